use crate::{
    config::Config,
    drift,
    errors::{AppError, Result},
};
use schema::Schema;
use std::{fs, path::Path};
use tracing::{debug, info};

/// Loads the schema, picking the JSON loader for `.json` files
pub fn load_schema(path: &Path) -> Result<Schema> {
    let text = fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

    Ok(if is_json {
        Schema::from_json_str(&text)?
    } else {
        Schema::from_sdl(&text)?
    })
}

pub fn compile(config: &Config) -> Result<String> {
    let schema = load_schema(&config.schema)?;
    let collections = schema.collections()?;

    for collection in &collections {
        debug!(
            collection = collection.name(),
            type_name = collection.type_name(),
            collection_type = %collection.collection_type(),
            "found collection"
        );
    }

    Ok(rules::compile(&collections, &config.rules))
}

pub fn generate(config: &Config) -> Result<()> {
    let compiled = compile(config)?;
    write_artifact(&config.output, &compiled)?;

    info!(output = %config.output.display(), "rules written");
    Ok(())
}

pub fn check(config: &Config) -> Result<()> {
    let compiled = compile(config)?;
    drift::check(&config.output, &compiled)?;

    info!(output = %config.output.display(), "rules are up to date");
    Ok(())
}

/// Writes next to the target and renames, so a failed write never leaves a
/// truncated rules file behind
fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    let write_err = |source| AppError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");

    if let Err(source) = fs::write(&tmp, contents).and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(source));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{LogFormat, LogLevel, RulegenCommand};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    const SCHEMA: &str = r#"
        type Child @firestore(
          name: "children"
          type: INDEXED_BY_TENANT
          readPermission: "child:read"
          writePermission: "child:write"
        ) {
          id: ID!
        }
    "#;

    fn config(schema: PathBuf, output: PathBuf) -> Config {
        Config {
            command: RulegenCommand::Generate,
            schema,
            output,
            log_level: LogLevel::Info,
            log_format: LogFormat::Pretty,
            rules: vec![],
        }
    }

    #[test]
    fn generate_then_check() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.graphql");
        fs::write(&schema, SCHEMA).unwrap();
        let config = config(schema, dir.path().join("nested/firestore.rules"));

        generate(&config).unwrap();
        check(&config).unwrap();

        let written = fs::read_to_string(&config.output).unwrap();
        assert_eq!(written, compile(&config).unwrap());
        assert!(written.contains("match /children/{document}"));
        assert!(!dir.path().join("nested/firestore.rules.tmp").exists());
    }

    #[test]
    fn json_schema() {
        let dir = tempfile::tempdir().unwrap();
        let sdl_path = dir.path().join("schema.graphql");
        let json_path = dir.path().join("schema.json");
        fs::write(&sdl_path, SCHEMA).unwrap();

        let schema = Schema::from_sdl(SCHEMA).unwrap();
        fs::write(&json_path, serde_json::to_string(schema.document()).unwrap()).unwrap();

        let out = dir.path().join("firestore.rules");
        assert_eq!(
            compile(&config(json_path, out.clone())).unwrap(),
            compile(&config(sdl_path, out)).unwrap()
        );
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // renaming a file over a non-empty directory fails
        let output = dir.path().join("firestore.rules");
        fs::create_dir(&output).unwrap();
        fs::write(output.join("keep"), "").unwrap();

        let err = write_artifact(&output, "rules").unwrap_err();

        assert!(matches!(err, AppError::Write { .. }));
        assert!(!dir.path().join("firestore.rules.tmp").exists());
        assert!(output.join("keep").exists());
    }

    #[test]
    fn missing_schema() {
        let dir = tempfile::tempdir().unwrap();
        let err = compile(&config(
            dir.path().join("nope.graphql"),
            dir.path().join("firestore.rules"),
        ))
        .unwrap_err();

        assert!(matches!(err, AppError::Read { .. }));
    }

    #[test]
    fn invalid_schema_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.graphql");
        fs::write(
            &schema,
            r#"type AgeGroup @firestore(name: "age-groups", type: DOC_PER_TENANT, writePermission: "age-groups:write") { id: ID! }"#,
        )
        .unwrap();
        let config = config(schema, dir.path().join("firestore.rules"));

        let err = generate(&config).unwrap_err();
        assert!(matches!(err, AppError::Schema(_)));
        assert!(!config.output.exists());
    }
}
