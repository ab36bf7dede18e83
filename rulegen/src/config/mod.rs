//! Configuration for rulegen - using the CLI (clap), env (clap), and configuration file (toml).

mod clap_config;
mod toml_config;

use crate::util;
use clap::{parser::ValueSource, ArgMatches, ValueEnum};
use rules::Rule;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use toml_config::TomlConfigError;

pub(crate) const DEFAULT_SCHEMA: &str = "schema.graphql";
pub(crate) const DEFAULT_OUTPUT: &str = "firestore.rules";
pub(crate) const DEFAULT_CONFIG_FILE: &str = "rulegen.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error in config file {}", .path.display())]
    TomlConfig {
        path: PathBuf,
        source: TomlConfigError,
    },

    #[error("config file {} does not exist", .0.display())]
    MissingConfigFile(PathBuf),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug)]
pub struct Config {
    pub command: RulegenCommand,

    /// Annotated GraphQL schema (or pre-parsed JSON schema)
    pub schema: PathBuf,

    /// Generated rules file
    pub output: PathBuf,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Hand written rules from the config file
    pub rules: Vec<Rule>,
}

impl Config {
    pub fn new() -> ConfigResult<Self> {
        Self::from_matches(&clap_config::get_matches())
    }

    #[cfg(test)]
    #[allow(clippy::unwrap_used)]
    fn from_args<I, T>(args: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::from_matches(&clap_config::command().try_get_matches_from(args).unwrap())
    }

    fn from_matches(matches: &ArgMatches) -> ConfigResult<Self> {
        let config = Config::from(matches);

        let config_file = util::expand_home(&string_arg(matches, "config", DEFAULT_CONFIG_FILE));
        match toml_config::read_config(&config_file) {
            Ok(Some(toml_config)) => config.merge_toml_config(toml_config, &config_file, matches),
            Ok(None) if Self::was_supplied_by_user("config", matches) => {
                Err(ConfigError::MissingConfigFile(config_file))
            }
            Ok(None) => Ok(config),
            Err(source) => Err(ConfigError::TomlConfig {
                path: config_file,
                source,
            }),
        }
    }

    fn was_supplied_by_user(key: &str, matches: &ArgMatches) -> bool {
        !matches!(matches.value_source(key), Some(ValueSource::DefaultValue))
    }

    /// The order of priority is (in decreasing order):
    /// cli -> env -> toml -> default
    ///
    /// A TOML value is only used when the same option was left at its default.
    fn merge_toml_config(
        mut self,
        toml_config: toml_config::TomlConfig,
        config_file: &Path,
        matches: &ArgMatches,
    ) -> ConfigResult<Self> {
        let base_dir = config_file.parent().unwrap_or(Path::new(""));
        let core = &toml_config.core;

        if !Self::was_supplied_by_user("schema", matches) {
            if let Some(schema) = &core.schema {
                self.schema = util::resolve_from(base_dir, schema);
            }
        }

        if !Self::was_supplied_by_user("output", matches) {
            if let Some(output) = &core.output {
                self.output = util::resolve_from(base_dir, output);
            }
        }

        if !Self::was_supplied_by_user("log-level", matches) {
            if let Some(log_level) = core.log_level {
                self.log_level = log_level;
            }
        }

        if !Self::was_supplied_by_user("log-format", matches) {
            if let Some(log_format) = core.log_format {
                self.log_format = log_format;
            }
        }

        self.rules = toml_config
            .into_rules()
            .map_err(|source| ConfigError::TomlConfig {
                path: config_file.to_path_buf(),
                source,
            })?;

        Ok(self)
    }
}

fn string_arg(matches: &ArgMatches, key: &str, default: &str) -> String {
    matches
        .get_one::<String>(key)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

// `clap` does not provide an automated way to build the config in builder mode
impl From<&ArgMatches> for Config {
    fn from(am: &ArgMatches) -> Self {
        Config {
            command: match am.subcommand() {
                Some(("check", _)) => RulegenCommand::Check,
                Some(("print-directive", _)) => RulegenCommand::PrintDirective,
                _ => RulegenCommand::Generate,
            },
            schema: util::expand_home(&string_arg(am, "schema", DEFAULT_SCHEMA)),
            output: util::expand_home(&string_arg(am, "output", DEFAULT_OUTPUT)),
            log_level: am.get_one::<LogLevel>("log-level").copied().unwrap_or_default(),
            log_format: am
                .get_one::<LogFormat>("log-format")
                .copied()
                .unwrap_or_default(),
            rules: vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulegenCommand {
    /// Write the rules file
    Generate,
    /// Compare the rules file against the schema
    Check,
    /// Print the directive definition
    PrintDirective,
}

#[derive(Copy, Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, ValueEnum)]
#[clap(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    #[serde(rename = "DEBUG")]
    Debug,
    #[default]
    #[serde(rename = "INFO")]
    Info,
    #[serde(rename = "ERROR")]
    Error,
}

impl LogLevel {
    /// Filter directive for `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Deserialize)]
#[clap(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogFormat {
    #[default]
    #[serde(rename = "PRETTY")]
    Pretty,
    #[serde(rename = "JSON")]
    Json,
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn args(dir: &Path, rest: &[&str]) -> Vec<String> {
        let config = dir.join("rulegen.toml");
        let mut args = vec![
            "rulegen".to_string(),
            "--config".to_string(),
            config.display().to_string(),
        ];
        args.extend(rest.iter().map(|a| a.to_string()));
        args
    }

    #[test]
    fn defaults_without_config_file() {
        let config = Config::from_args(["rulegen"]).unwrap();

        assert_eq!(config.command, RulegenCommand::Generate);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn subcommands() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("rulegen.toml"), "").unwrap();

        let check = Config::from_args(args(dir.path(), &["check"])).unwrap();
        assert_eq!(check.command, RulegenCommand::Check);

        let print = Config::from_args(args(dir.path(), &["print-directive"])).unwrap();
        assert_eq!(print.command, RulegenCommand::PrintDirective);
    }

    #[test]
    fn toml_values_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("rulegen.toml"),
            r#"
            [core]
            schema = "api/schema.graphql"
            output = "/tmp/out.rules"
            log_format = "JSON"

            [[rules]]
            match = "/public/{document=**}"
            read = true
            "#,
        )
        .unwrap();

        let config = Config::from_args(args(dir.path(), &["check"])).unwrap();

        assert_eq!(config.schema, dir.path().join("api/schema.graphql"));
        assert_eq!(config.output, PathBuf::from("/tmp/out.rules"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.rules.len(), 1);
    }

    #[test]
    fn cli_overrides_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("rulegen.toml"),
            "[core]\nschema = \"from-toml.graphql\"\nlog_level = \"ERROR\"\n",
        )
        .unwrap();

        let config = Config::from_args(args(
            dir.path(),
            &["generate", "--schema", "from-cli.graphql", "--log-level", "DEBUG"],
        ))
        .unwrap();

        assert_eq!(config.schema, PathBuf::from("from-cli.graphql"));
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn explicit_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_args(args(dir.path(), &[])).unwrap_err();

        assert!(matches!(err, ConfigError::MissingConfigFile(_)));
    }

    #[test]
    fn invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("rulegen.toml"), "[[rules]]\nmatch = \"\"\n").unwrap();

        let err = Config::from_args(args(dir.path(), &[])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TomlConfig {
                source: TomlConfigError::EmptyMatch { index: 0 },
                ..
            }
        ));
    }
}
