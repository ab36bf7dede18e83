//! File-based (TOML) configuration: core settings and hand written rules.

use super::{Deserialize, LogFormat, LogLevel};
use rules::{AllowValue, Rule};
use std::{fs, io, path::Path};

#[derive(Debug, thiserror::Error)]
pub enum TomlConfigError {
    #[error("failed to read config file")]
    Io(#[from] io::Error),

    #[error("invalid config file")]
    Toml(#[from] toml::de::Error),

    #[error("rule {index} in config file has an empty match path")]
    EmptyMatch { index: usize },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CoreConfig {
    pub schema: Option<String>,
    pub output: Option<String>,
    pub log_level: Option<LogLevel>,
    pub log_format: Option<LogFormat>,
}

/// A hand written rule, rendered before the generated ones
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RuleConfig {
    #[serde(default)]
    pub comment: String,
    #[serde(rename = "match")]
    pub match_path: String,
    pub extra: Option<String>,
    #[serde(default)]
    pub create: AllowValue,
    #[serde(default)]
    pub read: AllowValue,
    #[serde(default)]
    pub update: AllowValue,
    #[serde(default)]
    pub delete: AllowValue,
}

impl TomlConfig {
    pub fn into_rules(self) -> Result<Vec<Rule>, TomlConfigError> {
        self.rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| {
                if rule.match_path.trim().is_empty() {
                    return Err(TomlConfigError::EmptyMatch { index });
                }

                let mut r = Rule::new(&rule.comment, rule.match_path)
                    .allow_create(rule.create)
                    .allow_read(rule.read)
                    .allow_update(rule.update)
                    .allow_delete(rule.delete);
                if let Some(extra) = rule.extra {
                    r = r.with_extra(extra);
                }
                Ok(r)
            })
            .collect()
    }
}

/// Read the TOML configuration file, `None` if it does not exist
pub(super) fn read_config(path: &Path) -> Result<Option<TomlConfig>, TomlConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    Ok(Some(parse(&fs::read_to_string(path)?)?))
}

pub(super) fn parse(text: &str) -> Result<TomlConfig, TomlConfigError> {
    Ok(toml::from_str::<TomlConfig>(text)?)
}
