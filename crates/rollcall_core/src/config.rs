//! Tracker configuration file.
//!
//! # Responsibility
//! - Load the TOML configuration: database path, section options, logging.
//! - Validate the section option set.
//!
//! # Invariants
//! - Every field is optional; a missing file section falls back to defaults.
//! - Section options are non-empty after trimming and unique.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DB_FILE_NAME: &str = "rollcall.sqlite3";
const DEFAULT_SECTIONS: &[&str] = &["A", "B", "C"];

/// Configuration load/validation error.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse {
                path: Some(path),
                source,
            } => write!(f, "failed to parse config `{}`: {source}", path.display()),
            Self::Parse { path: None, source } => write!(f, "failed to parse config: {source}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Logging options. Logging stays off unless `dir` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `trace|debug|info|warn|error`; defaults to the build-mode level.
    pub level: Option<String>,
    /// Absolute directory for rolling log files.
    pub dir: Option<PathBuf>,
}

/// Top-level tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    pub db_path: PathBuf,
    /// Section options offered by the roster form, in display order.
    pub sections: Vec<String>,
    pub logging: LoggingConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            sections: DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|err| match err {
            ConfigError::Parse { path: None, source } => ConfigError::Parse {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })
    }

    /// Parses and validates TOML text.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(raw).map_err(|source| ConfigError::Parse { path: None, source })?;
        config.sections = normalize_sections(config.sections)?;
        Ok(config)
    }
}

fn normalize_sections(sections: Vec<String>) -> Result<Vec<String>, ConfigError> {
    let mut normalized: Vec<String> = Vec::with_capacity(sections.len());
    for section in sections {
        let trimmed = section.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid(
                "section names cannot be empty".to_string(),
            ));
        }
        if normalized.iter().any(|existing| existing == trimmed) {
            return Err(ConfigError::Invalid(format!(
                "duplicate section `{trimmed}`"
            )));
        }
        normalized.push(trimmed.to_string());
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, TrackerConfig};
    use std::path::PathBuf;

    #[test]
    fn empty_document_yields_defaults() {
        let config = TrackerConfig::parse("").unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.sections, vec!["A", "B", "C"]);
    }

    #[test]
    fn parses_all_fields() {
        let config = TrackerConfig::parse(
            r#"
db_path = "/srv/rollcall/data.sqlite3"
sections = [" Morning ", "Evening"]

[logging]
level = "debug"
dir = "/var/tmp/rollcall-logs"
"#,
        )
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/srv/rollcall/data.sqlite3"));
        assert_eq!(config.sections, vec!["Morning", "Evening"]);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(
            config.logging.dir,
            Some(PathBuf::from("/var/tmp/rollcall-logs"))
        );
    }

    #[test]
    fn rejects_duplicate_and_blank_sections() {
        let duplicate = TrackerConfig::parse(r#"sections = ["A", "A "]"#).unwrap_err();
        assert!(matches!(duplicate, ConfigError::Invalid(message) if message.contains("duplicate")));

        let blank = TrackerConfig::parse(r#"sections = ["  "]"#).unwrap_err();
        assert!(matches!(blank, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = TrackerConfig::parse("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
    }
}
