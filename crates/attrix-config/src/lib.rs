//! TOML configuration for hosts of the attribute engine.
//!
//! ```toml
//! [editor]
//! keep_orphaned = false
//!
//! [[aliases]]
//! canonical = "brand"
//! variants = ["marka", "manufacturer"]
//! ```

use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// AttrixConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AttrixConfig {
    #[serde(default)]
    pub editor: EditorConfig,

    /// Canonical alias groups; empty means the standard brand/model/serial set.
    #[serde(default)]
    pub aliases: Vec<AliasGroupConfig>,
}

impl AttrixConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();

        for group in &self.aliases {
            let canonical = group.canonical.trim();
            if canonical.is_empty() {
                return Err(ConfigError::Invalid(
                    "alias group has an empty canonical key".to_string(),
                ));
            }
            if !seen.insert(canonical.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "alias group '{canonical}' is declared more than once"
                )));
            }
        }

        Ok(())
    }
}

///
/// EditorConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EditorConfig {
    /// Carry stored keys that match no schema field into the saved document.
    #[serde(default)]
    pub keep_orphaned: bool,
}

///
/// AliasGroupConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AliasGroupConfig {
    pub canonical: String,

    #[serde(default)]
    pub variants: Vec<String>,
}

///
/// TESTS
///
