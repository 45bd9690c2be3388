//! Configuration I/O (YAML loading)
//!
//! ```yaml
//! version: 1
//! summary:
//!   concurrency: 4
//!   transmission_threshold: 0.3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult, SummaryConfig};

const SUPPORTED_VERSIONS: &[u32] = &[1];

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    /// Summary settings; omitted fields keep their defaults
    #[serde(default)]
    pub summary: SummaryConfig,
}

impl SummaryConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let version = match raw.get("version") {
            Some(v) => v.as_u64().ok_or(ConfigError::MissingVersion)? as u32,
            None => return Err(ConfigError::MissingVersion),
        };
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                known: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let file: ConfigFileV1 = serde_yaml::from_value(raw)?;
        file.summary.validate()?;
        Ok(file.summary)
    }

    /// Load and validate a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Export as a v1 YAML document
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: 1,
            summary: self.clone(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}
