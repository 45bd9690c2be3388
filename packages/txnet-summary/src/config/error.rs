//! Summary configuration errors

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting outside its accepted interval
    #[error("summary.{field} = {value} is outside {allowed} ({hint})")]
    OutOfRange {
        field: &'static str,
        value: String,
        allowed: &'static str,
        hint: &'static str,
    },

    #[error("config has no integer `version` key; start the file with `version: 1` above `summary:`")]
    MissingVersion,

    #[error("config version {found} is not readable by this build (known: {known:?})")]
    UnsupportedVersion { found: u32, known: Vec<u32> },

    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed summary config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub fn out_of_range(
        field: &'static str,
        value: impl ToString,
        allowed: &'static str,
        hint: &'static str,
    ) -> Self {
        Self::OutOfRange {
            field,
            value: value.to_string(),
            allowed,
            hint,
        }
    }

    /// Name of the offending setting, if the error is about one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::OutOfRange { field, .. } => Some(*field),
            _ => None,
        }
    }
}
