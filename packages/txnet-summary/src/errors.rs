//! Error types for txnet-summary
//!
//! Parse errors are reported per sample so the loader's caller can pick a
//! policy. Summary errors are all-or-nothing for one summarization call.

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::UnknownNodeLabel;

/// Per-sample parse failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Sample references a label absent from the node registry
    #[error("Unknown node label '{label}'{}", line_suffix(.line))]
    UnknownNodeLabel { label: String, line: Option<usize> },

    /// Edge token is not `<from>-<weight>-<to>`
    #[error("Malformed edge token '{token}'{}: {reason}", line_suffix(.line))]
    MalformedToken {
        token: String,
        line: Option<usize>,
        reason: String,
    },
}

impl ParseError {
    pub fn malformed(token: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseError::MalformedToken {
            token: token.into(),
            line: None,
            reason: reason.into(),
        }
    }

    /// Attach the 1-based line number of the offending sample
    pub fn at_line(self, n: usize) -> Self {
        match self {
            ParseError::UnknownNodeLabel { label, .. } => ParseError::UnknownNodeLabel {
                label,
                line: Some(n),
            },
            ParseError::MalformedToken { token, reason, .. } => ParseError::MalformedToken {
                token,
                line: Some(n),
                reason,
            },
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::UnknownNodeLabel { line, .. } | ParseError::MalformedToken { line, .. } => {
                *line
            }
        }
    }
}

impl From<UnknownNodeLabel> for ParseError {
    fn from(err: UnknownNodeLabel) -> Self {
        ParseError::UnknownNodeLabel {
            label: err.label,
            line: None,
        }
    }
}

/// Summarization failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    /// A shard replay (or the seeding pass) hit a fault; partial results are discarded
    #[error("Summarization failed{}: {reason}", shard_suffix(.shard))]
    SummarizationFailed { shard: Option<usize>, reason: String },

    /// A newer request was submitted before this one finished
    #[error("Summarization superseded (generation {generation})")]
    Superseded { generation: u64 },
}

impl SummaryError {
    pub fn failed(reason: impl Into<String>) -> Self {
        SummaryError::SummarizationFailed {
            shard: None,
            reason: reason.into(),
        }
    }

    pub fn shard_failed(shard: usize, reason: impl Into<String>) -> Self {
        SummaryError::SummarizationFailed {
            shard: Some(shard),
            reason: reason.into(),
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, SummaryError::Superseded { .. })
    }
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum TxnetError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for txnet operations
pub type Result<T> = std::result::Result<T, TxnetError>;

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" at line {}", n),
        None => String::new(),
    }
}

fn shard_suffix(shard: &Option<usize>) -> String {
    match shard {
        Some(n) => format!(" in shard {}", n),
        None => String::new(),
    }
}
