//! Summary configuration
//!
//! Worker count, floating-point tolerance, display threshold and the load
//! policy for malformed samples. Loaded from YAML (see [`io`]) or built in code.

pub mod error;
pub mod io;

use serde::{Deserialize, Serialize};

pub use error::{ConfigError, ConfigResult};
pub use io::ConfigFileV1;

/// What a load does with a sample that fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// First malformed sample aborts the whole load
    #[default]
    Abort,
    /// Malformed samples are reported and skipped
    SkipMalformed,
}

/// Summarization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummaryConfig {
    /// Number of shard workers (0=auto, 1..=256)
    pub concurrency: usize,

    /// Tolerance for weight comparisons (0 < epsilon <= 1e-3)
    pub epsilon: f64,

    /// Edges must exceed this weight to be shown (0..=1)
    pub transmission_threshold: f64,

    /// Keep edges whose source node is a source
    pub include_sources: bool,

    /// Malformed sample handling during load
    pub load_policy: LoadPolicy,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            concurrency: 0,
            epsilon: 1e-9,
            transmission_threshold: 0.5,
            include_sources: true,
            load_policy: LoadPolicy::Abort,
        }
    }
}

impl SummaryConfig {
    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.concurrency > 256 {
            return Err(ConfigError::out_of_range(
                "concurrency",
                self.concurrency,
                "0..=256",
                "0 picks the core count",
            ));
        }

        if !(self.epsilon > 0.0 && self.epsilon <= 1e-3) {
            return Err(ConfigError::out_of_range(
                "epsilon",
                self.epsilon,
                "(0, 1e-3]",
                "weight comparison tolerance",
            ));
        }

        if !(0.0..=1.0).contains(&self.transmission_threshold) {
            return Err(ConfigError::out_of_range(
                "transmission_threshold",
                self.transmission_threshold,
                "0..=1",
                "edge weights are sample fractions",
            ));
        }

        Ok(())
    }

    /// Worker count with `0` resolved to the available parallelism
    pub fn resolved_concurrency(&self) -> usize {
        resolve_concurrency(self.concurrency)
    }

    /// Builder: Set concurrency
    pub fn concurrency(mut self, v: usize) -> Self {
        self.concurrency = v;
        self
    }

    /// Builder: Set epsilon
    pub fn epsilon(mut self, v: f64) -> Self {
        self.epsilon = v;
        self
    }

    /// Builder: Set transmission_threshold
    pub fn transmission_threshold(mut self, v: f64) -> Self {
        self.transmission_threshold = v;
        self
    }

    /// Builder: Set include_sources
    pub fn include_sources(mut self, v: bool) -> Self {
        self.include_sources = v;
        self
    }

    /// Builder: Set load_policy
    pub fn load_policy(mut self, v: LoadPolicy) -> Self {
        self.load_policy = v;
        self
    }
}

pub(crate) fn resolve_concurrency(requested: usize) -> usize {
    if requested == 0 {
        num_cpus::get().max(1)
    } else {
        requested
    }
}
