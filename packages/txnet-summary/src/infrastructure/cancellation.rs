//! Generation-based cancellation
//!
//! Each summarization request carries the generation it was issued under.
//! Submitting a newer request bumps the shared counter, which cancels every
//! token holding an older generation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Option<(u64, Arc<AtomicU64>)>,
}

impl CancellationToken {
    /// Token that is never cancelled
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// Token valid while `latest` still equals `generation`
    pub fn for_generation(generation: u64, latest: Arc<AtomicU64>) -> Self {
        Self {
            inner: Some((generation, latest)),
        }
    }

    pub fn generation(&self) -> Option<u64> {
        self.inner.as_ref().map(|(g, _)| *g)
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        match &self.inner {
            Some((generation, latest)) => latest.load(Ordering::Acquire) != *generation,
            None => false,
        }
    }
}
