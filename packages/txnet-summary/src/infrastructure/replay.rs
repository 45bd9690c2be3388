//! Edge state replay engine
//!
//! Single-threaded reference semantics for rebuilding edge state from the
//! diff log and accumulating per-edge presence weight over a range.
//!
//! ```text
//! for t in sequence[start..end]:
//!     state += t.add
//!     state -= t.remove
//!     for e in state: weight[e] += increment      // after the diff
//! ```
//!
//! Replay is strict: adding an edge that is already present, or removing one
//! that is absent, means the starting state was wrong for this position (or
//! the log is corrupt) and is reported as a [`ReplayFault`].

use std::ops::Range;

use thiserror::Error;

use crate::domain::{EdgeIndex, EdgeSet, EdgeWeights, NetworkTransition, TransitionSequence};

use super::cancellation::CancellationToken;

/// Diff inconsistent with the state it is applied to
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayFault {
    #[error("transition {transition} adds edge {edge} which is already present")]
    DuplicateAdd { transition: usize, edge: EdgeIndex },

    #[error("transition {transition} removes edge {edge} which is not present")]
    MissingRemove { transition: usize, edge: EdgeIndex },

    #[error("replay cancelled before transition {transition}")]
    Cancelled { transition: usize },
}

/// End state and accumulated weights of a replayed range
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayOutcome {
    pub end_state: EdgeSet,
    /// Sparse: edges never present in the range are absent
    pub weight_delta: EdgeWeights,
}

/// Apply one diff in place
pub fn apply_transition(
    state: &mut EdgeSet,
    transition: &NetworkTransition,
    position: usize,
) -> Result<(), ReplayFault> {
    for &edge in &transition.add {
        if !state.insert(edge) {
            return Err(ReplayFault::DuplicateAdd {
                transition: position,
                edge,
            });
        }
    }
    for &edge in &transition.remove {
        if !state.remove(&edge) {
            return Err(ReplayFault::MissingRemove {
                transition: position,
                edge,
            });
        }
    }
    Ok(())
}

/// Replay engine over a borrowed, read-only sequence
#[derive(Debug, Clone, Copy)]
pub struct EdgeStateReplayEngine<'s> {
    sequence: &'s TransitionSequence,
}

impl<'s> EdgeStateReplayEngine<'s> {
    pub fn new(sequence: &'s TransitionSequence) -> Self {
        Self { sequence }
    }

    pub fn sequence(&self) -> &'s TransitionSequence {
        self.sequence
    }

    /// Advance `state` (the state just before `range.start`) through `range`
    pub fn advance(&self, state: &mut EdgeSet, range: Range<usize>) -> Result<(), ReplayFault> {
        let start = range.start;
        for (offset, transition) in self.sequence.range(range).iter().enumerate() {
            apply_transition(state, transition, start + offset)?;
        }
        Ok(())
    }

    /// State after replaying `[0, k)` from empty
    pub fn state_at(&self, k: usize) -> Result<EdgeSet, ReplayFault> {
        let mut state = EdgeSet::default();
        self.advance(&mut state, 0..k)?;
        Ok(state)
    }

    /// Replay `range` from `start_state`, accumulating `increment` per sample
    pub fn replay_range(
        &self,
        start_state: EdgeSet,
        range: Range<usize>,
        increment: f64,
    ) -> Result<ReplayOutcome, ReplayFault> {
        self.replay_range_cancellable(start_state, range, increment, &CancellationToken::none())
    }

    /// [`replay_range`](Self::replay_range), checking `token` before each transition
    pub fn replay_range_cancellable(
        &self,
        start_state: EdgeSet,
        range: Range<usize>,
        increment: f64,
        token: &CancellationToken,
    ) -> Result<ReplayOutcome, ReplayFault> {
        let start = range.start;
        let mut state = start_state;
        let mut weight_delta = EdgeWeights::default();

        for (offset, transition) in self.sequence.range(range).iter().enumerate() {
            let position = start + offset;
            if token.is_cancelled() {
                return Err(ReplayFault::Cancelled {
                    transition: position,
                });
            }

            apply_transition(&mut state, transition, position)?;
            for &edge in &state {
                *weight_delta.entry(edge).or_insert(0.0) += increment;
            }
        }

        Ok(ReplayOutcome {
            end_state: state,
            weight_delta,
        })
    }
}

/// Sequential burn-in summary; the reference the parallel summarizer must match
///
/// Same window and increment as
/// [`ParallelBurninSummarizer::summarize`](super::ParallelBurninSummarizer::summarize):
/// samples `[burnin, total)`, each contributing `1 / (total - burnin)`.
pub fn summarize_sequential(
    sequence: &TransitionSequence,
    burnin: usize,
) -> Result<EdgeWeights, ReplayFault> {
    let total = sequence.len();
    if total == 0 || burnin >= total {
        return Ok(EdgeWeights::default());
    }

    let engine = EdgeStateReplayEngine::new(sequence);
    let increment = 1.0 / (total - burnin) as f64;
    let seed = engine.state_at(burnin)?;
    Ok(engine.replay_range(seed, burnin..total, increment)?.weight_delta)
}
