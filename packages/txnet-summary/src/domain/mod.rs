//! Domain layer
//!
//! # Domain Models
//!
//! - `EdgeIndexCodec`: bijection between `(source, target)` and a scalar edge index
//! - `NodeRegistry`: label -> dense node index, fixed for a whole load
//! - `NetworkTransition`: add/remove diff between consecutive samples
//! - `TransitionSequence`: the frozen, ordered diff log
//!
//! Cumulative edge state is never stored per sample; it is always derived by
//! replaying the diff log from the start.

pub mod edge_index;
pub mod registry;
pub mod transition;

use rustc_hash::{FxHashMap, FxHashSet};

pub use edge_index::{EdgeIndex, EdgeIndexCodec};
pub use registry::{NodeInfo, NodeLookup, NodeRegistry, UnknownNodeLabel};
pub use transition::{
    NetworkTransition, OverlappingTransition, TransitionSequence, TransitionSequenceStore,
};

/// Cumulative edge state after replaying a prefix of the diff log
pub type EdgeSet = FxHashSet<EdgeIndex>;

/// Edge index -> fraction of post-burn-in samples containing the edge
pub type EdgeWeights = FxHashMap<EdgeIndex, f64>;
