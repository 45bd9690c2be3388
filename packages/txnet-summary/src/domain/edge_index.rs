//! Edge index codec
//!
//! ```text
//! index  = source * N + target
//! source = index / N
//! target = index % N
//! ```

use serde::{Deserialize, Serialize};

/// Scalar encoding of a directed `(source, target)` node pair
pub type EdgeIndex = usize;

/// Bijection between directed node pairs and `[0, N*N)`
///
/// Out-of-range inputs mean the node registry upstream is corrupt, so they
/// panic instead of returning an error.
///
/// # Examples
///
/// ```rust
/// use txnet_summary::EdgeIndexCodec;
///
/// let codec = EdgeIndexCodec::new(3);
/// assert_eq!(codec.encode(1, 2), 5);
/// assert_eq!(codec.decode(5), (1, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeIndexCodec {
    node_count: usize,
}

impl EdgeIndexCodec {
    pub fn new(node_count: usize) -> Self {
        assert!(
            node_count.checked_mul(node_count).is_some(),
            "node count {} overflows the edge index space",
            node_count
        );
        Self { node_count }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Size of the edge index space (`N * N`)
    pub fn edge_space(&self) -> usize {
        self.node_count * self.node_count
    }

    #[inline]
    pub fn encode(&self, source: usize, target: usize) -> EdgeIndex {
        assert!(
            source < self.node_count && target < self.node_count,
            "edge ({}, {}) out of range for {} nodes",
            source,
            target,
            self.node_count
        );
        source * self.node_count + target
    }

    #[inline]
    pub fn decode(&self, index: EdgeIndex) -> (usize, usize) {
        assert!(
            index < self.edge_space(),
            "edge index {} out of range for {} nodes",
            index,
            self.node_count
        );
        (index / self.node_count, index % self.node_count)
    }
}
