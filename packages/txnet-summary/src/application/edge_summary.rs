//! Edge summary view
//!
//! Decodes a weight map into `(source, target, weight)` rows and applies the
//! display filters: transmission threshold, source-node visibility, parents
//! of a selected node, and the set of non-isolated nodes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::SummaryConfig;
use crate::domain::{EdgeIndex, EdgeIndexCodec, EdgeWeights, NodeRegistry};

/// One summarized directed edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSummary {
    pub source: usize,
    pub target: usize,
    pub index: EdgeIndex,
    pub weight: f64,
}

/// Decode every weighted edge, ordered by edge index
pub fn summarize_edges(weights: &EdgeWeights, codec: &EdgeIndexCodec) -> Vec<EdgeSummary> {
    let mut edges: Vec<EdgeSummary> = weights
        .iter()
        .map(|(&index, &weight)| {
            let (source, target) = codec.decode(index);
            EdgeSummary {
                source,
                target,
                index,
                weight,
            }
        })
        .collect();
    edges.sort_unstable_by_key(|e| e.index);
    edges
}

/// Display filter over summarized edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryFilter {
    /// Keep edges with weight strictly above this (beyond `epsilon`)
    pub threshold: f64,
    pub epsilon: f64,
    /// Keep edges leaving source nodes
    pub include_sources: bool,
}

impl Default for SummaryFilter {
    fn default() -> Self {
        Self::from_config(&SummaryConfig::default())
    }
}

impl SummaryFilter {
    pub fn from_config(config: &SummaryConfig) -> Self {
        Self {
            threshold: config.transmission_threshold,
            epsilon: config.epsilon,
            include_sources: config.include_sources,
        }
    }

    /// Filter that keeps every edge
    pub fn all() -> Self {
        Self {
            threshold: f64::NEG_INFINITY,
            epsilon: 0.0,
            include_sources: true,
        }
    }

    pub fn keeps(&self, edge: &EdgeSummary, registry: &NodeRegistry) -> bool {
        edge.weight - self.threshold > self.epsilon
            && (self.include_sources || !registry.is_source(edge.source))
    }

    pub fn apply(&self, edges: &[EdgeSummary], registry: &NodeRegistry) -> Vec<EdgeSummary> {
        edges
            .iter()
            .filter(|edge| self.keeps(edge, registry))
            .cloned()
            .collect()
    }
}

/// One-shot form of [`SummaryFilter::apply`]
pub fn filter_by_threshold(
    edges: &[EdgeSummary],
    threshold: f64,
    epsilon: f64,
    registry: &NodeRegistry,
    include_sources: bool,
) -> Vec<EdgeSummary> {
    SummaryFilter {
        threshold,
        epsilon,
        include_sources,
    }
    .apply(edges, registry)
}

/// Non-source nodes with a retained edge into `target`
pub fn parents_of(edges: &[EdgeSummary], target: usize, registry: &NodeRegistry) -> Vec<usize> {
    edges
        .iter()
        .filter(|edge| edge.target == target && !registry.is_source(edge.source))
        .map(|edge| edge.source)
        .collect()
}

/// Nodes touched by at least one retained edge
pub fn connected_nodes(edges: &[EdgeSummary]) -> BTreeSet<usize> {
    edges
        .iter()
        .flat_map(|edge| [edge.source, edge.target])
        .collect()
}
