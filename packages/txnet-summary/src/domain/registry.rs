//! Node registry
//!
//! Maps stable node labels to dense indices in `[0, N)`. Indices never change
//! once assigned, and the registry is borrowed immutably for the whole
//! duration of a transition load.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::edge_index::EdgeIndexCodec;

/// Lookup failure for a label absent from the registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown node label '{label}'")]
pub struct UnknownNodeLabel {
    pub label: String,
}

impl UnknownNodeLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// Label lookup consumed by the transition parser
pub trait NodeLookup {
    fn label_to_index(&self, label: &str) -> Result<usize, UnknownNodeLabel>;

    /// Total node count `N`
    fn size(&self) -> usize;

    fn codec(&self) -> EdgeIndexCodec {
        EdgeIndexCodec::new(self.size())
    }
}

/// A registered node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub label: String,
    pub index: usize,
    pub is_source: bool,
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub symptom_type: Option<String>,
    /// Locus -> allele values
    #[serde(default)]
    pub alleles: BTreeMap<String, Vec<f64>>,
}

impl NodeInfo {
    pub fn new(label: impl Into<String>, index: usize, is_source: bool) -> Self {
        Self {
            label: label.into(),
            index,
            is_source,
            time: None,
            symptom_type: None,
            alleles: BTreeMap::new(),
        }
    }
}

/// Dense, insertion-ordered label registry
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: Vec<NodeInfo>,
    by_label: FxHashMap<String, usize>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a label, returning its index
    ///
    /// Re-inserting a known label returns the existing index; a later
    /// `is_source = true` marks the existing node as a source.
    pub fn insert(&mut self, label: impl Into<String>, is_source: bool) -> usize {
        let label = label.into();
        if let Some(&index) = self.by_label.get(&label) {
            if is_source {
                self.nodes[index].is_source = true;
            }
            return index;
        }

        let index = self.nodes.len();
        self.by_label.insert(label.clone(), index);
        self.nodes.push(NodeInfo::new(label, index, is_source));
        index
    }

    pub fn node(&self, index: usize) -> Option<&NodeInfo> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut NodeInfo> {
        self.nodes.get_mut(index)
    }

    pub fn get(&self, label: &str) -> Option<&NodeInfo> {
        self.by_label.get(label).map(|&i| &self.nodes[i])
    }

    pub fn is_source(&self, index: usize) -> bool {
        self.nodes.get(index).is_some_and(|n| n.is_source)
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(|n| n.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeInfo> {
        self.nodes.iter()
    }

    pub fn non_source_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_source).count()
    }

    pub fn source_count(&self) -> usize {
        self.nodes.len() - self.non_source_count()
    }
}

impl NodeLookup for NodeRegistry {
    fn label_to_index(&self, label: &str) -> Result<usize, UnknownNodeLabel> {
        self.by_label
            .get(label)
            .copied()
            .ok_or_else(|| UnknownNodeLabel::new(label))
    }

    fn size(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_dense_indices() {
        let mut registry = NodeRegistry::new();
        assert_eq!(registry.insert("a", false), 0);
        assert_eq!(registry.insert("b", false), 1);
        assert_eq!(registry.insert("src", true), 2);
        assert_eq!(registry.size(), 3);
        assert_eq!(registry.label(1), Some("b"));
        assert!(registry.is_source(2));
        assert!(!registry.is_source(0));
        assert!(!registry.is_source(99));
    }

    #[test]
    fn test_reinsert_keeps_index() {
        let mut registry = NodeRegistry::new();
        registry.insert("a", false);
        registry.insert("b", false);
        assert_eq!(registry.insert("a", true), 0);
        assert_eq!(registry.len(), 2);
        assert!(registry.is_source(0));
        assert_eq!(registry.source_count(), 1);
    }

    #[test]
    fn test_unknown_label() {
        let mut registry = NodeRegistry::new();
        registry.insert("a", false);
        assert_eq!(registry.label_to_index("a"), Ok(0));
        let err = registry.label_to_index("zz").unwrap_err();
        assert_eq!(err.label, "zz");
    }

    #[test]
    fn test_codec_tracks_size() {
        let mut registry = NodeRegistry::new();
        for label in ["a", "b", "c"] {
            registry.insert(label, false);
        }
        assert_eq!(registry.codec().node_count(), 3);
    }
}
