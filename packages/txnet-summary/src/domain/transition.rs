//! Network transitions and the frozen transition sequence
//!
//! A transition lists the edges that appear (`add`) and disappear (`remove`)
//! relative to the cumulative edge set just before it. Both lists are sorted
//! and disjoint.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::edge_index::EdgeIndex;
use super::EdgeSet;

/// Add/remove diff between one sample and the previous one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTransition {
    pub add: Vec<EdgeIndex>,
    pub remove: Vec<EdgeIndex>,
}

impl NetworkTransition {
    /// Build from unordered lists; sorts and dedups both sides
    pub fn new(mut add: Vec<EdgeIndex>, mut remove: Vec<EdgeIndex>) -> Self {
        add.sort_unstable();
        add.dedup();
        remove.sort_unstable();
        remove.dedup();
        Self { add, remove }
    }

    /// Diff `previous -> current`: `add = current \ previous`, `remove = previous \ current`
    pub fn between(previous: &EdgeSet, current: &EdgeSet) -> Self {
        let add = current
            .iter()
            .filter(|idx| !previous.contains(idx))
            .copied()
            .collect();
        let remove = previous
            .iter()
            .filter(|idx| !current.contains(idx))
            .copied()
            .collect();
        Self::new(add, remove)
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    /// `add ∩ remove = ∅` (both sides are sorted)
    pub fn is_disjoint(&self) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.add.len() && j < self.remove.len() {
            match self.add[i].cmp(&self.remove[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return false,
            }
        }
        true
    }
}

/// Append-only builder for a [`TransitionSequence`]
///
/// Filled once per load, then frozen.
#[derive(Debug, Default)]
pub struct TransitionSequenceStore {
    transitions: Vec<NetworkTransition>,
}

impl TransitionSequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transitions: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, transition: NetworkTransition) {
        assert!(
            transition.is_disjoint(),
            "transition {} adds and removes the same edge",
            self.transitions.len()
        );
        self.transitions.push(transition);
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn freeze(self) -> TransitionSequence {
        TransitionSequence {
            transitions: self.transitions,
        }
    }
}

/// Ordered, immutable diff log; index `k` is the diff into sample `k`
///
/// Serialized as a plain list. Deserializing normalizes every transition and
/// rejects one that adds and removes the same edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<NetworkTransition>",
    into = "Vec<NetworkTransition>"
)]
pub struct TransitionSequence {
    transitions: Vec<NetworkTransition>,
}

/// Serialized transition whose add and remove lists share an edge
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transition {index} adds and removes edge {edge}")]
pub struct OverlappingTransition {
    pub index: usize,
    pub edge: EdgeIndex,
}

impl TryFrom<Vec<NetworkTransition>> for TransitionSequence {
    type Error = OverlappingTransition;

    fn try_from(raw: Vec<NetworkTransition>) -> Result<Self, Self::Error> {
        let mut store = TransitionSequenceStore::with_capacity(raw.len());
        for (index, NetworkTransition { add, remove }) in raw.into_iter().enumerate() {
            let transition = NetworkTransition::new(add, remove);
            if let Some(&edge) = transition
                .add
                .iter()
                .find(|edge| transition.remove.binary_search(edge).is_ok())
            {
                return Err(OverlappingTransition { index, edge });
            }
            store.push(transition);
        }
        Ok(store.freeze())
    }
}

impl From<TransitionSequence> for Vec<NetworkTransition> {
    fn from(sequence: TransitionSequence) -> Self {
        sequence.transitions
    }
}

impl TransitionSequence {
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Transition at `index`; out-of-range is a caller bug and panics
    pub fn at(&self, index: usize) -> &NetworkTransition {
        assert!(
            index < self.transitions.len(),
            "transition index {} out of range (len {})",
            index,
            self.transitions.len()
        );
        &self.transitions[index]
    }

    pub fn range(&self, range: Range<usize>) -> &[NetworkTransition] {
        assert!(
            range.start <= range.end && range.end <= self.transitions.len(),
            "transition range {:?} out of range (len {})",
            range,
            self.transitions.len()
        );
        &self.transitions[range]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NetworkTransition> {
        self.transitions.iter()
    }

    pub fn as_slice(&self) -> &[NetworkTransition] {
        &self.transitions
    }
}

impl FromIterator<NetworkTransition> for TransitionSequence {
    fn from_iter<I: IntoIterator<Item = NetworkTransition>>(iter: I) -> Self {
        let mut store = TransitionSequenceStore::new();
        for transition in iter {
            store.push(transition);
        }
        store.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[EdgeIndex]) -> EdgeSet {
        items.iter().copied().collect()
    }

    #[test]
    fn test_between() {
        let t = NetworkTransition::between(&set(&[1, 2, 3]), &set(&[3, 4]));
        assert_eq!(t.add, vec![4]);
        assert_eq!(t.remove, vec![1, 2]);
        assert!(t.is_disjoint());
    }

    #[test]
    fn test_between_empty_current_removes_all() {
        let t = NetworkTransition::between(&set(&[5, 7]), &EdgeSet::default());
        assert!(t.add.is_empty());
        assert_eq!(t.remove, vec![5, 7]);
    }

    #[test]
    fn test_new_sorts_and_dedups() {
        let t = NetworkTransition::new(vec![3, 1, 3], vec![9, 2]);
        assert_eq!(t.add, vec![1, 3]);
        assert_eq!(t.remove, vec![2, 9]);
    }

    #[test]
    fn test_disjoint_detection() {
        assert!(!NetworkTransition::new(vec![1, 4], vec![4]).is_disjoint());
        assert!(NetworkTransition::default().is_disjoint());
    }

    #[test]
    fn test_store_freeze() {
        let mut store = TransitionSequenceStore::new();
        store.push(NetworkTransition::new(vec![1], vec![]));
        store.push(NetworkTransition::new(vec![2], vec![1]));
        assert_eq!(store.len(), 2);

        let seq = store.freeze();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.at(1).remove, vec![1]);
        assert_eq!(seq.range(1..2).len(), 1);
    }

    #[test]
    #[should_panic(expected = "adds and removes")]
    fn test_store_rejects_overlap() {
        let mut store = TransitionSequenceStore::new();
        store.push(NetworkTransition::new(vec![1], vec![1]));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_at_out_of_range() {
        TransitionSequence::default().at(0);
    }

    #[test]
    fn test_sequence_serde() {
        let seq: TransitionSequence = vec![
            NetworkTransition::new(vec![1], vec![]),
            NetworkTransition::new(vec![], vec![1]),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&seq).unwrap();
        assert_eq!(json, r#"[{"add":[1],"remove":[]},{"add":[],"remove":[1]}]"#);

        let back: TransitionSequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seq);
    }

    #[test]
    fn test_deserialize_rejects_overlap() {
        let json = r#"[{"add":[2],"remove":[]},{"add":[7,3],"remove":[3]}]"#;
        let err = serde_json::from_str::<TransitionSequence>(json).unwrap_err();
        assert!(err.to_string().contains("transition 1 adds and removes edge 3"));
    }

    #[test]
    fn test_deserialize_normalizes_order() {
        let json = r#"[{"add":[5,1,5],"remove":[]}]"#;
        let seq: TransitionSequence = serde_json::from_str(json).unwrap();
        assert_eq!(seq.at(0).add, vec![1, 5]);
    }
}
