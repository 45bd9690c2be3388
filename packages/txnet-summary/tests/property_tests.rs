//! Property-based tests for parsing, replay and parallel summarization
//!
//! Invariants checked for arbitrary sample histories:
//! - Codec: decode(encode(s, t)) == (s, t)
//! - Diffs: replaying the log reproduces every sample's edge set
//! - Seeding: replaying [0, k) then [k, m) equals replaying [0, m)
//! - Sharding: any partition of the window sums to the sequential result
//! - Bounds: every weight lies in (0, 1]

use std::ops::Range;

use proptest::prelude::*;
use txnet_summary::infrastructure::{plan_shards, summarize_sequential};
use txnet_summary::{
    load_transitions, CancellationToken, EdgeIndexCodec, EdgeSet, EdgeStateReplayEngine,
    EdgeWeights, LoadPolicy, NetworkTransition, NodeLookup, NodeRegistry,
    ParallelBurninSummarizer, TransitionSequence, TransitionSequenceStore,
};

const NODES: usize = 5;

fn approx_eq(a: &EdgeWeights, b: &EdgeWeights) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(edge, w)| b.get(edge).is_some_and(|v| (w - v).abs() < 1e-9))
}

/// Samples as edge sets over a small node space
fn samples_strategy(max_len: usize) -> impl Strategy<Value = Vec<EdgeSet>> {
    prop::collection::vec(
        prop::collection::hash_set(0..NODES * NODES, 0..8)
            .prop_map(|edges| edges.into_iter().collect::<EdgeSet>()),
        0..max_len,
    )
}

fn to_sequence(samples: &[EdgeSet]) -> TransitionSequence {
    let mut previous = EdgeSet::default();
    let mut store = TransitionSequenceStore::with_capacity(samples.len());
    for sample in samples {
        store.push(NetworkTransition::between(&previous, sample));
        previous = sample.clone();
    }
    store.freeze()
}

/// Cut points in `window` turned into a contiguous partition
fn partition(window: Range<usize>, cuts: &[usize]) -> Vec<Range<usize>> {
    let len = window.end - window.start;
    let mut points: Vec<usize> = cuts
        .iter()
        .filter(|_| len > 1)
        .map(|c| window.start + 1 + c % (len - 1).max(1))
        .filter(|&p| p < window.end)
        .collect();
    points.sort_unstable();
    points.dedup();

    let mut plan = Vec::new();
    let mut start = window.start;
    for point in points {
        plan.push(start..point);
        start = point;
    }
    plan.push(start..window.end);
    plan
}

fn render(samples: &[EdgeSet], registry: &NodeRegistry) -> String {
    let codec = registry.codec();
    samples
        .iter()
        .map(|sample| {
            let mut edges: Vec<_> = sample.iter().copied().collect();
            edges.sort_unstable();
            let mut line: String = edges
                .into_iter()
                .map(|e| {
                    let (s, t) = codec.decode(e);
                    format!(
                        "{}-0.5-{};",
                        registry.label(s).unwrap_or_default(),
                        registry.label(t).unwrap_or_default()
                    )
                })
                .collect();
            // Empty samples still need a non-blank line
            if line.is_empty() {
                line.push(';');
            }
            line + "\n"
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_codec_roundtrip(n in 1usize..2000, s in any::<usize>(), t in any::<usize>()) {
        let codec = EdgeIndexCodec::new(n);
        let (s, t) = (s % n, t % n);
        let index = codec.encode(s, t);
        prop_assert!(index < codec.edge_space());
        prop_assert_eq!(codec.decode(index), (s, t));
    }

    #[test]
    fn prop_replay_reproduces_samples(samples in samples_strategy(30)) {
        let sequence = to_sequence(&samples);
        let engine = EdgeStateReplayEngine::new(&sequence);
        for (k, sample) in samples.iter().enumerate() {
            let transition = sequence.at(k);
            prop_assert!(transition.is_disjoint());
            prop_assert_eq!(&engine.state_at(k + 1).unwrap(), sample);
        }
    }

    #[test]
    fn prop_parsed_text_matches_built_sequence(samples in samples_strategy(20)) {
        let mut registry = NodeRegistry::new();
        for i in 0..NODES {
            registry.insert(format!("n{}", i), false);
        }
        let text = render(&samples, &registry);
        let (parsed, report) = load_transitions(&text, &registry, LoadPolicy::Abort).unwrap();
        prop_assert_eq!(report.parsed, samples.len());
        prop_assert_eq!(parsed, to_sequence(&samples));
    }

    #[test]
    fn prop_split_replay_matches_direct(
        samples in samples_strategy(30),
        k in 0usize..30,
        m in 0usize..30,
    ) {
        let sequence = to_sequence(&samples);
        let engine = EdgeStateReplayEngine::new(&sequence);
        let m = m.min(sequence.len());
        let k = k.min(m);

        let mut state = engine.state_at(k).unwrap();
        engine.advance(&mut state, k..m).unwrap();
        prop_assert_eq!(state, engine.state_at(m).unwrap());
    }

    #[test]
    fn prop_any_partition_matches_sequential(
        samples in samples_strategy(40),
        burnin in 0usize..40,
        cuts in prop::collection::vec(any::<usize>(), 0..6),
    ) {
        let sequence = to_sequence(&samples);
        prop_assume!(burnin + 1 < sequence.len());

        let expected = summarize_sequential(&sequence, burnin).unwrap();
        let plan = partition(burnin + 1..sequence.len(), &cuts);
        let actual = ParallelBurninSummarizer::new(3)
            .summarize_with_plan(&sequence, burnin, plan, &CancellationToken::none())
            .unwrap();
        prop_assert!(approx_eq(&actual, &expected));
    }

    #[test]
    fn prop_concurrency_does_not_change_result(
        samples in samples_strategy(40),
        burnin in 0usize..40,
        concurrency in 1usize..12,
    ) {
        let sequence = to_sequence(&samples);
        let single = ParallelBurninSummarizer::new(1).summarize(&sequence, burnin).unwrap();
        let many = ParallelBurninSummarizer::new(concurrency).summarize(&sequence, burnin).unwrap();
        prop_assert!(approx_eq(&single, &many));
    }

    #[test]
    fn prop_weights_are_fractions(samples in samples_strategy(40), burnin in 0usize..40) {
        let sequence = to_sequence(&samples);
        let weights = ParallelBurninSummarizer::new(4).summarize(&sequence, burnin).unwrap();
        let window = sequence.len().saturating_sub(burnin);
        for (&edge, &w) in &weights {
            prop_assert!(w > 0.0 && w <= 1.0 + 1e-9);
            let present = samples[burnin..].iter().filter(|s| s.contains(&edge)).count();
            prop_assert!((w - present as f64 / window as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_plan_covers_window(start in 0usize..100, len in 0usize..100, shards in 1usize..32) {
        let plan = plan_shards(start..start + len, shards);
        let covered: usize = plan.iter().map(|r| r.end - r.start).sum();
        prop_assert_eq!(covered, len);
        prop_assert!(plan.len() <= shards);
        for pair in plan.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
    }
}
