//! txnet-summary - Burn-in summarization of posterior transmission networks
//!
//! Each posterior sample of a transmission network is a set of directed
//! node-pairs. Samples are stored as add/remove diffs against the previous
//! sample, and summarized into a per-edge weight: the fraction of post-burn-in
//! samples in which the edge is present.
//!
//! ## Layers
//!
//! - [`domain`]: edge index codec, node registry, transitions and the frozen
//!   transition sequence
//! - [`infrastructure`]: sample parsing, the chunked stream loader, replay and
//!   the parallel burn-in summarizer
//! - [`application`]: last-request-wins scheduling and the filtered edge view
//! - [`config`]: validated summary configuration (YAML)
//!
//! ## Usage
//!
//! ```rust
//! use txnet_summary::{
//!     load_transitions, LoadPolicy, NodeLookup, NodeRegistry, ParallelBurninSummarizer,
//! };
//!
//! let mut registry = NodeRegistry::new();
//! for label in ["a", "b", "c"] {
//!     registry.insert(label, false);
//! }
//!
//! let text = "a-1-b;\na-1-b;b-1-c;\nb-1-c;\n";
//! let (sequence, report) = load_transitions(text, &registry, LoadPolicy::Abort).unwrap();
//! assert_eq!(report.parsed, 3);
//!
//! let weights = ParallelBurninSummarizer::new(2).summarize(&sequence, 0).unwrap();
//! let a_to_b = registry.codec().encode(0, 1);
//! assert!((weights[&a_to_b] - 2.0 / 3.0).abs() < 1e-9);
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infrastructure;

pub use errors::{ParseError, Result, SummaryError, TxnetError};

pub use domain::{
    EdgeIndex, EdgeIndexCodec, EdgeSet, EdgeWeights, NetworkTransition, NodeInfo, NodeLookup,
    NodeRegistry, OverlappingTransition, TransitionSequence, TransitionSequenceStore,
    UnknownNodeLabel,
};

pub use infrastructure::{
    load_transitions, parse_sample, CancellationToken, EdgeStateReplayEngine, LoadReport,
    ParallelBurninSummarizer, ReplayOutcome, TransitionLoader, TransitionStreamParser,
};

pub use application::{
    EdgeSummary, PublishedSummary, SummaryFilter, SummaryScheduler, SummaryTicket,
};

pub use config::{ConfigError, LoadPolicy, SummaryConfig};
