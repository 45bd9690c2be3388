//! Infrastructure layer
//!
//! Parsing, replay and parallel summarization:
//!
//! ```text
//! sample text ──► diff_parser ──► stream_parser ──► TransitionSequence
//!                                                         │
//!               replay ◄── parallel_summarizer (per shard) ◄┘
//!                                  │
//!                                  ▼
//!                             EdgeWeights
//! ```

pub mod cancellation;
pub mod diff_parser;
pub mod parallel_summarizer;
pub mod registry_loader;
pub mod replay;
pub mod stream_parser;

pub use cancellation::CancellationToken;
pub use diff_parser::{parse_edges, parse_sample, tokenize, EdgeToken};
pub use parallel_summarizer::{merge_weight_maps, plan_shards, ParallelBurninSummarizer};
pub use registry_loader::{load_nodes_table, load_sources_table};
pub use replay::{
    apply_transition, summarize_sequential, EdgeStateReplayEngine, ReplayFault, ReplayOutcome,
};
pub use stream_parser::{load_transitions, LoadReport, TransitionLoader, TransitionStreamParser};
