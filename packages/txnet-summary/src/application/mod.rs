//! Application layer: summary views and request scheduling

pub mod edge_summary;
pub mod scheduler;

pub use edge_summary::{
    connected_nodes, filter_by_threshold, parents_of, summarize_edges, EdgeSummary, SummaryFilter,
};
pub use scheduler::{PublishedSummary, SummaryScheduler, SummaryTicket};
