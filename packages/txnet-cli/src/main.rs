//! txnet - transmission network burn-in summaries
//!
//! # Usage
//!
//! ```bash
//! # Edges present in more than 60% of post-burn-in samples, as JSON
//! txnet summarize --nodes nodes.csv --sources sources.csv \
//!     --networks networks.txt --burnin 1000 --threshold 0.6
//!
//! # Every edge, text table, malformed samples skipped
//! txnet summarize --nodes nodes.csv --networks networks.txt --all \
//!     --skip-malformed --format text
//!
//! # Node and sample counts
//! txnet stats --nodes nodes.csv --networks networks.txt
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`), written to stderr.

mod input;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use txnet_summary::application::summarize_edges;
use txnet_summary::{
    EdgeSummary, LoadPolicy, NodeLookup, NodeRegistry, ParallelBurninSummarizer, SummaryConfig,
    SummaryFilter,
};

#[derive(Parser)]
#[command(name = "txnet")]
#[command(about = "Burn-in summaries of posterior transmission networks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize edge weights after burn-in
    Summarize {
        /// Nodes table (CSV with header)
        #[arg(long)]
        nodes: PathBuf,

        /// Sources table (label,locus,alleles...)
        #[arg(long)]
        sources: Option<PathBuf>,

        /// Network samples, one per line
        #[arg(long)]
        networks: PathBuf,

        /// Number of leading samples to discard
        #[arg(short, long, default_value = "0")]
        burnin: usize,

        /// Show edges with weight above this
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Shard workers (0 = auto)
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// YAML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Skip samples that fail to parse instead of aborting
        #[arg(long)]
        skip_malformed: bool,

        /// Show every edge (no threshold, sources included)
        #[arg(long)]
        all: bool,

        /// Hide edges leaving source nodes
        #[arg(long)]
        hide_sources: bool,
    },

    /// Print node and sample counts
    Stats {
        /// Nodes table (CSV with header)
        #[arg(long)]
        nodes: PathBuf,

        /// Sources table (label,locus,alleles...)
        #[arg(long)]
        sources: Option<PathBuf>,

        /// Network samples, one per line
        #[arg(long)]
        networks: PathBuf,

        /// Skip samples that fail to parse instead of aborting
        #[arg(long)]
        skip_malformed: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Edge row with node labels resolved
#[derive(Debug, Serialize)]
struct LabelledEdge<'a> {
    source: &'a str,
    target: &'a str,
    weight: f64,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summarize {
            nodes,
            sources,
            networks,
            burnin,
            threshold,
            concurrency,
            config,
            format,
            skip_malformed,
            all,
            hide_sources,
        } => {
            let mut config = match config {
                Some(path) => SummaryConfig::from_yaml_file(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => SummaryConfig::default(),
            };
            if let Some(t) = threshold {
                config = config.transmission_threshold(t);
            }
            if let Some(c) = concurrency {
                config = config.concurrency(c);
            }
            if skip_malformed {
                config = config.load_policy(LoadPolicy::SkipMalformed);
            }
            if hide_sources {
                config = config.include_sources(false);
            }
            config.validate().context("Invalid configuration")?;

            let registry = input::load_registry(&nodes, sources.as_deref())?;
            let (sequence, report) =
                input::load_networks(&networks, &registry, config.load_policy)?;
            if !report.skipped.is_empty() {
                warn!("{} malformed samples skipped", report.skipped.len());
            }

            let weights = ParallelBurninSummarizer::from_config(&config)
                .summarize(&sequence, burnin)
                .context("Summarization failed")?;
            if burnin >= sequence.len() {
                warn!(
                    "Burn-in {} leaves no samples out of {}",
                    burnin,
                    sequence.len()
                );
            }

            let edges = summarize_edges(&weights, &registry.codec());
            let filter = if all {
                SummaryFilter::all()
            } else {
                SummaryFilter::from_config(&config)
            };
            let shown = filter.apply(&edges, &registry);
            info!("{} of {} edges shown", shown.len(), edges.len());

            print_edges(&shown, &registry, format)?;
        }

        Commands::Stats {
            nodes,
            sources,
            networks,
            skip_malformed,
        } => {
            let policy = if skip_malformed {
                LoadPolicy::SkipMalformed
            } else {
                LoadPolicy::Abort
            };
            let registry = input::load_registry(&nodes, sources.as_deref())?;
            let (sequence, report) = input::load_networks(&networks, &registry, policy)?;

            println!("nodes:    {}", registry.len());
            println!("sources:  {}", registry.source_count());
            println!("samples:  {}", sequence.len());
            println!("skipped:  {}", report.skipped.len());
            for err in &report.skipped {
                println!("  {}", err);
            }
        }
    }

    Ok(())
}

fn print_edges(edges: &[EdgeSummary], registry: &NodeRegistry, format: OutputFormat) -> Result<()> {
    let rows: Vec<LabelledEdge<'_>> = edges
        .iter()
        .map(|e| LabelledEdge {
            source: registry.label(e.source).unwrap_or("?"),
            target: registry.label(e.target).unwrap_or("?"),
            weight: e.weight,
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            let width = rows
                .iter()
                .map(|r| r.source.len().max(r.target.len()))
                .max()
                .unwrap_or(0)
                .max(6);
            println!("{:<width$}  {:<width$}  weight", "source", "target", width = width);
            for row in &rows {
                println!(
                    "{:<width$}  {:<width$}  {:.4}",
                    row.source,
                    row.target,
                    row.weight,
                    width = width
                );
            }
        }
    }
    Ok(())
}
