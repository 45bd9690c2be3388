//! File loading for the CLI: node tables and the network samples log

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use txnet_summary::infrastructure::{load_nodes_table, load_sources_table};
use txnet_summary::{LoadPolicy, LoadReport, NodeRegistry, TransitionLoader, TransitionSequence};

const CHUNK_SIZE: usize = 64 * 1024;

/// Build the registry from a nodes table and an optional sources table
pub fn load_registry(nodes: &Path, sources: Option<&Path>) -> Result<NodeRegistry> {
    let mut registry = NodeRegistry::new();

    let text = fs::read_to_string(nodes)
        .with_context(|| format!("Failed to read nodes table {}", nodes.display()))?;
    load_nodes_table(&mut registry, &text);

    if let Some(path) = sources {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read sources table {}", path.display()))?;
        load_sources_table(&mut registry, &text);
    }

    info!(
        "Registry: {} nodes ({} sources)",
        registry.len(),
        registry.source_count()
    );
    Ok(registry)
}

/// Stream the samples file through the loader in fixed-size chunks
pub fn load_networks(
    path: &Path,
    registry: &NodeRegistry,
    policy: LoadPolicy,
) -> Result<(TransitionSequence, LoadReport)> {
    let file =
        File::open(path).with_context(|| format!("Failed to open networks {}", path.display()))?;
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, file);
    let mut loader = TransitionLoader::new(registry, policy);
    // Bytes of a UTF-8 sequence split across two chunks
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let buf = reader
            .fill_buf()
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if buf.is_empty() {
            break;
        }
        let consumed = buf.len();
        pending.extend_from_slice(buf);
        reader.consume(consumed);

        let valid = match std::str::from_utf8(&pending) {
            Ok(text) => text.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                return Err(e).with_context(|| format!("{} is not valid UTF-8", path.display()))
            }
        };
        let text = std::str::from_utf8(&pending[..valid])?;
        loader
            .feed(text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        pending.drain(..valid);
    }

    if !pending.is_empty() {
        anyhow::bail!("{} ends with a truncated UTF-8 sequence", path.display());
    }

    loader
        .finish()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_registry_and_networks() {
        let nodes = write("label,time\na,1\nb,2\n");
        let sources = write("s,loc,1\n");
        let registry = load_registry(nodes.path(), Some(sources.path())).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.get("s").unwrap().is_source);

        let networks = write("s-1-a;\ns-1-a;a-1-b;\n");
        let (sequence, report) =
            load_networks(networks.path(), &registry, LoadPolicy::Abort).unwrap();
        assert_eq!(sequence.len(), 2);
        assert_eq!(report.parsed, 2);
    }

    #[test]
    fn test_parse_error_has_context() {
        let nodes = write("label\na\n");
        let registry = load_registry(nodes.path(), None).unwrap();
        let networks = write("a-1-q;\n");
        let err = load_networks(networks.path(), &registry, LoadPolicy::Abort).unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown node label 'q'"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_registry(Path::new("/nonexistent/nodes.csv"), None).unwrap_err();
        assert!(err.to_string().contains("nodes table"));
    }
}
