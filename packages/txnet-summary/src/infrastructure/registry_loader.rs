//! Node registry loading from text tables
//!
//! Nodes table: a header row, then one row per node.
//!
//! ```text
//! label,time,type,locus1,locus2
//! p1,12,A,0101,11
//! ```
//!
//! Sources table: `label,locus,allele,allele,...`, one row per source locus.

use tracing::debug;

use crate::domain::NodeRegistry;

/// Lines of a table, `\n` or `\r\n` terminated, blank lines dropped
fn table_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
}

/// Add nodes from a nodes table; returns the number of rows loaded
///
/// Rows without a label are auto-labelled with a running counter starting
/// at (non-source nodes already registered) + 1.
pub fn load_nodes_table(registry: &mut NodeRegistry, text: &str) -> usize {
    let mut lines = table_lines(text);
    let header: Vec<&str> = match lines.next() {
        Some(line) => line.split(',').map(str::trim).collect(),
        None => return 0,
    };

    let mut next_auto_label = registry.non_source_count() + 1;
    let mut loaded = 0;

    for line in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let cell = |names: [&str; 2]| {
            header
                .iter()
                .position(|h| names.contains(h))
                .and_then(|i| fields.get(i).copied())
                .filter(|v| !v.is_empty())
        };

        let label = match cell(["label", "Label"]) {
            Some(label) => label.to_string(),
            None => {
                let label = next_auto_label.to_string();
                next_auto_label += 1;
                label
            }
        };

        let index = registry.insert(label, false);
        let Some(node) = registry.node_mut(index) else {
            continue;
        };
        node.time = cell(["time", "Time"]).and_then(|v| v.parse().ok());
        node.symptom_type = cell(["type", "Type"]).map(str::to_string);

        for (column, value) in header.iter().zip(fields.iter()) {
            if matches!(*column, "label" | "Label" | "time" | "Time" | "type" | "Type") {
                continue;
            }
            let alleles = value
                .chars()
                .filter_map(|c| match c {
                    '0' => Some(0.0),
                    '1' => Some(1.0),
                    _ => None,
                })
                .collect();
            node.alleles.insert(column.to_string(), alleles);
        }
        loaded += 1;
    }

    debug!("Loaded {} nodes ({} total)", loaded, registry.len());
    loaded
}

/// Add source nodes from a sources table; returns the number of new sources
///
/// A label already in the registry is marked as a source in place and keeps
/// its index.
pub fn load_sources_table(registry: &mut NodeRegistry, text: &str) -> usize {
    let before = registry.len();

    for line in table_lines(text) {
        let mut fields = line.split(',').map(str::trim);
        let Some(label) = fields.next().filter(|l| !l.is_empty()) else {
            continue;
        };
        let locus = fields.next().unwrap_or_default().to_string();
        let alleles: Vec<f64> = fields
            .map(|f| f.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect::<String>())
            .filter(|f| !f.is_empty())
            .filter_map(|f| f.parse().ok())
            .collect();

        let index = registry.insert(label, true);
        if let Some(node) = registry.node_mut(index) {
            node.alleles.insert(locus, alleles);
        }
    }

    let added = registry.len() - before;
    debug!("Loaded {} sources ({} total)", added, registry.len());
    added
}
