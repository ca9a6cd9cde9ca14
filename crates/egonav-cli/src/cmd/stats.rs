//! `egonav stats`: dataset inventory.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use egonav_core::GraphIndex;
use serde::Serialize;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `egonav stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Graph export (JSON).
    pub dataset: PathBuf,
}

/// Report payload for `egonav stats`.
#[derive(Debug, Serialize)]
pub struct DatasetStats {
    pub nodes: usize,
    pub edges: usize,
    pub content_hash: String,
    pub entity_types: BTreeMap<String, usize>,
    pub relation_types: BTreeMap<String, usize>,
    pub communities: BTreeMap<String, usize>,
}

impl DatasetStats {
    pub fn collect(index: &GraphIndex) -> Self {
        Self {
            nodes: index.node_count(),
            edges: index.edge_count(),
            content_hash: index.content_hash().to_string(),
            entity_types: index.entity_types(),
            relation_types: index.relation_types(),
            communities: index.communities(),
        }
    }
}

/// Execute `egonav stats`.
pub fn run_stats(args: &StatsArgs, config: Option<&Path>, output: OutputMode) -> anyhow::Result<()> {
    let loaded = super::load(&args.dataset, config, output)?;
    let stats = DatasetStats::collect(&loaded.index);
    render_mode(output, &stats, write_text, write_pretty)
}

fn write_text(stats: &DatasetStats, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "nodes\t{}", stats.nodes)?;
    writeln!(w, "edges\t{}", stats.edges)?;
    writeln!(w, "hash\t{}", stats.content_hash)?;
    for (kind, table) in [
        ("entity_type", &stats.entity_types),
        ("relation_type", &stats.relation_types),
        ("community", &stats.communities),
    ] {
        for (name, count) in table {
            writeln!(w, "{kind}\t{name}\t{count}")?;
        }
    }
    Ok(())
}

fn write_pretty(stats: &DatasetStats, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Dataset")?;
    pretty_kv(w, "Nodes", stats.nodes.to_string())?;
    pretty_kv(w, "Edges", stats.edges.to_string())?;
    pretty_kv(w, "Hash", &stats.content_hash)?;
    for (heading, table) in [
        ("Entity types", &stats.entity_types),
        ("Relation types", &stats.relation_types),
        ("Communities", &stats.communities),
    ] {
        writeln!(w)?;
        pretty_section(w, heading)?;
        if table.is_empty() {
            writeln!(w, "  (none)")?;
        }
        for (name, count) in table {
            writeln!(w, "  {name:<32} {count:>6}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use egonav_core::Dataset;

    fn stats() -> DatasetStats {
        let ds = Dataset::from_json_str(
            r#"{
                "nodes": [
                    {"id": "a", "entity_type": "PERSON", "community": "1"},
                    {"id": "b", "entity_type": "ORG", "community": "1"},
                    {"id": "c"}
                ],
                "links": [
                    {"source": "a", "target": "b", "relation_type": "WORKS_FOR"},
                    {"source": "a", "target": "zzz", "relation_type": "WORKS_FOR"}
                ]
            }"#,
        )
        .expect("parse");
        DatasetStats::collect(&GraphIndex::from_dataset(&ds))
    }

    #[test]
    fn inventories_are_counted() {
        let s = stats();
        assert_eq!(s.nodes, 3);
        assert_eq!(s.edges, 1);
        assert_eq!(s.entity_types.get("UNKNOWN"), Some(&1));
        assert_eq!(s.relation_types.get("WORKS_FOR"), Some(&1));
        assert_eq!(s.communities.get("1"), Some(&2));
    }

    #[test]
    fn text_rows_are_tab_separated() {
        let mut buf = Vec::new();
        write_text(&stats(), &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("nodes\t3\nedges\t1\n"));
        assert!(text.contains("community\t1\t2\n"));
    }
}
