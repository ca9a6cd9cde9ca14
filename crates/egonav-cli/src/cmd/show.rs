//! `egonav show`: one node and its grouped connections.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use egonav_core::connections::{group_connections, relation_type_counts};
use egonav_core::detail::{ConnectionRow, connection_rows};
use egonav_core::label::InverseFallback;
use egonav_core::{GraphIndex, Node};
use serde::Serialize;

use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};

/// Arguments for `egonav show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Graph export (JSON).
    pub dataset: PathBuf,

    /// Node id.
    pub node: String,

    /// Only list connections carrying this relation type.
    #[arg(long, value_name = "TYPE")]
    pub relation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NodeReport {
    #[serde(flatten)]
    pub node: Node,
    pub relation_counts: BTreeMap<String, usize>,
    pub connections: Vec<ConnectionRow>,
}

impl NodeReport {
    pub fn build(
        index: &GraphIndex,
        id: &str,
        relation: Option<&str>,
        fallback: InverseFallback,
    ) -> Option<Self> {
        let node = index.node(id)?.clone();
        let all = group_connections(index, id, None);
        Some(Self {
            node,
            relation_counts: relation_type_counts(&all),
            connections: connection_rows(index, id, relation, fallback),
        })
    }
}

/// Execute `egonav show`.
pub fn run_show(args: &ShowArgs, config: Option<&Path>, output: OutputMode) -> anyhow::Result<()> {
    let loaded = super::load(&args.dataset, config, output)?;
    let Some(report) = NodeReport::build(
        &loaded.index,
        &args.node,
        args.relation.as_deref(),
        loaded.config.labels.inverse_fallback,
    ) else {
        return super::node_not_found(output, &args.node);
    };
    render_mode(output, &report, write_text, write_pretty)
}

fn write_text(report: &NodeReport, w: &mut dyn Write) -> std::io::Result<()> {
    let node = &report.node;
    writeln!(w, "{}\t{}\t{}\t{}", node.id, node.name, node.entity_type, node.degree)?;
    for row in &report.connections {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            row.direction().arrow(),
            row.label,
            row.neighbor_id(),
            row.group.support_count()
        )?;
    }
    Ok(())
}

fn write_pretty(report: &NodeReport, w: &mut dyn Write) -> std::io::Result<()> {
    let node = &report.node;
    pretty_section(w, &node.name)?;
    pretty_kv(w, "ID", &node.id)?;
    pretty_kv(w, "Type", &node.entity_type)?;
    pretty_kv(w, "Degree", node.degree.to_string())?;
    if let Some(community) = &node.community {
        pretty_kv(w, "Community", community)?;
    }
    if !node.aliases.is_empty() {
        pretty_kv(w, "Aliases", node.aliases.join(", "))?;
    }
    if let Some(confidence) = node.confidence {
        pretty_kv(w, "Confidence", format!("{confidence:.2}"))?;
    }
    if let Some(description) = &node.description {
        writeln!(w)?;
        writeln!(w, "{description}")?;
    }

    writeln!(w)?;
    pretty_section(w, &format!("Connections ({})", report.connections.len()))?;
    for row in &report.connections {
        writeln!(
            w,
            "{} {:<28} {}",
            row.direction().arrow(),
            row.label,
            row.group.neighbor_name
        )?;
        for edge in &row.group.edges {
            let confidence = edge
                .confidence
                .map_or_else(String::new, |c| format!(" {:.0}%", c * 100.0));
            writeln!(
                w,
                "    {} x{}{}",
                edge.relation_type, edge.support_count, confidence
            )?;
            if let Some(evidence) = &edge.evidence {
                writeln!(w, "      \"{evidence}\"")?;
            }
        }
    }
    if !report.relation_counts.is_empty() {
        pretty_rule(w)?;
        let counts: Vec<String> = report
            .relation_counts
            .iter()
            .map(|(rel, n)| format!("{rel} {n}"))
            .collect();
        writeln!(w, "{}", counts.join(" · "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use egonav_core::Dataset;

    fn index() -> GraphIndex {
        let ds = Dataset::from_json_str(
            r#"{
                "nodes": [
                    {"id": "act", "name": "Data Act", "entity_type": "LAW"},
                    {"id": "acme", "name": "Acme"},
                    {"id": "reg", "name": "Regulator"}
                ],
                "links": [
                    {"source": "act", "target": "acme", "relation_type": "GOVERNS", "evidence": "Applies to Acme."},
                    {"source": "reg", "target": "act", "relation_type": "SUPPORTS"}
                ]
            }"#,
        )
        .expect("parse");
        GraphIndex::from_dataset(&ds)
    }

    #[test]
    fn report_lists_rows_with_perspective_labels() {
        let idx = index();
        let report = NodeReport::build(&idx, "act", None, InverseFallback::Heuristic).expect("known");
        let labels: Vec<&str> = report.connections.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["governs", "supported by"]);
        assert_eq!(report.relation_counts.len(), 2);
    }

    #[test]
    fn relation_filter_narrows_rows_but_not_counts() {
        let idx = index();
        let report = NodeReport::build(&idx, "act", Some("SUPPORTS"), InverseFallback::Heuristic)
            .expect("known");
        assert_eq!(report.connections.len(), 1);
        assert_eq!(report.relation_counts.len(), 2);
    }

    #[test]
    fn unknown_node_has_no_report() {
        assert!(NodeReport::build(&index(), "nope", None, InverseFallback::Heuristic).is_none());
    }

    #[test]
    fn pretty_output_quotes_evidence() {
        let idx = index();
        let report = NodeReport::build(&idx, "act", None, InverseFallback::Heuristic).expect("known");
        let mut buf = Vec::new();
        write_pretty(&report, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("\"Applies to Acme.\""));
        assert!(text.contains("→ governs"));
    }
}
