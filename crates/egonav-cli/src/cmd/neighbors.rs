//! `egonav neighbors`: the 1-hop neighbors a focus view would show.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use egonav_core::GraphIndex;
use egonav_core::index::Neighbor;
use serde::Serialize;

use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `egonav neighbors`.
#[derive(Args, Debug)]
pub struct NeighborsArgs {
    /// Graph export (JSON).
    pub dataset: PathBuf,

    /// Node id.
    pub node: String,

    /// Keep at most this many neighbors (defaults to the focus cap).
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct RankedNeighbor {
    #[serde(flatten)]
    neighbor: Neighbor,
    name: String,
    entity_type: String,
}

#[derive(Debug, Serialize)]
struct NeighborReport {
    node: String,
    total: usize,
    shown: Vec<RankedNeighbor>,
}

impl NeighborReport {
    fn build(index: &GraphIndex, id: &str, limit: usize) -> Option<Self> {
        index.node(id)?;
        let ranked = index.ranked_neighbors(id);
        let total = ranked.len();
        let shown = ranked
            .into_iter()
            .take(limit)
            .map(|neighbor| {
                let (name, entity_type) = index.node(&neighbor.id).map_or_else(
                    || (neighbor.id.clone(), String::new()),
                    |n| (n.name.clone(), n.entity_type.clone()),
                );
                RankedNeighbor {
                    neighbor,
                    name,
                    entity_type,
                }
            })
            .collect();
        Some(Self {
            node: id.to_string(),
            total,
            shown,
        })
    }
}

/// Execute `egonav neighbors`.
pub fn run_neighbors(
    args: &NeighborsArgs,
    config: Option<&Path>,
    output: OutputMode,
) -> anyhow::Result<()> {
    let loaded = super::load(&args.dataset, config, output)?;
    let limit = args.limit.unwrap_or(loaded.config.focus.neighbor_cap);
    let Some(report) = NeighborReport::build(&loaded.index, &args.node, limit) else {
        return super::node_not_found(output, &args.node);
    };
    render_mode(output, &report, write_text, write_pretty)
}

fn write_text(report: &NeighborReport, w: &mut dyn Write) -> std::io::Result<()> {
    for n in &report.shown {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            n.neighbor.id, n.neighbor.degree, n.neighbor.edge_count, n.name
        )?;
    }
    Ok(())
}

fn write_pretty(report: &NeighborReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(
        w,
        &format!(
            "Neighbors of {} ({} of {})",
            report.node,
            report.shown.len(),
            report.total
        ),
    )?;
    writeln!(w, "  {:<32} {:<16} {:>6} {:>5}", "NAME", "TYPE", "DEGREE", "EDGES")?;
    for n in &report.shown {
        writeln!(
            w,
            "  {:<32} {:<16} {:>6} {:>5}",
            n.name, n.entity_type, n.neighbor.degree, n.neighbor.edge_count
        )?;
    }
    Ok(())
}
