//! `egonav regions`: community hulls over the seeded layout.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use egonav_core::region::{CommunityRegion, compute_regions};
use serde::Serialize;

use crate::layout::SeededLayout;
use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `egonav regions`.
#[derive(Args, Debug)]
pub struct RegionsArgs {
    /// Graph export (JSON).
    pub dataset: PathBuf,

    /// Outward padding in layout units (overrides the config).
    #[arg(long)]
    pub padding: Option<f64>,
}

#[derive(Debug, Serialize)]
struct RegionReport {
    padding: f64,
    regions: Vec<CommunityRegion>,
}

/// Execute `egonav regions`.
pub fn run_regions(args: &RegionsArgs, config: Option<&Path>, output: OutputMode) -> anyhow::Result<()> {
    let loaded = super::load(&args.dataset, config, output)?;
    let mut layout = SeededLayout::from_dataset(&loaded.dataset);
    layout.settle();
    let padding = args.padding.unwrap_or(loaded.config.regions.padding);
    let report = RegionReport {
        padding,
        regions: compute_regions(&loaded.index, &layout, padding),
    };
    render_mode(output, &report, write_text, write_pretty)
}

fn write_text(report: &RegionReport, w: &mut dyn Write) -> std::io::Result<()> {
    for region in &report.regions {
        let boundary: Vec<String> = region
            .boundary
            .iter()
            .map(|p| format!("{:.1},{:.1}", p.x, p.y))
            .collect();
        writeln!(
            w,
            "{}\t{}\t{:.1},{:.1}\t{}",
            region.community,
            region.members,
            region.centroid.x,
            region.centroid.y,
            boundary.join(" ")
        )?;
    }
    Ok(())
}

fn write_pretty(report: &RegionReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(
        w,
        &format!("Regions ({}, padding {:.0})", report.regions.len(), report.padding),
    )?;
    writeln!(w, "  {:<24} {:>7} {:>8}  CENTROID", "COMMUNITY", "MEMBERS", "VERTICES")?;
    for region in &report.regions {
        writeln!(
            w,
            "  {:<24} {:>7} {:>8}  ({:.0}, {:.0})",
            region.community,
            region.members,
            region.boundary.len(),
            region.centroid.x,
            region.centroid.y
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use egonav_core::{Dataset, GraphIndex};

    #[test]
    fn regions_cover_each_tagged_community() {
        let ds = Dataset::from_json_str(
            r#"{
                "nodes": [
                    {"id": "a", "community": "1", "x": 0.0, "y": 0.0},
                    {"id": "b", "community": "1", "x": 100.0, "y": 0.0},
                    {"id": "c", "community": "1", "x": 0.0, "y": 100.0},
                    {"id": "d", "community": "2"},
                    {"id": "e"}
                ],
                "links": []
            }"#,
        )
        .expect("parse");
        let index = GraphIndex::from_dataset(&ds);
        let layout = SeededLayout::from_dataset(&ds);
        let report = RegionReport {
            padding: 10.0,
            regions: compute_regions(&index, &layout, 10.0),
        };
        let names: Vec<&str> = report.regions.iter().map(|r| r.community.as_str()).collect();
        assert_eq!(names, vec!["1", "2"]);
        assert_eq!(report.regions[0].members, 3);

        let mut buf = Vec::new();
        write_text(&report, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("1\t3\t"));
    }
}
