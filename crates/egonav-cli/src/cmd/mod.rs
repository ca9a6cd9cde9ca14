pub mod completions;
pub mod explore;
pub mod neighbors;
pub mod regions;
pub mod show;
pub mod stats;

use std::path::Path;

use egonav_core::config::load_config;
use egonav_core::error::ErrorCode;
use egonav_core::{Dataset, ExplorerConfig, GraphIndex};

use crate::output::{CliError, OutputMode, render_error};

/// A dataset with its index and the effective config.
pub struct Loaded {
    pub dataset: Dataset,
    pub index: GraphIndex,
    pub config: ExplorerConfig,
}

/// Read the dataset and resolve the config, rendering typed failures.
pub fn load(dataset: &Path, config: Option<&Path>, output: OutputMode) -> anyhow::Result<Loaded> {
    let project_dir = std::env::current_dir()?;
    let config = match load_config(config, &project_dir) {
        Ok(config) => config,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };
    let dataset = match Dataset::load(dataset) {
        Ok(dataset) => dataset,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };
    let config = config.with_dataset_min_degree(dataset.min_degree);
    let index = GraphIndex::from_dataset(&dataset);
    Ok(Loaded {
        dataset,
        index,
        config,
    })
}

/// Render the node-not-found error (`E3001`) and fail.
pub fn node_not_found(output: OutputMode, id: &str) -> anyhow::Result<()> {
    render_error(
        output,
        &CliError::from_code(format!("node `{id}` not found"), ErrorCode::NodeNotFound),
    )?;
    anyhow::bail!("node not found: {id}")
}
