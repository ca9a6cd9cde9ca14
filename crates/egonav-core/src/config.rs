//! Explorer configuration.
//!
//! Every field has a default, so an empty or missing file is a valid config.
//! Resolution order: explicit path, `./egonav.toml`, then
//! `<config_dir>/egonav/config.toml`, then built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::label::InverseFallback;

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = "egonav.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default)]
    pub focus: FocusConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub regions: RegionConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub labels: LabelConfig,
}

/// Neighborhood capping and dimming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusConfig {
    /// Neighbors shown around a focused node.
    #[serde(default = "default_neighbor_cap")]
    pub neighbor_cap: usize,
    /// Neighbors of the paired node shown as ghosts.
    #[serde(default = "default_secondary_cap")]
    pub secondary_cap: usize,
    /// Highest-degree neighbors that get a text label.
    #[serde(default = "default_label_top_n")]
    pub label_top_n: usize,
    /// Edge labels are drawn statically when the visible set is this small.
    #[serde(default = "default_static_edge_label_limit")]
    pub static_edge_label_limit: usize,
    #[serde(default = "default_ghost_opacity")]
    pub ghost_opacity: f64,
    #[serde(default = "default_dim_opacity")]
    pub dim_opacity: f64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            neighbor_cap: default_neighbor_cap(),
            secondary_cap: default_secondary_cap(),
            label_top_n: default_label_top_n(),
            static_edge_label_limit: default_static_edge_label_limit(),
            ghost_opacity: default_ghost_opacity(),
            dim_opacity: default_dim_opacity(),
        }
    }
}

/// Camera fitting, animation and typography constants (screen pixels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_padding")]
    pub padding: f64,
    #[serde(default = "default_scale_cap")]
    pub scale_cap: f64,
    #[serde(default = "default_left_panel")]
    pub left_panel: f64,
    #[serde(default = "default_right_panel")]
    pub right_panel: f64,
    #[serde(default = "default_top_banner")]
    pub top_banner: f64,
    #[serde(default = "default_animation_ms")]
    pub animation_ms: u64,
    #[serde(default = "default_pair_animation_ms")]
    pub pair_animation_ms: u64,
    /// Delay before typography is recomputed from the settled scale.
    #[serde(default = "default_typography_delay_ms")]
    pub typography_delay_ms: u64,
    #[serde(default = "default_node_font")]
    pub node_font: f64,
    #[serde(default = "default_pair_node_font")]
    pub pair_node_font: f64,
    #[serde(default = "default_edge_font")]
    pub edge_font: f64,
    #[serde(default = "default_stroke")]
    pub stroke: f64,
    #[serde(default = "default_pair_stroke")]
    pub pair_stroke: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            padding: default_viewport_padding(),
            scale_cap: default_scale_cap(),
            left_panel: default_left_panel(),
            right_panel: default_right_panel(),
            top_banner: default_top_banner(),
            animation_ms: default_animation_ms(),
            pair_animation_ms: default_pair_animation_ms(),
            typography_delay_ms: default_typography_delay_ms(),
            node_font: default_node_font(),
            pair_node_font: default_pair_node_font(),
            edge_font: default_edge_font(),
            stroke: default_stroke(),
            pair_stroke: default_pair_stroke(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// World-space distance hull vertices are pushed outward.
    #[serde(default = "default_region_padding")]
    pub padding: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            padding: default_region_padding(),
        }
    }
}

/// Initial state of the global visibility filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_min_degree")]
    pub min_degree: usize,
    #[serde(default = "default_hidden_relation_types")]
    pub hidden_relation_types: Vec<String>,
    #[serde(default)]
    pub hidden_entity_types: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_degree: default_min_degree(),
            hidden_relation_types: default_hidden_relation_types(),
            hidden_entity_types: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Shorter queries clear the search instead of matching.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: default_min_query_len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default)]
    pub inverse_fallback: InverseFallback,
}

impl ExplorerConfig {
    /// Reject values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.focus.neighbor_cap == 0 {
            return Err(invalid("focus.neighbor_cap", "must be at least 1"));
        }
        if self.focus.secondary_cap == 0 {
            return Err(invalid("focus.secondary_cap", "must be at least 1"));
        }
        for (field, value) in [
            ("focus.ghost_opacity", self.focus.ghost_opacity),
            ("focus.dim_opacity", self.focus.dim_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, &format!("{value} is outside [0, 1]")));
            }
        }
        if !(self.viewport.scale_cap.is_finite() && self.viewport.scale_cap > 0.0) {
            return Err(invalid("viewport.scale_cap", "must be a positive number"));
        }
        if self.viewport.padding < 0.0 || self.regions.padding < 0.0 {
            return Err(invalid("padding", "must not be negative"));
        }
        Ok(())
    }

    /// Apply a dataset-provided default minimum degree.
    #[must_use]
    pub fn with_dataset_min_degree(mut self, min_degree: Option<usize>) -> Self {
        if let Some(min) = min_degree {
            self.filters.min_degree = min;
        }
        self
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

/// Read and validate one config file.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, is not valid TOML,
/// or holds an out-of-range value.
pub fn load_config_file(path: &Path) -> Result<ExplorerConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ExplorerConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    debug!(path = %path.display(), "loaded explorer config");
    Ok(config)
}

/// Per-user config location, if the platform has a config directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("egonav/config.toml"))
}

/// Resolve the effective config.
///
/// An explicit path must exist. Otherwise `project_dir/egonav.toml` and the
/// per-user file are tried in turn; the first one present wins.
///
/// # Errors
///
/// Propagates [`load_config_file`] failures.
pub fn load_config(explicit: Option<&Path>, project_dir: &Path) -> Result<ExplorerConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }
    let project = project_dir.join(PROJECT_CONFIG_FILE);
    if project.exists() {
        return load_config_file(&project);
    }
    if let Some(user) = user_config_path().filter(|p| p.exists()) {
        return load_config_file(&user);
    }
    Ok(ExplorerConfig::default())
}

const fn default_neighbor_cap() -> usize {
    25
}

const fn default_secondary_cap() -> usize {
    10
}

const fn default_label_top_n() -> usize {
    15
}

const fn default_static_edge_label_limit() -> usize {
    20
}

const fn default_ghost_opacity() -> f64 {
    0.35
}

const fn default_dim_opacity() -> f64 {
    0.06
}

const fn default_viewport_padding() -> f64 {
    200.0
}

const fn default_scale_cap() -> f64 {
    1.5
}

const fn default_left_panel() -> f64 {
    352.0
}

const fn default_right_panel() -> f64 {
    320.0
}

const fn default_top_banner() -> f64 {
    80.0
}

const fn default_animation_ms() -> u64 {
    400
}

const fn default_pair_animation_ms() -> u64 {
    300
}

const fn default_typography_delay_ms() -> u64 {
    450
}

const fn default_node_font() -> f64 {
    14.0
}

const fn default_pair_node_font() -> f64 {
    20.0
}

const fn default_edge_font() -> f64 {
    16.0
}

const fn default_stroke() -> f64 {
    2.0
}

const fn default_pair_stroke() -> f64 {
    3.0
}

const fn default_region_padding() -> f64 {
    40.0
}

const fn default_min_degree() -> usize {
    2
}

fn default_hidden_relation_types() -> Vec<String> {
    vec!["MENTIONED_IN".to_string()]
}

const fn default_min_query_len() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: ExplorerConfig = toml::from_str("").expect("parse");
        assert_eq!(cfg, ExplorerConfig::default());
        assert_eq!(cfg.focus.neighbor_cap, 25);
        assert_eq!(cfg.focus.secondary_cap, 10);
        assert_eq!(cfg.filters.hidden_relation_types, vec!["MENTIONED_IN"]);
        assert_eq!(cfg.labels.inverse_fallback, InverseFallback::Heuristic);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: ExplorerConfig = toml::from_str(
            r#"
[focus]
neighbor_cap = 8

[labels]
inverse_fallback = "neutral"
"#,
        )
        .expect("parse");
        assert_eq!(cfg.focus.neighbor_cap, 8);
        assert_eq!(cfg.focus.secondary_cap, 10);
        assert_eq!(cfg.labels.inverse_fallback, InverseFallback::Neutral);
        assert!((cfg.viewport.scale_cap - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn validation_rejects_zero_cap_and_bad_opacity() {
        let mut cfg = ExplorerConfig::default();
        cfg.focus.neighbor_cap = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "focus.neighbor_cap", .. })
        ));

        let mut cfg = ExplorerConfig::default();
        cfg.focus.dim_opacity = 1.2;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "focus.dim_opacity", .. })
        ));
    }

    #[test]
    fn project_file_is_picked_up() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            "[filters]\nmin_degree = 0\n",
        )
        .expect("write");
        let cfg = load_config(None, dir.path()).expect("load");
        assert_eq!(cfg.filters.min_degree, 0);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_config(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[focus\nneighbor_cap = ").expect("write");
        let err = load_config_file(&path).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::ConfigParseError);
    }

    #[test]
    fn dataset_min_degree_overrides() {
        let cfg = ExplorerConfig::default().with_dataset_min_degree(Some(5));
        assert_eq!(cfg.filters.min_degree, 5);
        let cfg = ExplorerConfig::default().with_dataset_min_degree(None);
        assert_eq!(cfg.filters.min_degree, 2);
    }
}
