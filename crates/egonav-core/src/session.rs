//! Mutable exploration state owned by one [`crate::explorer::Explorer`].
//!
//! Fields are crate-private: only explorer transitions write them, everyone
//! else reads through the accessors.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::ExplorerConfig;
use crate::filter::{Filters, SearchHits};
use crate::focus::FocusState;
use crate::input::Target;
use crate::trail::Trail;
use crate::viewport::Typography;

/// What the detail panel is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DetailTarget {
    #[default]
    Closed,
    Node(String),
    Edge(String),
}

/// Which nodes carry a text label in focus mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LabelPlan {
    /// Right after a transition: every visible node is labelled until the
    /// camera settles.
    #[default]
    Provisional,
    /// Decided from the settled scale.
    Settled(HashSet<String>),
}

impl LabelPlan {
    #[must_use]
    pub fn labels(&self, id: &str) -> bool {
        match self {
            Self::Provisional => true,
            Self::Settled(ids) => ids.contains(id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) focus: FocusState,
    pub(crate) trail: Trail,
    pub(crate) filters: Filters,
    pub(crate) search: Option<SearchHits>,
    pub(crate) hover: Option<Target>,
    pub(crate) detail: DetailTarget,
    /// Relation type restricting the focused node's connection rows.
    pub(crate) connection_filter: Option<String>,
    /// Evidence drill-down of the selected row.
    pub(crate) evidence_open: bool,
    /// Trail cards the user expanded or collapsed, by card position.
    pub(crate) card_overrides: BTreeMap<usize, bool>,
    pub(crate) typography: Typography,
    pub(crate) labels: LabelPlan,
}

impl Session {
    #[must_use]
    pub fn new(config: &ExplorerConfig) -> Self {
        Self {
            focus: FocusState::Overview,
            trail: Trail::default(),
            filters: Filters::from_config(&config.filters),
            search: None,
            hover: None,
            detail: DetailTarget::Closed,
            connection_filter: None,
            evidence_open: false,
            card_overrides: BTreeMap::new(),
            typography: Typography::overview(&config.viewport),
            labels: LabelPlan::Provisional,
        }
    }

    #[must_use]
    pub const fn focus(&self) -> &FocusState {
        &self.focus
    }

    #[must_use]
    pub const fn trail(&self) -> &Trail {
        &self.trail
    }

    #[must_use]
    pub const fn filters(&self) -> &Filters {
        &self.filters
    }

    #[must_use]
    pub const fn search(&self) -> Option<&SearchHits> {
        self.search.as_ref()
    }

    #[must_use]
    pub const fn hover(&self) -> Option<&Target> {
        self.hover.as_ref()
    }

    #[must_use]
    pub const fn detail(&self) -> &DetailTarget {
        &self.detail
    }

    #[must_use]
    pub fn connection_filter(&self) -> Option<&str> {
        self.connection_filter.as_deref()
    }

    #[must_use]
    pub const fn evidence_open(&self) -> bool {
        self.evidence_open
    }

    #[must_use]
    pub const fn typography(&self) -> &Typography {
        &self.typography
    }

    #[must_use]
    pub const fn labels(&self) -> &LabelPlan {
        &self.labels
    }

    /// Whether trail card `pos` is expanded; the last card (the current
    /// node) is expanded unless the user collapsed it.
    #[must_use]
    pub fn card_expanded(&self, pos: usize) -> bool {
        self.card_overrides
            .get(&pos)
            .copied()
            .unwrap_or(pos == self.trail.len())
    }

    /// Nodes exempt from neighborhood capping and the global filters: every
    /// trail node plus the current focus.
    #[must_use]
    pub fn exempt_ids(&self) -> BTreeSet<String> {
        self.trail
            .node_ids()
            .chain(self.focus.focal())
            .map(str::to_string)
            .collect()
    }
}
