//! The navigation controller.
//!
//! # Overview
//!
//! [`Explorer`] owns the graph index, the layout handle, the session and the
//! derived presentation (scene, regions, camera). Every user interaction goes
//! through [`Explorer::handle`]; time goes through [`Explorer::tick`].
//!
//! ## Transitions
//!
//! ```text
//!             click/dbl-click node
//!   Overview ─────────────────────────► Focused(n)
//!      ▲  ▲                               │  ▲
//!      │  │ Esc / click canvas            │  │ ArrowUp at row 0
//!      │  └───────────────────────────────┤  │
//!      │                 click row / ↓     ▼  │
//!      └───────────── Esc ─────────── Paired(n, m, i) ── ↑/↓ ──► Paired(n, m', i±1)
//!                                         │
//!                         Enter / → / click m: push trail, Focused(m)
//! ```
//!
//! Backspace, Delete and ArrowLeft pop the trail and restore the state that
//! was active when the popped entry was pushed.
//!
//! ## Generations
//!
//! Each transition bumps a counter. Deferred work (the typography refresh
//! that runs once the camera has settled) records the counter when it is
//! scheduled and is dropped if the counter has moved on by the time it is
//! due.
//!
//! ## Missing ids
//!
//! Any input naming a node or edge the index does not know is a no-op.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, instrument, trace};

use crate::config::ExplorerConfig;
use crate::detail::{self, ConnectionRow, DetailPanel};
use crate::filter;
use crate::focus::{FocusState, focus_neighborhood};
use crate::index::GraphIndex;
use crate::input::{Input, Key, Target};
use crate::layout::LayoutSource;
use crate::model::Point;
use crate::region::{CommunityRegion, compute_regions};
use crate::scene::{self, NodeRole, Scene};
use crate::session::{DetailTarget, LabelPlan, Session};
use crate::trail::{Trail, TrailEntry};
use crate::viewport::{self, Camera, CameraAnimation, Occlusion, Typography, ViewportSize};

/// Hit radius around a node centre, in screen pixels.
const NODE_HIT_PX: f64 = 10.0;
/// Hit distance from an edge segment, in screen pixels.
const EDGE_HIT_PX: f64 = 4.0;

/// What a transition asks of the camera.
#[derive(Debug, Clone)]
enum Refit {
    /// Leave the camera alone.
    Keep,
    /// Every node passing the global filters.
    Overview,
    /// The focal node's capped neighborhood plus the trail.
    Neighborhood,
    /// Only the focal node and the paired neighbor.
    Pair,
    /// Specific nodes.
    Nodes(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredTask {
    Typography,
}

#[derive(Debug, Clone, Copy)]
struct Deferred {
    due: Duration,
    generation: u64,
    task: DeferredTask,
}

/// Interactive ego-graph explorer over one immutable dataset.
pub struct Explorer<L: LayoutSource> {
    index: GraphIndex,
    layout: L,
    config: ExplorerConfig,
    session: Session,
    scene: Scene,
    regions: Vec<CommunityRegion>,
    viewport: ViewportSize,
    camera: Camera,
    animation: Option<CameraAnimation>,
    now: Duration,
    generation: u64,
    deferred: Vec<Deferred>,
    layout_settled: bool,
}

impl<L: LayoutSource> Explorer<L> {
    /// Start a session in `Overview`.
    #[instrument(skip_all, fields(nodes = index.node_count()))]
    pub fn new(index: GraphIndex, layout: L, config: ExplorerConfig) -> Self {
        let session = Session::new(&config);
        let mut explorer = Self {
            index,
            layout,
            config,
            session,
            scene: Scene::default(),
            regions: Vec::new(),
            viewport: ViewportSize::default(),
            camera: Camera::default(),
            animation: None,
            now: Duration::ZERO,
            generation: 0,
            deferred: Vec::new(),
            layout_settled: false,
        };
        explorer.regions = compute_regions(&explorer.index, &explorer.layout, explorer.config.regions.padding);
        explorer.rebuild_scene();
        if let Some(camera) = explorer.fit_target(&Refit::Overview) {
            explorer.camera = camera;
        }
        explorer
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn index(&self) -> &GraphIndex {
        &self.index
    }

    #[must_use]
    pub const fn layout(&self) -> &L {
        &self.layout
    }

    /// Mutable layout handle for the external layout process.
    ///
    /// Moving nodes does not recompute regions; call
    /// [`Explorer::geometry_changed`] afterwards.
    pub const fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    #[must_use]
    pub const fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn focus(&self) -> &FocusState {
        &self.session.focus
    }

    #[must_use]
    pub const fn trail(&self) -> &Trail {
        &self.session.trail
    }

    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn regions(&self) -> &[CommunityRegion] {
        &self.regions
    }

    /// Camera as of the last [`Explorer::tick`].
    #[must_use]
    pub const fn camera(&self) -> Camera {
        self.camera
    }

    /// Where the running animation will end, or the current camera.
    #[must_use]
    pub fn camera_target(&self) -> Camera {
        self.animation.map_or(self.camera, |a| a.to)
    }

    #[must_use]
    pub const fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Deferred callbacks not yet run or discarded.
    #[must_use]
    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    #[must_use]
    pub const fn is_layout_settled(&self) -> bool {
        self.layout_settled
    }

    /// Detail panel content, built on demand.
    #[must_use]
    pub fn detail_panel(&self) -> Option<DetailPanel> {
        detail::build(&self.index, &self.session, self.config.labels.inverse_fallback)
    }

    /// Connection rows of the focused node, honoring the relation filter.
    #[must_use]
    pub fn connection_rows(&self) -> Vec<ConnectionRow> {
        self.session
            .focus
            .focal()
            .map(|focal| self.rows_for(focal, self.session.connection_filter.as_deref()))
            .unwrap_or_default()
    }

    /// Display names from the first trail node to the current focus.
    #[must_use]
    pub fn breadcrumb(&self) -> Vec<String> {
        self.session
            .trail
            .node_ids()
            .chain(self.session.focus.focal())
            .map(|id| self.display_name(id))
            .collect()
    }

    /// Banner text shown while in focus mode.
    #[must_use]
    pub fn focus_banner(&self) -> Option<String> {
        self.session
            .focus
            .focal()
            .map(|id| format!("Focused on: {}", self.display_name(id)))
    }

    /// Screen pixels currently covered by panels and the banner.
    #[must_use]
    pub fn occlusion(&self) -> Occlusion {
        let vp = &self.config.viewport;
        Occlusion {
            left: vp.left_panel,
            right: if self.session.detail == DetailTarget::Closed {
                0.0
            } else {
                vp.right_panel
            },
            top: if self.session.focus.is_overview() {
                0.0
            } else {
                vp.top_banner
            },
            bottom: 0.0,
        }
    }

    // -----------------------------------------------------------------------
    // Event entry points
    // -----------------------------------------------------------------------

    /// Apply one user interaction.
    pub fn handle(&mut self, input: Input) {
        match input {
            Input::Click(target) => self.click(target),
            Input::DoubleClick(target) => self.double_click(target),
            Input::Hover(target) => self.hover(target),
            Input::Key(key) => self.key(key),
            Input::SelectConnection(row) => self.select_connection(row),
            Input::ConnectionFilter(filter) => self.set_connection_filter(filter),
            Input::ToggleCard(pos) => self.toggle_card(pos),
            Input::CloseDetail => self.close_detail(),
            Input::Search(query) => self.search(&query),
            Input::ToggleEntityType(ty) => {
                if self.index.entity_types().contains_key(&ty) {
                    let hidden = self.session.filters.toggle_entity_type(&ty);
                    debug!(entity_type = %ty, hidden, "entity type toggled");
                    self.transition(Refit::Keep);
                }
            }
            Input::ToggleRelationType(ty) => {
                if self.index.relation_types().contains_key(&ty) {
                    let hidden = self.session.filters.toggle_relation_type(&ty);
                    debug!(relation_type = %ty, hidden, "relation type toggled");
                    self.transition(Refit::Keep);
                }
            }
            Input::ToggleCommunity(tag) => {
                if self.index.communities().contains_key(&tag) {
                    let hidden = self.session.filters.toggle_community(&tag);
                    debug!(community = %tag, hidden, "community toggled");
                    self.transition(Refit::Keep);
                }
            }
            Input::SetMinDegree(min) => {
                if self.session.filters.min_degree() != min {
                    self.session.filters.set_min_degree(min);
                    self.transition(Refit::Keep);
                }
            }
            Input::Resize { width, height } => self.resize(width, height),
        }
    }

    /// Advance the clock: poll the layout, step the camera, run due
    /// deferred work.
    pub fn tick(&mut self, now: Duration) {
        self.now = now;

        if !self.layout_settled && self.layout.is_settled() {
            self.layout_settled = true;
            self.on_layout_settled();
        }

        if let Some(animation) = self.animation {
            self.camera = animation.sample(now);
            if animation.is_finished(now) {
                self.animation = None;
            }
        }

        let (due, pending): (Vec<Deferred>, Vec<Deferred>) =
            self.deferred.drain(..).partition(|d| d.due <= now);
        self.deferred = pending;
        for task in due {
            if task.generation != self.generation {
                trace!(
                    scheduled = task.generation,
                    current = self.generation,
                    "discarding stale deferred task"
                );
                continue;
            }
            match task.task {
                DeferredTask::Typography => self.refresh_typography(),
            }
        }
    }

    /// Recompute community regions from current positions.
    pub fn geometry_changed(&mut self) {
        self.regions = compute_regions(&self.index, &self.layout, self.config.regions.padding);
    }

    /// Resolve a screen point to the node or edge under it.
    ///
    /// Nodes win over edges; only visible elements are hit.
    #[must_use]
    pub fn hit_test(&self, screen: Point) -> Target {
        let world = self.camera.screen_to_world(screen, self.viewport);
        let scale = self.camera.scale.max(f64::EPSILON);

        let node_radius = NODE_HIT_PX / scale;
        let nearest_node = self
            .scene
            .nodes()
            .filter_map(|(id, _)| self.layout.position(id).map(|p| (id, p.distance(world))))
            .filter(|(_, d)| *d <= node_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((id, _)) = nearest_node {
            return Target::Node(id.to_string());
        }

        let edge_radius = EDGE_HIT_PX / scale;
        let nearest_edge = self
            .scene
            .edges()
            .filter_map(|(id, _)| {
                let edge = self.index.edge(id)?;
                let a = self.layout.position(&edge.source)?;
                let b = self.layout.position(&edge.target)?;
                Some((id, segment_distance(world, a, b)))
            })
            .filter(|(_, d)| *d <= edge_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        nearest_edge.map_or(Target::Canvas, |(id, _)| Target::Edge(id.to_string()))
    }

    // -----------------------------------------------------------------------
    // Pointer
    // -----------------------------------------------------------------------

    fn click(&mut self, target: Target) {
        let focus = self.session.focus.clone();
        match (focus, target) {
            (FocusState::Overview, Target::Node(id)) => self.enter_focus(&id),
            (FocusState::Overview, Target::Edge(id)) => self.open_edge_detail(&id),
            (FocusState::Overview, Target::Canvas) => {}
            (_, Target::Canvas) => self.exit_to_overview(),
            (FocusState::Focused { node }, Target::Node(id)) => {
                if id == node || !self.scene.is_visible(&id) {
                    return;
                }
                if self.session.trail.contains(&id) {
                    self.jump_back(&id);
                } else if let Some(row) = self.row_index_for(&node, &id) {
                    self.pair(&node, &id, row);
                } else {
                    self.push_and_focus(&id);
                }
            }
            (FocusState::Paired { node, neighbor, .. }, Target::Node(id)) => {
                if !self.scene.is_visible(&id) {
                    return;
                }
                if id == neighbor {
                    self.push_and_focus(&neighbor);
                } else if id == node {
                    self.refocus(&node);
                } else if self.session.trail.contains(&id) {
                    self.jump_back(&id);
                } else if self.scene.node(&id).is_some_and(|v| v.role == NodeRole::Ghost) {
                    // Follow the pair, then select the ghost from there.
                    self.push_and_focus(&neighbor);
                    if let Some(row) = self.row_index_for(&neighbor, &id) {
                        self.pair(&neighbor, &id, row);
                    }
                } else if let Some(row) = self.row_index_for(&node, &id) {
                    self.pair(&node, &id, row);
                }
            }
            (FocusState::Focused { node } | FocusState::Paired { node, .. }, Target::Edge(id)) => {
                let Some(other) = self
                    .index
                    .edge(&id)
                    .and_then(|e| e.other_end(&node))
                    .map(str::to_string)
                else {
                    debug!(edge = %id, "edge does not touch the focus");
                    return;
                };
                if other == node {
                    return;
                }
                if let Some(row) = self.row_index_for(&node, &other) {
                    self.pair(&node, &other, row);
                }
            }
        }
    }

    fn double_click(&mut self, target: Target) {
        let id = match target {
            Target::Node(id) => id,
            other => return self.click(other),
        };
        match self.session.focus.clone() {
            FocusState::Overview => self.enter_focus(&id),
            FocusState::Focused { node } | FocusState::Paired { node, .. } => {
                if id == node || !self.scene.is_visible(&id) {
                    return;
                }
                if self.session.trail.contains(&id) {
                    self.jump_back(&id);
                } else {
                    self.push_and_focus(&id);
                }
            }
        }
    }

    fn hover(&mut self, target: Option<Target>) {
        let target = target.filter(|t| match t {
            Target::Node(id) => self.index.contains(id),
            Target::Edge(id) => self.index.edge(id).is_some(),
            Target::Canvas => false,
        });
        if self.session.hover != target {
            self.session.hover = target;
            self.rebuild_scene();
        }
    }

    // -----------------------------------------------------------------------
    // Keyboard
    // -----------------------------------------------------------------------

    fn key(&mut self, key: Key) {
        match key {
            Key::Escape => self.exit_to_overview(),
            Key::Down => self.step_selection(true),
            Key::Up => self.step_selection(false),
            Key::Right | Key::Enter => {
                if let FocusState::Paired { neighbor, .. } = self.session.focus.clone() {
                    self.push_and_focus(&neighbor);
                }
            }
            Key::Left | Key::Backspace | Key::Delete => {
                if !self.session.focus.is_overview() {
                    self.pop_trail();
                }
            }
            Key::Space => {
                if self.session.focus.selected_index().is_some() {
                    self.session.evidence_open = !self.session.evidence_open;
                }
            }
        }
    }

    fn step_selection(&mut self, down: bool) {
        let (node, current) = match &self.session.focus {
            FocusState::Overview => return,
            FocusState::Focused { node } => (node.clone(), None),
            FocusState::Paired { node, index, .. } => (node.clone(), Some(*index)),
        };
        let rows = self.rows_for(&node, self.session.connection_filter.as_deref());
        if rows.is_empty() {
            return;
        }
        let next = match (down, current) {
            (true, None) => Some(0),
            (true, Some(i)) => Some((i + 1).min(rows.len() - 1)),
            (false, None) => return,
            (false, Some(0)) => None,
            (false, Some(i)) => Some((i - 1).min(rows.len() - 1)),
        };
        match next {
            None => self.refocus(&node),
            Some(i) if Some(i) == current => {}
            Some(i) => {
                let neighbor = rows[i].neighbor_id().to_string();
                self.pair(&node, &neighbor, i);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Detail panel
    // -----------------------------------------------------------------------

    fn select_connection(&mut self, row: usize) {
        let Some(node) = self.session.focus.focal().map(str::to_string) else {
            return;
        };
        let rows = self.rows_for(&node, self.session.connection_filter.as_deref());
        let Some(target) = rows.get(row) else {
            debug!(row, "connection row out of range");
            return;
        };
        let neighbor = target.neighbor_id().to_string();
        if self.session.focus.selected_index() == Some(row) {
            self.push_and_focus(&neighbor);
        } else {
            self.pair(&node, &neighbor, row);
        }
    }

    fn set_connection_filter(&mut self, filter: Option<String>) {
        let Some(node) = self.session.focus.focal().map(str::to_string) else {
            return;
        };
        if self.session.connection_filter == filter {
            return;
        }
        if let Some(rel) = &filter {
            let known = self
                .rows_for(&node, None)
                .iter()
                .any(|r| r.group.has_relation(rel));
            if !known {
                return;
            }
        }
        self.session.connection_filter = filter;
        if matches!(self.session.focus, FocusState::Paired { .. }) {
            self.refocus(&node);
        }
    }

    fn toggle_card(&mut self, pos: usize) {
        if self.session.trail.is_empty() || pos > self.session.trail.len() {
            return;
        }
        let expanded = self.session.card_expanded(pos);
        self.session.card_overrides.insert(pos, !expanded);
    }

    fn close_detail(&mut self) {
        if self.session.focus.is_overview() {
            self.session.detail = DetailTarget::Closed;
        }
    }

    fn open_edge_detail(&mut self, edge_id: &str) {
        if self.index.edge(edge_id).is_some() {
            self.session.detail = DetailTarget::Edge(edge_id.to_string());
        }
    }

    // -----------------------------------------------------------------------
    // Filters and search
    // -----------------------------------------------------------------------

    fn search(&mut self, query: &str) {
        let hits = filter::search(&self.index, query, self.config.search.min_query_len);
        let Some(hits) = hits else {
            if self.session.search.take().is_some() {
                self.rebuild_scene();
            }
            return;
        };
        self.exit_to_overview();
        let first = hits.matches.first().cloned();
        debug!(query = %hits.query, matches = hits.matches.len(), "search");
        self.session.search = Some(hits);
        match first {
            Some(id) => self.transition(Refit::Nodes(vec![id])),
            None => self.transition(Refit::Keep),
        }
    }

    fn resize(&mut self, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.viewport = ViewportSize { width, height };
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn enter_focus(&mut self, id: &str) {
        if !self.index.contains(id) {
            debug!(node = %id, "focus on unknown node ignored");
            return;
        }
        self.session.trail.clear();
        self.session.card_overrides.clear();
        self.session.connection_filter = None;
        self.session.evidence_open = false;
        self.session.focus = FocusState::Focused { node: id.to_string() };
        self.session.detail = DetailTarget::Node(id.to_string());
        self.transition(Refit::Neighborhood);
    }

    /// Back to the plain neighborhood view of `node` without touching the trail.
    fn refocus(&mut self, node: &str) {
        self.session.evidence_open = false;
        self.session.focus = FocusState::Focused { node: node.to_string() };
        self.session.detail = DetailTarget::Node(node.to_string());
        self.transition(Refit::Neighborhood);
    }

    fn pair(&mut self, node: &str, neighbor: &str, row: usize) {
        if !self.index.contains(neighbor) {
            return;
        }
        self.session.evidence_open = false;
        self.session.focus = FocusState::Paired {
            node: node.to_string(),
            neighbor: neighbor.to_string(),
            index: row,
        };
        self.session.detail = DetailTarget::Node(node.to_string());
        self.transition(Refit::Pair);
    }

    /// Record the current state on the trail and focus `dest`.
    fn push_and_focus(&mut self, dest: &str) {
        let Some(node) = self.session.focus.focal().map(str::to_string) else {
            return;
        };
        if !self.index.contains(dest) || dest == node {
            return;
        }
        let selected = self.session.focus.selected_index();
        let paired = self.session.focus.paired_neighbor().map(str::to_string);
        let filter = self.session.connection_filter.clone();
        let rows = self.rows_for(&node, filter.as_deref());
        let row = selected
            .and_then(|i| rows.get(i))
            .filter(|r| r.neighbor_id() == dest)
            .or_else(|| rows.iter().find(|r| r.neighbor_id() == dest));

        self.session.trail.push(TrailEntry {
            node_id: node,
            connection_index: selected,
            paired_neighbor: paired,
            connection_filter: filter,
            relation_label: row.map(|r| r.label.clone()),
            direction: row.map(ConnectionRow::direction),
            destination: dest.to_string(),
        });
        self.session.card_overrides.clear();
        self.session.connection_filter = None;
        self.session.evidence_open = false;
        self.session.focus = FocusState::Focused { node: dest.to_string() };
        self.session.detail = DetailTarget::Node(dest.to_string());
        self.transition(Refit::Neighborhood);
    }

    fn pop_trail(&mut self) {
        let Some(entry) = self.session.trail.last() else {
            return;
        };
        if !self.index.contains(&entry.node_id) {
            debug!(node = %entry.node_id, "trail entry no longer resolves");
            return;
        }
        if let Some(entry) = self.session.trail.pop() {
            self.restore(entry);
        }
    }

    fn jump_back(&mut self, id: &str) {
        let Some(pos) = self.session.trail.rposition(id) else {
            return;
        };
        if let Some(entry) = self.session.trail.truncate_to(pos) {
            self.restore(entry);
        }
    }

    /// Re-enter the state recorded in `entry`.
    fn restore(&mut self, entry: TrailEntry) {
        self.session.card_overrides.clear();
        self.session.evidence_open = false;
        self.session.connection_filter = entry.connection_filter;
        self.session.detail = DetailTarget::Node(entry.node_id.clone());
        let refit = match (entry.connection_index, entry.paired_neighbor) {
            (Some(index), Some(neighbor)) if self.index.contains(&neighbor) => {
                self.session.focus = FocusState::Paired {
                    node: entry.node_id,
                    neighbor,
                    index,
                };
                Refit::Pair
            }
            _ => {
                self.session.focus = FocusState::Focused { node: entry.node_id };
                Refit::Neighborhood
            }
        };
        self.transition(refit);
    }

    fn exit_to_overview(&mut self) {
        if self.session.focus.is_overview() {
            return;
        }
        self.session.focus = FocusState::Overview;
        self.session.trail.clear();
        self.session.card_overrides.clear();
        self.session.connection_filter = None;
        self.session.evidence_open = false;
        self.session.hover = None;
        self.transition(Refit::Overview);
    }

    /// Common tail of every transition: new generation, camera target,
    /// immediate typography, scene rebuild and a deferred typography refresh.
    fn transition(&mut self, refit: Refit) {
        self.generation += 1;
        self.session.labels = LabelPlan::Provisional;

        let pair = matches!(self.session.focus, FocusState::Paired { .. });
        if let Some(target) = self.fit_target(&refit) {
            let ms = if pair {
                self.config.viewport.pair_animation_ms
            } else {
                self.config.viewport.animation_ms
            };
            self.animate_to(target, Duration::from_millis(ms));
        }
        let scale = self.camera_target().scale;
        self.session.typography = self.typography_for(scale);
        self.rebuild_scene();

        if !self.session.focus.is_overview() {
            self.deferred.push(Deferred {
                due: self.now + Duration::from_millis(self.config.viewport.typography_delay_ms),
                generation: self.generation,
                task: DeferredTask::Typography,
            });
        }
        debug!(
            generation = self.generation,
            focus = %self.session.focus,
            trail = self.session.trail.len(),
            "transition"
        );
    }

    fn on_layout_settled(&mut self) {
        debug!("layout settled");
        self.geometry_changed();
        let refit = match self.session.focus {
            FocusState::Overview => Refit::Overview,
            FocusState::Focused { .. } => Refit::Neighborhood,
            FocusState::Paired { .. } => Refit::Pair,
        };
        if let Some(target) = self.fit_target(&refit) {
            self.animate_to(target, Duration::from_millis(self.config.viewport.animation_ms));
        }
    }

    /// Deferred step: typography from the settled scale and the final set of
    /// labelled nodes.
    fn refresh_typography(&mut self) {
        self.session.typography = self.typography_for(self.camera.scale);
        let always = self.session.exempt_ids();
        let mut ranked: Vec<(&str, usize)> = self
            .scene
            .nodes()
            .filter(|(id, v)| {
                !always.contains(*id)
                    && matches!(v.role, NodeRole::Neighbor | NodeRole::Ghost)
            })
            .map(|(id, _)| (id, self.index.degree(id).unwrap_or(0)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let mut labelled: HashSet<String> = ranked
            .into_iter()
            .take(self.config.focus.label_top_n)
            .map(|(id, _)| id.to_string())
            .collect();
        labelled.extend(always);
        labelled.extend(self.session.focus.paired_neighbor().map(str::to_string));
        trace!(labelled = labelled.len(), scale = self.camera.scale, "typography settled");
        self.session.labels = LabelPlan::Settled(labelled);
        self.rebuild_scene();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn rebuild_scene(&mut self) {
        self.scene = scene::compose(&self.index, &self.session, &self.config);
    }

    fn rows_for(&self, node: &str, filter: Option<&str>) -> Vec<ConnectionRow> {
        detail::connection_rows(&self.index, node, filter, self.config.labels.inverse_fallback)
    }

    /// Row of `neighbor` in `node`'s list. Clears the relation filter when it
    /// hides the neighbor.
    fn row_index_for(&mut self, node: &str, neighbor: &str) -> Option<usize> {
        let filter = self.session.connection_filter.clone();
        if let Some(pos) = self
            .rows_for(node, filter.as_deref())
            .iter()
            .position(|r| r.neighbor_id() == neighbor)
        {
            return Some(pos);
        }
        if filter.is_some() {
            let pos = self
                .rows_for(node, None)
                .iter()
                .position(|r| r.neighbor_id() == neighbor);
            if pos.is_some() {
                self.session.connection_filter = None;
            }
            return pos;
        }
        None
    }

    fn display_name(&self, id: &str) -> String {
        self.index
            .node(id)
            .map_or_else(|| id.to_string(), |n| n.name.clone())
    }

    fn typography_for(&self, scale: f64) -> Typography {
        match self.session.focus {
            FocusState::Overview => Typography::overview(&self.config.viewport),
            FocusState::Focused { .. } => Typography::focus(&self.config.viewport, scale),
            FocusState::Paired { .. } => Typography::pair(&self.config.viewport, scale),
        }
    }

    fn animate_to(&mut self, target: Camera, duration: Duration) {
        let from = self.animation.map_or(self.camera, |a| a.sample(self.now));
        self.camera = from;
        self.animation = Some(CameraAnimation::new(from, target, self.now, duration));
    }

    fn fit_target(&self, refit: &Refit) -> Option<Camera> {
        let ids: Vec<String> = match refit {
            Refit::Keep => return None,
            Refit::Overview => self
                .index
                .nodes()
                .filter(|n| self.session.filters.node_passes(n))
                .map(|n| n.id.clone())
                .collect(),
            Refit::Neighborhood => {
                let focal = self.session.focus.focal()?;
                let exempt = self.session.exempt_ids();
                let hood = focus_neighborhood(
                    &self.index,
                    &self.session.filters,
                    focal,
                    &exempt,
                    self.config.focus.neighbor_cap,
                )?;
                hood.ids().map(str::to_string).collect()
            }
            Refit::Pair => {
                let focal = self.session.focus.focal()?;
                let neighbor = self.session.focus.paired_neighbor()?;
                vec![focal.to_string(), neighbor.to_string()]
            }
            Refit::Nodes(ids) => ids.clone(),
        };
        let points: Vec<Point> = ids.iter().filter_map(|id| self.layout.position(id)).collect();
        viewport::fit(
            &points,
            self.viewport,
            self.occlusion(),
            self.config.viewport.padding,
            self.config.viewport.scale_cap,
        )
    }
}

/// Distance from `p` to the segment `a`–`b`.
fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx.mul_add(dx, dy * dy);
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p.x - a.x).mul_add(dx, (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(t.mul_add(dx, a.x), t.mul_add(dy, a.y)))
}
