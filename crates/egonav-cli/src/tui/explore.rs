//! Event loop and key/mouse mapping for the terminal explorer.
//!
//! Key bindings:
//!
//! | Key              | Action                                           |
//! |------------------|--------------------------------------------------|
//! | `↑` / `↓`        | walk connection rows                             |
//! | `→` / `Enter`    | follow the selected connection                   |
//! | `←` / `Bksp`     | step back along the trail                        |
//! | `Space`          | show or hide evidence for the selected row       |
//! | `Esc`            | back to the overview                             |
//! | `1`..`9`         | select connection row                            |
//! | `f`              | cycle the connection list's relation filter      |
//! | `e`              | expand or collapse the newest trail card         |
//! | `/`              | search by name or alias                          |
//! | `t` `r` `c`      | move the entity / relation / community cursor    |
//! | `T` `R` `C`      | show or hide the item under that cursor          |
//! | `+` / `-`        | raise or lower the minimum degree                |
//! | `x`              | close the detail panel (overview only)           |
//! | `q`              | quit                                             |

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use egonav_core::connections::{group_connections, relation_type_counts};
use egonav_core::palette::Palette;
use egonav_core::{Dataset, Explorer, ExplorerConfig, GraphIndex, Input, Key, Point, Target};
use ratatui::layout::Rect;
use tracing::{debug, info};

use super::terminal::TerminalSession;
use super::{BANNER_ROWS, CELL_H, CELL_W, LEFT_COLS, RIGHT_COLS, draw};
use crate::layout::SeededLayout;

/// Two clicks on the same cell within this window form a double click.
const DOUBLE_CLICK: Duration = Duration::from_millis(400);
/// Frame interval.
const FRAME: Duration = Duration::from_millis(33);

/// Which filter list a cursor walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterList {
    Entity,
    Relation,
    Community,
}

/// What a key press asks the app to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Engine(Input),
    Quit,
    BeginSearch,
    MoveCursor(FilterList),
    ToggleUnderCursor(FilterList),
    MinDegree(isize),
    CycleConnectionFilter,
    ToggleNewestCard,
    Nothing,
}

/// Map a key press outside of search entry.
pub fn map_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Up => Action::Engine(Input::Key(Key::Up)),
        KeyCode::Down => Action::Engine(Input::Key(Key::Down)),
        KeyCode::Left => Action::Engine(Input::Key(Key::Left)),
        KeyCode::Right => Action::Engine(Input::Key(Key::Right)),
        KeyCode::Enter => Action::Engine(Input::Key(Key::Enter)),
        KeyCode::Char(' ') => Action::Engine(Input::Key(Key::Space)),
        KeyCode::Backspace => Action::Engine(Input::Key(Key::Backspace)),
        KeyCode::Delete => Action::Engine(Input::Key(Key::Delete)),
        KeyCode::Esc => Action::Engine(Input::Key(Key::Escape)),
        KeyCode::Char('x') => Action::Engine(Input::CloseDetail),
        KeyCode::Char(d @ '1'..='9') => {
            let row = d.to_digit(10).map_or(0, |n| n as usize - 1);
            Action::Engine(Input::SelectConnection(row))
        }
        KeyCode::Char('/') => Action::BeginSearch,
        KeyCode::Char('t') => Action::MoveCursor(FilterList::Entity),
        KeyCode::Char('r') => Action::MoveCursor(FilterList::Relation),
        KeyCode::Char('c') => Action::MoveCursor(FilterList::Community),
        KeyCode::Char('T') => Action::ToggleUnderCursor(FilterList::Entity),
        KeyCode::Char('R') => Action::ToggleUnderCursor(FilterList::Relation),
        KeyCode::Char('C') => Action::ToggleUnderCursor(FilterList::Community),
        KeyCode::Char('+' | '=') => Action::MinDegree(1),
        KeyCode::Char('-') => Action::MinDegree(-1),
        KeyCode::Char('f') => Action::CycleConnectionFilter,
        KeyCode::Char('e') => Action::ToggleNewestCard,
        _ => Action::Nothing,
    }
}

/// Cursor positions in the three filter lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursors {
    pub entity: usize,
    pub relation: usize,
    pub community: usize,
    pub active: Option<FilterList>,
}

impl Cursors {
    fn slot(&mut self, list: FilterList) -> &mut usize {
        match list {
            FilterList::Entity => &mut self.entity,
            FilterList::Relation => &mut self.relation,
            FilterList::Community => &mut self.community,
        }
    }

    pub const fn get(&self, list: FilterList) -> usize {
        match list {
            FilterList::Entity => self.entity,
            FilterList::Relation => self.relation,
            FilterList::Community => self.community,
        }
    }
}

pub struct App {
    pub explorer: Explorer<SeededLayout>,
    pub palette: Palette,
    pub cursors: Cursors,
    /// `Some` while a search query is being typed.
    pub search_input: Option<String>,
    pub should_quit: bool,
    started: Instant,
    last_click: Option<(Instant, u16, u16)>,
    area: Rect,
}

impl App {
    pub fn new(dataset: &Dataset, index: GraphIndex, mut config: ExplorerConfig) -> Self {
        // Panels are drawn in cells; the engine fits in pixels.
        config.viewport.left_panel = f64::from(LEFT_COLS) * CELL_W;
        config.viewport.right_panel = f64::from(RIGHT_COLS) * CELL_W;
        config.viewport.top_banner = f64::from(BANNER_ROWS) * CELL_H;

        let palette = Palette::for_index(&index, &dataset.community_colors);
        let layout = SeededLayout::from_dataset(dataset);
        Self {
            explorer: Explorer::new(index, layout, config),
            palette,
            cursors: Cursors::default(),
            search_input: None,
            should_quit: false,
            started: Instant::now(),
            last_click: None,
            area: Rect::default(),
        }
    }

    /// Track the terminal size, forwarding changes to the engine.
    pub fn resize(&mut self, area: Rect) {
        if area == self.area {
            return;
        }
        self.area = area;
        self.explorer.handle(Input::Resize {
            width: f64::from(area.width) * CELL_W,
            height: f64::from(area.height) * CELL_H,
        });
    }

    pub fn tick(&mut self) {
        self.explorer.tick(self.started.elapsed());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(query) = self.search_input.as_mut() {
            match key.code {
                KeyCode::Enter => {
                    let query = std::mem::take(query);
                    self.search_input = None;
                    self.explorer.handle(Input::Search(query));
                }
                KeyCode::Esc => {
                    self.search_input = None;
                    self.explorer.handle(Input::Search(String::new()));
                }
                KeyCode::Backspace => {
                    query.pop();
                }
                KeyCode::Char(ch) => query.push(ch),
                _ => {}
            }
            return;
        }

        match map_key(key) {
            Action::Engine(input) => self.explorer.handle(input),
            Action::Quit => self.should_quit = true,
            Action::BeginSearch => self.search_input = Some(String::new()),
            Action::MoveCursor(list) => {
                let len = self.filter_items(list).len();
                if self.cursors.active == Some(list) && len > 0 {
                    let slot = self.cursors.slot(list);
                    *slot = (*slot + 1) % len;
                }
                self.cursors.active = Some(list);
            }
            Action::ToggleUnderCursor(list) => self.toggle_under_cursor(list),
            Action::MinDegree(step) => {
                let current = self.explorer.session().filters().min_degree();
                let next = current.saturating_add_signed(step);
                self.explorer.handle(Input::SetMinDegree(next));
            }
            Action::CycleConnectionFilter => self.cycle_connection_filter(),
            Action::ToggleNewestCard => {
                if !self.explorer.focus().is_overview() {
                    let newest = self.explorer.trail().len();
                    self.explorer.handle(Input::ToggleCard(newest));
                }
            }
            Action::Nothing => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.in_panel(mouse.column, mouse.row) {
            return;
        }
        let target = self.explorer.hit_test(cell_center(mouse.column, mouse.row));
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let now = Instant::now();
                let double = self.last_click.is_some_and(|(at, col, row)| {
                    col == mouse.column && row == mouse.row && now.duration_since(at) <= DOUBLE_CLICK
                });
                if double {
                    self.last_click = None;
                    self.explorer.handle(Input::DoubleClick(target));
                } else {
                    self.last_click = Some((now, mouse.column, mouse.row));
                    self.explorer.handle(Input::Click(target));
                }
            }
            MouseEventKind::Moved => {
                let hovered = (target != Target::Canvas).then_some(target);
                if self.explorer.session().hover() != hovered.as_ref() {
                    self.explorer.handle(Input::Hover(hovered));
                }
            }
            _ => {}
        }
    }

    /// Names in one filter list, in display order.
    pub fn filter_items(&self, list: FilterList) -> Vec<(String, usize)> {
        let index = self.explorer.index();
        let map = match list {
            FilterList::Entity => index.entity_types(),
            FilterList::Relation => index.relation_types(),
            FilterList::Community => index.communities(),
        };
        map.into_iter().collect()
    }

    fn toggle_under_cursor(&mut self, list: FilterList) {
        let items = self.filter_items(list);
        let Some((name, _)) = items.get(self.cursors.get(list)).cloned() else {
            return;
        };
        self.cursors.active = Some(list);
        let input = match list {
            FilterList::Entity => Input::ToggleEntityType(name),
            FilterList::Relation => Input::ToggleRelationType(name),
            FilterList::Community => Input::ToggleCommunity(name),
        };
        self.explorer.handle(input);
    }

    fn cycle_connection_filter(&mut self) {
        let Some(focal) = self.explorer.focus().focal() else {
            return;
        };
        let relations: Vec<String> =
            relation_type_counts(&group_connections(self.explorer.index(), focal, None))
                .into_keys()
                .collect();
        let next = match self.explorer.session().connection_filter() {
            None => relations.first().cloned(),
            Some(current) => relations
                .iter()
                .position(|r| r == current)
                .and_then(|i| relations.get(i + 1).cloned()),
        };
        debug!(filter = ?next, "connection filter cycled");
        self.explorer.handle(Input::ConnectionFilter(next));
    }

    fn in_panel(&self, col: u16, row: u16) -> bool {
        let right_open = self.explorer.detail_panel().is_some();
        col < self.area.x + LEFT_COLS
            || (right_open && col >= self.area.right().saturating_sub(RIGHT_COLS))
            || (!self.explorer.focus().is_overview() && row < self.area.y + BANNER_ROWS)
    }
}

/// Screen-pixel center of a terminal cell.
fn cell_center(col: u16, row: u16) -> Point {
    Point::new(
        (f64::from(col) + 0.5) * CELL_W,
        (f64::from(row) + 0.5) * CELL_H,
    )
}

/// Run the explorer until the user quits.
pub fn run_explorer(dataset: &Dataset, index: GraphIndex, config: ExplorerConfig) -> Result<()> {
    let mut app = App::new(dataset, index, config);
    // Seeded positions are final, so the layout settles before the first frame.
    app.explorer.layout_mut().settle();
    info!(
        nodes = app.explorer.index().node_count(),
        edges = app.explorer.index().edge_count(),
        "explorer started"
    );

    let mut terminal = TerminalSession::new()?;
    while !app.should_quit {
        let size = terminal.size()?;
        app.resize(Rect::new(0, 0, size.width, size.height));
        app.tick();
        terminal.draw(|frame| draw::draw(frame, &app))?;

        if event::poll(FRAME)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
    }
    info!("explorer closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use egonav_core::FocusState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        let ds = Dataset::from_json_str(
            r#"{
                "nodes": [
                    {"id": "a", "name": "Alpha", "entity_type": "PERSON", "community": "1"},
                    {"id": "b", "name": "Beta", "entity_type": "ORG", "community": "1"},
                    {"id": "c", "name": "Gamma", "entity_type": "ORG", "community": "2"}
                ],
                "links": [
                    {"source": "a", "target": "b", "relation_type": "WORKS_FOR"},
                    {"source": "a", "target": "c", "relation_type": "KNOWS"}
                ],
                "min_degree": 0
            }"#,
        )
        .expect("parse");
        let index = GraphIndex::from_dataset(&ds);
        let config = ExplorerConfig::default().with_dataset_min_degree(ds.min_degree);
        let mut app = App::new(&ds, index, config);
        app.explorer.layout_mut().settle();
        app.resize(Rect::new(0, 0, 200, 60));
        app.tick();
        app
    }

    #[test]
    fn navigation_keys_map_to_engine_keys() {
        assert_eq!(map_key(press(KeyCode::Down)), Action::Engine(Input::Key(Key::Down)));
        assert_eq!(map_key(press(KeyCode::Esc)), Action::Engine(Input::Key(Key::Escape)));
        assert_eq!(map_key(press(KeyCode::Char(' '))), Action::Engine(Input::Key(Key::Space)));
        assert_eq!(map_key(press(KeyCode::Char('3'))), Action::Engine(Input::SelectConnection(2)));
    }

    #[test]
    fn quit_on_q_and_ctrl_c() {
        assert_eq!(map_key(press(KeyCode::Char('q'))), Action::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c), Action::Quit);
        assert_eq!(
            map_key(press(KeyCode::Char('c'))),
            Action::MoveCursor(FilterList::Community)
        );
    }

    #[test]
    fn typed_search_is_submitted_on_enter() {
        let mut app = app();
        app.handle_key(press(KeyCode::Char('/')));
        for ch in "gam".chars() {
            app.handle_key(press(KeyCode::Char(ch)));
        }
        assert_eq!(app.search_input.as_deref(), Some("gam"));
        app.handle_key(press(KeyCode::Enter));
        assert!(app.search_input.is_none());
        let hits = app.explorer.session().search().expect("search active");
        assert!(hits.is_match("c"));
    }

    #[test]
    fn cursor_moves_then_toggles() {
        let mut app = app();
        app.handle_key(press(KeyCode::Char('t')));
        assert_eq!(app.cursors.active, Some(FilterList::Entity));
        assert_eq!(app.cursors.entity, 0);
        app.handle_key(press(KeyCode::Char('t')));
        assert_eq!(app.cursors.entity, 1);
        // Entity types sort as ORG, PERSON.
        app.handle_key(press(KeyCode::Char('T')));
        assert!(app.explorer.session().filters().is_entity_type_hidden("PERSON"));
    }

    #[test]
    fn min_degree_never_goes_negative() {
        let mut app = app();
        app.handle_key(press(KeyCode::Char('-')));
        assert_eq!(app.explorer.session().filters().min_degree(), 0);
        app.handle_key(press(KeyCode::Char('+')));
        assert_eq!(app.explorer.session().filters().min_degree(), 1);
    }

    #[test]
    fn connection_filter_cycles_through_relations_then_clears() {
        let mut app = app();
        app.explorer.handle(Input::Click(Target::Node("a".into())));
        assert!(matches!(app.explorer.focus(), FocusState::Focused { .. }));
        app.handle_key(press(KeyCode::Char('f')));
        assert_eq!(app.explorer.session().connection_filter(), Some("KNOWS"));
        app.handle_key(press(KeyCode::Char('f')));
        assert_eq!(app.explorer.session().connection_filter(), Some("WORKS_FOR"));
        app.handle_key(press(KeyCode::Char('f')));
        assert_eq!(app.explorer.session().connection_filter(), None);
    }

    #[test]
    fn clicks_inside_the_filter_panel_do_not_reach_the_canvas() {
        let mut app = app();
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 2,
            row: 10,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse(click);
        assert!(app.explorer.focus().is_overview());
        assert!(app.explorer.detail_panel().is_none());
    }
}
