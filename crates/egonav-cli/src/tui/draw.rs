//! Frame rendering: braille canvas, filter panel, focus banner, detail panel.

use egonav_core::detail::{ConnectionRow, DetailPanel, EdgeDetail, NodeCard};
use egonav_core::palette::Rgb;
use egonav_core::scene::{EdgeRole, NodeRole};
use egonav_core::viewport::{Camera, ViewportSize};
use egonav_core::{LayoutSource, Point};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as Segment};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::explore::{App, FilterList};
use super::{BANNER_ROWS, CELL_H, CELL_W, LEFT_COLS, RIGHT_COLS};

/// Below this opacity an element is not drawn at all.
const INVISIBLE: f64 = 0.05;

const fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

/// Blend toward black; terminals have no alpha.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn faded(c: Rgb, opacity: f64) -> Color {
    let k = opacity.clamp(0.0, 1.0);
    let ch = |v: u8| (f64::from(v) * k).round() as u8;
    Color::Rgb(ch(c.0), ch(c.1), ch(c.2))
}

pub fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();
    let [body, status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    draw_canvas(frame, app, area);

    let left = Rect {
        width: LEFT_COLS.min(body.width),
        ..body
    };
    draw_filters(frame, app, left);

    if let Some(panel) = app.explorer.detail_panel() {
        let width = RIGHT_COLS.min(body.width.saturating_sub(left.width));
        let right = Rect {
            x: body.right().saturating_sub(width),
            width,
            ..body
        };
        draw_detail(frame, app, &panel, right);
    }

    if let Some(banner) = app.explorer.focus_banner() {
        let x = left.right();
        let banner_area = Rect {
            x,
            y: body.y,
            width: body.right().saturating_sub(x),
            height: BANNER_ROWS.min(body.height),
        };
        draw_banner(frame, app, &banner, banner_area);
    }

    draw_status(frame, app, status);
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

struct Projection {
    camera: Camera,
    size: ViewportSize,
}

impl Projection {
    /// World point to canvas coordinates (canvas `y` grows upward).
    fn to_canvas(&self, p: Point) -> (f64, f64) {
        let s = self.camera.world_to_screen(p, self.size);
        (s.x, self.size.height - s.y)
    }
}

fn draw_canvas(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let size = ViewportSize {
        width: f64::from(area.width) * CELL_W,
        height: f64::from(area.height) * CELL_H,
    };
    let projection = Projection {
        camera: app.explorer.camera(),
        size,
    };
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, size.width])
        .y_bounds([0.0, size.height])
        .paint(|ctx| {
            paint_regions(ctx, app, &projection);
            paint_edges(ctx, app, &projection);
            ctx.layer();
            paint_nodes(ctx, app, &projection);
        });
    frame.render_widget(canvas, area);
}

fn paint_regions(ctx: &mut Context<'_>, app: &App, proj: &Projection) {
    for region in app.explorer.regions() {
        if !region.is_drawable() {
            continue;
        }
        let color = faded(app.palette.community(&region.community), 0.35);
        let pts: Vec<(f64, f64)> = region.boundary.iter().map(|p| proj.to_canvas(*p)).collect();
        for (i, &(x1, y1)) in pts.iter().enumerate() {
            let (x2, y2) = pts[(i + 1) % pts.len()];
            ctx.draw(&Segment { x1, y1, x2, y2, color });
        }
        let (cx, cy) = proj.to_canvas(region.centroid);
        ctx.print(
            cx,
            cy,
            Span::styled(region.community.clone(), Style::default().fg(color)),
        );
    }
}

fn paint_edges(ctx: &mut Context<'_>, app: &App, proj: &Projection) {
    let index = app.explorer.index();
    let layout = app.explorer.layout();
    for (id, view) in app.explorer.scene().edges() {
        if view.opacity < INVISIBLE {
            continue;
        }
        let Some(edge) = index.edge(id) else { continue };
        let (Some(a), Some(b)) = (layout.position(&edge.source), layout.position(&edge.target))
        else {
            continue;
        };
        let base = app.palette.relation(&edge.relation_type);
        let color = match view.role {
            EdgeRole::Pair => Color::Yellow,
            EdgeRole::Trail => Color::Cyan,
            EdgeRole::Focus | EdgeRole::Context => faded(base, view.opacity),
            EdgeRole::Ghost | EdgeRole::Dimmed => faded(base, view.opacity.min(0.3)),
        };
        let (x1, y1) = proj.to_canvas(a);
        let (x2, y2) = proj.to_canvas(b);
        ctx.draw(&Segment { x1, y1, x2, y2, color });
        if let Some(label) = &view.label {
            ctx.print(
                f64::midpoint(x1, x2),
                f64::midpoint(y1, y2),
                Span::styled(label.clone(), Style::default().fg(Color::Gray)),
            );
        }
    }
}

fn paint_nodes(ctx: &mut Context<'_>, app: &App, proj: &Projection) {
    let index = app.explorer.index();
    let layout = app.explorer.layout();
    for (id, view) in app.explorer.scene().nodes() {
        if view.opacity < INVISIBLE {
            continue;
        }
        let (Some(node), Some(p)) = (index.node(id), layout.position(id)) else {
            continue;
        };
        let glyph = match view.role {
            NodeRole::Focus => "◉",
            NodeRole::Paired => "★",
            NodeRole::Trail => "◆",
            NodeRole::SearchMatch => "◎",
            NodeRole::Ghost | NodeRole::Dimmed | NodeRole::SearchMiss => "·",
            NodeRole::Context | NodeRole::Neighbor | NodeRole::SearchNeighbor => "●",
        };
        let mut style = Style::default().fg(faded(app.palette.entity(&node.entity_type), view.opacity));
        if matches!(view.role, NodeRole::Focus | NodeRole::Paired) {
            style = style.add_modifier(Modifier::BOLD);
        }
        let (x, y) = proj.to_canvas(p);
        let text = if view.label {
            format!("{glyph} {}", node.name)
        } else {
            glyph.to_string()
        };
        ctx.print(x, y, Span::styled(text, style));
    }
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

fn draw_filters(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let filters = app.explorer.session().filters();
    let mut lines: Vec<Line<'_>> = Vec::new();
    for (list, heading) in [
        (FilterList::Entity, "Entity types (t/T)"),
        (FilterList::Relation, "Relation types (r/R)"),
        (FilterList::Community, "Communities (c/C)"),
    ] {
        lines.push(Line::styled(heading, Style::default().add_modifier(Modifier::BOLD)));
        for (pos, (name, count)) in app.filter_items(list).into_iter().enumerate() {
            let (shown, color) = match list {
                FilterList::Entity => (!filters.is_entity_type_hidden(&name), app.palette.entity(&name)),
                FilterList::Relation => (filters.relation_visible(&name), app.palette.relation(&name)),
                FilterList::Community => (!filters.is_community_hidden(&name), app.palette.community(&name)),
            };
            let mark = if shown { "[x]" } else { "[ ]" };
            let mut style = Style::default();
            if app.cursors.active == Some(list) && app.cursors.get(list) == pos {
                style = style.add_modifier(Modifier::REVERSED);
            }
            lines.push(Line::from(vec![
                Span::styled(format!(" {mark} "), style),
                Span::styled("■ ", Style::default().fg(rgb(color))),
                Span::styled(format!("{name} ({count})"), style),
            ]));
        }
        lines.push(Line::default());
    }
    lines.push(Line::from(format!("Min degree (+/-): {}", filters.min_degree())));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::RIGHT).title("Filters")),
        area,
    );
}

fn draw_banner(frame: &mut Frame<'_>, app: &App, banner: &str, area: Rect) {
    let crumbs = app.explorer.breadcrumb().join(" › ");
    let lines = vec![
        Line::styled(banner.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Line::from(crumbs),
        Line::styled(
            "Esc overview · ←/Bksp back · ↑/↓ rows · →/Enter follow",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

fn draw_detail(frame: &mut Frame<'_>, app: &App, panel: &DetailPanel, area: Rect) {
    let evidence_open = app.explorer.session().evidence_open();
    let mut lines: Vec<Line<'_>> = Vec::new();
    match panel {
        DetailPanel::Node(card) => card_lines(&mut lines, card, evidence_open),
        DetailPanel::Trail { cards } => {
            for card in cards {
                card_lines(&mut lines, card, evidence_open);
                if let Some(dep) = &card.departure {
                    let via = dep.relation_label.as_deref().unwrap_or("jump");
                    let arrow = dep.direction.map_or("⇢", |d| d.arrow());
                    lines.push(Line::styled(
                        format!("  {arrow} {via} → {}", dep.destination_name),
                        Style::default().fg(Color::Cyan),
                    ));
                }
                lines.push(Line::default());
            }
        }
        DetailPanel::Edge(detail) => edge_lines(&mut lines, detail),
    }
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::LEFT).title("Detail")),
        area,
    );
}

fn card_lines(lines: &mut Vec<Line<'_>>, card: &NodeCard, evidence_open: bool) {
    lines.push(Line::styled(
        card.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    let mut meta = format!("{} · degree {}", card.entity_type, card.degree);
    if let Some(c) = &card.community {
        meta.push_str(&format!(" · community {c}"));
    }
    lines.push(Line::styled(meta, Style::default().fg(Color::DarkGray)));
    if !card.expanded {
        return;
    }
    if let Some(desc) = &card.description {
        lines.push(Line::from(desc.clone()));
    }
    if let Some(filter) = &card.connection_filter {
        lines.push(Line::styled(
            format!("filter: {filter} (f)"),
            Style::default().fg(Color::Yellow),
        ));
    }
    for (i, row) in card.rows.iter().enumerate() {
        let selected = card.selected == Some(i);
        lines.push(row_line(i, row, selected));
        if selected && evidence_open {
            for edge in &row.group.edges {
                let text = edge.evidence.as_deref().unwrap_or("(no evidence)");
                lines.push(Line::styled(
                    format!("    {}: \"{text}\"", edge.relation_type),
                    Style::default().fg(Color::Gray),
                ));
            }
        }
    }
}

fn row_line(i: usize, row: &ConnectionRow, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    Line::styled(
        format!(
            "{:>2} {} {} {}",
            i + 1,
            row.direction().arrow(),
            row.label,
            row.group.neighbor_name
        ),
        style,
    )
}

fn edge_lines(lines: &mut Vec<Line<'_>>, detail: &EdgeDetail) {
    lines.push(Line::styled(
        detail.relation_type.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::from(format!(
        "{} → {}",
        detail.source_name, detail.target_name
    )));
    if let Some(pct) = detail.confidence_pct {
        lines.push(Line::from(format!("confidence {pct}%")));
    }
    lines.push(Line::from(format!(
        "support {} in {} documents",
        detail.support_count, detail.support_doc_count
    )));
    if let Some(evidence) = &detail.evidence {
        lines.push(Line::default());
        lines.push(Line::from(format!("\"{evidence}\"")));
    }
    lines.push(Line::default());
    lines.push(Line::styled("x to close", Style::default().fg(Color::DarkGray)));
}

fn draw_status(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let text = app.search_input.as_ref().map_or_else(
        || {
            let search = app
                .explorer
                .session()
                .search()
                .map(|hits| format!("search \"{}\": {} matches · ", hits.query, hits.matches.len()))
                .unwrap_or_default();
            format!("{search}/ search · click a node to focus · q quit")
        },
        |query| format!("/{query}"),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
