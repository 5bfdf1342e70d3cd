//! The family tree itself: connection lines, cards and generation labels
//! projected through the viewport.

use std::collections::HashMap;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, StatefulWidget, Widget},
};

use super::{canvas::CellProjection, theme::Theme, ClickRegion};
use crate::{
    family::{BranchSummary, ConnectionSegment, LayoutConfig, LayoutNode, SegmentKind, TreeView},
    geometry::Point,
    viewport::{ViewportState, ZoomLevel},
};

const UP: u8 = 1;
const DOWN: u8 = 2;
const LEFT: u8 = 4;
const RIGHT: u8 = 8;

/// Box-drawing glyph per stroke mask (`UP | DOWN | LEFT | RIGHT`).
const GLYPHS: [&str; 16] = [
    "│", "│", "│", "│", "─", "┘", "┐", "┤", "─", "└", "┌", "├", "─", "┴", "┬", "┼",
];

/// State for the tree canvas widget.
#[derive(Debug, Default)]
pub struct TreeCanvasState {
    /// Card areas generated during rendering, in drawing order.
    pub click_regions: Vec<ClickRegion>,
}

/// Renders a [`TreeView`] through the current viewport.
pub struct TreeCanvas<'a> {
    view: &'a TreeView,
    viewport: &'a ViewportState,
    config: &'a LayoutConfig,
}

impl<'a> TreeCanvas<'a> {
    pub const fn new(
        view: &'a TreeView,
        viewport: &'a ViewportState,
        config: &'a LayoutConfig,
    ) -> Self {
        Self {
            view,
            viewport,
            config,
        }
    }

    fn draw_connections(&self, projection: &CellProjection, buf: &mut Buffer) {
        let mut strokes: HashMap<(i32, i32), u8> = HashMap::new();
        for segment in &self.view.layout.connections {
            if segment.kind.is_parent_child() {
                rasterize(projection, segment, &mut strokes);
            }
        }
        for (&(column, row), &mask) in &strokes {
            if let Some(pos) = projection.to_buffer(column, row) {
                buf[pos]
                    .set_symbol(GLYPHS[usize::from(mask & 0x0f)])
                    .set_style(Theme::LINE);
            }
        }

        for segment in self
            .view
            .layout
            .connections
            .iter()
            .filter(|s| s.kind == SegmentKind::Couple)
        {
            let (from, row) = projection.cell(segment.from);
            let (to, _) = projection.cell(segment.to);
            for column in from..to {
                if let Some(pos) = projection.to_buffer(column, row) {
                    buf[pos].set_symbol("┄").set_style(Theme::COUPLE_LINE);
                }
            }
            let (heart, _) = projection.cell(segment.midpoint());
            if from < to {
                if let Some(pos) = projection.to_buffer(heart, row) {
                    buf[pos].set_symbol("♥").set_style(Theme::COUPLE_LINE);
                }
            }
        }
    }

    fn draw_card(
        &self,
        node: &LayoutNode,
        projection: &CellProjection,
        buf: &mut Buffer,
        state: &mut TreeCanvasState,
    ) {
        let (column, row) = projection.cell(Point::new(node.x, node.y));
        let (width, height) = projection.cells(self.config.card_width, self.config.card_height);
        let Some(visible) = projection.clip(column, row, width, height) else {
            return;
        };

        let selected = self.viewport.selected.as_deref() == Some(node.id());
        let summary = self.view.summaries.get(node.id());
        let mut card = Buffer::empty(Rect::new(0, 0, width, height));
        match self.viewport.zoom_level() {
            ZoomLevel::Full if height >= 3 && width >= 8 => {
                render_full_card(node, summary, selected, card.area, &mut card);
            }
            ZoomLevel::Full | ZoomLevel::Compact => {
                render_compact_card(node, selected, card.area, &mut card);
            }
            ZoomLevel::Mini => render_mini_card(node, selected, card.area, &mut card),
        }

        // Copy the visible part of the card into place.
        let skip_x = visible.x - projection.area.x;
        let skip_y = visible.y - projection.area.y;
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let (offset_x, offset_y) = (
            (i32::from(skip_x) - column) as u16,
            (i32::from(skip_y) - row) as u16,
        );
        for dy in 0..visible.height {
            for dx in 0..visible.width {
                buf[(visible.x + dx, visible.y + dy)] = card[(offset_x + dx, offset_y + dy)].clone();
            }
        }

        state.click_regions.push(ClickRegion {
            area: visible,
            person_id: node.person.id.clone(),
        });
    }

    fn draw_headers(&self, projection: &CellProjection, buf: &mut Buffer) {
        let area = projection.area;
        for header in &self.view.headers {
            let middle = Point::new(0.0, header.y + self.config.card_height / 2.0);
            let (_, row) = projection.cell(middle);
            let Some((x, y)) = projection.to_buffer(0, row) else {
                continue;
            };
            let label = format!("G{}", header.generation);
            buf.set_stringn(x, y, label, usize::from(area.width), Theme::HEADER);
        }
    }
}

impl StatefulWidget for TreeCanvas<'_> {
    type State = TreeCanvasState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.click_regions.clear();
        let projection = CellProjection::new(area, self.viewport, self.view.layout.x_offset);

        self.draw_connections(&projection, buf);
        for node in &self.view.layout.nodes {
            self.draw_card(node, &projection, buf, state);
        }
        self.draw_headers(&projection, buf);
    }
}

/// Mark the cells a segment crosses. Offset parent/child lines become an
/// elbow through the segment's vertical middle.
fn rasterize(
    projection: &CellProjection,
    segment: &ConnectionSegment,
    strokes: &mut HashMap<(i32, i32), u8>,
) {
    let (c0, r0) = projection.cell(segment.from);
    let (c1, r1) = projection.cell(segment.to);
    if r0 == r1 {
        horizontal(r0, c0, c1, strokes);
    } else if c0 == c1 {
        vertical(c0, r0, r1, strokes);
    } else {
        let (_, mid) = projection.cell(segment.midpoint());
        vertical(c0, r0, mid, strokes);
        horizontal(mid, c0, c1, strokes);
        vertical(c1, mid, r1, strokes);
    }
}

fn horizontal(row: i32, a: i32, b: i32, strokes: &mut HashMap<(i32, i32), u8>) {
    let (start, end) = (a.min(b), a.max(b));
    for column in start..=end {
        let mut mask = 0;
        if column > start {
            mask |= LEFT;
        }
        if column < end {
            mask |= RIGHT;
        }
        *strokes.entry((column, row)).or_default() |= mask;
    }
}

fn vertical(column: i32, a: i32, b: i32, strokes: &mut HashMap<(i32, i32), u8>) {
    let (start, end) = (a.min(b), a.max(b));
    for row in start..=end {
        let mut mask = 0;
        if row > start {
            mask |= UP;
        }
        if row < end {
            mask |= DOWN;
        }
        *strokes.entry((column, row)).or_default() |= mask;
    }
}

fn border_style(node: &LayoutNode, selected: bool) -> Style {
    if selected {
        Style::new()
            .fg(Theme::SELECTED_BORDER)
            .add_modifier(Modifier::BOLD)
    } else {
        Theme::card_style(&node.person)
    }
}

fn render_full_card(
    node: &LayoutNode,
    summary: Option<&BranchSummary>,
    selected: bool,
    area: Rect,
    buf: &mut Buffer,
) {
    let person = &node.person;
    let mut block = Block::bordered()
        .border_type(if person.is_living {
            BorderType::Rounded
        } else {
            BorderType::Plain
        })
        .border_style(border_style(node, selected));
    if node.collapsed {
        let badge = summary.map_or_else(|| "+".to_string(), BranchSummary::badge);
        block = block
            .title_bottom(Line::from(Span::styled(format!(" {badge} "), Theme::BADGE)).centered());
    } else if node.has_children {
        block = block.title_bottom(Line::from(Span::styled(" − ", Theme::DIM)).centered());
    }

    let inner_width = usize::from(area.width.saturating_sub(2));
    let name = Line::from(Span::styled(
        truncate(&person.display_name, inner_width),
        Theme::card_style(person).add_modifier(Modifier::BOLD),
    ));
    let mut details = vec![Span::styled(format!("G{}", person.level()), Theme::DIM)];
    if let Some(years) = person.card_years() {
        details.push(Span::raw(" "));
        details.push(Span::styled(years, Theme::NORMAL));
    }
    if person.is_living {
        details.push(Span::styled(" ●", Theme::LIVING_MARKER));
    }

    Paragraph::new(vec![name, Line::from(details)])
        .alignment(Alignment::Center)
        .block(block)
        .render(area, buf);
}

fn render_compact_card(node: &LayoutNode, selected: bool, area: Rect, buf: &mut Buffer) {
    let width = usize::from(area.width);
    let marker = if node.collapsed { "+" } else { "" };
    let name = truncate(&node.person.display_name, width.saturating_sub(3));
    let text = format!("[{name}{marker}]");
    let mut style = border_style(node, selected);
    if width < 4 {
        style = style.add_modifier(Modifier::REVERSED);
    }
    let line = Line::from(Span::styled(
        if width < 4 { node.person.initials() } else { text },
        style,
    ));
    let middle = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
    Paragraph::new(line).alignment(Alignment::Center).render(middle, buf);
}

fn render_mini_card(node: &LayoutNode, selected: bool, area: Rect, buf: &mut Buffer) {
    let symbol = if node.collapsed { "◆" } else { "●" };
    let center = (area.x + area.width / 2, area.y + area.height / 2);
    buf[center]
        .set_symbol(symbol)
        .set_style(border_style(node, selected));
}

/// Shorten `text` to at most `max` characters, ending with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut short: String = text.chars().take(max - 1).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use ratatui::buffer::Cell;

    use super::*;
    use crate::{
        family::{build_tree_view, ChildLink, FamilyUnit, Gender, Person, TreeData, ViewFilter},
        tui::widgets::canvas::pixel_size,
        viewport::ViewportConfig,
    };

    fn person(id: &str, name: &str, gender: Gender, generation: u32) -> Person {
        Person {
            id: id.to_string(),
            display_name: name.to_string(),
            gender,
            generation,
            birth_year: Some(1950),
            death_year: None,
            is_living: true,
            is_patrilineal: true,
        }
    }

    fn sample() -> TreeData {
        TreeData {
            people: vec![
                person("F", "Father", Gender::Male, 1),
                person("M", "Mother", Gender::Female, 1),
                person("A", "Anh", Gender::Male, 2),
                person("B", "Binh", Gender::Female, 2),
            ],
            families: vec![FamilyUnit {
                id: "fm".into(),
                father_id: Some("F".into()),
                mother_id: Some("M".into()),
            }],
            children: vec![
                ChildLink {
                    family_id: "fm".into(),
                    person_id: "A".into(),
                    sort_order: 0,
                },
                ChildLink {
                    family_id: "fm".into(),
                    person_id: "B".into(),
                    sort_order: 1,
                },
            ],
        }
    }

    fn render(scale: f64) -> (Buffer, TreeCanvasState) {
        let area = Rect::new(0, 0, 100, 30);
        let data = sample();
        let config = LayoutConfig::default();
        let view = build_tree_view(&data, &ViewFilter::default(), &HashSet::new(), &config);
        let mut viewport = ViewportState::new(pixel_size(area), &ViewportConfig::default());
        viewport.scale = scale;
        let mut buf = Buffer::empty(area);
        let mut state = TreeCanvasState::default();
        TreeCanvas::new(&view, &viewport, &config).render(area, &mut buf, &mut state);
        (buf, state)
    }

    fn text(buf: &Buffer) -> String {
        buf.content().iter().map(Cell::symbol).collect()
    }

    #[test]
    fn test_full_cards_show_names_and_couple_heart() {
        let (buf, state) = render(0.9);
        let text = text(&buf);
        assert!(text.contains("Father"), "father card should be drawn");
        assert!(text.contains("Binh"));
        assert!(text.contains('♥'), "couple line should carry a heart");
        assert!(text.contains('┴'), "stub should join the sibling bus");
        assert!(text.contains('┌'));
        assert_eq!(state.click_regions.len(), 4);
    }

    #[test]
    fn test_mini_zoom_draws_dots() {
        let (buf, state) = render(0.2);
        let text = text(&buf);
        assert!(text.contains('●'));
        assert!(!text.contains("Father"));
        assert_eq!(state.click_regions.len(), 4);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Nguyen", 10), "Nguyen");
        assert_eq!(truncate("Nguyen Van An", 6), "Nguye…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_glyph_table_joins_strokes() {
        assert_eq!(GLYPHS[usize::from(UP | LEFT | RIGHT)], "┴");
        assert_eq!(GLYPHS[usize::from(DOWN | RIGHT)], "┌");
        assert_eq!(GLYPHS[usize::from(UP | DOWN)], "│");
    }
}
