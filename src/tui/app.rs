//! Application state for the TUI.

use std::{collections::HashSet, mem};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    widgets::{Block, Paragraph},
    Frame,
};
use tracing::debug;

use super::widgets::{
    canvas::{cell_center, pixel_size},
    card_at,
    help_menu::{HelpMenu, HelpMenuWidget},
    minimap::{minimap_area, MinimapState, MinimapWidget},
    navigation::{build_navigation_regions, find_nearest_in_direction, Direction},
    search::{SearchHit, SearchPrompt, SearchPromptWidget},
    status_bar::{SelectionInfo, StatusBar, StatusBarInput, StatusBarWidget},
    theme::Theme,
    tree_canvas::{TreeCanvas, TreeCanvasState},
    InteractiveStatefulWidget,
};
use crate::{
    config::Config,
    family::{
        build_tree_view, collapse_all, FamilyIndex, PersonId, TreeData, TreeView, ViewFilter,
        ViewMode,
    },
    geometry::{Point, Size},
    viewport::{TreeEvent, ViewportAction, ViewportState},
};

/// Screen pixels moved per arrow key press.
const PAN_STEP: f64 = 40.0;

/// How the viewer starts.
#[derive(Debug, Clone, Default)]
pub struct InitialView {
    pub mode: ViewMode,
    pub focus: Option<PersonId>,
    pub branch_root: Option<PersonId>,
    /// Overrides automatic collapsing when non-empty.
    pub collapse: Vec<PersonId>,
}

/// Application state.
pub struct App {
    data: TreeData,
    config: Config,
    pub viewport: ViewportState,
    view: TreeView,
    /// Inputs the current `view` was built from.
    view_key: Option<(ViewFilter, HashSet<PersonId>)>,
    help: HelpMenu,
    status: StatusBar,
    search: SearchPrompt,
    minimap: MinimapState,
    canvas: TreeCanvasState,
    canvas_area: Rect,
    /// Whether app should exit.
    pub should_exit: bool,
    events: Vec<TreeEvent>,
}

impl App {
    pub fn new(data: TreeData, config: Config, initial: InitialView, size: Size) -> Self {
        let collapsed: HashSet<PersonId> = if initial.collapse.is_empty() {
            let index = FamilyIndex::build(&data);
            config.auto_collapse.initial_collapsed(&data, &index)
        } else {
            initial.collapse.into_iter().collect()
        };

        let mut viewport = ViewportState::new(size, &config.viewport);
        viewport.collapsed = collapsed;
        viewport.selected = initial.focus;
        viewport.view_mode = initial.mode;
        viewport.branch_root = initial.branch_root;
        if viewport.view_mode != ViewMode::All && viewport.selected.is_none() {
            viewport.selected = data.people.first().map(|p| p.id.clone());
        }

        let mut app = Self {
            data,
            config,
            viewport,
            view: TreeView::default(),
            view_key: None,
            help: HelpMenu::default(),
            status: StatusBar::default(),
            search: SearchPrompt::default(),
            minimap: MinimapState::new(),
            canvas: TreeCanvasState::default(),
            canvas_area: Rect::default(),
            should_exit: false,
            events: Vec::new(),
        };
        app.update();
        app
    }

    pub const fn view(&self) -> &TreeView {
        &self.view
    }

    /// Take all events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<TreeEvent> {
        mem::take(&mut self.events)
    }

    /// Rebuild derived state before drawing.
    pub fn update(&mut self) {
        self.refresh_view();
        let input = self.status_input();
        StatusBarWidget::update_state(&mut self.status, input);
    }

    fn refresh_view(&mut self) {
        let mut filter = self.viewport.filter();
        if filter.mode == ViewMode::All {
            filter.focus = None;
        }
        let key = (filter, self.viewport.collapsed.clone());
        if self.view_key.as_ref() == Some(&key) {
            return;
        }

        self.view = build_tree_view(&self.data, &key.0, &key.1, &self.config.layout);
        debug!(
            nodes = self.view.layout.nodes.len(),
            connections = self.view.layout.connections.len(),
            mode = key.0.mode.label(),
            collapsed = key.1.len(),
            "Rebuilt tree view"
        );
        self.view_key = Some(key);
    }

    fn status_input(&self) -> StatusBarInput {
        let selection = self.viewport.selected.as_ref().and_then(|id| {
            let person = self.data.people.iter().find(|p| &p.id == id)?;
            Some(SelectionInfo {
                name: person.display_name.clone(),
                status: person.status_text(),
                summary: self.view.summaries.get(id).copied(),
            })
        });
        let branch_root = self.viewport.branch_root.as_ref().map(|id| {
            self.data
                .people
                .iter()
                .find(|p| &p.id == id)
                .map_or_else(|| id.clone(), |p| p.display_name.clone())
        });

        StatusBarInput {
            mode: self.viewport.view_mode,
            branch_root,
            zoom: self.viewport.zoom_level(),
            scale: self.viewport.scale,
            shown: self.view.layout.nodes.len(),
            total: self.data.people.len(),
            selection,
        }
    }

    fn dispatch(&mut self, action: ViewportAction) {
        let (viewport, events) = self.viewport.clone().apply(action, &self.config.viewport);
        self.viewport = viewport;
        self.events.extend(events);
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if SearchPromptWidget::handle_event(&mut self.search, key) {
            self.after_search_key();
            return;
        }
        if HelpMenuWidget::handle_event(&mut self.help, key) {
            return;
        }

        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_exit = true,
            KeyCode::Char('?') => self.help.toggle(),
            KeyCode::Left if shift => self.select_neighbour(Direction::Left),
            KeyCode::Right if shift => self.select_neighbour(Direction::Right),
            KeyCode::Up if shift => self.select_neighbour(Direction::Up),
            KeyCode::Down if shift => self.select_neighbour(Direction::Down),
            KeyCode::Char('H') => self.select_neighbour(Direction::Left),
            KeyCode::Char('L') => self.select_neighbour(Direction::Right),
            KeyCode::Char('K') => self.select_neighbour(Direction::Up),
            KeyCode::Char('J') => self.select_neighbour(Direction::Down),
            KeyCode::Left => self.dispatch(ViewportAction::PanBy(Point::new(PAN_STEP, 0.0))),
            KeyCode::Right => self.dispatch(ViewportAction::PanBy(Point::new(-PAN_STEP, 0.0))),
            KeyCode::Up => self.dispatch(ViewportAction::PanBy(Point::new(0.0, PAN_STEP))),
            KeyCode::Down => self.dispatch(ViewportAction::PanBy(Point::new(0.0, -PAN_STEP))),
            KeyCode::Char('+' | '=') => self.dispatch(ViewportAction::ZoomIn),
            KeyCode::Char('-') => self.dispatch(ViewportAction::ZoomOut),
            KeyCode::Char('0') => self.dispatch(ViewportAction::Reset),
            KeyCode::Char('c') => self.center_on_selection(),
            KeyCode::Enter => {
                if let Some(id) = self.viewport.selected.clone() {
                    self.dispatch(ViewportAction::ToggleCollapse(id));
                }
            }
            KeyCode::Char('e') => self.dispatch(ViewportAction::ExpandAll),
            KeyCode::Char('E') => {
                let index = FamilyIndex::build(&self.data);
                let collapsed = collapse_all(&self.data, &index);
                self.dispatch(ViewportAction::SetCollapsed(collapsed));
            }
            KeyCode::Char('v') => self.cycle_view_mode(),
            KeyCode::Char('/') => self.search.open(),
            KeyCode::Char('r') => self.dispatch(ViewportAction::SetBranchRoot(None)),
            KeyCode::Char('m') => self.minimap.toggle(),
            _ => {}
        }
    }

    fn after_search_key(&mut self) {
        if let Some(id) = self.search.take_chosen() {
            self.dispatch(ViewportAction::SetBranchRoot(Some(id)));
            return;
        }
        if self.search.is_active() {
            let hits: Vec<SearchHit> = self
                .data
                .search(self.search.query())
                .into_iter()
                .map(|p| {
                    let label = p.card_years().map_or_else(
                        || p.display_name.clone(),
                        |years| format!("{} ({years})", p.display_name),
                    );
                    (p.id.clone(), label)
                })
                .collect();
            SearchPromptWidget::update_state(&mut self.search, hits);
        }
    }

    fn cycle_view_mode(&mut self) {
        let mode = match self.viewport.view_mode {
            ViewMode::All => ViewMode::Ancestors,
            ViewMode::Ancestors => ViewMode::Descendants,
            ViewMode::Descendants => ViewMode::All,
        };
        let fallback_focus = self.data.people.first().map(|p| p.id.clone());
        self.dispatch(ViewportAction::SetViewMode {
            mode,
            fallback_focus,
        });
    }

    /// Content-space center of a drawn card.
    fn card_center(&self, id: &str) -> Option<Point> {
        let node = self.view.layout.find_node(id)?;
        Some(node.card(&self.config.layout).center() + Point::new(self.view.layout.x_offset, 0.0))
    }

    fn center_on_selection(&mut self) {
        let Some(center) = self
            .viewport
            .selected
            .as_deref()
            .and_then(|id| self.card_center(id))
        else {
            return;
        };
        self.dispatch(ViewportAction::CenterOn(center));
    }

    fn select_neighbour(&mut self, direction: Direction) {
        let target = match self.viewport.selected.as_deref() {
            Some(current) => {
                let regions = build_navigation_regions(&self.view.layout.nodes, &self.config.layout);
                find_nearest_in_direction(&regions, current, direction).cloned()
            }
            None => self.view.layout.nodes.first().map(|n| n.person.id.clone()),
        };
        let Some(person_id) = target else {
            return;
        };
        let Some(center) = self.card_center(&person_id) else {
            return;
        };

        let screen = self.viewport.to_screen(center);
        self.dispatch(ViewportAction::SelectNode { person_id, screen });
        if !self.viewport.view_box().contains(center) {
            self.dispatch(ViewportAction::CenterOn(center));
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column, mouse.row);
        let screen = cell_center(self.canvas_area, column, row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some((point, minimap)) = self.minimap.hit(column, row) {
                    self.dispatch(ViewportAction::MinimapClick { point, minimap });
                } else if let Some(person_id) =
                    card_at(&self.canvas.click_regions, column, row).cloned()
                {
                    self.dispatch(ViewportAction::SelectNode { person_id, screen });
                } else {
                    self.dispatch(ViewportAction::PointerDown(screen));
                }
            }
            MouseEventKind::Down(MouseButton::Right) => {
                if let Some(id) = card_at(&self.canvas.click_regions, column, row).cloned() {
                    self.dispatch(ViewportAction::ToggleCollapse(id));
                }
            }
            MouseEventKind::Drag(MouseButton::Left) if self.viewport.is_dragging() => {
                self.dispatch(ViewportAction::PointerMove(screen));
            }
            MouseEventKind::Up(MouseButton::Left) => self.dispatch(ViewportAction::PointerUp),
            MouseEventKind::ScrollUp => self.dispatch(ViewportAction::Wheel { delta: -1.0 }),
            MouseEventKind::ScrollDown => self.dispatch(ViewportAction::Wheel { delta: 1.0 }),
            _ => {}
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let [main_area, status_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());

        let block = Block::bordered()
            .title(format!(" genealogy-tui ─ {} people ", self.data.people.len()))
            .border_style(Style::new().fg(Theme::BORDER));
        let inner = block.inner(main_area);
        frame.render_widget(block, main_area);

        self.canvas_area = inner;
        let size = pixel_size(inner);
        if size != self.viewport.size {
            self.dispatch(ViewportAction::Resize(size));
        }

        if self.data.is_empty() {
            frame.render_widget(Paragraph::new("No people in this tree").style(Theme::DIM), inner);
        } else {
            frame.render_stateful_widget(
                TreeCanvas::new(&self.view, &self.viewport, &self.config.layout),
                inner,
                &mut self.canvas,
            );
            frame.render_stateful_widget(
                MinimapWidget::new(&self.view, &self.viewport, &self.config.layout),
                minimap_area(inner),
                &mut self.minimap,
            );
        }

        frame.render_stateful_widget(StatusBarWidget, status_area, &mut self.status);
        frame.render_stateful_widget(HelpMenuWidget, inner, &mut self.help);
        frame.render_stateful_widget(SearchPromptWidget, inner, &mut self.search);
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;

    const FAMILY: &str = r#"{
        "people": [
            {"id": "F", "display_name": "Father", "gender": "male", "generation": 1, "is_living": false},
            {"id": "M", "display_name": "Mother", "gender": "female", "generation": 1, "is_living": true},
            {"id": "A", "display_name": "An", "gender": "male", "generation": 2, "is_living": true},
            {"id": "B", "display_name": "Binh", "gender": "female", "generation": 2, "is_living": true}
        ],
        "families": [{"id": "FM", "father_id": "F", "mother_id": "M"}],
        "children": [
            {"family_id": "FM", "person_id": "A", "sort_order": 1},
            {"family_id": "FM", "person_id": "B", "sort_order": 2}
        ]
    }"#;

    fn app() -> App {
        let data = TreeData::from_json_str(FAMILY).unwrap();
        App::new(
            data,
            Config::default(),
            InitialView::default(),
            Size::new(1200.0, 600.0),
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_event(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
        app.update();
    }

    #[test]
    fn test_cycle_view_mode_selects_fallback_focus() {
        let mut app = app();
        assert_eq!(app.view().layout.nodes.len(), 4);

        press(&mut app, KeyCode::Char('v'));
        assert_eq!(app.viewport.view_mode, ViewMode::Ancestors);
        assert_eq!(app.viewport.selected.as_deref(), Some("F"));
        assert_eq!(app.view().layout.nodes.len(), 1, "F has no ancestors");
        assert_eq!(
            app.take_events(),
            vec![TreeEvent::ViewModeChanged(ViewMode::Ancestors)]
        );
        assert!(app.take_events().is_empty());
    }

    #[test]
    fn test_enter_collapses_selected_person() {
        let mut app = app();
        app.viewport.selected = Some("F".to_string());

        press(&mut app, KeyCode::Enter);
        assert!(app.viewport.collapsed.contains("F"));
        assert_eq!(app.view().layout.nodes.len(), 2, "children hidden");
        assert_eq!(app.view().summaries["F"].total_count, 2);

        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.view().layout.nodes.len(), 4);
    }

    #[test]
    fn test_search_sets_branch_root() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.viewport.branch_root.as_deref(), Some("F"));
        assert_eq!(
            app.take_events(),
            vec![TreeEvent::BranchRootChanged(Some("F".to_string()))]
        );

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.viewport.branch_root, None);
    }

    #[test]
    fn test_arrow_keys_pan_and_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Left);
        assert_eq!(app.viewport.pan, Point::new(PAN_STEP, 0.0));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_exit);
    }

    #[test]
    fn test_render_registers_cards_and_resizes_viewport() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        assert_eq!(app.viewport.size, Size::new(1180.0, 740.0));
        assert_eq!(app.canvas.click_regions.len(), 4);

        let region = app.canvas.click_regions[0].clone();
        app.handle_event(&Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: region.area.x,
            row: region.area.y,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(app.viewport.selected, Some(region.person_id));
    }

    #[test]
    fn test_status_bar_shows_selected_person() {
        let mut app = app();
        app.viewport.selected = Some("M".to_string());
        app.update();

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let status: String = (0..buffer.area.width)
            .map(|x| buffer[(x, buffer.area.height - 1)].symbol())
            .collect();
        assert!(status.contains("Mother"), "status line: {status}");
    }

    #[test]
    fn test_events_are_queued_as_soon_as_a_key_is_handled() {
        let mut app = app();
        app.viewport.selected = Some("F".to_string());

        app.handle_event(&Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert_eq!(
            app.take_events(),
            vec![TreeEvent::CollapseToggled("F".to_string())]
        );
        assert!(app.take_events().is_empty());
    }
}
