//! Status bar with view settings, selection details and keybindings.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, StatefulWidget, Widget},
};

use super::InteractiveStatefulWidget;
use crate::{
    family::{BranchSummary, ViewMode},
    viewport::ZoomLevel,
};

/// Selected person as shown in the status bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionInfo {
    pub name: String,
    pub status: String,
    pub summary: Option<BranchSummary>,
}

/// Input for updating status bar state.
pub struct StatusBarInput {
    pub mode: ViewMode,
    pub branch_root: Option<String>,
    pub zoom: ZoomLevel,
    pub scale: f64,
    pub shown: usize,
    pub total: usize,
    pub selection: Option<SelectionInfo>,
}

/// State for the status bar widget.
#[derive(Default)]
pub struct StatusBar {
    mode: ViewMode,
    branch_root: Option<String>,
    zoom: Option<ZoomLevel>,
    scale: f64,
    shown: usize,
    total: usize,
    selection: Option<SelectionInfo>,
}

/// Widget for rendering the status bar.
pub struct StatusBarWidget;

impl StatefulWidget for StatusBarWidget {
    type State = StatusBar;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        const GLOBAL_KEYBINDINGS: &[(&str, &str)] = &[("?", "help"), ("v", "mode"), ("q", "quit")];

        let separator = Span::raw(" │ ");

        let mut spans = vec![
            Span::styled(state.mode.label(), Style::new().fg(Color::Yellow)),
            Span::raw(format!(" {}/{}", state.shown, state.total)),
        ];
        if let Some(root) = &state.branch_root {
            spans.push(separator.clone());
            spans.push(Span::styled(format!("branch: {root}"), Style::new().fg(Color::Green)));
        }
        if let Some(zoom) = state.zoom {
            spans.push(separator.clone());
            spans.push(Span::raw(format!("{:.0}% {}", state.scale * 100.0, zoom.label())));
        }
        if let Some(selection) = &state.selection {
            spans.push(separator.clone());
            spans.push(Span::styled(selection.name.clone(), Style::new().fg(Color::Cyan)));
            spans.push(Span::raw(format!(" {}", selection.status)));
            if let Some(summary) = selection.summary.filter(|s| !s.is_empty()) {
                spans.push(Span::styled(
                    format!(" [{}]", summary.badge()),
                    Style::new().fg(Color::Magenta),
                ));
            }
        }

        // Keybindings
        spans.extend(GLOBAL_KEYBINDINGS.iter().flat_map(|(key, desc)| {
            [
                separator.clone(),
                Span::styled(*key, Style::new().fg(Color::Cyan)),
                Span::raw(format!(": {desc}")),
            ]
        }));

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

impl InteractiveStatefulWidget for StatusBarWidget {
    type Input = StatusBarInput;
    type Event = ();

    fn update_state(state: &mut Self::State, input: Self::Input) {
        state.mode = input.mode;
        state.branch_root = input.branch_root;
        state.zoom = Some(input.zoom);
        state.scale = input.scale;
        state.shown = input.shown;
        state.total = input.total;
        state.selection = input.selection;
    }
}
