//! Name search prompt used to pick a branch root.

use std::mem;

use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, StatefulWidget, Widget},
};

use super::{theme::Theme, InteractiveStatefulWidget, KeyEvent};
use crate::family::{PersonId, MIN_SEARCH_LEN};

/// One search hit: person id and the label shown for it.
pub type SearchHit = (PersonId, String);

#[derive(Debug, Default)]
pub struct SearchPrompt {
    active: bool,
    query: String,
    hits: Vec<SearchHit>,
    cursor: usize,
    chosen: Option<PersonId>,
}

impl SearchPrompt {
    pub fn open(&mut self) {
        self.active = true;
        self.query.clear();
        self.hits.clear();
        self.cursor = 0;
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The person picked with Enter, if any since the last call.
    pub fn take_chosen(&mut self) -> Option<PersonId> {
        mem::take(&mut self.chosen)
    }
}

pub struct SearchPromptWidget;

impl StatefulWidget for SearchPromptWidget {
    type State = SearchPrompt;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if !state.active {
            return;
        }

        let width = 44u16.min(area.width);
        #[allow(clippy::cast_possible_truncation)]
        let height = (state.hits.len().max(1) as u16 + 3).min(area.height);
        let popup = Rect::new(area.x + (area.width - width) / 2, area.y + 1, width, height);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" Branch root ")
            .border_style(Style::new().fg(Theme::BORDER_FOCUSED));

        let mut lines = vec![Line::from(vec![
            Span::styled("/ ", Theme::KEY),
            Span::raw(state.query.clone()),
            Span::styled("▏", Theme::DIM),
        ])];
        if state.hits.is_empty() {
            let hint = if state.query.chars().count() < MIN_SEARCH_LEN {
                format!("type at least {MIN_SEARCH_LEN} characters")
            } else {
                "no match".to_string()
            };
            lines.push(Line::from(Span::styled(hint, Theme::DIM)));
        }
        lines.extend(state.hits.iter().enumerate().map(|(i, (_, label))| {
            let style = if i == state.cursor {
                Style::new().add_modifier(Modifier::REVERSED)
            } else {
                Theme::NORMAL
            };
            Line::from(Span::styled(label.clone(), style))
        }));

        Paragraph::new(lines).block(block).render(popup, buf);
    }
}

impl InteractiveStatefulWidget for SearchPromptWidget {
    type Input = Vec<SearchHit>;
    type Event = KeyEvent;

    fn update_state(state: &mut Self::State, input: Self::Input) {
        state.hits = input;
        state.cursor = state.cursor.min(state.hits.len().saturating_sub(1));
    }

    fn handle_event(state: &mut Self::State, event: Self::Event) -> bool {
        if !state.active {
            return false;
        }

        match event.code {
            KeyCode::Esc => state.active = false,
            KeyCode::Enter => {
                state.chosen = state.hits.get(state.cursor).map(|(id, _)| id.clone());
                state.active = false;
            }
            KeyCode::Up => state.cursor = state.cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Tab => {
                if state.cursor + 1 < state.hits.len() {
                    state.cursor += 1;
                }
            }
            KeyCode::Backspace => {
                state.query.pop();
                state.cursor = 0;
            }
            KeyCode::Char(c) => {
                state.query.push(c);
                state.cursor = 0;
            }
            _ => {}
        }
        true
    }
}
