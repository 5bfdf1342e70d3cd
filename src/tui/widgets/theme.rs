//! Centralized theme and styling constants.

use ratatui::style::{Color, Modifier, Style};

use crate::family::{Gender, Person};

/// Theme constants for consistent styling across widgets.
pub struct Theme;

impl Theme {
    // Base text colors
    pub const DIM: Style = Style::new().fg(Color::DarkGray);
    pub const NORMAL: Style = Style::new().fg(Color::White);
    pub const KEY: Style = Style::new().fg(Color::Cyan);

    // UI chrome colors
    pub const BORDER: Color = Color::DarkGray;
    pub const BORDER_FOCUSED: Color = Color::Cyan;

    // Cards
    pub const MALE: Color = Color::Rgb(129, 140, 248);
    pub const FEMALE: Color = Color::Rgb(251, 113, 133);
    pub const MARRIED_IN: Color = Color::Rgb(168, 162, 158);
    pub const SELECTED_BORDER: Color = Color::Yellow;
    pub const DECEASED: Modifier = Modifier::DIM;
    pub const LIVING_MARKER: Style = Style::new().fg(Color::Green);
    pub const BADGE: Style = Style::new().fg(Color::Black).bg(Color::Yellow);

    // Connections
    pub const LINE: Style = Style::new().fg(Color::DarkGray);
    pub const COUPLE_LINE: Style = Style::new().fg(Color::Rgb(251, 113, 133));

    // Generation header column
    pub const HEADER: Style = Style::new()
        .fg(Color::Rgb(200, 180, 120))
        .add_modifier(Modifier::BOLD);

    // Minimap
    pub const MINIMAP_VIEW: Color = Color::Cyan;

    /// Accent color for a person, by gender and lineage.
    pub const fn person_color(person: &Person) -> Color {
        match (person.is_patrilineal, person.gender) {
            (false, _) => Self::MARRIED_IN,
            (true, Gender::Male) => Self::MALE,
            (true, Gender::Female) => Self::FEMALE,
        }
    }

    pub const fn card_style(person: &Person) -> Style {
        let style = Style::new().fg(Self::person_color(person));
        if person.is_living {
            style
        } else {
            style.add_modifier(Self::DECEASED)
        }
    }
}
