//! Interactive widget trait extending ratatui's `StatefulWidget`.

use ratatui::widgets::StatefulWidget;

/// A `StatefulWidget` whose state is fed from the app and which may consume
/// input events.
pub trait InteractiveStatefulWidget: StatefulWidget {
    /// Input data type for updating state.
    type Input;
    /// Event type for handling (use `()` for non-interactive widgets).
    type Event;

    /// Update the widget's state with new input data.
    fn update_state(state: &mut Self::State, input: Self::Input);

    /// Handle an event. Returns true if the event was consumed.
    fn handle_event(_state: &mut Self::State, _event: Self::Event) -> bool {
        false
    }
}
