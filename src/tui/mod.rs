//! Terminal viewer for a family tree.

pub mod app;
pub mod widgets;

use std::{io::stdout, time::Duration};

pub use app::{App, InitialView};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures::StreamExt;
use ratatui::prelude::*;
use tokio::time::sleep;
use tracing::info;
use widgets::canvas::pixel_size;

use crate::{config::Config, error::Result, family::TreeData};

pub async fn run(data: TreeData, config: Config, initial: InitialView) -> Result<()> {
    enable_raw_mode()?;
    stdout()
        .execute(EnterAlternateScreen)?
        .execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let size = terminal.size()?;
    let mut app = App::new(
        data,
        config,
        initial,
        pixel_size(Rect::new(0, 0, size.width, size.height)),
    );
    let mut event_stream = EventStream::new();

    while !app.should_exit {
        app.update();
        terminal.draw(|frame| app.render(frame))?;

        tokio::select! {
            Some(Ok(event)) = event_stream.next() => {
                app.handle_event(&event);
            }
            () = sleep(Duration::from_millis(50)) => {}
        }
        for event in app.take_events() {
            info!(?event, "Tree event");
        }
    }

    disable_raw_mode()?;
    stdout()
        .execute(DisableMouseCapture)?
        .execute(LeaveAlternateScreen)?;

    Ok(())
}
