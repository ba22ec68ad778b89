//! Terminal setup and the render/event loop

use crate::ui::conversation::{ConversationAction, ConversationManager};
use anyhow::{Context, Result};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, Event, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::{info, warn};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run the chat UI until the user quits
pub async fn run(manager: &mut ConversationManager, tick_rate: Duration) -> Result<()> {
    let mut terminal = enter().context("Failed to initialise terminal")?;

    let result = event_loop(&mut terminal, manager, tick_rate).await;

    // Restore the terminal even when the loop failed
    if let Err(e) = leave(&mut terminal) {
        warn!(error = %e, "Failed to restore terminal");
    }

    result
}

fn enter() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

fn leave(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn event_loop(
    terminal: &mut Tui,
    manager: &mut ConversationManager,
    tick_rate: Duration,
) -> Result<()> {
    let mut reader = EventStream::new();
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal
            .draw(|frame| {
                let area = frame.size();
                manager.render(area, frame.buffer_mut());
            })
            .context("Failed to draw frame")?;

        tokio::select! {
            _ = ticker.tick() => {
                manager.tick();
            }
            maybe_event = reader.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        if manager.handle_key(key) == ConversationAction::Exit {
                            info!("exit requested");
                            return Ok(());
                        }
                    }
                    Some(Ok(Event::Paste(text))) => manager.handle_paste(&text),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                    None => return Ok(()),
                }
            }
        }
    }
}
