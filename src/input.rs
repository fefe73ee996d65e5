//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] mutations.  Keys that need the loader
//! come back as a [`Command`] for the main loop to carry out, since only the
//! main loop holds the [`ResourceLoader`](crate::loader::ResourceLoader).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;

/// A request for the loader, produced by a keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fetch again, ignoring the cache.
    Refresh,
    /// Abandon the running load.
    Cancel,
}

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('r') => return Some(Command::Refresh),
        KeyCode::Char('c') => return Some(Command::Cancel),
        _ => {}
    }
    None
}
