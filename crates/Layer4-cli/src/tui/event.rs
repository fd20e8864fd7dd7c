//! Event handling for TUI

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::time::Duration;

/// TUI Events
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// Key press
    Key(KeyEvent),

    /// Terminal resize
    Resize(u16, u16),

    /// Nothing happened within the tick
    Tick,

    /// Quit request (Ctrl+C)
    Quit,
}

/// Polls the terminal on the UI thread
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Wait up to one tick for the next event
    pub fn next(&self) -> io::Result<TuiEvent> {
        if !event::poll(self.tick_rate)? {
            return Ok(TuiEvent::Tick);
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    Ok(TuiEvent::Quit)
                } else {
                    Ok(TuiEvent::Key(key))
                }
            }
            Event::Resize(w, h) => Ok(TuiEvent::Resize(w, h)),
            _ => Ok(TuiEvent::Tick),
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
