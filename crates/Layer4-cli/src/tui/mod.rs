//! TUI (Terminal User Interface) module
//!
//! Interactive role/marker browser on top of the permission tree store.

mod app;
mod event;
mod theme;
mod view;

use crate::workspace::Workspace;
use app::{Action, BrowseApp};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use event::{EventHandler, TuiEvent};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use theme::Theme;

/// Run the browser until the user quits
pub fn run(ws: &Workspace) -> anyhow::Result<()> {
    let mut app = BrowseApp::new(ws.load_config());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, ws);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app.has_unsaved() {
        eprintln!("Unsaved grant changes were discarded.");
    }
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut BrowseApp,
    ws: &Workspace,
) -> anyhow::Result<()> {
    let theme = Theme::default();
    let events = EventHandler::default();

    loop {
        if app.take_redraw() {
            terminal.draw(|frame| view::render(frame, app, &theme))?;
        }

        match events.next()? {
            TuiEvent::Quit => break,
            TuiEvent::Key(key) => match app.handle_key(key) {
                Action::Quit => break,
                Action::Apply => app.apply(ws),
                Action::None => {}
            },
            TuiEvent::Resize(_, _) => app.request_redraw(),
            TuiEvent::Tick => {}
        }
    }
    Ok(())
}
