//! Terminal User Interface for the contact form
//!
//! A page with an "Open Modal" button and the last submitted record, plus
//! the contact dialog drawn over it while a modal session is open. The
//! dialog's visibility follows the modal service's notifications.

mod app;
mod dialog;
mod events;
mod runner;
pub mod state;
mod views;

pub use app::{App, AppAction};
pub use dialog::{DialogAction, DialogFocus, FormDialog};
pub use events::{Event, EventHandler, EventSender};
pub use runner::TuiRunner;
pub use state::{AppState, PageFocus};

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::config::TuiConfig;
use crate::form::FormModal;

/// Terminal type alias
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// Run the TUI against a shared modal service until the user quits
pub async fn run(service: Arc<FormModal>, config: &TuiConfig) -> Result<()> {
    let terminal = init()?;

    // Use a guard to ensure terminal is restored even on early return/error
    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore();
        }
    }
    let _guard = TerminalGuard;

    let events = EventHandler::new(Duration::from_millis(config.tick_rate_ms));
    let mut runner = TuiRunner::new(terminal, events, service, config);
    runner.run().await
}
