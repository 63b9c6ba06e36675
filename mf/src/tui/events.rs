//! TUI event handling
//!
//! Terminal input and modal notifications arrive on one channel so the
//! runner has a single place to wait.

use std::time::Duration;

use crossterm::event::{self, KeyEvent, KeyEventKind, MouseEvent};
use eyre::Result;
use tokio::sync::mpsc;
use tracing::debug;

use crate::form::SubmissionRecord;
use crate::modal::ModalResult;

/// Everything the runner reacts to
#[derive(Debug)]
pub enum Event {
    /// Key press
    Key(KeyEvent),
    /// Mouse event
    Mouse(MouseEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Tick (periodic refresh)
    Tick,
    /// The modal service reported an open/closed transition
    ModalState(bool),
    /// A session the page was awaiting has settled
    ModalSettled(ModalResult<SubmissionRecord>),
}

/// Sender half, handed to modal listeners and settlement tasks
pub type EventSender = mpsc::UnboundedSender<Event>;

/// Event handler for the TUI
pub struct EventHandler {
    tx: EventSender,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Create a handler and start polling the terminal at `tick_rate`
    pub fn new(tick_rate: Duration) -> Self {
        debug!(?tick_rate, "EventHandler::new: called");
        let handler = Self::detached();
        let tx = handler.tx.clone();

        // crossterm polling blocks, keep it off the runtime
        std::thread::spawn(move || {
            debug!("EventHandler: terminal polling thread started");
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(event::Event::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
                        Ok(event::Event::Mouse(mouse)) => Event::Mouse(mouse),
                        Ok(event::Event::Resize(w, h)) => Event::Resize(w, h),
                        Ok(_) => continue,
                        Err(e) => {
                            debug!(error = %e, "EventHandler: read failed, skipping");
                            continue;
                        }
                    }
                } else {
                    Event::Tick
                };

                if tx.send(event).is_err() {
                    debug!("EventHandler: channel closed, exiting loop");
                    break;
                }
            }
        });

        handler
    }

    /// Create a handler with no terminal polling; events come only from senders
    pub fn detached() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Clone a sender into this handler's channel
    pub fn sender(&self) -> EventSender {
        self.tx.clone()
    }

    /// Get the next event (async)
    pub async fn next(&mut self) -> Result<Event> {
        let event = self.rx.recv().await.ok_or_else(|| eyre::eyre!("Event channel closed"))?;
        debug!(?event, "EventHandler::next: received event");
        Ok(event)
    }
}
