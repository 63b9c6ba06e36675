//! TUI Runner - main loop that owns the terminal and the modal wiring
//!
//! The TuiRunner is responsible for:
//! - Subscribing to the modal service so the dialog mirrors its open state
//! - Opening sessions on the page's behalf and awaiting them off the UI loop
//! - Closing sessions when the dialog submits or is dismissed
//! - Dispatching events to App and rendering after each one

use std::sync::Arc;

use eyre::{Result, eyre};
use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::{debug, info, trace};

use crate::config::TuiConfig;
use crate::form::FormModal;
use crate::modal::Subscription;

use super::app::{App, AppAction};
use super::events::{Event, EventHandler};
use super::views;

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner<B: Backend> {
    /// Application state
    app: App,
    /// Terminal handle
    terminal: Terminal<B>,
    /// Terminal input plus modal notifications
    events: EventHandler,
    /// Shared modal service; the page is one of its callers
    service: Arc<FormModal>,
    /// Listener feeding open/closed transitions into `events`
    subscription: Subscription,
}

impl<B: Backend> TuiRunner<B> {
    /// Wire a runner to the modal service
    pub fn new(terminal: Terminal<B>, events: EventHandler, service: Arc<FormModal>, config: &TuiConfig) -> Self {
        debug!(?config, "TuiRunner::new: called");
        let tx = events.sender();
        let subscription = service.subscribe(move |open| {
            if tx.send(Event::ModalState(open)).is_err() {
                trace!(open, "TuiRunner: event channel closed, dropping modal state");
            }
        });

        // Subscribing does not replay the current state
        let mut app = App::with_dialog_width(config.dialog_width_percent);
        app.set_modal_open(service.is_open());

        Self {
            app,
            terminal,
            events,
            service,
            subscription,
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Run until the user quits
    pub async fn run(&mut self) -> Result<()> {
        info!("TuiRunner::run: starting");
        let result = self.event_loop().await;
        self.shutdown();
        info!("TuiRunner::run: stopped");
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        loop {
            self.draw()?;
            let event = self.events.next().await?;
            self.handle_event(event);
            if self.app.state().should_quit {
                debug!("TuiRunner::event_loop: quit requested");
                return Ok(());
            }
        }
    }

    fn draw(&mut self) -> Result<()> {
        let app = &mut self.app;
        self.terminal
            .draw(|frame| views::render(app.state_mut(), frame))
            .map_err(|e| eyre!("Failed to draw frame: {}", e))?;
        Ok(())
    }

    /// Apply one event and carry out whatever it asks of the modal service
    pub fn handle_event(&mut self, event: Event) {
        trace!(?event, "TuiRunner::handle_event: called");
        let action = match event {
            Event::Key(key) => self.app.handle_key(key),
            Event::Mouse(mouse) => self.app.handle_mouse(mouse),
            Event::Resize(..) | Event::Tick => AppAction::None,
            Event::ModalState(open) => {
                // Queued notifications can trail the page's own open/close
                let current = self.service.is_open();
                if current != open {
                    trace!(open, current, "TuiRunner::handle_event: stale modal state");
                }
                self.app.set_modal_open(current);
                AppAction::None
            }
            Event::ModalSettled(outcome) => {
                self.app.on_settled(outcome);
                AppAction::None
            }
        };
        self.dispatch(action);
    }

    fn dispatch(&mut self, action: AppAction) {
        match action {
            AppAction::None => {}
            AppAction::OpenModal => {
                let request = self.service.open();
                self.app.set_modal_open(true);
                let session_id = request.session_id();
                let tx = self.events.sender();
                debug!(%session_id, "TuiRunner::dispatch: awaiting modal session");
                tokio::spawn(async move {
                    let outcome = request.await;
                    debug!(%session_id, ok = outcome.is_ok(), "TuiRunner: modal session settled");
                    if tx.send(Event::ModalSettled(outcome)).is_err() {
                        trace!(%session_id, "TuiRunner: event channel closed, outcome dropped");
                    }
                });
            }
            AppAction::CloseModal(result) => {
                debug!(submitted = result.is_some(), "TuiRunner::dispatch: closing modal");
                self.service.close(result);
                self.app.set_modal_open(false);
            }
            AppAction::Quit => {
                self.app.state_mut().should_quit = true;
            }
        }
    }

    /// Stop listening and release any caller still waiting on the dialog
    fn shutdown(&mut self) {
        debug!("TuiRunner::shutdown: called");
        self.subscription.unsubscribe();
        if self.service.is_open() {
            self.service.close(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    use crate::form::FormInput;
    use crate::modal::ModalError;
    use crate::tui::state::PageFocus;

    fn runner() -> (TuiRunner<TestBackend>, Arc<FormModal>) {
        let service = Arc::new(FormModal::new());
        let terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        let runner = TuiRunner::new(
            terminal,
            EventHandler::detached(),
            service.clone(),
            &TuiConfig::default(),
        );
        (runner, service)
    }

    fn press(runner: &mut TuiRunner<TestBackend>, code: KeyCode) {
        runner.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_str(runner: &mut TuiRunner<TestBackend>, text: &str) {
        for c in text.chars() {
            press(runner, KeyCode::Char(c));
        }
    }

    /// Process the next queued event, waiting for spawned settlement tasks.
    /// Returns the open state if the event was a modal transition.
    async fn pump(runner: &mut TuiRunner<TestBackend>) -> Option<bool> {
        let event = tokio::time::timeout(Duration::from_secs(1), runner.events.next())
            .await
            .expect("event within timeout")
            .unwrap();
        let transition = match &event {
            Event::ModalState(open) => Some(*open),
            _ => None,
        };
        runner.handle_event(event);
        transition
    }

    #[tokio::test]
    async fn test_submit_flow() {
        let (mut runner, service) = runner();
        press(&mut runner, KeyCode::Enter);
        assert!(service.is_open());
        assert_eq!(pump(&mut runner).await, Some(true));
        assert!(runner.app().state().modal_open);

        type_str(&mut runner, "Ada");
        press(&mut runner, KeyCode::Tab);
        type_str(&mut runner, "ada@example.com");
        press(&mut runner, KeyCode::Tab);
        type_str(&mut runner, "hello");
        runner.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        assert!(!service.is_open());

        assert_eq!(pump(&mut runner).await, Some(false));
        pump(&mut runner).await; // settlement
        let submitted = runner.app().state().submitted.clone().expect("record shown on page");
        assert_eq!(FormInput::from(submitted), FormInput::new("Ada", "ada@example.com", "hello"));
    }

    async fn assert_no_pending_event(runner: &mut TuiRunner<TestBackend>) {
        let next = tokio::time::timeout(Duration::from_millis(50), runner.events.next()).await;
        assert!(next.is_err(), "unexpected event: {:?}", next);
    }

    #[tokio::test]
    async fn test_double_enter_opens_once() {
        let (mut runner, service) = runner();
        press(&mut runner, KeyCode::Enter);
        press(&mut runner, KeyCode::Enter);
        assert!(runner.app().state().modal_open);

        assert_eq!(pump(&mut runner).await, Some(true));
        assert_no_pending_event(&mut runner).await;
        assert!(service.is_open());
        assert!(runner.app().state().status.is_none());
    }

    #[tokio::test]
    async fn test_quit_key_before_open_notification_goes_to_dialog() {
        let (mut runner, service) = runner();
        press(&mut runner, KeyCode::Enter);
        press(&mut runner, KeyCode::Char('q'));

        assert!(!runner.app().state().should_quit);
        assert_eq!(runner.app().state().dialog.input().name, "q");
        pump(&mut runner).await;
        assert!(service.is_open());
        assert_eq!(runner.app().state().dialog.input().name, "q", "late notification keeps input");
    }

    #[tokio::test]
    async fn test_stale_open_notification_after_close_stays_closed() {
        let (mut runner, service) = runner();
        press(&mut runner, KeyCode::Enter);
        press(&mut runner, KeyCode::Esc);
        assert!(!service.is_open());
        assert!(!runner.app().state().modal_open);

        assert_eq!(pump(&mut runner).await, Some(true));
        assert!(!runner.app().state().modal_open);
        assert_eq!(runner.app().state().focus, PageFocus::OpenButton);
    }

    #[tokio::test]
    async fn test_invalid_submit_keeps_session_open() {
        let (mut runner, service) = runner();
        press(&mut runner, KeyCode::Enter);
        pump(&mut runner).await;

        press(&mut runner, KeyCode::Enter);
        assert!(service.is_open());
        assert!(!runner.app().state().dialog.errors().is_empty());
    }

    #[tokio::test]
    async fn test_escape_dismisses_without_submission() {
        let (mut runner, service) = runner();
        press(&mut runner, KeyCode::Enter);
        pump(&mut runner).await;

        press(&mut runner, KeyCode::Esc);
        assert!(!service.is_open());
        pump(&mut runner).await;
        pump(&mut runner).await;
        assert!(runner.app().state().submitted.is_none());
        assert!(runner.app().state().status.is_none());
    }

    #[tokio::test]
    async fn test_outside_open_rejects_page_waiter() {
        let (mut runner, service) = runner();
        press(&mut runner, KeyCode::Enter);
        pump(&mut runner).await;

        // Another caller takes the slot
        let other = service.open();
        assert_eq!(pump(&mut runner).await, Some(true));
        assert_eq!(pump(&mut runner).await, None); // page's session rejected
        assert_eq!(
            runner.app().state().status.as_deref(),
            Some("Modal error: Another modal is already open")
        );
        assert!(runner.app().state().modal_open);

        press(&mut runner, KeyCode::Esc);
        assert_eq!(other.await, Ok(None));
    }

    #[tokio::test]
    async fn test_runner_mirrors_already_open_service() {
        let service = Arc::new(FormModal::new());
        let _pending = service.open();
        let terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        let runner = TuiRunner::new(terminal, EventHandler::detached(), service, &TuiConfig::default());
        assert!(runner.app().state().modal_open);
    }

    #[tokio::test]
    async fn test_run_quits_and_releases_waiter() {
        let (mut runner, service) = runner();
        let waiter = service.open();
        runner
            .events
            .sender()
            .send(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)))
            .unwrap();

        runner.run().await.unwrap();
        assert!(!service.is_open());
        assert_eq!(service.listener_count(), 0);
        assert_eq!(waiter.await, Ok(None));
    }

    #[tokio::test]
    async fn test_quit_during_collision_is_clean() {
        let (mut runner, service) = runner();
        let first = service.open();
        let _second = service.open();
        assert_eq!(first.await, Err(ModalError::AlreadyOpen));

        runner.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(runner.app().state().should_quit);
    }
}
