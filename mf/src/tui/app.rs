//! TUI application - event handling and state management
//!
//! The App owns the AppState and turns input and modal notifications into
//! state changes. It does not render and it does not call the modal
//! service; anything that must reach the service comes back as an
//! [`AppAction`] for the runner to carry out.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;
use tracing::{debug, error, info, trace};

use crate::form::SubmissionRecord;
use crate::modal::ModalResult;

use super::dialog::{DialogAction, DialogFocus};
use super::state::{AppState, PageFocus};

/// Work the runner must do against the modal service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    None,
    /// Start a session and await it
    OpenModal,
    /// End the session (`None` = dismissed)
    CloseModal(Option<SubmissionRecord>),
    Quit,
}

impl From<DialogAction> for AppAction {
    fn from(action: DialogAction) -> Self {
        match action {
            DialogAction::None => Self::None,
            DialogAction::Submit(record) => Self::CloseModal(Some(record)),
            DialogAction::Cancel => Self::CloseModal(None),
        }
    }
}

/// TUI application
#[derive(Debug, Default)]
pub struct App {
    state: AppState,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Self {
        debug!("App::new: called");
        Self::default()
    }

    /// Create an application whose dialog uses the given width
    pub fn with_dialog_width(percent: u16) -> Self {
        let mut app = Self::new();
        app.state.dialog_width_percent = percent;
        app
    }

    pub fn state(&self) -> &AppState {
        trace!("App::state: called");
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        trace!("App::state_mut: called");
        &mut self.state
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        debug!(?key, modal_open = self.state.modal_open, "App::handle_key: called");
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            debug!("App::handle_key: Ctrl+C force quit");
            return AppAction::Quit;
        }

        if self.state.modal_open {
            return self.state.dialog.handle_key(key).into();
        }

        self.state.clear_status();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => AppAction::Quit,
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('o') if self.state.focus == PageFocus::OpenButton => {
                AppAction::OpenModal
            }
            _ => AppAction::None,
        }
    }

    /// Handle a mouse event
    ///
    /// A left click outside the open dialog dismisses it, like clicking a backdrop.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> AppAction {
        trace!(?mouse, "App::handle_mouse: called");
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return AppAction::None;
        }
        let position = Position::new(mouse.column, mouse.row);

        if self.state.modal_open {
            let Some(layout) = self.state.dialog_layout else {
                return AppAction::None;
            };
            return match layout.hit(position) {
                None => {
                    debug!("App::handle_mouse: backdrop click");
                    AppAction::CloseModal(None)
                }
                Some(Some(DialogFocus::Close)) | Some(Some(DialogFocus::Cancel)) => AppAction::CloseModal(None),
                Some(Some(DialogFocus::Submit)) => {
                    self.state.dialog.set_focus(DialogFocus::Submit);
                    self.state.dialog.submit().into()
                }
                Some(_) => AppAction::None,
            };
        }

        match self.state.open_button_area {
            Some(area) if area.contains(position) => AppAction::OpenModal,
            _ => AppAction::None,
        }
    }

    /// Apply an open/closed notification from the modal service
    ///
    /// Opening resets the form and moves focus into the dialog; closing
    /// returns focus to the button that opened it.
    pub fn set_modal_open(&mut self, open: bool) {
        debug!(open, "App::set_modal_open: called");
        if open && !self.state.modal_open {
            self.state.dialog.reset();
        }
        if open {
            self.state.focus = PageFocus::Dialog;
        } else {
            self.state.focus = PageFocus::OpenButton;
            self.state.dialog_layout = None;
        }
        self.state.modal_open = open;
    }

    /// Apply the outcome of a session the page was awaiting
    pub fn on_settled(&mut self, outcome: ModalResult<SubmissionRecord>) {
        match outcome {
            Ok(Some(record)) => {
                info!(name = record.name(), "Submission received");
                self.state.submitted = Some(record);
                self.state.clear_status();
            }
            Ok(None) => {
                debug!("App::on_settled: dismissed");
            }
            Err(e) => {
                error!(error = %e, "Modal error");
                self.state.status = Some(format!("Modal error: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{self, FormInput};
    use crate::modal::ModalError;
    use crate::tui::state::DialogLayout;
    use crossterm::event::KeyEventState;
    use ratatui::layout::Rect;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn record() -> SubmissionRecord {
        form::validate(&FormInput::new("A", "a@b.com", "hi")).unwrap()
    }

    fn open_app() -> App {
        let mut app = App::new();
        app.set_modal_open(true);
        app.state_mut().dialog_layout = Some(DialogLayout {
            dialog: Rect::new(10, 5, 40, 20),
            close: Rect::new(44, 5, 5, 1),
            cancel: Rect::new(30, 22, 8, 1),
            submit: Rect::new(40, 22, 8, 1),
        });
        app
    }

    #[test]
    fn test_enter_on_page_opens_modal() {
        let mut app = App::new();
        assert_eq!(app.handle_key(key(KeyCode::Enter)), AppAction::OpenModal);
        assert_eq!(app.handle_key(key(KeyCode::Char('o'))), AppAction::OpenModal);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new();
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), AppAction::Quit);

        let mut app = open_app();
        let ctrl_c = KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        assert_eq!(app.handle_key(ctrl_c), AppAction::Quit);
    }

    #[test]
    fn test_keys_route_to_dialog_when_open() {
        let mut app = open_app();
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), AppAction::None);
        assert_eq!(app.state().dialog.input().name, "q");
        assert_eq!(app.handle_key(key(KeyCode::Esc)), AppAction::CloseModal(None));
    }

    #[test]
    fn test_open_moves_focus_and_close_restores_it() {
        let mut app = App::new();
        app.set_modal_open(true);
        assert_eq!(app.state().focus, PageFocus::Dialog);
        assert!(app.state().modal_open);

        app.set_modal_open(false);
        assert_eq!(app.state().focus, PageFocus::OpenButton);
        assert!(!app.state().modal_open);
        assert!(app.state().dialog_layout.is_none());
    }

    #[test]
    fn test_reopen_resets_form() {
        let mut app = open_app();
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Enter));
        assert!(!app.state().dialog.errors().is_empty());

        app.set_modal_open(false);
        app.set_modal_open(true);
        assert_eq!(app.state().dialog.input(), &FormInput::default());
        assert!(app.state().dialog.errors().is_empty());
    }

    #[test]
    fn test_repeated_open_notification_keeps_input() {
        let mut app = open_app();
        app.handle_key(key(KeyCode::Char('x')));
        app.set_modal_open(true);
        assert_eq!(app.state().dialog.input().name, "x");
    }

    #[test]
    fn test_backdrop_click_dismisses() {
        let mut app = open_app();
        assert_eq!(app.handle_mouse(click(1, 1)), AppAction::CloseModal(None));
    }

    #[test]
    fn test_click_inside_dialog_is_ignored() {
        let mut app = open_app();
        assert_eq!(app.handle_mouse(click(15, 10)), AppAction::None);
    }

    #[test]
    fn test_click_buttons() {
        let mut app = open_app();
        assert_eq!(app.handle_mouse(click(45, 5)), AppAction::CloseModal(None));
        assert_eq!(app.handle_mouse(click(31, 22)), AppAction::CloseModal(None));
        // Empty form: submit shows errors instead of closing
        assert_eq!(app.handle_mouse(click(41, 22)), AppAction::None);
        assert!(app.state().dialog.errors().contains(crate::form::Field::Name));
    }

    #[test]
    fn test_click_open_button() {
        let mut app = App::new();
        app.state_mut().open_button_area = Some(Rect::new(2, 4, 16, 1));
        assert_eq!(app.handle_mouse(click(5, 4)), AppAction::OpenModal);
        assert_eq!(app.handle_mouse(click(30, 4)), AppAction::None);
    }

    #[test]
    fn test_valid_submit_closes_with_record() {
        let mut app = open_app();
        for c in "A".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Tab));
        for c in "a@b.com".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Tab));
        for c in "hi".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        let submit = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(submit), AppAction::CloseModal(Some(record())));
    }

    #[test]
    fn test_settled_outcomes() {
        let mut app = App::new();
        app.on_settled(Ok(Some(record())));
        assert_eq!(app.state().submitted, Some(record()));

        app.on_settled(Ok(None));
        assert_eq!(app.state().submitted, Some(record()), "dismissal keeps the last submission");

        app.on_settled(Err(ModalError::AlreadyOpen));
        assert_eq!(
            app.state().status.as_deref(),
            Some("Modal error: Another modal is already open")
        );
    }
}
