//! TUI state
//!
//! Plain data the app mutates and the views read. The `*_area` fields are
//! written by the views on every frame so mouse clicks can be hit-tested
//! against what was actually drawn.

use ratatui::layout::{Position, Rect};

use crate::form::SubmissionRecord;

use super::dialog::{DialogFocus, FormDialog};

/// Where keyboard focus sits outside the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFocus {
    /// The page's "Open Modal" button
    OpenButton,
    /// Inside the dialog; the dialog tracks which element
    Dialog,
}

/// Dialog geometry from the last frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialogLayout {
    pub dialog: Rect,
    pub close: Rect,
    pub cancel: Rect,
    pub submit: Rect,
}

impl DialogLayout {
    /// Which element a click landed on; `None` means the backdrop
    pub fn hit(&self, position: Position) -> Option<Option<DialogFocus>> {
        if !self.dialog.contains(position) {
            return None;
        }
        let target = if self.close.contains(position) {
            Some(DialogFocus::Close)
        } else if self.cancel.contains(position) {
            Some(DialogFocus::Cancel)
        } else if self.submit.contains(position) {
            Some(DialogFocus::Submit)
        } else {
            None
        };
        Some(target)
    }
}

/// Complete TUI state
#[derive(Debug)]
pub struct AppState {
    /// Mirrors the modal service's open state, fed by its subscription
    pub modal_open: bool,
    /// The contact form dialog
    pub dialog: FormDialog,
    /// Last successfully submitted record
    pub submitted: Option<SubmissionRecord>,
    /// Keyboard focus on the page
    pub focus: PageFocus,
    /// One-line status (errors from the modal service)
    pub status: Option<String>,
    /// Set when the user asked to quit
    pub should_quit: bool,
    /// Dialog width as a percentage of the terminal
    pub dialog_width_percent: u16,
    /// "Open Modal" button position from the last frame
    pub open_button_area: Option<Rect>,
    /// Dialog geometry from the last frame, `None` while closed
    pub dialog_layout: Option<DialogLayout>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            modal_open: false,
            dialog: FormDialog::new(),
            submitted: None,
            focus: PageFocus::OpenButton,
            status: None,
            should_quit: false,
            dialog_width_percent: 60,
            open_button_area: None,
            dialog_layout: None,
        }
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> DialogLayout {
        DialogLayout {
            dialog: Rect::new(10, 5, 40, 20),
            close: Rect::new(44, 5, 5, 1),
            cancel: Rect::new(30, 22, 8, 1),
            submit: Rect::new(40, 22, 8, 1),
        }
    }

    #[test]
    fn test_hit_outside_is_backdrop() {
        assert_eq!(layout().hit(Position::new(0, 0)), None);
        assert_eq!(layout().hit(Position::new(50, 10)), None);
    }

    #[test]
    fn test_hit_buttons() {
        let layout = layout();
        assert_eq!(layout.hit(Position::new(45, 5)), Some(Some(DialogFocus::Close)));
        assert_eq!(layout.hit(Position::new(31, 22)), Some(Some(DialogFocus::Cancel)));
        assert_eq!(layout.hit(Position::new(41, 22)), Some(Some(DialogFocus::Submit)));
        assert_eq!(layout.hit(Position::new(15, 10)), Some(None));
    }

    #[test]
    fn test_new_state() {
        let state = AppState::new();
        assert!(!state.modal_open);
        assert_eq!(state.focus, PageFocus::OpenButton);
        assert!(state.submitted.is_none());
    }
}
