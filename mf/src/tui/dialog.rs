//! Contact form dialog state and key handling
//!
//! The dialog owns the field buffers, the inline errors and its own focus
//! ring. It never talks to the modal service; it reports what the user
//! asked for and the app decides what to do with it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::form::{self, Field, FieldErrors, FormInput, SubmissionRecord};

/// Focusable elements of the dialog, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogFocus {
    Field(Field),
    Cancel,
    Submit,
    Close,
}

impl DialogFocus {
    const RING: [DialogFocus; 6] = [
        DialogFocus::Field(Field::Name),
        DialogFocus::Field(Field::Email),
        DialogFocus::Field(Field::Message),
        DialogFocus::Cancel,
        DialogFocus::Submit,
        DialogFocus::Close,
    ];

    fn position(self) -> usize {
        Self::RING.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::RING[(self.position() + 1) % Self::RING.len()]
    }

    pub fn prev(self) -> Self {
        Self::RING[(self.position() + Self::RING.len() - 1) % Self::RING.len()]
    }
}

/// What the user asked the dialog to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogAction {
    /// Nothing leaves the dialog
    None,
    /// Validated submission
    Submit(SubmissionRecord),
    /// Explicit dismissal
    Cancel,
}

/// Contact form dialog state
#[derive(Debug, Clone)]
pub struct FormDialog {
    input: FormInput,
    errors: FieldErrors,
    focus: DialogFocus,
    /// Set after the first rejected submit; edits then re-validate live
    attempted: bool,
}

impl Default for FormDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl FormDialog {
    pub fn new() -> Self {
        Self {
            input: FormInput::default(),
            errors: FieldErrors::default(),
            focus: DialogFocus::Field(Field::Name),
            attempted: false,
        }
    }

    /// Empty fields, no errors, focus on the first field
    pub fn reset(&mut self) {
        debug!("FormDialog::reset: called");
        *self = Self::new();
    }

    pub fn input(&self) -> &FormInput {
        &self.input
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn focus(&self) -> DialogFocus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: DialogFocus) {
        self.focus = focus;
    }

    /// Handle a key while the dialog is open
    pub fn handle_key(&mut self, key: KeyEvent) -> DialogAction {
        debug!(?key, focus = ?self.focus, "FormDialog::handle_key: called");
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => DialogAction::Cancel,
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => self.submit(),
            (KeyCode::Tab, _) | (KeyCode::Down, _) => {
                self.focus = self.focus.next();
                DialogAction::None
            }
            (KeyCode::BackTab, _) | (KeyCode::Up, _) => {
                self.focus = self.focus.prev();
                DialogAction::None
            }
            (KeyCode::Enter, modifiers) => match self.focus {
                DialogFocus::Cancel | DialogFocus::Close => DialogAction::Cancel,
                DialogFocus::Submit => self.submit(),
                DialogFocus::Field(field) if field.is_multiline() && !modifiers.contains(KeyModifiers::CONTROL) => {
                    self.edit(field, |value| value.push('\n'));
                    DialogAction::None
                }
                DialogFocus::Field(_) => self.submit(),
            },
            (KeyCode::Backspace, _) => {
                if let DialogFocus::Field(field) = self.focus {
                    self.edit(field, |value| {
                        value.pop();
                    });
                }
                DialogAction::None
            }
            (KeyCode::Char(c), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
                if let DialogFocus::Field(field) = self.focus {
                    self.edit(field, |value| value.push(c));
                }
                DialogAction::None
            }
            _ => DialogAction::None,
        }
    }

    /// Run validation; on failure keep the dialog open and focus the first bad field
    pub fn submit(&mut self) -> DialogAction {
        match form::validate(&self.input) {
            Ok(record) => {
                debug!("FormDialog::submit: accepted");
                self.errors = FieldErrors::default();
                DialogAction::Submit(record)
            }
            Err(errors) => {
                debug!(%errors, "FormDialog::submit: rejected");
                if let Some(first) = errors.fields().next() {
                    self.focus = DialogFocus::Field(first);
                }
                self.errors = errors;
                self.attempted = true;
                DialogAction::None
            }
        }
    }

    fn edit(&mut self, field: Field, change: impl FnOnce(&mut String)) {
        change(self.input.get_mut(field));
        if self.attempted {
            self.errors = match form::validate(&self.input) {
                Ok(_) => FieldErrors::default(),
                Err(errors) => errors,
            };
        }
    }
}
