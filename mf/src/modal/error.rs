//! Errors delivered to callers awaiting a modal session

use thiserror::Error;

/// Why an awaited modal session did not produce a result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModalError {
    /// A later `open()` took over the single session slot
    #[error("Another modal is already open")]
    AlreadyOpen,

    /// The service was dropped while the session was still pending
    #[error("Modal service dropped before the session settled")]
    Abandoned,
}

/// Outcome of one modal session: `Ok(None)` means the user dismissed the dialog
pub type ModalResult<T> = Result<Option<T>, ModalError>;
