//! modalform - a contact form behind a single-slot modal orchestrator
//!
//! Callers open the modal and await the outcome; the UI only learns whether
//! it should be showing the dialog and reports back with a submission or a
//! dismissal.
//!
//! # Modules
//!
//! - [`modal`] - `ModalService`, the generic single-session request broker
//! - [`form`] - contact form types and validation
//! - [`tui`] - ratatui front end: page, dialog, event loop
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface
//!
//! # Example
//!
//! ```
//! use modalform::form::{self, FormInput, FormModal};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let modal = FormModal::new();
//! let request = modal.open();
//!
//! // ...the dialog collects input and submits it
//! let record = form::validate(&FormInput::new("Ada", "ada@example.com", "hi")).unwrap();
//! modal.close(Some(record.clone()));
//!
//! assert_eq!(request.await, Ok(Some(record)));
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod form;
pub mod modal;
pub mod tui;

pub use config::{Config, TuiConfig};
pub use form::{Field, FieldErrors, FormInput, FormModal, SubmissionRecord, validate};
pub use modal::{ModalError, ModalRequest, ModalResult, ModalService, Subscription};
