//! Modal orchestration
//!
//! Bridges imperative callers ("open the modal and wait for the result")
//! and a declarative UI ("am I open?"):
//!
//! - [`ModalService`] owns the single session slot and the listener set
//! - [`ModalRequest`] is the future a caller awaits
//! - [`Subscription`] removes a listener registered with `subscribe`

mod error;
mod listeners;
mod service;

pub use error::{ModalError, ModalResult};
pub use listeners::{Listener, Subscription};
pub use service::{ModalRequest, ModalService};
