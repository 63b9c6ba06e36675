//! Contact form model and validation
//!
//! [`validate`] turns a raw [`FormInput`] into either a [`SubmissionRecord`]
//! or a [`FieldErrors`] map keyed by [`Field`].

mod record;
mod validator;

pub use record::{Field, FormInput, SubmissionRecord};
pub use validator::{
    EMAIL_INVALID, EMAIL_REQUIRED, FieldErrors, MESSAGE_REQUIRED, NAME_REQUIRED, is_email_shaped, validate,
};

use crate::modal::ModalService;

/// Modal service carrying contact form submissions
pub type FormModal = ModalService<SubmissionRecord>;
