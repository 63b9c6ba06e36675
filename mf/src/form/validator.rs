//! Contact form validation
//!
//! Every field is checked independently and all failures are collected.
//! Presence is checked on the raw value; nothing is trimmed or normalised.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::record::{Field, FormInput, SubmissionRecord};

pub const NAME_REQUIRED: &str = "name required.";
pub const EMAIL_REQUIRED: &str = "email required.";
pub const EMAIL_INVALID: &str = "invalid email format.";
pub const MESSAGE_REQUIRED: &str = "message required.";

/// `local@domain.tld` shape. Intentionally loose: this is a typo guard, not RFC 5322.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Per-field validation messages; fields that passed are absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("{}", summarize(.0))]
pub struct FieldErrors(BTreeMap<Field, Vec<String>>);

fn summarize(errors: &BTreeMap<Field, Vec<String>>) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
        .collect::<Vec<_>>()
        .join("; ")
}

impl FieldErrors {
    fn push(&mut self, field: Field, message: &str) {
        self.0.entry(field).or_default().push(message.to_string());
    }

    /// Messages for a field, if it failed
    pub fn get(&self, field: Field) -> Option<&[String]> {
        self.0.get(&field).map(Vec::as_slice)
    }

    /// First message for a field, the one a form shows inline
    pub fn first(&self, field: Field) -> Option<&str> {
        self.get(field).and_then(|messages| messages.first()).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Failed fields in form order
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Whether `email` has the `local@domain.tld` shape
pub fn is_email_shaped(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Validate raw input into a [`SubmissionRecord`]
pub fn validate(input: &FormInput) -> Result<SubmissionRecord, FieldErrors> {
    let mut errors = FieldErrors::default();

    if input.name.is_empty() {
        errors.push(Field::Name, NAME_REQUIRED);
    }

    if input.email.is_empty() {
        errors.push(Field::Email, EMAIL_REQUIRED);
    } else if !is_email_shaped(&input.email) {
        errors.push(Field::Email, EMAIL_INVALID);
    }

    if input.message.is_empty() {
        errors.push(Field::Message, MESSAGE_REQUIRED);
    }

    if errors.is_empty() {
        debug!("validate: input accepted");
        Ok(SubmissionRecord::from_validated(input.clone()))
    } else {
        debug!(failed = errors.len(), "validate: input rejected");
        Err(errors)
    }
}
