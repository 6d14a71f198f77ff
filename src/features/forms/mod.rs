//! Controlled forms. A form owns its raw input values, validates them with
//! the shared rules and knows how to send itself; `FormController` drives the
//! `Idle → Submitting → Succeeded | Failed` lifecycle around it.
//!
//! Field names are the server's JSON names, so a 422 error map lines up with
//! the local one without translation.

mod admin_edit_user;
mod admin_user;
mod controller;
mod declaration;
mod login;
mod register;
mod reset_password;

pub use admin_edit_user::AdminEditUserForm;
pub use admin_user::AdminUserForm;
pub use controller::{FailureOrigin, FormController, FormFailure, FormState, SubmitError};
pub use declaration::DeclarationForm;
pub use login::LoginForm;
pub use register::RegisterForm;
pub use reset_password::ResetPasswordForm;

use crate::portal::{ApiClient, ApiError};
use std::{future::Future, str::FromStr};

/// One input of a form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    /// Input must not be echoed or displayed.
    pub secret: bool,
    pub optional: bool,
}

impl FieldSpec {
    pub(crate) const fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            secret: false,
            optional: false,
        }
    }

    pub(crate) const fn secret(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            secret: true,
            optional: false,
        }
    }

    pub(crate) const fn optional(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            secret: false,
            optional: true,
        }
    }

    pub(crate) const fn optional_secret(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            secret: true,
            optional: true,
        }
    }
}

/// What happens to the values after a successful submit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormKind {
    /// Values are kept and the caller navigates away.
    Navigation,
    /// Values reset to their initial state and a success notice is shown.
    Create,
}

pub trait Form: Clone + Default + Send + Sync + 'static {
    type Response: Send;

    const FIELDS: &'static [FieldSpec];
    const KIND: FormKind;

    /// Updates a field; returns false for unknown names.
    fn set_field(&mut self, field: &str, value: String) -> bool;

    /// Current value of a non-secret field.
    fn value(&self, field: &str) -> Option<&str>;

    /// Runs every rule and returns the complete error map.
    fn validate(&self) -> crate::features::validation::FieldErrors;

    /// Sends the validated values.
    fn send(&self, api: &ApiClient) -> impl Future<Output = Result<Self::Response, ApiError>> + Send;

    fn describe_failure(err: &ApiError) -> FormFailure {
        FormFailure::from_api_error(err)
    }

    fn success_notice(_response: &Self::Response) -> Option<String> {
        None
    }
}

/// Parses a validated input value. Validation already checked it, so a
/// failure here means the form was sent without validating.
pub(crate) fn parse_value<T: FromStr>(field: &str, value: &str) -> Result<T, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::Serialization(format!("Invalid value for {field}")))
}

/// Yes/no answers; blank counts as no.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "" | "no" | "n" | "false" | "0" => Some(false),
        "yes" | "y" | "si" | "sí" | "true" | "1" => Some(true),
        _ => None,
    }
}

/// Parses an optional input value; blank means absent.
pub(crate) fn parse_optional<T: FromStr>(field: &str, value: &str) -> Result<Option<T>, ApiError> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_value(field, value).map(Some)
    }
}
