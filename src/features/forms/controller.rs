use super::{Form, FormKind};
use crate::{
    features::{auth::state::SessionStore, validation::FieldErrors},
    portal::ApiError,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const MSG_CORRECT_FIELDS: &str = "Please correct the highlighted fields.";
pub const MSG_UNAVAILABLE: &str =
    "Could not reach the server. Please check your connection and try again.";
pub const MSG_SERVER_FAULT: &str = "The server had a problem. Please try again later.";
pub const MSG_DENIED: &str = "You are not allowed to do that.";
pub const MSG_UNEXPECTED: &str = "The request could not be completed.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureOrigin {
    /// Local rules rejected the input; nothing was sent.
    Validation,
    /// The server rejected specific fields or the credentials.
    Rejected,
    /// No response: connection refused, DNS, timeout.
    Unavailable,
    ServerFault,
    /// 401 or 403.
    Denied,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormFailure {
    pub origin: FailureOrigin,
    pub message: String,
}

impl FormFailure {
    #[must_use]
    pub fn new(origin: FailureOrigin, message: impl Into<String>) -> Self {
        Self {
            origin,
            message: message.into(),
        }
    }

    /// Default mapping from transport errors to what the user is told.
    /// Server internals never reach the message for 5xx responses.
    #[must_use]
    pub fn from_api_error(err: &ApiError) -> Self {
        if err.field_errors().is_some() {
            return Self::new(FailureOrigin::Rejected, MSG_CORRECT_FIELDS);
        }
        if err.is_unavailable() {
            return Self::new(FailureOrigin::Unavailable, MSG_UNAVAILABLE);
        }
        if err.is_server_fault() {
            return Self::new(FailureOrigin::ServerFault, MSG_SERVER_FAULT);
        }
        if err.is_unauthorized() || err.is_forbidden() {
            return Self::new(
                FailureOrigin::Denied,
                err.server_message().unwrap_or(MSG_DENIED),
            );
        }
        Self::new(
            FailureOrigin::Other,
            err.server_message().unwrap_or(MSG_UNEXPECTED),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
    Succeeded,
    Failed(FormFailure),
}

#[derive(Clone, Debug, Error)]
pub enum SubmitError {
    #[error("a submission is already in progress")]
    InFlight,
    #[error("please correct the highlighted fields")]
    Invalid(FieldErrors),
    #[error("{}", .0.message)]
    Failed(FormFailure),
}

#[derive(Debug)]
struct Inner<F> {
    form: F,
    errors: FieldErrors,
    state: FormState,
    notice: Option<String>,
}

/// Drives one form. The lock is only taken for short synchronous sections and
/// is never held while a request is in flight.
#[derive(Debug)]
pub struct FormController<F: Form> {
    inner: Mutex<Inner<F>>,
}

impl<F: Form> Default for FormController<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Form> FormController<F> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_form(F::default())
    }

    #[must_use]
    pub fn with_form(form: F) -> Self {
        Self {
            inner: Mutex::new(Inner {
                form,
                errors: FieldErrors::new(),
                state: FormState::Idle,
                notice: None,
            }),
        }
    }

    /// Updates a field and clears its error. Returns false for unknown names.
    pub fn set_field(&self, field: &str, value: impl Into<String>) -> bool {
        let mut inner = self.lock();
        if !inner.form.set_field(field, value.into()) {
            return false;
        }
        inner.errors.clear_field(field);
        true
    }

    /// Snapshot of the current values.
    #[must_use]
    pub fn form(&self) -> F {
        self.lock().form.clone()
    }

    #[must_use]
    pub fn errors(&self) -> FieldErrors {
        self.lock().errors.clone()
    }

    #[must_use]
    pub fn state(&self) -> FormState {
        self.lock().state.clone()
    }

    /// Success notice of the last create-style submit; returned once.
    pub fn take_notice(&self) -> Option<String> {
        self.lock().notice.take()
    }

    /// Validates and sends the form.
    ///
    /// # Errors
    /// `InFlight` when a submit is already running, `Invalid` when local
    /// validation fails (no request is made), `Failed` for server and
    /// transport errors.
    pub async fn submit(&self, session: &SessionStore) -> Result<F::Response, SubmitError> {
        let form = {
            let mut inner = self.lock();
            if inner.state == FormState::Submitting {
                debug!("submit ignored, already in flight");
                return Err(SubmitError::InFlight);
            }
            let errors = inner.form.validate();
            if !errors.is_empty() {
                debug!(fields = errors.len(), "form failed local validation");
                inner.errors = errors.clone();
                inner.state = FormState::Failed(FormFailure::new(
                    FailureOrigin::Validation,
                    MSG_CORRECT_FIELDS,
                ));
                return Err(SubmitError::Invalid(errors));
            }
            inner.errors = FieldErrors::new();
            inner.notice = None;
            inner.state = FormState::Submitting;
            inner.form.clone()
        };

        let mut flight = Flight {
            controller: self,
            landed: false,
        };
        let result = form.send(session.api()).await;
        flight.landed = true;

        let mut inner = self.lock();
        match result {
            Ok(response) => {
                info!(kind = ?F::KIND, "form submitted");
                inner.state = FormState::Succeeded;
                if F::KIND == FormKind::Create {
                    inner.form = F::default();
                    inner.notice = F::success_notice(&response);
                }
                Ok(response)
            }
            Err(err) => {
                if session.handle_denial(&err) {
                    warn!("session revoked after form submit was denied");
                }
                let failure = F::describe_failure(&err);
                debug!(error = %err, origin = ?failure.origin, "form submit failed");
                if let Some(field_errors) = err.field_errors() {
                    for (field, message) in field_errors.iter() {
                        inner.errors.insert(field, message);
                    }
                }
                inner.state = FormState::Failed(failure.clone());
                Err(SubmitError::Failed(failure))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<F>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the controller to `Idle` if the submit future is dropped before
/// the response arrives.
struct Flight<'a, F: Form> {
    controller: &'a FormController<F>,
    landed: bool,
}

impl<F: Form> Drop for Flight<'_, F> {
    fn drop(&mut self) {
        if self.landed {
            return;
        }
        let mut inner = self.controller.lock();
        if inner.state == FormState::Submitting {
            inner.state = FormState::Idle;
        }
    }
}
