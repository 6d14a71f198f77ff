use super::{FailureOrigin, FieldSpec, Form, FormFailure, FormKind};
use crate::{
    features::{
        auth::{
            client,
            types::{LoginRequest, LoginResponse},
        },
        validation::{rules, FieldErrors},
    },
    portal::{ApiClient, ApiError},
};
use secrecy::{ExposeSecret, SecretString};
use std::future::Future;

pub const MSG_INVALID_CREDENTIALS: &str =
    "Invalid credentials. Please check your email and password.";
pub const MSG_INACTIVE: &str = "Your account is inactive. Contact the administrator.";

#[derive(Clone, Debug)]
pub struct LoginForm {
    email: String,
    password: SecretString,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: SecretString::from(String::new()),
        }
    }
}

impl Form for LoginForm {
    type Response = LoginResponse;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("correo_electronico", "Email"),
        FieldSpec::secret("password", "Password"),
    ];
    const KIND: FormKind = FormKind::Navigation;

    fn set_field(&mut self, field: &str, value: String) -> bool {
        match field {
            "correo_electronico" => self.email = value,
            "password" => self.password = SecretString::from(value),
            _ => return false,
        }
        true
    }

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "correo_electronico" => Some(&self.email),
            _ => None,
        }
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("correo_electronico", rules::email(&self.email));
        errors.check("password", rules::required(self.password.expose_secret()));
        errors
    }

    fn send(&self, api: &ApiClient) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send {
        let request = LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        async move { client::login(api, &request).await }
    }

    fn describe_failure(err: &ApiError) -> FormFailure {
        match err.status() {
            Some(400 | 401) => FormFailure::new(FailureOrigin::Rejected, MSG_INVALID_CREDENTIALS),
            Some(403) => FormFailure::new(
                FailureOrigin::Denied,
                err.server_message().unwrap_or(MSG_INACTIVE),
            ),
            _ => FormFailure::from_api_error(err),
        }
    }
}
