use super::{FailureOrigin, FieldSpec, Form, FormFailure, FormKind};
use crate::{
    features::{
        auth::{client, types::ResetPasswordRequest},
        validation::{rules, FieldErrors},
    },
    portal::{ApiClient, ApiError},
};
use secrecy::{ExposeSecret, SecretString};
use std::future::Future;

pub const MSG_USER_NOT_FOUND: &str = "User not found.";

#[derive(Clone, Debug)]
pub struct ResetPasswordForm {
    email: String,
    password: SecretString,
    confirm_password: SecretString,
}

impl Default for ResetPasswordForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: SecretString::from(String::new()),
            confirm_password: SecretString::from(String::new()),
        }
    }
}

impl Form for ResetPasswordForm {
    type Response = ();

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("mail", "Email"),
        FieldSpec::secret("password", "New password"),
        FieldSpec::secret("confirm_password", "Confirm password"),
    ];
    const KIND: FormKind = FormKind::Navigation;

    fn set_field(&mut self, field: &str, value: String) -> bool {
        match field {
            "mail" => self.email = value,
            "password" => self.password = SecretString::from(value),
            "confirm_password" => self.confirm_password = SecretString::from(value),
            _ => return false,
        }
        true
    }

    fn value(&self, field: &str) -> Option<&str> {
        (field == "mail").then_some(self.email.as_str())
    }

    fn validate(&self) -> FieldErrors {
        let password = self.password.expose_secret();
        let mut errors = FieldErrors::new();
        errors.check("mail", rules::email(&self.email));
        errors.check("password", rules::password_strength(password));
        errors.check(
            "confirm_password",
            rules::password_confirmation(password, self.confirm_password.expose_secret()),
        );
        errors
    }

    fn send(&self, api: &ApiClient) -> impl Future<Output = Result<(), ApiError>> + Send {
        let request = ResetPasswordRequest {
            mail: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        async move { client::reset_password(api, &request).await }
    }

    fn describe_failure(err: &ApiError) -> FormFailure {
        if err.status() == Some(404) {
            return FormFailure::new(FailureOrigin::Rejected, MSG_USER_NOT_FOUND);
        }
        FormFailure::from_api_error(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::forms::{
        test_support::{can_bind_localhost, store_for},
        FormController, SubmitError,
    };
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn filled() -> FormController<ResetPasswordForm> {
        let controller = FormController::<ResetPasswordForm>::new();
        controller.set_field("mail", "ana@example.com");
        controller.set_field("password", "Newpass1!");
        controller.set_field("confirm_password", "Newpass1!");
        controller
    }

    #[tokio::test]
    async fn unknown_user_maps_to_not_found() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/reset-password"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "message": "Usuario no encontrado." })),
            )
            .mount(&server)
            .await;

        let session = store_for(&server.uri());
        let Err(SubmitError::Failed(failure)) = filled().submit(&session).await else {
            panic!("expected not found");
        };
        assert_eq!(failure.message, MSG_USER_NOT_FOUND);
    }

    #[tokio::test]
    async fn successful_reset_keeps_values() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/reset-password"))
            .and(body_json(json!({ "mail": "ana@example.com", "password": "Newpass1!" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "message": "Contraseña actualizada exitosamente." })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = store_for(&server.uri());
        let controller = filled();
        controller.submit(&session).await.unwrap();
        assert_eq!(controller.form().value("mail"), Some("ana@example.com"));
        assert_eq!(controller.take_notice(), None);
    }

    #[test]
    fn weak_password_blocks_submit() {
        let mut form = ResetPasswordForm::default();
        form.set_field("mail", "ana@example.com".to_string());
        form.set_field("password", "abcdefgh".to_string());
        let errors = form.validate();
        assert_eq!(
            errors.get("password"),
            Some("Password must contain at least one uppercase letter.")
        );
        assert!(!errors.contains("confirm_password"));
    }
}
