use super::{parse_value, FieldSpec, Form, FormKind};
use crate::{
    features::{
        users::{
            client,
            types::{DocumentType, RegisterRequest, UserResponse},
        },
        validation::{rules, FieldErrors},
    },
    portal::{ApiClient, ApiError},
};
use secrecy::{ExposeSecret, SecretString};
use std::future::Future;

/// Inputs shared by self-registration and admin account creation.
#[derive(Clone, Debug)]
pub(crate) struct AccountFields {
    pub document_type: String,
    pub document_number: String,
    pub full_name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

impl Default for AccountFields {
    fn default() -> Self {
        Self {
            document_type: String::new(),
            document_number: String::new(),
            full_name: String::new(),
            email: String::new(),
            password: SecretString::from(String::new()),
            confirm_password: SecretString::from(String::new()),
        }
    }
}

pub(crate) const ACCOUNT_FIELDS: [FieldSpec; 6] = [
    FieldSpec::text("tipo_documento", "Document type"),
    FieldSpec::text("numero_documento", "Document number"),
    FieldSpec::text("nombre_completo", "Full name"),
    FieldSpec::text("correo_electronico", "Email"),
    FieldSpec::secret("password", "Password"),
    FieldSpec::secret("confirm_password", "Confirm password"),
];

impl AccountFields {
    pub(crate) fn set(&mut self, field: &str, value: String) -> bool {
        match field {
            "tipo_documento" => self.document_type = value,
            "numero_documento" => self.document_number = value,
            "nombre_completo" => self.full_name = value,
            "correo_electronico" => self.email = value,
            "password" => self.password = SecretString::from(value),
            "confirm_password" => self.confirm_password = SecretString::from(value),
            _ => return false,
        }
        true
    }

    pub(crate) fn get(&self, field: &str) -> Option<&str> {
        match field {
            "tipo_documento" => Some(&self.document_type),
            "numero_documento" => Some(&self.document_number),
            "nombre_completo" => Some(&self.full_name),
            "correo_electronico" => Some(&self.email),
            _ => None,
        }
    }

    pub(crate) fn validate(&self) -> FieldErrors {
        let kind = self.document_type.parse::<DocumentType>().ok();

        let mut errors = FieldErrors::new();
        errors.check("tipo_documento", rules::document_type(&self.document_type));
        errors.check(
            "numero_documento",
            rules::document_number(&self.document_number, kind),
        );
        self.check_profile(&mut errors);
        self.check_password(&mut errors);
        errors
    }

    /// Name and email rules.
    pub(crate) fn check_profile(&self, errors: &mut FieldErrors) {
        errors.check("nombre_completo", rules::full_name(&self.full_name));
        errors.check("correo_electronico", rules::email(&self.email));
    }

    /// Strength and confirmation rules for the password pair.
    pub(crate) fn check_password(&self, errors: &mut FieldErrors) {
        let password = self.password.expose_secret();
        errors.check("password", rules::password_strength(password));
        errors.check(
            "confirm_password",
            rules::password_confirmation(password, self.confirm_password.expose_secret()),
        );
    }

    pub(crate) fn has_password(&self) -> bool {
        !self.password.expose_secret().is_empty()
            || !self.confirm_password.expose_secret().is_empty()
    }

    pub(crate) fn request(&self, is_admin: Option<bool>) -> Result<RegisterRequest, ApiError> {
        Ok(RegisterRequest {
            document_type: parse_value("tipo_documento", &self.document_type)?,
            document_number: self.document_number.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            is_admin,
        })
    }
}

/// Self-registration. On success the caller sends the user to the login view.
#[derive(Clone, Debug, Default)]
pub struct RegisterForm {
    fields: AccountFields,
}

impl Form for RegisterForm {
    type Response = UserResponse;

    const FIELDS: &'static [FieldSpec] = &ACCOUNT_FIELDS;
    const KIND: FormKind = FormKind::Navigation;

    fn set_field(&mut self, field: &str, value: String) -> bool {
        self.fields.set(field, value)
    }

    fn value(&self, field: &str) -> Option<&str> {
        self.fields.get(field)
    }

    fn validate(&self) -> FieldErrors {
        self.fields.validate()
    }

    fn send(&self, api: &ApiClient) -> impl Future<Output = Result<UserResponse, ApiError>> + Send {
        let request = self.fields.request(None);
        async move { client::register(api, &request?).await }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> RegisterForm {
        let mut form = RegisterForm::default();
        for (field, value) in pairs {
            assert!(form.set_field(field, (*value).to_string()), "{field}");
        }
        form
    }

    const VALID: [(&str, &str); 6] = [
        ("tipo_documento", "Cedula"),
        ("numero_documento", "123456"),
        ("nombre_completo", "José Núñez"),
        ("correo_electronico", "jose@example.com"),
        ("password", "Abcdef1!"),
        ("confirm_password", "Abcdef1!"),
    ];

    #[test]
    fn valid_form_has_no_errors() {
        assert!(form(&VALID).validate().is_empty());
    }

    #[test]
    fn short_password_reports_length_only() {
        let mut form = form(&VALID);
        form.set_field("password", "abc".to_string());
        form.set_field("confirm_password", "xyz".to_string());
        let errors = form.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 8 characters long.")
        );
    }

    #[test]
    fn mismatched_confirmation_is_reported_once_password_is_valid() {
        let mut form = form(&VALID);
        form.set_field("confirm_password", "Abcdef1?".to_string());
        let errors = form.validate();
        assert_eq!(errors.get("confirm_password"), Some("Passwords do not match."));
        assert!(!errors.contains("password"));
    }

    #[test]
    fn passport_allows_letters_in_document_number() {
        let mut form = form(&VALID);
        form.set_field("numero_documento", "AB1234".to_string());
        assert!(form.validate().contains("numero_documento"));

        form.set_field("tipo_documento", "Pasaporte".to_string());
        assert!(form.validate().is_empty());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut form = RegisterForm::default();
        assert!(!form.set_field("es_admin", "true".to_string()));
    }

    #[test]
    fn request_is_not_admin() {
        let request = form(&VALID).fields.request(None).unwrap();
        assert_eq!(request.document_type, DocumentType::Cedula);
        assert_eq!(request.is_admin, None);
    }
}
