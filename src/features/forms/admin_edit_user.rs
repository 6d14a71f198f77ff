use super::{
    parse_flag, parse_value,
    register::{AccountFields, ACCOUNT_FIELDS},
    reset_password::MSG_USER_NOT_FOUND,
    FailureOrigin, FieldSpec, Form, FormFailure, FormKind,
};
use crate::{
    features::{
        auth::types::UserId,
        users::{
            client,
            types::{UpdateUserRequest, UserResponse, UserStatus, UserSummary},
        },
        validation::FieldErrors,
    },
    portal::{ApiClient, ApiError},
};
use std::future::Future;

pub const MSG_INVALID_STATUS: &str = "Status must be activo or inactivo.";

const FIELDS: [FieldSpec; 6] = [
    ACCOUNT_FIELDS[2],
    ACCOUNT_FIELDS[3],
    FieldSpec::optional_secret("password", "New password"),
    FieldSpec::optional_secret("confirm_password", "Confirm new password"),
    FieldSpec::text("estado", "Status (activo/inactivo)"),
    FieldSpec::text("es_admin", "Administrator (yes/no)"),
];

/// Admin edit of an existing account. Document fields are fixed once the
/// account exists; a blank password leaves the current one in place.
#[derive(Clone, Debug, Default)]
pub struct AdminEditUserForm {
    user_id: Option<UserId>,
    fields: AccountFields,
    status: String,
    is_admin: String,
}

impl AdminEditUserForm {
    /// Form prefilled with the account's current values.
    #[must_use]
    pub fn for_user(user: &UserSummary) -> Self {
        let mut form = Self {
            user_id: Some(user.id.clone()),
            status: user
                .status
                .clone()
                .unwrap_or_else(|| UserStatus::Active.as_str().to_string()),
            is_admin: if user.is_admin { "yes" } else { "no" }.to_string(),
            ..Self::default()
        };
        form.fields.set("nombre_completo", user.display_name.clone());
        form.fields.set("correo_electronico", user.email.clone());
        form
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    fn request(&self) -> Result<UpdateUserRequest, ApiError> {
        Ok(UpdateUserRequest {
            full_name: self.fields.full_name.trim().to_string(),
            email: self.fields.email.trim().to_string(),
            password: self
                .fields
                .has_password()
                .then(|| self.fields.password.clone()),
            status: parse_value("estado", &self.status)?,
            is_admin: parse_flag(&self.is_admin)
                .ok_or_else(|| ApiError::Serialization("Invalid value for es_admin".to_string()))?,
        })
    }
}

impl Form for AdminEditUserForm {
    type Response = UserResponse;

    const FIELDS: &'static [FieldSpec] = &FIELDS;
    const KIND: FormKind = FormKind::Navigation;

    fn set_field(&mut self, field: &str, value: String) -> bool {
        match field {
            "nombre_completo" | "correo_electronico" | "password" | "confirm_password" => {
                self.fields.set(field, value)
            }
            "estado" => {
                self.status = value;
                true
            }
            "es_admin" => {
                self.is_admin = value;
                true
            }
            _ => false,
        }
    }

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "nombre_completo" | "correo_electronico" => self.fields.get(field),
            "estado" => Some(&self.status),
            "es_admin" => Some(&self.is_admin),
            _ => None,
        }
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        self.fields.check_profile(&mut errors);
        if self.fields.has_password() {
            self.fields.check_password(&mut errors);
        }
        if self.status.parse::<UserStatus>().is_err() {
            errors.insert("estado", MSG_INVALID_STATUS);
        }
        if parse_flag(&self.is_admin).is_none() {
            errors.insert("es_admin", "Answer yes or no.");
        }
        errors
    }

    fn send(&self, api: &ApiClient) -> impl Future<Output = Result<UserResponse, ApiError>> + Send {
        let user_id = self.user_id.clone();
        let request = self.request();
        async move {
            let user_id =
                user_id.ok_or_else(|| ApiError::Config("No user selected.".to_string()))?;
            client::update_user(api, &user_id, &request?).await
        }
    }

    fn describe_failure(err: &ApiError) -> FormFailure {
        if err.status() == Some(404) {
            return FormFailure::new(FailureOrigin::Rejected, MSG_USER_NOT_FOUND);
        }
        FormFailure::from_api_error(err)
    }
}
