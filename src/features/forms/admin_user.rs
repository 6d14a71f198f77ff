use super::{
    parse_flag,
    register::{AccountFields, ACCOUNT_FIELDS},
    FieldSpec, Form, FormKind,
};
use crate::{
    features::{
        users::{client, types::UserResponse},
        validation::FieldErrors,
    },
    portal::{ApiClient, ApiError},
};
use std::future::Future;

const FIELDS: [FieldSpec; 7] = [
    ACCOUNT_FIELDS[0],
    ACCOUNT_FIELDS[1],
    ACCOUNT_FIELDS[2],
    ACCOUNT_FIELDS[3],
    ACCOUNT_FIELDS[4],
    ACCOUNT_FIELDS[5],
    FieldSpec::optional("es_admin", "Administrator (yes/no)"),
];

/// Account creation by an administrator. Resets after each success so the
/// next account can be entered.
#[derive(Clone, Debug, Default)]
pub struct AdminUserForm {
    fields: AccountFields,
    is_admin: bool,
    is_admin_raw: String,
}

impl Form for AdminUserForm {
    type Response = UserResponse;

    const FIELDS: &'static [FieldSpec] = &FIELDS;
    const KIND: FormKind = FormKind::Create;

    fn set_field(&mut self, field: &str, value: String) -> bool {
        if field == "es_admin" {
            self.is_admin = parse_flag(&value).unwrap_or(false);
            self.is_admin_raw = value;
            return true;
        }
        self.fields.set(field, value)
    }

    fn value(&self, field: &str) -> Option<&str> {
        if field == "es_admin" {
            return Some(&self.is_admin_raw);
        }
        self.fields.get(field)
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = self.fields.validate();
        if parse_flag(&self.is_admin_raw).is_none() {
            errors.insert("es_admin", "Answer yes or no.");
        }
        errors
    }

    fn send(&self, api: &ApiClient) -> impl Future<Output = Result<UserResponse, ApiError>> + Send {
        let request = self.fields.request(Some(self.is_admin));
        async move { client::register(api, &request?).await }
    }

    fn success_notice(response: &UserResponse) -> Option<String> {
        Some(
            response
                .message
                .clone()
                .unwrap_or_else(|| "User created.".to_string()),
        )
    }
}
