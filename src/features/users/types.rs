//! Account payloads for registration and the admin user listing. Field names
//! follow the server's JSON.

use crate::features::auth::types::UserId;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Identity document kinds the server accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "Cedula")]
    Cedula,
    #[serde(rename = "Tarjeta de identidad")]
    IdentityCard,
    #[serde(rename = "Pasaporte")]
    Passport,
    #[serde(rename = "Cedula de extranjería")]
    ForeignerId,
}

impl DocumentType {
    pub const ALL: [Self; 4] = [
        Self::Cedula,
        Self::IdentityCard,
        Self::Passport,
        Self::ForeignerId,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cedula => "Cedula",
            Self::IdentityCard => "Tarjeta de identidad",
            Self::Passport => "Pasaporte",
            Self::ForeignerId => "Cedula de extranjería",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_lowercase();
        match lowered.as_str() {
            "cedula" | "cédula" => Ok(Self::Cedula),
            "tarjeta de identidad" | "identity card" => Ok(Self::IdentityCard),
            "pasaporte" | "passport" => Ok(Self::Passport),
            "cedula de extranjería" | "cedula de extranjeria" | "foreigner id" => {
                Ok(Self::ForeignerId)
            }
            _ => Err(format!("unknown document type: {value}")),
        }
    }
}

/// Account status as the server spells it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    #[serde(rename = "activo")]
    Active,
    #[serde(rename = "inactivo")]
    Inactive,
}

impl UserStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "activo",
            Self::Inactive => "inactivo",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "activo" | "active" => Ok(Self::Active),
            "inactivo" | "inactive" => Ok(Self::Inactive),
            _ => Err(format!("unknown status: {value}")),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    #[serde(rename = "nombre_completo")]
    pub display_name: String,
    #[serde(rename = "correo_electronico")]
    pub email: String,
    #[serde(rename = "tipo_documento", default)]
    pub document_type: Option<String>,
    #[serde(rename = "numero_documento", default)]
    pub document_number: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: Option<String>,
    #[serde(rename = "es_admin", default)]
    pub is_admin: bool,
}

impl UserSummary {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("activo")
    }
}

/// One page of the admin listing. Only `users` is guaranteed; the rest is
/// pagination metadata the server may omit.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct UserPage {
    pub users: Vec<UserSummary>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub has_next: Option<bool>,
    #[serde(default)]
    pub has_prev: Option<bool>,
}

/// Account creation payload for `POST /register`. `es_admin` is only sent by
/// the admin create-user form; the server ignores it for anyone else.
#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    #[serde(rename = "tipo_documento")]
    pub document_type: DocumentType,
    #[serde(rename = "numero_documento")]
    pub document_number: String,
    #[serde(rename = "nombre_completo")]
    pub full_name: String,
    #[serde(rename = "correo_electronico")]
    pub email: String,
    #[serde(serialize_with = "crate::features::auth::types::expose_secret")]
    pub password: SecretString,
    #[serde(rename = "es_admin", skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

/// Body of `PUT /admin/users/{id}`. Document fields can't be changed; the
/// password is only sent when a new one was entered.
#[derive(Clone, Debug, Serialize)]
pub struct UpdateUserRequest {
    #[serde(rename = "nombre_completo")]
    pub full_name: String,
    #[serde(rename = "correo_electronico")]
    pub email: String,
    #[serde(
        serialize_with = "expose_new_password",
        skip_serializing_if = "Option::is_none"
    )]
    pub password: Option<SecretString>,
    #[serde(rename = "estado")]
    pub status: UserStatus,
    #[serde(rename = "es_admin")]
    pub is_admin: bool,
}

fn expose_new_password<S: Serializer>(
    password: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match password {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<UserSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_type_parses_wire_values_and_aliases() {
        for kind in DocumentType::ALL {
            assert_eq!(kind.as_str().parse::<DocumentType>(), Ok(kind));
        }
        assert_eq!("passport".parse::<DocumentType>(), Ok(DocumentType::Passport));
        assert_eq!(" PASAPORTE ".parse::<DocumentType>(), Ok(DocumentType::Passport));
        assert!("driver license".parse::<DocumentType>().is_err());
    }

    #[test]
    fn register_request_uses_wire_names() {
        let request = RegisterRequest {
            document_type: DocumentType::ForeignerId,
            document_number: "123".to_string(),
            full_name: "Ana Pérez".to_string(),
            email: "ana@example.com".to_string(),
            password: SecretString::from("Abcdef1!"),
            is_admin: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "tipo_documento": "Cedula de extranjería",
                "numero_documento": "123",
                "nombre_completo": "Ana Pérez",
                "correo_electronico": "ana@example.com",
                "password": "Abcdef1!"
            })
        );
    }

    #[test]
    fn update_request_leaves_password_out_when_unchanged() {
        let mut request = UpdateUserRequest {
            full_name: "Ana Pérez".to_string(),
            email: "ana@example.com".to_string(),
            password: None,
            status: UserStatus::Inactive,
            is_admin: false,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "nombre_completo": "Ana Pérez",
                "correo_electronico": "ana@example.com",
                "estado": "inactivo",
                "es_admin": false
            })
        );

        request.password = Some(SecretString::from("Newpass1!"));
        assert_eq!(serde_json::to_value(&request).unwrap()["password"], "Newpass1!");
    }

    #[test]
    fn status_parses_wire_values_and_aliases() {
        assert_eq!("activo".parse::<UserStatus>(), Ok(UserStatus::Active));
        assert_eq!(" Inactive ".parse::<UserStatus>(), Ok(UserStatus::Inactive));
        assert!("suspended".parse::<UserStatus>().is_err());
    }

    #[test]
    fn user_page_tolerates_missing_metadata() {
        let page: UserPage = serde_json::from_value(json!({
            "users": [{
                "id": 7,
                "nombre_completo": "Ana Pérez",
                "correo_electronico": "ana@example.com",
                "estado": "activo",
                "es_admin": false
            }]
        }))
        .unwrap();
        assert_eq!(page.users.len(), 1);
        assert!(page.users[0].is_active());
        assert_eq!(page.has_next, None);
    }
}
