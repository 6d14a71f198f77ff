//! Request and response types for session-related API calls. Login and
//! password-reset payloads carry passwords, so they hold `SecretString` and
//! must never be logged.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Opaque user identifier. The server currently sends integers, but the
/// client never does arithmetic on it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(u64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(formatter, "{id}"),
            Self::Text(id) => formatter.write_str(id),
        }
    }
}

/// The authenticated identity as the client knows it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSession {
    #[serde(rename = "id")]
    pub user_id: UserId,
    #[serde(rename = "nombre_completo")]
    pub display_name: String,
    #[serde(rename = "correo_electronico")]
    pub email: String,
    #[serde(rename = "es_admin", default)]
    pub is_admin: bool,
}

/// Body of `GET /session`.
#[derive(Clone, Debug, Deserialize)]
pub struct SessionResponse {
    pub user: Option<UserSession>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    #[serde(rename = "correo_electronico")]
    pub email: String,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: UserSession,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResetPasswordRequest {
    pub mail: String,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FindMailResponse {
    pub exists: bool,
}

/// Writes the secret as a plain string; only used on outgoing request bodies.
pub(crate) fn expose_secret<S: Serializer>(
    secret: &SecretString,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
