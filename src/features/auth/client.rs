//! Client wrappers for the session endpoints. These keep paths in one place
//! and make sure credentials never reach the logs.

use crate::{
    features::auth::types::{
        FindMailResponse, LoginRequest, LoginResponse, ResetPasswordRequest, SessionResponse,
        UserSession,
    },
    portal::{ApiClient, ApiError},
};
use tracing::instrument;

/// Fetches the current session using the cookie jar.
/// Returns `None` when the server answers 401 or sends no user.
#[instrument(skip(api))]
pub async fn fetch_session(api: &ApiClient) -> Result<Option<UserSession>, ApiError> {
    let response: Option<SessionResponse> = api.get_optional_json("/session").await?;
    Ok(response.and_then(|body| body.user))
}

/// Logs in; on success the server sets the session cookie on the jar.
#[instrument(skip(api, request))]
pub async fn login(api: &ApiClient, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
    api.post_json("/login", request).await
}

/// Invalidates the server-side session.
#[instrument(skip(api))]
pub async fn logout(api: &ApiClient) -> Result<(), ApiError> {
    api.delete("/session").await
}

/// Checks whether an account exists for the address, first step of the
/// password reset flow.
#[instrument(skip(api, email))]
pub async fn find_mail(api: &ApiClient, email: &str) -> Result<bool, ApiError> {
    let response: FindMailResponse = api
        .get_json_with_query("/find-mail", &[("mail", email.trim())])
        .await?;
    Ok(response.exists)
}

#[instrument(skip(api, request))]
pub async fn reset_password(api: &ApiClient, request: &ResetPasswordRequest) -> Result<(), ApiError> {
    api.patch_json("/reset-password", request).await
}
