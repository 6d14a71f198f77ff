use crate::{
    features::{
        auth::types::UserId,
        users::types::{RegisterRequest, UpdateUserRequest, UserPage, UserResponse, UserSummary},
    },
    portal::{ApiClient, ApiError},
};
use tracing::instrument;

/// Creates an account. Used by self-registration and by admins.
#[instrument(skip(api, request), fields(admin = ?request.is_admin))]
pub async fn register(api: &ApiClient, request: &RegisterRequest) -> Result<UserResponse, ApiError> {
    api.post_json("/register", request).await
}

/// Fetches one page of the admin user listing; an empty search is not sent.
#[instrument(skip(api))]
pub async fn list_users(api: &ApiClient, page: u32, search: &str) -> Result<UserPage, ApiError> {
    let search = search.trim();
    let mut query = vec![("page", page.to_string())];
    if !search.is_empty() {
        query.push(("q", search.to_string()));
    }
    api.get_json_with_query("/admin/users", &query).await
}

/// Fetches one account for editing.
#[instrument(skip(api), fields(user_id = %user_id))]
pub async fn get_user(api: &ApiClient, user_id: &UserId) -> Result<UserSummary, ApiError> {
    api.get_json(&user_path(user_id, "")?).await
}

/// Updates an account's profile, status and role.
#[instrument(skip(api, request), fields(user_id = %user_id, password_changed = request.password.is_some()))]
pub async fn update_user(
    api: &ApiClient,
    user_id: &UserId,
    request: &UpdateUserRequest,
) -> Result<UserResponse, ApiError> {
    api.put_json(&user_path(user_id, "")?, request).await
}

/// Flips a user between active and inactive.
#[instrument(skip(api), fields(user_id = %user_id))]
pub async fn toggle_status(api: &ApiClient, user_id: &UserId) -> Result<UserResponse, ApiError> {
    api.post_empty(&user_path(user_id, "/toggle_status")?).await
}

/// `/admin/users/{id}{tail}`. Ids become a single path segment, so only
/// plain word characters are accepted.
fn user_path(user_id: &UserId, tail: &str) -> Result<String, ApiError> {
    if let UserId::Text(raw) = user_id {
        let plain = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
        if !plain {
            return Err(ApiError::Config(format!("Invalid user id: {raw}")));
        }
    }
    Ok(format!("/admin/users/{user_id}{tail}"))
}
