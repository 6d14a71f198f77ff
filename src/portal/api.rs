//! HTTP helpers for the portal's JSON API with a consistent timeout and error
//! policy. Feature clients go through these helpers so every request carries
//! the session cookie, a request id, and maps failures into one `ApiError`
//! taxonomy. The helpers never log request bodies; callers pass passwords in
//! bodies and must not log them either.

use super::{config::PortalConfig, cookies::SessionJar, errors::ApiError, APP_USER_AGENT};
use crate::features::validation::FieldErrors;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument};
use ulid::Ulid;
use url::Url;

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

/// Cookie-carrying client bound to one API base URL. Clones share the cookie
/// jar, so every clone sees the same session.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    jar: SessionJar,
}

/// JSON error body as the server emits it: `{message, errors}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<FieldErrors>,
}

impl ApiClient {
    /// Builds a client with the configured timeout and a cookie jar, loaded
    /// from the session file when one is configured.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the underlying HTTP client can't be built.
    pub fn new(config: &PortalConfig) -> Result<Self, ApiError> {
        let jar = config
            .session_file
            .clone()
            .map_or_else(SessionJar::in_memory, SessionJar::open);

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_provider(jar.provider())
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            jar,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn jar(&self) -> &SessionJar {
        &self.jar
    }

    /// Fetches JSON.
    ///
    /// # Errors
    /// Returns the mapped transport or HTTP error.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.client.get(self.url(path)?);
        let response = self.send(request).await?;
        handle_json_response(response).await
    }

    /// Fetches JSON with query parameters.
    ///
    /// # Errors
    /// Returns the mapped transport or HTTP error.
    pub async fn get_json_with_query<Q: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let request = self.client.get(self.url(path)?).query(query);
        let response = self.send(request).await?;
        handle_json_response(response).await
    }

    /// Fetches JSON and returns `None` on 204 or 401.
    ///
    /// # Errors
    /// Returns the mapped transport error or any other HTTP error.
    pub async fn get_optional_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ApiError> {
        let request = self.client.get(self.url(path)?);
        let response = self.send(request).await?;
        handle_optional_json_response(response).await
    }

    /// Posts JSON and parses a JSON response.
    ///
    /// # Errors
    /// Returns the mapped transport or HTTP error.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.client.post(self.url(path)?).json(body);
        let response = self.send(request).await?;
        handle_json_response(response).await
    }

    /// Posts an empty body and parses a JSON response.
    ///
    /// # Errors
    /// Returns the mapped transport or HTTP error.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.client.post(self.url(path)?);
        let response = self.send(request).await?;
        handle_json_response(response).await
    }

    /// Patches JSON and discards the response body.
    ///
    /// # Errors
    /// Returns the mapped transport or HTTP error.
    pub async fn patch_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let request = self.client.patch(self.url(path)?).json(body);
        let response = self.send(request).await?;
        handle_empty_response(response).await
    }

    /// Puts JSON and parses a JSON response.
    ///
    /// # Errors
    /// Returns the mapped transport or HTTP error.
    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.client.put(self.url(path)?).json(body);
        let response = self.send(request).await?;
        handle_json_response(response).await
    }

    /// Sends a DELETE and discards the response body.
    ///
    /// # Errors
    /// Returns the mapped transport or HTTP error.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.client.delete(self.url(path)?);
        let response = self.send(request).await?;
        handle_empty_response(response).await
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let raw = build_url_with_base(self.base_url.as_str(), path);
        Url::parse(&raw).map_err(|err| ApiError::Config(format!("Invalid request URL {raw}: {err}")))
    }

    /// Tags the request with a fresh id and maps transport failures.
    #[instrument(skip(self, request), fields(request_id = tracing::field::Empty))]
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request_id = Ulid::new().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let response = request
            .header("X-Request-Id", request_id.as_str())
            .send()
            .await
            .map_err(map_request_error)?;

        debug!(
            path = %response.url().path(),
            status = response.status().as_u16(),
            "response received"
        );

        Ok(response)
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps reqwest errors into `ApiError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Serialization(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

/// Handles responses whose body is irrelevant on success.
async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

/// Parses optional JSON responses and treats 204/401 as "nothing there".
async fn handle_optional_json_response<T: DeserializeOwned>(
    response: Response,
) -> Result<Option<T>, ApiError> {
    match response.status() {
        StatusCode::NO_CONTENT | StatusCode::UNAUTHORIZED => Ok(None),
        status if status.is_success() => response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}"))),
        _ => Err(http_error(response).await),
    }
}

async fn http_error(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    error_from_body(status, &body)
}

/// Reads `{message, errors}` when the body is JSON, otherwise keeps a
/// truncated copy of the raw text.
fn error_from_body(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ApiError::Http {
            status,
            message: parsed
                .message
                .map(|message| sanitize_body(&message))
                .unwrap_or_default(),
            field_errors: parsed.errors,
        },
        Err(_) => ApiError::Http {
            status,
            message: sanitize_body(body),
            field_errors: None,
        },
    }
}

/// Trims and truncates error bodies for user-facing messages.
fn sanitize_body(body: &str) -> String {
    body.trim().chars().take(MAX_ERROR_CHARS).collect()
}
