//! API client for communicating with the DayFlow HRMS REST API.
//!
//! `ApiClient` is a pure transport: it reads the token store to attach the
//! bearer credential but never writes or clears it. Reacting to a rejected
//! credential is the session manager's job.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::config::Config;
use crate::models::{LoginRequest, LoginResponse, MeResponse, User};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Session validation endpoint
pub const ME_PATH: &str = "/auth/me";

/// Login endpoint
pub const LOGIN_PATH: &str = "/auth/login";

/// HTTP request timeout in seconds when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API client for the DayFlow server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client reading credentials from `tokens`
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    pub fn from_config(config: &Config, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
            tokens,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();

        let credential = match self.tokens.get() {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential, sending request without it");
                None
            }
        };

        if let Some(credential) = credential {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
                .map_err(|_| ApiError::Unauthorized {
                    message: Some("Stored credential is not a valid header value".to_string()),
                })?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request and decode the JSON response.
    ///
    /// The stored credential, when present, is attached as a bearer token.
    /// Failures are returned as-is; nothing is retried.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!(%method, url = %url, "Sending API request");

        let mut request = self
            .client
            .request(method, &url)
            .header(header::ACCEPT, "application/json")
            .headers(self.auth_headers()?);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e))
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    // ===== Auth Endpoints =====

    /// Fetch the user the stored credential belongs to
    pub async fn me(&self) -> Result<User, ApiError> {
        let response: MeResponse = self.get(ME_PATH).await?;
        Ok(response.into_user())
    }

    /// Exchange an identifier and secret for a credential and user record
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<LoginResponse, ApiError> {
        self.post(LOGIN_PATH, &LoginRequest::new(identifier, secret))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(
            base,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Arc::new(MemoryTokenStore::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_url_joining() {
        let c = client("http://localhost:5000/api/");
        assert_eq!(c.base_url(), "http://localhost:5000/api");
        assert_eq!(c.url("/auth/me"), "http://localhost:5000/api/auth/me");
        assert_eq!(c.url("auth/login"), "http://localhost:5000/api/auth/login");
    }

    #[test]
    fn test_auth_headers_without_credential() {
        let c = client("http://localhost:5000/api");
        assert!(c.auth_headers().unwrap().get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_auth_headers_with_credential() {
        let store = Arc::new(MemoryTokenStore::with_token("abc.def"));
        let c = ApiClient::new("http://localhost:5000/api", Duration::from_secs(5), store).unwrap();
        let headers = c.auth_headers().unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer abc.def");
    }

    #[test]
    fn test_invalid_header_credential_is_auth_error() {
        let store = Arc::new(MemoryTokenStore::with_token("bad\ntoken"));
        let c = ApiClient::new("http://localhost:5000/api", Duration::from_secs(5), store).unwrap();
        assert!(matches!(
            c.auth_headers(),
            Err(ApiError::Unauthorized { .. })
        ));
    }
}
