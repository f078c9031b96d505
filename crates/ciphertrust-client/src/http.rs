//! HTTP client with token authentication and retries
//!
//! Every resource handler reaches the appliance through [`CmClient`]. It owns
//! the JWT cache (password grant, then refresh grant) and the retry policy.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned, de::IgnoredAny};
use std::{
    sync::RwLock,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::{
    config::ClientConfig,
    constants::{DEFAULT_TOKEN_DURATION_SECS, TOKEN_REFRESH_MARGIN_SECS, api_path},
    error::{ClientError, Result},
    model::auth::{TokenRequest, TokenResponse},
};

/// Token info for authentication
#[derive(Clone, Debug)]
struct TokenInfo {
    jwt: String,
    refresh_token: Option<String>,
    refresh_at: Instant,
}

/// HTTP client for the CipherTrust Manager REST API
pub struct CmClient {
    client: Client,
    config: ClientConfig,
    base_url: String,
    token: RwLock<Option<TokenInfo>>,
    auth_lock: Mutex<()>,
}

impl CmClient {
    /// Create a new client. Authentication happens lazily on the first request.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.address.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "appliance address must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()?;

        Ok(Self::with_http_client(client, config))
    }

    fn with_http_client(client: Client, config: ClientConfig) -> Self {
        let base_url = config.base_url();
        Self {
            client,
            config,
            base_url,
            token: RwLock::new(None),
            auth_lock: Mutex::new(()),
        }
    }

    /// Client for another appliance node, sharing credentials and the
    /// connection pool but holding its own session.
    pub fn for_node(&self, address: &str) -> Self {
        let config = ClientConfig {
            address: address.to_string(),
            ..self.config.clone()
        };
        Self::with_http_client(self.client.clone(), config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build full URL for an API path
    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Current JWT if it is not due for refresh
    fn valid_token(&self) -> Option<String> {
        let token_guard = self.token.read().unwrap_or_else(|e| e.into_inner());
        token_guard
            .as_ref()
            .filter(|t| t.refresh_at > Instant::now())
            .map(|t| t.jwt.clone())
    }

    fn current_refresh_token(&self) -> Option<String> {
        let token_guard = self.token.read().unwrap_or_else(|e| e.into_inner());
        token_guard.as_ref().and_then(|t| t.refresh_token.clone())
    }

    fn set_token(&self, response: TokenResponse) {
        let duration = if response.duration > 0 {
            response.duration as u64
        } else {
            DEFAULT_TOKEN_DURATION_SECS
        };
        // Refresh ahead of expiry, but never later than half the lifetime
        let lead = TOKEN_REFRESH_MARGIN_SECS.min(duration / 2);
        let refresh_at = Instant::now() + Duration::from_secs(duration - lead);

        let mut token_guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        let refresh_token = response
            .refresh_token
            .or_else(|| token_guard.as_ref().and_then(|t| t.refresh_token.clone()));
        *token_guard = Some(TokenInfo {
            jwt: response.jwt,
            refresh_token,
            refresh_at,
        });
    }

    /// Mark the cached JWT as stale, keeping the refresh token
    fn invalidate_token(&self) {
        let mut token_guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = token_guard.as_mut() {
            token.refresh_at = Instant::now();
        }
    }

    /// Authenticate with the password grant
    pub async fn authenticate(&self) -> Result<()> {
        debug!(address = %self.config.address, user = %self.config.username, "authenticating");
        let request = TokenRequest::password(&self.config);
        self.request_token(&request).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<()> {
        debug!(address = %self.config.address, "refreshing session token");
        let request = TokenRequest::refresh(&self.config, refresh_token);
        self.request_token(&request).await
    }

    async fn request_token(&self, request: &TokenRequest<'_>) -> Result<()> {
        let url = self.build_url(api_path::AUTH_TOKENS);
        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::AuthFailed(format!(
                "status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response.json().await?;
        if token.jwt.is_empty() {
            return Err(ClientError::AuthFailed(
                "token response did not contain a jwt".to_string(),
            ));
        }
        self.set_token(token);
        Ok(())
    }

    /// Ensure we have a valid token, refreshing or re-authenticating if needed
    async fn ensure_token(&self) -> Result<String> {
        if let Some(jwt) = self.valid_token() {
            return Ok(jwt);
        }

        let _guard = self.auth_lock.lock().await;
        // Another request may have renewed the session while we waited
        if let Some(jwt) = self.valid_token() {
            return Ok(jwt);
        }

        let refreshed = match self.current_refresh_token() {
            Some(refresh_token) => match self.refresh(&refresh_token).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Token refresh failed, falling back to password grant: {}", e);
                    false
                }
            },
            None => false,
        };
        if !refreshed {
            self.authenticate().await?;
        }

        self.valid_token().ok_or_else(|| {
            ClientError::AuthFailed("no token available after authentication".to_string())
        })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request_with_retry(Method::GET, path, |request| request)
            .await
    }

    /// Make a GET request with query parameters
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        self.request_with_retry(Method::GET, path, |request| request.query(query))
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request_with_retry(Method::POST, path, |request| request.json(body))
            .await
    }

    /// Make a POST request without a body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request_with_retry(Method::POST, path, |request| request)
            .await
    }

    /// Make a PUT request with JSON body
    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request_with_retry(Method::PUT, path, |request| request.json(body))
            .await
    }

    /// Make a PATCH request with JSON body
    pub async fn patch_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request_with_retry(Method::PATCH, path, |request| request.json(body))
            .await
    }

    /// Make a DELETE request, discarding any response body
    pub async fn delete(&self, path: &str) -> Result<()> {
        let _: IgnoredAny = self
            .request_with_retry(Method::DELETE, path, |request| request)
            .await?;
        Ok(())
    }

    /// Generic request with retry logic
    async fn request_with_retry<T, F>(&self, method: Method, path: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = self.build_url(path);
        let mut attempt = 0;
        let mut reauthenticated = false;

        loop {
            let token = self.ensure_token().await?;
            debug!(%method, %url, attempt, "sending request");

            let request = build(self.client.request(method.clone(), &url).bearer_auth(&token));
            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::UNAUTHORIZED && !reauthenticated {
                        warn!("Token rejected by {}, re-authenticating...", url);
                        self.invalidate_token();
                        reauthenticated = true;
                        continue;
                    }
                    if is_retryable(status) && attempt < self.config.max_retries {
                        attempt += 1;
                        warn!(
                            "{} {} returned {}, retrying ({}/{})",
                            method, url, status, attempt, self.config.max_retries
                        );
                        self.backoff(attempt).await;
                        continue;
                    }
                    return self.handle_response(&method, &url, response).await;
                }
                Err(e) => {
                    if attempt < self.config.max_retries {
                        attempt += 1;
                        warn!(
                            "{} {} failed: {}, retrying ({}/{})",
                            method, url, e, attempt, self.config.max_retries
                        );
                        self.backoff(attempt).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    async fn backoff(&self, attempt: u32) {
        let delay = self.config.retry_backoff_ms.saturating_mul(attempt as u64);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    /// Handle response and parse JSON. An empty body parses as `null`.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &str,
        response: Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let body = if body.trim().is_empty() {
                "null"
            } else {
                body.as_str()
            };
            Ok(serde_json::from_str(body)?)
        } else {
            if status == StatusCode::NOT_FOUND {
                debug!("{} {} returned 404", method, url);
            } else {
                error!("{} {} failed with status {}: {}", method, url, status, body);
            }
            Err(ClientError::RequestFailed {
                status: status.as_u16(),
                body,
            })
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let client = CmClient::new(ClientConfig::new("https://cm.local")).unwrap();
        assert_eq!(
            client.build_url(api_path::USERS),
            "https://cm.local/api/v1/usermgmt/users"
        );
    }

    #[test]
    fn test_empty_address_rejected() {
        let result = CmClient::new(ClientConfig::new("  "));
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn test_for_node_keeps_credentials() {
        let client = CmClient::new(
            ClientConfig::new("https://node1.local").with_auth("admin", "secret"),
        )
        .unwrap();
        let node = client.for_node("https://node2.local");
        assert_eq!(node.config().username, "admin");
        assert_eq!(node.build_url("/v1/nodes"), "https://node2.local/api/v1/nodes");
    }

    #[test]
    fn test_short_token_lifetime_is_usable() {
        let client = CmClient::new(ClientConfig::new("https://cm.local")).unwrap();
        client.set_token(TokenResponse {
            jwt: "abc".to_string(),
            duration: 10,
            refresh_token: Some("r1".to_string()),
            ..Default::default()
        });
        assert_eq!(client.valid_token().as_deref(), Some("abc"));

        client.invalidate_token();
        assert!(client.valid_token().is_none());
        assert_eq!(client.current_refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
    }
}
