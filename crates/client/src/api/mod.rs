//! HTTP gateway to the Kirana backend.
//!
//! All outbound traffic goes through [`ApiGateway`] - a single `reqwest`
//! client that attaches the current bearer token to every request and maps
//! failures into [`ApiError`] uniformly. It does not interpret response
//! bodies beyond JSON decoding, does not retry, and does not turn a 401
//! into a logout; those policies belong to the callers.

use std::sync::{Arc, RwLock};

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::KiranaConfig;
use crate::error::{ApiError, Result};

// =============================================================================
// TokenCell
// =============================================================================

/// Shared holder for the current session token.
///
/// The session store writes it on login/restore and clears it on logout;
/// the gateway reads it on every request. Reading at request time (rather
/// than capturing at construction) guarantees a newly-logged-out gateway
/// never leaks the previous user's token.
#[derive(Debug, Clone, Default)]
pub struct TokenCell {
    inner: Arc<RwLock<Option<SecretString>>>,
}

impl TokenCell {
    /// Create an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held token.
    pub fn set(&self, token: SecretString) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(token);
        }
    }

    /// Forget the held token.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }

    /// Current token, if any.
    #[must_use]
    pub fn get(&self) -> Option<SecretString> {
        self.inner.read().ok().and_then(|guard| guard.clone())
    }

    /// Whether a token is currently held.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.inner.read().is_ok_and(|guard| guard.is_some())
    }
}

// =============================================================================
// ApiGateway
// =============================================================================

/// Single choke point for all backend calls.
#[derive(Clone)]
pub struct ApiGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    client: reqwest::Client,
    base_url: Url,
    token: TokenCell,
}

impl ApiGateway {
    /// Create a gateway from configuration.
    ///
    /// The request timeout from config, when set, applies to every request;
    /// without it requests wait on the transport layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &KiranaConfig, token: TokenCell) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            inner: Arc::new(GatewayInner {
                client,
                base_url: config.base_url.clone(),
                token,
            }),
        })
    }

    /// The token cell this gateway reads from.
    #[must_use]
    pub fn token(&self) -> &TokenCell {
        &self.inner.token
    }

    /// `GET` a JSON resource.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        let body = self.send(self.inner.client.get(url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `GET` a JSON resource with query parameters.
    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let body = self
            .send(self.inner.client.get(url).query(query))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `POST` a JSON body, expecting a JSON response.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let text = self.send(self.inner.client.post(url).json(body)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `PUT` a JSON body, expecting a JSON response.
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let text = self.send(self.inner.client.put(url).json(body)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `PUT` with query parameters and no body, expecting a JSON response.
    pub async fn put_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let text = self
            .send(self.inner.client.put(url).query(query))
            .await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `DELETE`, expecting a JSON response.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        let text = self.send(self.inner.client.delete(url)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `DELETE` with a JSON body, expecting a JSON response.
    ///
    /// The cart remove endpoint identifies its target in the request body.
    pub async fn delete_with_body<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let text = self
            .send(self.inner.client.delete(url).json(body))
            .await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `DELETE`, ignoring the response body.
    pub async fn delete_empty(&self, path: &str) -> Result<()> {
        let url = self.endpoint(path)?;
        self.send(self.inner.client.delete(url)).await?;
        Ok(())
    }

    /// `DELETE`, returning the raw response body.
    ///
    /// The cart clear endpoint answers with a plain confirmation string
    /// rather than a cart payload.
    pub async fn delete_text(&self, path: &str) -> Result<String> {
        let url = self.endpoint(path)?;
        self.send(self.inner.client.delete(url)).await
    }

    /// Resolve a relative path against the configured base URL.
    fn endpoint(&self, path: &str) -> Result<Url> {
        // A leading slash would discard any path component of the base URL
        let relative = path.trim_start_matches('/');
        self.inner.base_url.join(relative).map_err(|e| {
            ApiError::Validation(format!("invalid request path {path:?}: {e}"))
        })
    }

    /// Attach the bearer token (when held), send, and map the response.
    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let request = match self.inner.token.get() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            debug!(%status, "backend returned non-success status");
            Err(ApiError::from_status(status, &body))
        }
    }
}

impl std::fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGateway")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.inner.token.is_set())
            .finish_non_exhaustive()
    }
}
