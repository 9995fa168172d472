//! Authentication endpoints.

use tracing::instrument;

use crate::api::ApiGateway;
use crate::error::Result;
use crate::session::AuthApi;
use crate::types::{LoginResponse, RegisterRequest, UserDisplay};

/// Client for `/auth`.
#[derive(Debug, Clone)]
pub struct AuthService {
    gateway: ApiGateway,
}

impl AuthService {
    /// Create the service over a gateway.
    #[must_use]
    pub const fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }
}

impl AuthApi for AuthService {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        self.gateway
            .post(
                "auth/login",
                &serde_json::json!({ "email": email, "password": password }),
            )
            .await
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn register(&self, request: &RegisterRequest) -> Result<UserDisplay> {
        self.gateway.post("auth/register", request).await
    }
}
