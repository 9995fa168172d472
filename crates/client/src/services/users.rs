//! Admin user management endpoints.

use tracing::instrument;

use kirana_core::UserId;

use crate::api::ApiGateway;
use crate::error::Result;
use crate::types::{UserInput, UserSummary};

/// Client for `/admin/users`. Every call requires an admin session
/// server-side; the client does not pre-check.
#[derive(Debug, Clone)]
pub struct UserAdminService {
    gateway: ApiGateway,
}

impl UserAdminService {
    /// Create the service over a gateway.
    #[must_use]
    pub const fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<UserSummary>> {
        self.gateway.get("admin/users").await
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the caller is not an
    /// admin.
    #[instrument(skip(self))]
    pub async fn get(&self, id: UserId) -> Result<UserSummary> {
        self.gateway.get(&format!("admin/users/{id}")).await
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the caller is not an admin.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: &UserInput) -> Result<UserSummary> {
        self.gateway.post("admin/users", input).await
    }

    /// Update a user. An absent password keeps the current one.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the caller is not an admin.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn update(&self, id: UserId, input: &UserInput) -> Result<UserSummary> {
        self.gateway.put(&format!("admin/users/{id}"), input).await
    }

    /// Delete a user, along with their cart and orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<()> {
        self.gateway.delete_empty(&format!("admin/users/{id}")).await
    }
}
