//! Shared application context for CLI commands.

use kirana_client::api::{ApiGateway, TokenCell};
use kirana_client::cart::CartSynchronizer;
use kirana_client::config::KiranaConfig;
use kirana_client::services::{
    AuthService, CartService, CatalogService, OrderService, ReportService, UserAdminService,
};
use kirana_client::session::SessionStore;
use kirana_client::session::storage::FileTokenStorage;

/// Everything a command needs, wired once per invocation.
///
/// The token cell is shared between the session store (which writes it) and
/// the gateway (which reads it per request), so a login or logout is
/// immediately visible to every service.
pub struct AppContext {
    /// Session lifecycle and identity.
    pub sessions: SessionStore<AuthService, FileTokenStorage>,
    /// Cart snapshot owner.
    pub cart: CartSynchronizer<CartService>,
    /// Product catalog.
    pub catalog: CatalogService,
    /// Orders and checkout.
    pub orders: OrderService,
    /// Admin user management.
    pub users: UserAdminService,
    /// Admin reports.
    pub reports: ReportService,
}

impl AppContext {
    /// Build the context from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the HTTP client
    /// cannot be constructed.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = KiranaConfig::from_env()?;
        let token = TokenCell::new();
        let gateway = ApiGateway::new(&config, token.clone())?;

        let sessions = SessionStore::new(
            AuthService::new(gateway.clone()),
            FileTokenStorage::new(config.session_file.clone()),
            token,
        );
        let cart = CartSynchronizer::new(CartService::new(gateway.clone()));

        Ok(Self {
            sessions,
            cart,
            catalog: CatalogService::new(gateway.clone()),
            orders: OrderService::new(gateway.clone()),
            users: UserAdminService::new(gateway.clone()),
            reports: ReportService::new(gateway),
        })
    }

    /// Sync the cart with the current identity: apply the identity and,
    /// when logged in, fetch the snapshot.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure; the cart state also carries it.
    pub async fn sync_cart(&self) -> Result<(), kirana_client::ApiError> {
        let identity = self.sessions.identity();
        self.cart.apply_identity(identity.as_ref());
        if identity.is_some() {
            self.cart.refresh().await?;
        }
        Ok(())
    }
}
