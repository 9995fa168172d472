//! Kirana Client - Typed client library for the E-Kirana REST backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth for pricing, stock, and order
//!   lifecycle - the client never recomputes, it mirrors.
//! - All network traffic flows through one [`api::ApiGateway`], which
//!   attaches the bearer token held in a shared [`api::TokenCell`].
//! - [`session::SessionStore`] owns "who is logged in": it persists the
//!   token, decodes identity claims from it, and publishes identity changes
//!   through a `tokio::sync::watch` channel.
//! - [`cart::CartSynchronizer`] owns the server-authoritative cart
//!   snapshot and keeps it consistent across logins, logouts, and
//!   overlapping mutations.
//! - [`services`] are thin typed wrappers over the gateway, one per
//!   backend resource (catalog, cart, orders, users, reports).
//!
//! # Example
//!
//! ```rust,ignore
//! use kirana_client::config::KiranaConfig;
//! use kirana_client::api::{ApiGateway, TokenCell};
//! use kirana_client::session::SessionStore;
//! use kirana_client::services::AuthService;
//! use kirana_client::session::storage::FileTokenStorage;
//!
//! let config = KiranaConfig::from_env()?;
//! let token = TokenCell::new();
//! let gateway = ApiGateway::new(&config, token.clone())?;
//! let sessions = SessionStore::new(
//!     AuthService::new(gateway.clone()),
//!     FileTokenStorage::new(config.session_file.clone()),
//!     token,
//! );
//! sessions.restore();
//! let identity = sessions.login("user@example.com", "hunter2!").await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod types;

pub use error::ApiError;
