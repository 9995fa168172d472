//! Kirana Core - Shared types library.
//!
//! This crate provides common types used across the E-Kirana client
//! components:
//! - `client` - Typed client library for the Kirana REST backend
//! - `cli` - Terminal storefront and admin console
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles, and
//!   order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
