//! Shared test support: an in-memory stand-in for the Kirana backend.
//!
//! The real backend is an external HTTP service; these tests exercise the
//! client's session/cart synchronization against a fake that honors the
//! same contract - server-authoritative snapshots, server-computed totals,
//! tokens carrying the identity claims.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rust_decimal::Decimal;

use kirana_core::{CartId, CartItemId, Email, ProductId, Role, UserId};

use kirana_client::ApiError;
use kirana_client::cart::CartApi;
use kirana_client::error::Result;
use kirana_client::session::AuthApi;
use kirana_client::types::{
    Cart, CartItem, CartProduct, LoginResponse, RegisterRequest, UserDisplay,
};

/// Build an unsigned token carrying the standard identity claims.
#[must_use]
pub fn make_token(uid: i64, email: &str, role: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = serde_json::json!({
        "sub": email,
        "uid": uid,
        "role": role,
        "exp": 4_102_444_800_i64
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.fake-signature")
}

/// The one registered account.
pub const ACCOUNT_EMAIL: &str = "asha@example.com";
/// Its password.
pub const ACCOUNT_PASSWORD: &str = "hunter2!";
/// Its user ID.
pub const ACCOUNT_UID: i64 = 11;

/// In-memory backend with a small product table and one user account.
///
/// Cart state lives "server-side" here: every response is a complete
/// snapshot with totals computed from the product table, exactly as the
/// real backend behaves.
#[derive(Default)]
pub struct FakeBackend {
    /// product id -> (name, unit price)
    products: BTreeMap<i64, (String, Decimal)>,
    /// product id -> quantity
    cart: Mutex<BTreeMap<i64, i32>>,
    /// Number of cart endpoint calls served.
    pub cart_calls: AtomicUsize,
}

impl FakeBackend {
    /// Backend with a seeded product table and an empty cart.
    #[must_use]
    pub fn new() -> Self {
        let mut products = BTreeMap::new();
        products.insert(7, ("Basmati Rice 5kg".to_owned(), Decimal::new(2550, 2)));
        products.insert(9, ("Turmeric 100g".to_owned(), Decimal::new(325, 2)));
        Self {
            products,
            cart: Mutex::new(BTreeMap::new()),
            cart_calls: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the current server-side cart.
    fn snapshot(&self) -> Cart {
        let cart = self.cart.lock().unwrap();
        let mut items = Vec::new();
        let mut total = Decimal::ZERO;
        for (line_no, (&product_id, &quantity)) in cart.iter().enumerate() {
            let (name, price) = self.products.get(&product_id).unwrap().clone();
            let line = price * Decimal::from(quantity);
            total += line;
            items.push(CartItem {
                id: CartItemId::new(i64::try_from(line_no).unwrap() + 1),
                quantity,
                price: line,
                product: CartProduct {
                    id: ProductId::new(product_id),
                    name,
                    price,
                    image_url: None,
                },
            });
        }
        Cart {
            id: CartId::new(12),
            items,
            total_price: total,
        }
    }

    fn record_call(&self) {
        self.cart_calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Cart endpoint calls served so far.
    pub fn calls(&self) -> usize {
        self.cart_calls.load(Ordering::SeqCst)
    }
}

impl AuthApi for FakeBackend {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        if email == ACCOUNT_EMAIL && password == ACCOUNT_PASSWORD {
            Ok(LoginResponse {
                token: make_token(ACCOUNT_UID, ACCOUNT_EMAIL, "USER"),
                user: UserDisplay {
                    id: UserId::new(ACCOUNT_UID),
                    name: "Asha".to_owned(),
                    email: Email::parse(ACCOUNT_EMAIL).unwrap(),
                    role: Role::User,
                },
            })
        } else {
            Err(ApiError::Unauthorized("Invalid credentials".to_owned()))
        }
    }

    async fn register(&self, request: &RegisterRequest) -> Result<UserDisplay> {
        Ok(UserDisplay {
            id: UserId::new(99),
            name: request.name.clone(),
            email: Email::parse(&request.email)
                .map_err(|e| ApiError::Validation(e.to_string()))?,
            role: Role::User,
        })
    }
}

impl CartApi for FakeBackend {
    async fn fetch_cart(&self) -> Result<Cart> {
        self.record_call();
        Ok(self.snapshot())
    }

    async fn add_item(&self, product_id: ProductId, quantity: i32) -> Result<Cart> {
        self.record_call();
        if !self.products.contains_key(&product_id.as_i64()) {
            return Err(ApiError::NotFound(format!(
                "Product not found with id: {product_id}"
            )));
        }
        {
            let mut cart = self.cart.lock().unwrap();
            *cart.entry(product_id.as_i64()).or_insert(0) += quantity;
        }
        Ok(self.snapshot())
    }

    async fn update_item(&self, product_id: ProductId, quantity: i32) -> Result<Cart> {
        self.record_call();
        {
            let mut cart = self.cart.lock().unwrap();
            if let Some(existing) = cart.get_mut(&product_id.as_i64()) {
                *existing = quantity;
            }
        }
        Ok(self.snapshot())
    }

    async fn remove_item(&self, product_id: ProductId) -> Result<Cart> {
        self.record_call();
        {
            let mut cart = self.cart.lock().unwrap();
            cart.remove(&product_id.as_i64());
        }
        Ok(self.snapshot())
    }

    async fn clear_cart(&self) -> Result<()> {
        self.record_call();
        self.cart.lock().unwrap().clear();
        Ok(())
    }
}
