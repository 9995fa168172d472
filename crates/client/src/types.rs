//! Wire types for the Kirana REST backend.
//!
//! These mirror the backend's JSON shapes one-to-one. Field names are
//! camelCase on the wire; money is carried as JSON numbers and parsed into
//! `Decimal`. None of these types carry client-side logic beyond small
//! display helpers - the backend's values are authoritative.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kirana_core::{CartId, CartItemId, Email, OrderId, OrderStatus, ProductId, Role, UserId};

// =============================================================================
// Auth Types
// =============================================================================

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Denormalized display user, persisted alongside the token.
    pub user: UserDisplay,
}

/// Denormalized user object returned at login and kept in durable storage.
///
/// Display convenience only - identity derives from the token claims, and
/// this object is never consulted for authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDisplay {
    /// User's backend ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Role at login time.
    #[serde(default)]
    pub role: Role,
}

/// Request body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plaintext password; hashed server-side.
    pub password: String,
}

// =============================================================================
// Product Types
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Current price.
    pub price: Decimal,
    /// Previous price, present when the product is discounted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_price: Option<Decimal>,
    /// Units in stock.
    pub stock: i32,
    /// Category name.
    pub category: String,
    /// Product description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Product image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Page envelope returned by `GET /products`.
///
/// The backend pages with Spring conventions; only `content` is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPage {
    /// Products on this page.
    pub content: Vec<Product>,
}

/// Request body for admin product create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    /// Product name.
    pub name: String,
    /// Current price.
    pub price: Decimal,
    /// Previous price, for showing a discount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_price: Option<Decimal>,
    /// Units in stock.
    pub stock: i32,
    /// Category name.
    pub category: String,
    /// Product description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Product image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Product projection embedded in cart items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    /// Product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Unit price at the time the snapshot was computed.
    pub price: Decimal,
    /// Product image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Cart item ID.
    pub id: CartItemId,
    /// Quantity, at least 1 in server snapshots.
    pub quantity: i32,
    /// Server-computed line total (unit price x quantity).
    pub price: Decimal,
    /// The referenced product.
    pub product: CartProduct,
}

/// The complete, server-authoritative cart snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Cart lines, in server order.
    pub items: Vec<CartItem>,
    /// Server-computed total.
    pub total_price: Decimal,
}

impl Cart {
    /// An empty snapshot, used after a successful `clear` (that endpoint
    /// returns no cart payload).
    #[must_use]
    pub const fn empty(id: CartId) -> Self {
        Self {
            id,
            items: Vec::new(),
            total_price: Decimal::ZERO,
        }
    }

    /// Total item count across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i64::from(i.quantity)).sum()
    }

    /// Recompute the total from unit prices and quantities.
    ///
    /// The client never substitutes this for `total_price`; it exists so
    /// tests can assert the server invariant
    /// `total_price == sum(product.price * quantity)`.
    #[must_use]
    pub fn computed_total(&self) -> Decimal {
        self.items
            .iter()
            .map(|i| i.product.price * Decimal::from(i.quantity))
            .sum()
    }
}

/// Request body shared by the cart mutation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRequest {
    /// Target product.
    pub product_id: ProductId,
    /// Quantity to add or set; ignored by remove.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

// =============================================================================
// Order Types
// =============================================================================

/// A line in an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Name of the ordered product at purchase time.
    pub product_name: String,
    /// Quantity ordered.
    pub quantity: i32,
    /// Line total.
    pub price: Decimal,
}

/// An order as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// Name of the ordering customer.
    pub customer_name: String,
    /// Order lines.
    pub order_items: Vec<OrderItem>,
    /// Server-computed total.
    pub total_price: Decimal,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Payment method chosen at checkout.
    pub payment_method: String,
    /// When the order was placed (backend local time, no zone).
    pub order_date: NaiveDateTime,
}

/// Request body of `POST /orders/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    /// Payment method, e.g. `"CASH_ON_DELIVERY"`.
    pub payment_method: String,
}

// =============================================================================
// Admin User Types
// =============================================================================

/// User row in the admin user list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Role.
    #[serde(default)]
    pub role: Role,
}

/// Request body for admin user create/update.
///
/// `password` is optional on update (absent keeps the current one); the
/// backend defaults a missing or unknown `role` to `USER`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plaintext password; hashed server-side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Role to assign.
    #[serde(default)]
    pub role: Role,
}

// =============================================================================
// Report Types
// =============================================================================

/// Response of `GET /admin/reports/sales`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    /// Orders in the window.
    pub total_orders: i64,
    /// Revenue in the window.
    pub total_revenue: Decimal,
    /// Window start, if bounded.
    #[serde(default)]
    pub from: Option<NaiveDateTime>,
    /// Window end, if bounded.
    #[serde(default)]
    pub to: Option<NaiveDateTime>,
}

/// Row of `GET /admin/reports/top-products`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    /// Product ID.
    pub product_id: ProductId,
    /// Product name.
    pub name: String,
    /// Units sold.
    pub quantity_sold: i64,
    /// Revenue attributed to the product.
    pub revenue: Decimal,
}

/// Row of `GET /admin/reports/low-stock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    /// Product ID.
    pub product_id: ProductId,
    /// Product name.
    pub name: String,
    /// Remaining units.
    pub stock: i32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_cart() -> Cart {
        serde_json::from_str(
            r#"{
                "id": 12,
                "items": [
                    {
                        "id": 1,
                        "quantity": 2,
                        "price": 51.0,
                        "product": {"id": 7, "name": "Basmati Rice 5kg", "price": 25.5, "imageUrl": "http://img/rice.png"}
                    },
                    {
                        "id": 2,
                        "quantity": 1,
                        "price": 3.25,
                        "product": {"id": 9, "name": "Turmeric 100g", "price": 3.25}
                    }
                ],
                "totalPrice": 54.25
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_cart_deserializes_camel_case() {
        let cart = sample_cart();
        assert_eq!(cart.id, CartId::new(12));
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].product.id, ProductId::new(7));
        assert_eq!(
            cart.items[0].product.image_url.as_deref(),
            Some("http://img/rice.png")
        );
        assert_eq!(cart.total_price, Decimal::new(5425, 2));
    }

    #[test]
    fn test_cart_total_matches_line_computation() {
        let cart = sample_cart();
        assert_eq!(cart.computed_total(), cart.total_price);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::empty(CartId::new(12));
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_price, Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_cart_request_omits_missing_quantity() {
        let remove = CartRequest {
            product_id: ProductId::new(5),
            quantity: None,
        };
        let json = serde_json::to_value(&remove).unwrap();
        assert_eq!(json, serde_json::json!({"productId": 5}));

        let add = CartRequest {
            product_id: ProductId::new(5),
            quantity: Some(3),
        };
        let json = serde_json::to_value(&add).unwrap();
        assert_eq!(json, serde_json::json!({"productId": 5, "quantity": 3}));
    }

    #[test]
    fn test_product_page_envelope() {
        let page: ProductPage = serde_json::from_str(
            r#"{"content": [{"id": 1, "name": "Salt", "price": 0.9, "stock": 10, "category": "Spices"}], "totalElements": 1, "number": 0}"#,
        )
        .unwrap();
        assert_eq!(page.content.len(), 1);
        assert!(page.content[0].old_price.is_none());
    }

    #[test]
    fn test_order_dates_without_zone() {
        let order: Order = serde_json::from_str(
            r#"{
                "id": 3,
                "customerName": "Asha",
                "orderItems": [{"productName": "Salt", "quantity": 2, "price": 1.8}],
                "totalPrice": 1.8,
                "status": "PENDING",
                "paymentMethod": "CASH_ON_DELIVERY",
                "orderDate": "2026-03-01T09:30:00"
            }"#,
        )
        .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.order_date.to_string(), "2026-03-01 09:30:00");
    }
}
