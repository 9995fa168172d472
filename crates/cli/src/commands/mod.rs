//! Command implementations, one module per area.

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod reports;
pub mod users;

use kirana_client::types::Cart;

/// Render a cart snapshot as a table.
pub fn print_cart(cart: &Cart) {
    if cart.items.is_empty() {
        println!("Cart is empty.");
        return;
    }

    println!("{:>6}  {:<32} {:>8} {:>10} {:>12}", "ID", "Product", "Unit", "Qty", "Line total");
    for item in &cart.items {
        println!(
            "{:>6}  {:<32} {:>8} {:>10} {:>12}",
            item.product.id,
            item.product.name,
            item.product.price,
            item.quantity,
            item.price,
        );
    }
    println!("{:>72}", format!("Total: {}", cart.total_price));
}
