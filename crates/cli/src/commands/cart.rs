//! Cart commands.
//!
//! Every command syncs the cart with the restored identity first, then
//! issues at most one mutation. The printed snapshot is always the server's
//! response, never a local computation.

use kirana_core::ProductId;

use crate::commands::print_cart;
use crate::context::AppContext;

/// Show the current cart.
pub async fn show(ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    ctx.sync_cart().await?;

    match ctx.cart.state().cart {
        Some(cart) => print_cart(&cart),
        None => println!("Not logged in."),
    }
    Ok(())
}

/// Add a product.
pub async fn add(
    ctx: &AppContext,
    product_id: ProductId,
    quantity: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    ctx.sync_cart().await?;

    let cart = ctx.cart.add(product_id, quantity).await?;
    print_cart(&cart);
    Ok(())
}

/// Set the quantity of a product (0 removes it).
pub async fn update(
    ctx: &AppContext,
    product_id: ProductId,
    quantity: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    ctx.sync_cart().await?;

    let cart = ctx.cart.update(product_id, quantity).await?;
    print_cart(&cart);
    Ok(())
}

/// Remove a product.
pub async fn remove(
    ctx: &AppContext,
    product_id: ProductId,
) -> Result<(), Box<dyn std::error::Error>> {
    ctx.sync_cart().await?;

    let cart = ctx.cart.remove(product_id).await?;
    print_cart(&cart);
    Ok(())
}

/// Clear the cart.
pub async fn clear(ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    ctx.sync_cart().await?;

    ctx.cart.clear().await?;
    println!("Cart cleared.");
    Ok(())
}
