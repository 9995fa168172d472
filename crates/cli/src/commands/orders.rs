//! Order commands.

use kirana_core::{OrderId, OrderStatus};
use kirana_client::types::Order;

use crate::context::AppContext;

fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders.");
        return;
    }

    println!(
        "{:>6}  {:<24} {:<20} {:>12} {:<12}",
        "ID", "Customer", "Placed", "Total", "Status"
    );
    for order in orders {
        println!(
            "{:>6}  {:<24} {:<20} {:>12} {:<12}",
            order.id,
            order.customer_name,
            order.order_date.format("%Y-%m-%d %H:%M"),
            order.total_price,
            order.status,
        );
    }
}

fn print_order(order: &Order) {
    println!("Order #{} - {}", order.id, order.status);
    println!("customer: {}", order.customer_name);
    println!("placed:   {}", order.order_date.format("%Y-%m-%d %H:%M:%S"));
    println!("payment:  {}", order.payment_method);
    println!();
    println!("{:<32} {:>8} {:>12}", "Product", "Qty", "Line total");
    for item in &order.order_items {
        println!(
            "{:<32} {:>8} {:>12}",
            item.product_name, item.quantity, item.price
        );
    }
    println!("{:>54}", format!("Total: {}", order.total_price));
}

/// Place an order from the current cart.
pub async fn place(
    ctx: &AppContext,
    payment_method: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let order = ctx.orders.place(payment_method).await?;

    println!("Order placed.");
    print_order(&order);

    // The backend drained the cart into the order; re-sync so the local
    // snapshot reflects that
    if let Err(e) = ctx.sync_cart().await {
        tracing::warn!("order placed but cart re-sync failed: {e}");
    }
    Ok(())
}

/// List the logged-in user's orders.
pub async fn my(ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    let orders = ctx.orders.my_orders().await?;
    print_orders(&orders);
    Ok(())
}

/// Show one order.
pub async fn show(ctx: &AppContext, id: OrderId) -> Result<(), Box<dyn std::error::Error>> {
    let order = ctx.orders.get(id).await?;
    print_order(&order);
    Ok(())
}

/// List all orders (admin).
pub async fn list(ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    let orders = ctx.orders.all().await?;
    print_orders(&orders);
    Ok(())
}

/// Change an order's status (admin).
pub async fn set_status(
    ctx: &AppContext,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), Box<dyn std::error::Error>> {
    let order = ctx.orders.set_status(id, status).await?;
    println!("Order #{} is now {}", order.id, order.status);
    Ok(())
}

/// Delete an order (admin).
pub async fn delete(ctx: &AppContext, id: OrderId) -> Result<(), Box<dyn std::error::Error>> {
    ctx.orders.delete(id).await?;
    println!("Deleted order #{id}");
    Ok(())
}
