//! Admin report commands.

use chrono::{NaiveDate, NaiveDateTime};

use crate::context::AppContext;

/// Parse a report window bound: full timestamp or date-only (midnight).
fn parse_bound(raw: &str) -> Result<NaiveDateTime, Box<dyn std::error::Error>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("invalid date {raw:?}: {e}"))?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("invalid date {raw:?}").into())
}

/// Sales totals.
pub async fn sales(
    ctx: &AppContext,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let from = from.map(parse_bound).transpose()?;
    let to = to.map(parse_bound).transpose()?;

    let summary = ctx.reports.sales_summary(from, to).await?;

    if let Some(from) = summary.from {
        println!("from:          {from}");
    }
    if let Some(to) = summary.to {
        println!("to:            {to}");
    }
    println!("total orders:  {}", summary.total_orders);
    println!("total revenue: {}", summary.total_revenue);
    Ok(())
}

/// Best-selling products.
pub async fn top_products(ctx: &AppContext, limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let rows = ctx.reports.top_products(limit).await?;
    if rows.is_empty() {
        println!("No sales yet.");
        return Ok(());
    }

    println!("{:>6}  {:<32} {:>10} {:>12}", "ID", "Name", "Sold", "Revenue");
    for row in rows {
        println!(
            "{:>6}  {:<32} {:>10} {:>12}",
            row.product_id, row.name, row.quantity_sold, row.revenue
        );
    }
    Ok(())
}

/// Products at or below a stock threshold.
pub async fn low_stock(ctx: &AppContext, threshold: u32) -> Result<(), Box<dyn std::error::Error>> {
    let rows = ctx.reports.low_stock(threshold).await?;
    if rows.is_empty() {
        println!("No products at or below stock {threshold}.");
        return Ok(());
    }

    println!("{:>6}  {:<32} {:>8}", "ID", "Name", "Stock");
    for row in rows {
        println!("{:>6}  {:<32} {:>8}", row.product_id, row.name, row.stock);
    }
    Ok(())
}
