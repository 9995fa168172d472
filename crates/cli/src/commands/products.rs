//! Catalog commands.

use clap::Args;
use rust_decimal::Decimal;

use kirana_core::ProductId;
use kirana_client::types::{Product, ProductInput};

use crate::context::AppContext;

/// Product fields shared by create and update.
#[derive(Debug, Args)]
pub struct ProductFields {
    /// Product name
    #[arg(short, long)]
    pub name: String,

    /// Price
    #[arg(short, long)]
    pub price: Decimal,

    /// Previous price, to show a discount
    #[arg(long)]
    pub old_price: Option<Decimal>,

    /// Units in stock
    #[arg(short, long)]
    pub stock: i32,

    /// Category name
    #[arg(short, long)]
    pub category: String,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Image URL
    #[arg(long)]
    pub image_url: Option<String>,
}

impl From<ProductFields> for ProductInput {
    fn from(fields: ProductFields) -> Self {
        Self {
            name: fields.name,
            price: fields.price,
            old_price: fields.old_price,
            stock: fields.stock,
            category: fields.category,
            description: fields.description,
            image_url: fields.image_url,
        }
    }
}

fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products.");
        return;
    }

    println!(
        "{:>6}  {:<32} {:<16} {:>10} {:>8}",
        "ID", "Name", "Category", "Price", "Stock"
    );
    for product in products {
        println!(
            "{:>6}  {:<32} {:<16} {:>10} {:>8}",
            product.id, product.name, product.category, product.price, product.stock
        );
    }
}

/// List products, optionally filtered.
pub async fn list(
    ctx: &AppContext,
    category: Option<&str>,
    search: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let products = ctx.catalog.list(category, search).await?;
    print_products(&products);
    Ok(())
}

/// Show one product in detail.
pub async fn show(ctx: &AppContext, id: ProductId) -> Result<(), Box<dyn std::error::Error>> {
    let product = ctx.catalog.get(id).await?;

    println!("{} (#{})", product.name, product.id);
    println!("category: {}", product.category);
    match product.old_price {
        Some(old_price) => println!("price:    {} (was {old_price})", product.price),
        None => println!("price:    {}", product.price),
    }
    println!("stock:    {}", product.stock);
    if let Some(description) = &product.description {
        println!("\n{description}");
    }
    if let Some(image_url) = &product.image_url {
        println!("\nimage: {image_url}");
    }
    Ok(())
}

/// Featured products.
pub async fn featured(ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    let products = ctx.catalog.featured().await?;
    print_products(&products);
    Ok(())
}

/// Category names.
pub async fn categories(ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    for category in ctx.catalog.categories().await? {
        println!("{category}");
    }
    Ok(())
}

/// Create a product (admin).
pub async fn create(
    ctx: &AppContext,
    fields: ProductFields,
) -> Result<(), Box<dyn std::error::Error>> {
    let product = ctx.catalog.create(&fields.into()).await?;
    println!("Created product #{}: {}", product.id, product.name);
    Ok(())
}

/// Update a product (admin).
pub async fn update(
    ctx: &AppContext,
    id: ProductId,
    fields: ProductFields,
) -> Result<(), Box<dyn std::error::Error>> {
    let product = ctx.catalog.update(id, &fields.into()).await?;
    println!("Updated product #{}: {}", product.id, product.name);
    Ok(())
}

/// Delete a product (admin).
pub async fn delete(ctx: &AppContext, id: ProductId) -> Result<(), Box<dyn std::error::Error>> {
    ctx.catalog.delete(id).await?;
    println!("Deleted product #{id}");
    Ok(())
}
