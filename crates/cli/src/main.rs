//! Kirana CLI - Terminal storefront and admin console.
//!
//! # Usage
//!
//! ```bash
//! # Log in and browse
//! kirana login -e asha@example.com -p 'secret'
//! kirana products list --category Spices
//!
//! # Manage the cart and check out
//! kirana cart add 7 --quantity 2
//! kirana cart show
//! kirana orders place --payment-method CASH_ON_DELIVERY
//!
//! # Admin area (requires an ADMIN account)
//! kirana users list
//! kirana reports top-products --limit 5
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `register` / `whoami` - session lifecycle
//! - `products` - catalog browsing and admin catalog CRUD
//! - `cart` - cart management
//! - `orders` - checkout, order history, admin order management
//! - `users` - admin user management
//! - `reports` - admin sales/top-products/low-stock reports

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

use kirana_core::{OrderId, OrderStatus, ProductId, UserId};

mod commands;
mod context;

#[derive(Parser)]
#[command(name = "kirana")]
#[command(author, version, about = "E-Kirana storefront console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Log out and forget the stored session
    Logout,
    /// Register a new account (does not log in)
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Show the current session identity
    Whoami,
    /// Browse and manage the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place orders and view order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Manage users (admin)
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Reporting dashboard (admin)
    Reports {
        #[command(subcommand)]
        action: ReportsAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products, optionally filtered
    List {
        /// Only products in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Name search
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one product
    Show {
        /// Product ID
        id: ProductId,
    },
    /// Featured products
    Featured,
    /// List category names
    Categories,
    /// Create a product (admin)
    Create {
        #[command(flatten)]
        fields: commands::products::ProductFields,
    },
    /// Update a product (admin)
    Update {
        /// Product ID
        id: ProductId,

        #[command(flatten)]
        fields: commands::products::ProductFields,
    },
    /// Delete a product (admin)
    Delete {
        /// Product ID
        id: ProductId,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the current cart
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        product_id: ProductId,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: i32,
    },
    /// Set the quantity of a product in the cart (0 removes it)
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity
        #[arg(short, long)]
        quantity: i32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove everything from the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// Place an order from the current cart
    Place {
        /// Payment method
        #[arg(short, long, default_value = "CASH_ON_DELIVERY")]
        payment_method: String,
    },
    /// List your orders
    My,
    /// Show one order
    Show {
        /// Order ID
        id: OrderId,
    },
    /// List all orders (admin)
    List,
    /// Change an order's status (admin)
    Status {
        /// Order ID
        id: OrderId,

        /// New status (PENDING, CONFIRMED, SHIPPED, DELIVERED, CANCELLED)
        status: OrderStatus,
    },
    /// Delete an order (admin)
    Delete {
        /// Order ID
        id: OrderId,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// List all users
    List,
    /// Create a user
    Create {
        #[command(flatten)]
        fields: commands::users::UserFields,
    },
    /// Update a user
    Update {
        /// User ID
        id: UserId,

        #[command(flatten)]
        fields: commands::users::UserFields,
    },
    /// Delete a user
    Delete {
        /// User ID
        id: UserId,
    },
}

#[derive(Subcommand)]
enum ReportsAction {
    /// Sales totals, optionally bounded to a window
    Sales {
        /// Window start (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        from: Option<String>,

        /// Window end (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        to: Option<String>,
    },
    /// Best-selling products
    TopProducts {
        /// Number of rows
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Products at or below a stock threshold
    LowStock {
        /// Stock threshold
        #[arg(short, long, default_value_t = 5)]
        threshold: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = context::AppContext::from_env()?;

    // The session must be restored before anything identity-dependent runs
    ctx.sessions.restore();

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&ctx, &email, &password).await?,
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(&ctx, name, email, password).await?,
        Commands::Whoami => commands::auth::whoami(&ctx),
        Commands::Products { action } => match action {
            ProductsAction::List { category, search } => {
                commands::products::list(&ctx, category.as_deref(), search.as_deref()).await?;
            }
            ProductsAction::Show { id } => commands::products::show(&ctx, id).await?,
            ProductsAction::Featured => commands::products::featured(&ctx).await?,
            ProductsAction::Categories => commands::products::categories(&ctx).await?,
            ProductsAction::Create { fields } => commands::products::create(&ctx, fields).await?,
            ProductsAction::Update { id, fields } => {
                commands::products::update(&ctx, id, fields).await?;
            }
            ProductsAction::Delete { id } => commands::products::delete(&ctx, id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await?,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&ctx, product_id, quantity).await?,
            CartAction::Update {
                product_id,
                quantity,
            } => commands::cart::update(&ctx, product_id, quantity).await?,
            CartAction::Remove { product_id } => commands::cart::remove(&ctx, product_id).await?,
            CartAction::Clear => commands::cart::clear(&ctx).await?,
        },
        Commands::Orders { action } => match action {
            OrdersAction::Place { payment_method } => {
                commands::orders::place(&ctx, &payment_method).await?;
            }
            OrdersAction::My => commands::orders::my(&ctx).await?,
            OrdersAction::Show { id } => commands::orders::show(&ctx, id).await?,
            OrdersAction::List => commands::orders::list(&ctx).await?,
            OrdersAction::Status { id, status } => {
                commands::orders::set_status(&ctx, id, status).await?;
            }
            OrdersAction::Delete { id } => commands::orders::delete(&ctx, id).await?,
        },
        Commands::Users { action } => match action {
            UsersAction::List => commands::users::list(&ctx).await?,
            UsersAction::Create { fields } => commands::users::create(&ctx, fields).await?,
            UsersAction::Update { id, fields } => commands::users::update(&ctx, id, fields).await?,
            UsersAction::Delete { id } => commands::users::delete(&ctx, id).await?,
        },
        Commands::Reports { action } => match action {
            ReportsAction::Sales { from, to } => {
                commands::reports::sales(&ctx, from.as_deref(), to.as_deref()).await?;
            }
            ReportsAction::TopProducts { limit } => {
                commands::reports::top_products(&ctx, limit).await?;
            }
            ReportsAction::LowStock { threshold } => {
                commands::reports::low_stock(&ctx, threshold).await?;
            }
        },
    }
    Ok(())
}
