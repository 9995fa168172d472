//! Admin user management commands.

use clap::Args;

use kirana_core::{Role, UserId};
use kirana_client::types::UserInput;

use crate::context::AppContext;

/// User fields shared by create and update.
#[derive(Debug, Args)]
pub struct UserFields {
    /// Display name
    #[arg(short, long)]
    pub name: String,

    /// Email address
    #[arg(short, long)]
    pub email: String,

    /// Password (on update, omit to keep the current one)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Role (USER or ADMIN)
    #[arg(short, long, default_value = "USER")]
    pub role: Role,
}

impl From<UserFields> for UserInput {
    fn from(fields: UserFields) -> Self {
        Self {
            name: fields.name,
            email: fields.email,
            password: fields.password,
            role: fields.role,
        }
    }
}

/// List all users.
pub async fn list(ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    let users = ctx.users.list().await?;
    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }

    println!("{:>6}  {:<24} {:<32} {:<8}", "ID", "Name", "Email", "Role");
    for user in users {
        println!(
            "{:>6}  {:<24} {:<32} {:<8}",
            user.id, user.name, user.email, user.role
        );
    }
    Ok(())
}

/// Create a user.
pub async fn create(ctx: &AppContext, fields: UserFields) -> Result<(), Box<dyn std::error::Error>> {
    let user = ctx.users.create(&fields.into()).await?;
    println!("Created user #{}: {} ({})", user.id, user.name, user.role);
    Ok(())
}

/// Update a user.
pub async fn update(
    ctx: &AppContext,
    id: UserId,
    fields: UserFields,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = ctx.users.update(id, &fields.into()).await?;
    println!("Updated user #{}: {} ({})", user.id, user.name, user.role);
    Ok(())
}

/// Delete a user.
pub async fn delete(ctx: &AppContext, id: UserId) -> Result<(), Box<dyn std::error::Error>> {
    ctx.users.delete(id).await?;
    println!("Deleted user #{id}");
    Ok(())
}
