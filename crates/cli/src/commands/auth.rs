//! Session commands: login, logout, register, whoami.

use kirana_client::types::RegisterRequest;

use crate::context::AppContext;

/// Log in and report the resulting identity.
pub async fn login(
    ctx: &AppContext,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let identity = ctx.sessions.login(email, password).await?;

    let name = identity.name.as_deref().unwrap_or(identity.email.as_str());
    println!("Logged in as {name} ({})", identity.role);
    Ok(())
}

/// Log out. Purely local; there is no backend call to wait for.
pub fn logout(ctx: &AppContext) {
    let was_logged_in = ctx.sessions.is_logged_in();
    ctx.sessions.logout();
    // The cart follows the identity immediately, without a server call
    ctx.cart.apply_identity(None);

    if was_logged_in {
        println!("Logged out.");
    } else {
        println!("No active session.");
    }
}

/// Register a new account.
pub async fn register(
    ctx: &AppContext,
    name: String,
    email: String,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = ctx
        .sessions
        .register(&RegisterRequest {
            name,
            email,
            password,
        })
        .await?;

    println!("Registered {} ({}). You can now log in.", user.name, user.email);
    Ok(())
}

/// Show the current identity.
pub fn whoami(ctx: &AppContext) {
    match ctx.sessions.identity() {
        Some(identity) => {
            println!("id:    {}", identity.id);
            println!("email: {}", identity.email);
            if let Some(name) = &identity.name {
                println!("name:  {name}");
            }
            println!("role:  {}", identity.role);
        }
        None => println!("Not logged in."),
    }
}
