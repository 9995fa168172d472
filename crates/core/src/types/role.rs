//! User roles.

use serde::{Deserialize, Serialize};

/// Role of an authenticated user.
///
/// The backend serializes roles as upper-case strings (`"USER"`,
/// `"ADMIN"`). Parsing is case-insensitive; unknown or missing values fall
/// back to [`Role::User`], matching the backend's own lenient mapping.
///
/// The decoded role is advisory only: it decides what the client shows, not
/// what the user may do. Authorization is re-checked server-side on every
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular storefront customer.
    #[default]
    User,
    /// Store administrator.
    Admin,
}

impl Role {
    /// Whether this role unlocks the admin area client-side.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "USER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            other => Err(format!("invalid role: {other}")),
        }
    }
}
