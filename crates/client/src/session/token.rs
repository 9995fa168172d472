//! Advisory decode of the session token.
//!
//! The backend issues a JWT whose payload carries the identity claims
//! (`uid`, `sub`, `role`, `exp`). The client decodes that payload without
//! verifying the signature: the decoded claims drive display only, and the
//! backend re-checks authorization on every request. A tampered token can
//! therefore change what the client shows, never what the server allows.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use kirana_core::{Email, Role, UserId};

use super::Identity;

/// Errors that can occur when decoding a session token.
///
/// Every variant is handled by treating the session as absent; decoding
/// never panics and never crashes the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a three-segment compact JWT.
    #[error("token is not in compact JWT form")]
    Malformed,

    /// Payload segment is not valid base64url.
    #[error("token payload is not valid base64url")]
    Encoding,

    /// Payload decoded but is not the expected claims object.
    #[error("token claims are malformed: {0}")]
    Claims(String),

    /// A claim is present but unusable (bad email, unknown role).
    #[error("invalid token claim: {0}")]
    InvalidClaim(String),

    /// The `exp` claim is in the past.
    #[error("token is expired")]
    Expired,
}

/// Claims carried in the token payload.
#[derive(Debug, Deserialize)]
struct Claims {
    /// Subject - the user's email address.
    sub: String,
    /// Backend user ID.
    uid: i64,
    /// Role name, upper-case on the wire.
    role: Option<String>,
    /// Expiry as seconds since the Unix epoch.
    exp: Option<i64>,
    /// Optional display name claim.
    name: Option<String>,
}

/// Decode a token into an [`Identity`].
///
/// Used identically by session restore and login so both paths agree on
/// what counts as a valid session.
///
/// # Errors
///
/// Returns a [`TokenError`] if the token is structurally malformed, its
/// claims are unusable, or it is expired. Callers treat any error as
/// "no session".
pub fn decode_identity(token: &str) -> Result<Identity, TokenError> {
    let claims = decode_claims(token)?;

    if let Some(exp) = claims.exp
        && Utc::now().timestamp() >= exp
    {
        return Err(TokenError::Expired);
    }

    let email = Email::parse(&claims.sub)
        .map_err(|e| TokenError::InvalidClaim(format!("sub: {e}")))?;

    let role = match claims.role {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|e| TokenError::InvalidClaim(format!("role: {e}")))?,
        None => return Err(TokenError::InvalidClaim("role claim missing".to_owned())),
    };

    Ok(Identity {
        id: UserId::new(claims.uid),
        email,
        name: claims.name,
        role,
    })
}

fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };

    // Some issuers pad the segments; base64url-no-pad rejects that
    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::Encoding)?;

    serde_json::from_slice(&bytes).map_err(|e| TokenError::Claims(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Build an unsigned token with the given payload claims.
    pub(crate) fn make_token(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{header}.{payload}.fake-signature")
    }

    /// A token for a regular user that expires far in the future.
    pub(crate) fn user_token() -> String {
        make_token(&serde_json::json!({
            "sub": "asha@example.com",
            "uid": 11,
            "role": "USER",
            "exp": 4_102_444_800_i64
        }))
    }

    #[test]
    fn test_decode_valid_token() {
        let identity = decode_identity(&user_token()).unwrap();
        assert_eq!(identity.id, UserId::new(11));
        assert_eq!(identity.email.as_str(), "asha@example.com");
        assert_eq!(identity.role, Role::User);
        assert!(identity.name.is_none());
    }

    #[test]
    fn test_decode_admin_role_case_insensitive() {
        let token = make_token(&serde_json::json!({
            "sub": "admin@example.com",
            "uid": 1,
            "role": "admin"
        }));
        let identity = decode_identity(&token).unwrap();
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn test_decode_name_claim() {
        let token = make_token(&serde_json::json!({
            "sub": "asha@example.com",
            "uid": 11,
            "role": "USER",
            "name": "Asha"
        }));
        let identity = decode_identity(&token).unwrap();
        assert_eq!(identity.name.as_deref(), Some("Asha"));
    }

    #[test]
    fn test_decode_expired_token() {
        let token = make_token(&serde_json::json!({
            "sub": "asha@example.com",
            "uid": 11,
            "role": "USER",
            "exp": 1_000_000_000_i64
        }));
        assert_eq!(decode_identity(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_decode_unknown_role_is_absent_session() {
        let token = make_token(&serde_json::json!({
            "sub": "asha@example.com",
            "uid": 11,
            "role": "SUPERUSER"
        }));
        assert!(matches!(
            decode_identity(&token),
            Err(TokenError::InvalidClaim(_))
        ));
    }

    #[test]
    fn test_decode_missing_role_is_absent_session() {
        let token = make_token(&serde_json::json!({
            "sub": "asha@example.com",
            "uid": 11
        }));
        assert!(matches!(
            decode_identity(&token),
            Err(TokenError::InvalidClaim(_))
        ));
    }

    #[test]
    fn test_decode_garbage_never_panics() {
        for garbage in [
            "",
            "not-a-token",
            "a.b",
            "a.b.c.d",
            "header.!!!not-base64!!!.sig",
        ] {
            assert!(decode_identity(garbage).is_err());
        }
    }

    #[test]
    fn test_decode_payload_not_json() {
        let header = URL_SAFE_NO_PAD.encode(b"{}");
        let payload = URL_SAFE_NO_PAD.encode(b"plain text");
        let token = format!("{header}.{payload}.sig");
        assert!(matches!(
            decode_identity(&token),
            Err(TokenError::Claims(_))
        ));
    }

    #[test]
    fn test_decode_accepts_padded_payload() {
        // Same claims, but with base64 padding characters appended
        let token = user_token();
        let mut parts = token.split('.');
        let header = parts.next().unwrap();
        let payload = parts.next().unwrap();
        let padded = format!("{header}.{payload}==.sig");
        assert!(decode_identity(&padded).is_ok());
    }

    #[test]
    fn test_tampered_payload_still_decodes() {
        // Decoding is advisory: a re-encoded payload with an elevated role
        // "succeeds" client-side. Authorization stays with the server.
        let token = make_token(&serde_json::json!({
            "sub": "asha@example.com",
            "uid": 11,
            "role": "ADMIN"
        }));
        let identity = decode_identity(&token).unwrap();
        assert_eq!(identity.role, Role::Admin);
    }
}
