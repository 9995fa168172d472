//! Session store - the single source of truth for "who is logged in".
//!
//! Identity is derived solely from the session token's claims; the
//! persisted display user only fills in a name the token may not carry.
//! Identity changes are published through a `tokio::sync::watch` channel so
//! any number of subscribers (the cart synchronizer, the view layer) can
//! react without polling.

pub mod storage;
pub mod token;

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use kirana_core::{Email, Role, UserId};

use crate::api::TokenCell;
use crate::error::Result;
use crate::types::{LoginResponse, RegisterRequest, UserDisplay};

use storage::{StoredSession, TokenStorage};

/// The decoded identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Backend user ID (`uid` claim).
    pub id: UserId,
    /// Email address (`sub` claim).
    pub email: Email,
    /// Display name, from the token or the persisted display user.
    pub name: Option<String>,
    /// Role (`role` claim). Advisory - authorization is server-side.
    pub role: Role,
}

/// Authentication endpoints the session store depends on.
///
/// Implemented by [`crate::services::AuthService`] over the live gateway
/// and by in-memory fakes in tests.
pub trait AuthApi {
    /// `POST /auth/login`.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginResponse>> + Send;

    /// `POST /auth/register`.
    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<UserDisplay>> + Send;
}

impl<A: AuthApi + ?Sized> AuthApi for std::sync::Arc<A> {
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginResponse>> + Send {
        (**self).login(email, password)
    }

    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<UserDisplay>> + Send {
        (**self).register(request)
    }
}

/// Owns the session lifecycle: restore on startup, login, logout.
///
/// Construction is explicit (no hidden singleton): the caller wires in the
/// auth transport, the durable storage, and the [`TokenCell`] shared with
/// the API gateway. All methods take `&self`; the store is cheap to share.
pub struct SessionStore<A, S> {
    auth: A,
    storage: S,
    token: TokenCell,
    identity_tx: watch::Sender<Option<Identity>>,
}

impl<A: AuthApi, S: TokenStorage> SessionStore<A, S> {
    /// Create a logged-out session store.
    #[must_use]
    pub fn new(auth: A, storage: S, token: TokenCell) -> Self {
        let (identity_tx, _) = watch::channel(None);
        Self {
            auth,
            storage,
            token,
            identity_tx,
        }
    }

    /// Restore a previously persisted session.
    ///
    /// Synchronous and network-free: it must complete before any
    /// identity-dependent output is rendered. A missing, unreadable, or
    /// undecodable session is treated as logged out, and undecodable
    /// storage is purged so the next start is clean.
    pub fn restore(&self) -> Option<Identity> {
        let stored = match self.storage.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                self.publish(None);
                return None;
            }
            Err(e) => {
                warn!("failed to read persisted session, treating as logged out: {e}");
                self.purge();
                return None;
            }
        };

        match token::decode_identity(&stored.token) {
            Ok(identity) => {
                let identity = with_display_name(identity, stored.user.as_ref());
                self.token.set(SecretString::from(stored.token));
                self.publish(Some(identity.clone()));
                Some(identity)
            }
            Err(e) => {
                debug!("persisted token rejected ({e}), purging session");
                self.purge();
                None
            }
        }
    }

    /// Log in with email and password.
    ///
    /// On success the returned token is persisted and decoded through the
    /// same routine as [`restore`](Self::restore), and the new identity is
    /// published. On failure prior state is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the login failure (bad credentials, transport error) or a
    /// token error if the server hands back an undecodable token.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity> {
        let response = self.auth.login(email, password).await?;

        // Same decode path as restore(); a token we cannot decode now is a
        // token we could not restore later, so reject it up front.
        let identity = token::decode_identity(&response.token)?;
        let identity = with_display_name(identity, Some(&response.user));

        let stored = StoredSession {
            token: response.token.clone(),
            user: Some(response.user),
        };
        if let Err(e) = self.storage.save(&stored) {
            // The in-memory session still works; only restart loses it
            warn!("failed to persist session: {e}");
        }

        self.token.set(SecretString::from(response.token));
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    /// Register a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns the backend's validation or transport failure.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserDisplay> {
        self.auth.register(request).await
    }

    /// Log out: purge persisted state, forget the token, publish `None`.
    ///
    /// Entirely local and synchronous - the backend has no logout side
    /// effect to await, and subscribers observe the identity loss before
    /// this method returns.
    pub fn logout(&self) {
        self.purge();
    }

    /// Current identity, if logged in. Synchronous, no network.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.identity_tx.borrow().clone()
    }

    /// Whether an identity is currently present.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.identity_tx.borrow().is_some()
    }

    /// Subscribe to identity changes.
    ///
    /// The receiver starts at the current value; each `login`/`logout`/
    /// `restore` publishes exactly once.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity_tx.subscribe()
    }

    fn purge(&self) {
        if let Err(e) = self.storage.clear() {
            warn!("failed to clear persisted session: {e}");
        }
        self.token.clear();
        self.publish(None);
    }

    fn publish(&self, identity: Option<Identity>) {
        // send_replace rather than send: publishing must succeed even with
        // no subscribers yet
        let _ = self.identity_tx.send_replace(identity);
    }
}

/// Prefer the token's own name claim, fall back to the persisted display
/// user.
fn with_display_name(mut identity: Identity, user: Option<&UserDisplay>) -> Identity {
    if identity.name.is_none() {
        identity.name = user.map(|u| u.name.clone());
    }
    identity
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::error::ApiError;
    use storage::MemoryTokenStorage;
    use token::tests::{make_token, user_token};

    /// Scripted auth transport.
    struct FakeAuthApi {
        login_response: Mutex<Option<Result<LoginResponse>>>,
    }

    impl FakeAuthApi {
        fn ok(token: String, user: UserDisplay) -> Self {
            Self {
                login_response: Mutex::new(Some(Ok(LoginResponse { token, user }))),
            }
        }

        fn failing() -> Self {
            Self {
                login_response: Mutex::new(Some(Err(ApiError::Unauthorized(
                    "bad credentials".to_owned(),
                )))),
            }
        }

        fn unused() -> Self {
            Self {
                login_response: Mutex::new(None),
            }
        }
    }

    impl AuthApi for FakeAuthApi {
        async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse> {
            self.login_response
                .lock()
                .unwrap()
                .take()
                .expect("unexpected login call")
        }

        async fn register(&self, request: &RegisterRequest) -> Result<UserDisplay> {
            Ok(UserDisplay {
                id: UserId::new(99),
                name: request.name.clone(),
                email: Email::parse(&request.email).unwrap(),
                role: Role::User,
            })
        }
    }

    fn display_user() -> UserDisplay {
        UserDisplay {
            id: UserId::new(11),
            name: "Asha".to_owned(),
            email: Email::parse("asha@example.com").unwrap(),
            role: Role::User,
        }
    }

    #[test]
    fn test_restore_without_stored_session() {
        let store = SessionStore::new(
            FakeAuthApi::unused(),
            MemoryTokenStorage::new(),
            TokenCell::new(),
        );
        assert!(store.restore().is_none());
        assert!(!store.is_logged_in());
        assert!(!store.token().is_set());
    }

    #[test]
    fn test_restore_with_valid_token() {
        let storage = MemoryTokenStorage::with_session(StoredSession {
            token: user_token(),
            user: Some(display_user()),
        });
        let cell = TokenCell::new();
        let store = SessionStore::new(FakeAuthApi::unused(), storage, cell.clone());

        let identity = store.restore().unwrap();
        assert_eq!(identity.id, UserId::new(11));
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.name.as_deref(), Some("Asha"));
        assert!(cell.is_set());
        assert_eq!(store.identity(), Some(identity));
    }

    #[test]
    fn test_restore_with_expired_token_purges() {
        let storage = MemoryTokenStorage::with_session(StoredSession {
            token: make_token(&serde_json::json!({
                "sub": "asha@example.com",
                "uid": 11,
                "role": "USER",
                "exp": 1_000_000_000_i64
            })),
            user: None,
        });
        let store = SessionStore::new(FakeAuthApi::unused(), storage, TokenCell::new());

        assert!(store.restore().is_none());
        assert!(!store.token().is_set());
        // The bad token is gone from storage
        assert!(store.storage.load().unwrap().is_none());
    }

    #[test]
    fn test_restore_with_garbage_token_purges() {
        let storage = MemoryTokenStorage::with_session(StoredSession {
            token: "not-a-jwt".to_owned(),
            user: None,
        });
        let store = SessionStore::new(FakeAuthApi::unused(), storage, TokenCell::new());

        assert!(store.restore().is_none());
        assert!(store.storage.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_publishes_identity_and_persists() {
        let store = SessionStore::new(
            FakeAuthApi::ok(user_token(), display_user()),
            MemoryTokenStorage::new(),
            TokenCell::new(),
        );
        let mut rx = store.subscribe();
        assert!(rx.borrow_and_update().is_none());

        let identity = store.login("asha@example.com", "hunter2!").await.unwrap();
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.name.as_deref(), Some("Asha"));

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().clone(), Some(identity));

        let stored = store.storage.load().unwrap().unwrap();
        assert_eq!(stored.token, user_token());
        assert!(store.token().is_set());
    }

    #[tokio::test]
    async fn test_login_failure_leaves_state_untouched() {
        let store = SessionStore::new(
            FakeAuthApi::failing(),
            MemoryTokenStorage::new(),
            TokenCell::new(),
        );

        let err = store.login("asha@example.com", "wrong").await.unwrap_err();
        assert!(err.is_auth());
        assert!(!store.is_logged_in());
        assert!(!store.token().is_set());
        assert!(store.storage.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_everything_synchronously() {
        let store = SessionStore::new(
            FakeAuthApi::ok(user_token(), display_user()),
            MemoryTokenStorage::new(),
            TokenCell::new(),
        );
        store.login("asha@example.com", "hunter2!").await.unwrap();
        assert!(store.is_logged_in());

        store.logout();

        // Observable before any further await point
        assert!(!store.is_logged_in());
        assert!(!store.token().is_set());
        assert!(store.storage.load().unwrap().is_none());
    }

    impl<A: AuthApi, S: TokenStorage> SessionStore<A, S> {
        fn token(&self) -> &TokenCell {
            &self.token
        }
    }
}
