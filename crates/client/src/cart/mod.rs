//! Cart synchronizer - keeps one server-authoritative cart snapshot
//! consistent with the backend.
//!
//! # State machine
//!
//! `NoSession -> Loading -> Ready -> (Loading on next mutation or identity
//! change) -> Ready`, with `Error` reachable from `Loading` on any failure.
//! `Error` is only left on the next triggering event (identity change,
//! explicit refresh, or a new mutation) - never by background retry.
//!
//! # Snapshot replacement
//!
//! Every successful mutation replaces the entire snapshot with the server's
//! response; nothing is merged locally, so the client can never drift from
//! server-computed pricing and totals. The one asymmetry is `clear`, whose
//! endpoint returns no cart payload: the empty snapshot is synthesized
//! locally after the call succeeds.
//!
//! # Overlapping mutations
//!
//! Mutations are not serialized. If two mutations overlap in flight, each
//! response still replaces the whole snapshot, so the last response to
//! *resolve* wins - not the last one issued. This is a known race inherited
//! from the design, kept deliberately; serializing would change observable
//! behavior. What *is* guarded is identity: every continuation re-checks a
//! session epoch before touching state, so a response that arrives after a
//! logout (or an identity switch) is discarded without effect.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, instrument};

use kirana_core::{CartId, ProductId};

use crate::error::{ApiError, Result};
use crate::session::Identity;
use crate::types::Cart;

/// Cart endpoints the synchronizer depends on.
///
/// Implemented by [`crate::services::CartService`] over the live gateway
/// and by in-memory fakes in tests.
pub trait CartApi {
    /// `GET /cart`.
    fn fetch_cart(&self) -> impl Future<Output = Result<Cart>> + Send;

    /// `POST /cart/add`.
    fn add_item(
        &self,
        product_id: ProductId,
        quantity: i32,
    ) -> impl Future<Output = Result<Cart>> + Send;

    /// `PUT /cart/update`.
    fn update_item(
        &self,
        product_id: ProductId,
        quantity: i32,
    ) -> impl Future<Output = Result<Cart>> + Send;

    /// `DELETE /cart/remove`.
    fn remove_item(&self, product_id: ProductId) -> impl Future<Output = Result<Cart>> + Send;

    /// `DELETE /cart/clear` - no cart payload in the response.
    fn clear_cart(&self) -> impl Future<Output = Result<()>> + Send;
}

impl<A: CartApi + ?Sized> CartApi for Arc<A> {
    fn fetch_cart(&self) -> impl Future<Output = Result<Cart>> + Send {
        (**self).fetch_cart()
    }

    fn add_item(
        &self,
        product_id: ProductId,
        quantity: i32,
    ) -> impl Future<Output = Result<Cart>> + Send {
        (**self).add_item(product_id, quantity)
    }

    fn update_item(
        &self,
        product_id: ProductId,
        quantity: i32,
    ) -> impl Future<Output = Result<Cart>> + Send {
        (**self).update_item(product_id, quantity)
    }

    fn remove_item(&self, product_id: ProductId) -> impl Future<Output = Result<Cart>> + Send {
        (**self).remove_item(product_id)
    }

    fn clear_cart(&self) -> impl Future<Output = Result<()>> + Send {
        (**self).clear_cart()
    }
}

/// Where the cart lifecycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartPhase {
    /// No identity; there is no cart.
    NoSession,
    /// A fetch or mutation is in flight.
    Loading,
    /// The snapshot mirrors the last server response.
    Ready,
    /// The last request failed; `error` carries the message.
    Error,
}

/// The observable cart state.
#[derive(Debug, Clone)]
pub struct CartState {
    /// Lifecycle phase.
    pub phase: CartPhase,
    /// Last server-confirmed snapshot. Empty until the first successful
    /// fetch; retained across failed mutations.
    pub cart: Option<Cart>,
    /// Failure message when `phase` is [`CartPhase::Error`].
    pub error: Option<String>,
    /// Bumped on every identity change; stale continuations compare
    /// against it and discard themselves.
    epoch: u64,
}

impl CartState {
    const fn no_session(epoch: u64) -> Self {
        Self {
            phase: CartPhase::NoSession,
            cart: None,
            error: None,
            epoch,
        }
    }
}

/// Owns the authoritative-from-server cart snapshot and mediates all
/// mutations. Cheap to clone; all clones share one state.
pub struct CartSynchronizer<A> {
    inner: Arc<SyncInner<A>>,
}

impl<A> Clone for CartSynchronizer<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SyncInner<A> {
    api: A,
    state_tx: watch::Sender<CartState>,
}

impl<A: CartApi> CartSynchronizer<A> {
    /// Create a synchronizer in the `NoSession` state.
    #[must_use]
    pub fn new(api: A) -> Self {
        let (state_tx, _) = watch::channel(CartState::no_session(0));
        Self {
            inner: Arc::new(SyncInner { api, state_tx }),
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.inner.state_tx.borrow().clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.state_tx.subscribe()
    }

    /// Apply an identity transition.
    ///
    /// Synchronous: by the time this returns, the transition is observable
    /// and every in-flight continuation from the previous identity is
    /// doomed to discard itself.
    ///
    /// - Identity absent: drop the snapshot locally and go to `NoSession`
    ///   without any server call.
    /// - Identity present: go to `Loading` with no snapshot; the caller
    ///   (or the [`run`](Self::run) driver) follows up with
    ///   [`refresh`](Self::refresh).
    pub fn apply_identity(&self, identity: Option<&Identity>) {
        let logged_in = identity.is_some();
        self.inner.state_tx.send_modify(|state| {
            state.epoch += 1;
            state.cart = None;
            state.error = None;
            state.phase = if logged_in {
                CartPhase::Loading
            } else {
                CartPhase::NoSession
            };
        });
    }

    /// Fetch the full cart and replace the snapshot.
    ///
    /// Also the explicit retry path out of `Error`.
    ///
    /// # Errors
    ///
    /// [`ApiError::NoSession`] without an identity; otherwise the fetch
    /// failure, which is also folded into the `Error` state.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<()> {
        let epoch = self.begin()?;

        match self.inner.api.fetch_cart().await {
            Ok(cart) => {
                self.finish(epoch, cart);
                Ok(())
            }
            Err(e) => {
                // Initial-fetch failure leaves no cart data to show
                self.inner.state_tx.send_if_modified(|state| {
                    if state.epoch != epoch {
                        return false;
                    }
                    state.phase = CartPhase::Error;
                    state.cart = None;
                    state.error = Some(e.to_string());
                    true
                });
                Err(e)
            }
        }
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a non-positive quantity (caught before
    /// dispatch), [`ApiError::NoSession`] without an identity, or the
    /// request failure. On failure the snapshot is left unchanged.
    #[instrument(skip(self))]
    pub async fn add(&self, product_id: ProductId, quantity: i32) -> Result<Cart> {
        if quantity < 1 {
            return Err(ApiError::Validation(
                "quantity must be at least 1".to_owned(),
            ));
        }
        let epoch = self.begin()?;
        self.apply(epoch, self.inner.api.add_item(product_id, quantity).await)
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// A quantity of zero or less is routed to [`remove`](Self::remove) -
    /// the two are defined to produce identical snapshots.
    ///
    /// # Errors
    ///
    /// [`ApiError::NoSession`] without an identity, or the request
    /// failure. On failure the snapshot is left unchanged.
    #[instrument(skip(self))]
    pub async fn update(&self, product_id: ProductId, quantity: i32) -> Result<Cart> {
        if quantity <= 0 {
            return self.remove(product_id).await;
        }
        let epoch = self.begin()?;
        self.apply(
            epoch,
            self.inner.api.update_item(product_id, quantity).await,
        )
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// [`ApiError::NoSession`] without an identity, or the request
    /// failure. On failure the snapshot is left unchanged.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: ProductId) -> Result<Cart> {
        let epoch = self.begin()?;
        self.apply(epoch, self.inner.api.remove_item(product_id).await)
    }

    /// Clear the cart.
    ///
    /// The endpoint returns no payload, so on success the empty snapshot is
    /// synthesized locally - no follow-up fetch. The call itself is still
    /// awaited so a failure can surface.
    ///
    /// # Errors
    ///
    /// [`ApiError::NoSession`] without an identity, or the request
    /// failure. On failure the snapshot is left unchanged.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        let epoch = self.begin()?;

        match self.inner.api.clear_cart().await {
            Ok(()) => {
                self.inner.state_tx.send_if_modified(|state| {
                    if state.epoch != epoch {
                        return false;
                    }
                    // The backend reuses the user's cart row, so the id of
                    // the previous snapshot remains correct
                    let id = state.cart.as_ref().map_or_else(|| CartId::new(0), |c| c.id);
                    state.phase = CartPhase::Ready;
                    state.cart = Some(Cart::empty(id));
                    state.error = None;
                    true
                });
                Ok(())
            }
            Err(e) => {
                self.fail(epoch, &e);
                Err(e)
            }
        }
    }

    /// Drive the synchronizer from a stream of identity changes.
    ///
    /// Applies the receiver's current value, then every subsequent change,
    /// fetching the cart whenever an identity is present. Runs until the
    /// session store is dropped. Intended for `tokio::spawn`; one-shot
    /// callers can use [`apply_identity`](Self::apply_identity) +
    /// [`refresh`](Self::refresh) directly.
    pub async fn run(self, mut identity_rx: watch::Receiver<Option<Identity>>) {
        loop {
            let identity = identity_rx.borrow_and_update().clone();
            self.apply_identity(identity.as_ref());
            if identity.is_some()
                && let Err(e) = self.refresh().await
            {
                // Already folded into the Error state; subscribers decide
                debug!("cart fetch failed: {e}");
            }
            if identity_rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Check the session, enter `Loading`, and capture the epoch the
    /// continuation must match. This is also how `Error` is left: any
    /// triggering event re-enters `Loading` and drops the stale message.
    fn begin(&self) -> Result<u64> {
        let mut result = Err(ApiError::NoSession);
        self.inner.state_tx.send_if_modified(|state| {
            if state.phase == CartPhase::NoSession {
                return false;
            }
            result = Ok(state.epoch);
            let changed = state.phase != CartPhase::Loading || state.error.is_some();
            state.phase = CartPhase::Loading;
            state.error = None;
            changed
        });
        result
    }

    /// Apply a mutation outcome: replace the snapshot wholesale on
    /// success, keep it untouched (but surface the error) on failure.
    fn apply(&self, epoch: u64, outcome: Result<Cart>) -> Result<Cart> {
        match outcome {
            Ok(cart) => {
                self.finish(epoch, cart.clone());
                Ok(cart)
            }
            Err(e) => {
                self.fail(epoch, &e);
                Err(e)
            }
        }
    }

    fn finish(&self, epoch: u64, cart: Cart) {
        let applied = self.inner.state_tx.send_if_modified(|state| {
            if state.epoch != epoch {
                return false;
            }
            state.phase = CartPhase::Ready;
            state.cart = Some(cart.clone());
            state.error = None;
            true
        });
        if !applied {
            debug!("discarding cart response from a previous session");
        }
    }

    fn fail(&self, epoch: u64, error: &ApiError) {
        self.inner.state_tx.send_if_modified(|state| {
            if state.epoch != epoch {
                return false;
            }
            state.phase = CartPhase::Error;
            state.error = Some(error.to_string());
            true
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal::Decimal;
    use tokio::sync::oneshot;

    use kirana_core::{CartItemId, Email, Role, UserId};

    use crate::types::{CartItem, CartProduct};

    fn identity() -> Identity {
        Identity {
            id: UserId::new(11),
            email: Email::parse("asha@example.com").unwrap(),
            name: Some("Asha".to_owned()),
            role: Role::User,
        }
    }

    fn cart_with(product_id: i64, quantity: i32, unit_price: &str) -> Cart {
        let price: Decimal = unit_price.parse().unwrap();
        let line = price * Decimal::from(quantity);
        Cart {
            id: CartId::new(12),
            items: vec![CartItem {
                id: CartItemId::new(1),
                quantity,
                price: line,
                product: CartProduct {
                    id: ProductId::new(product_id),
                    name: format!("product-{product_id}"),
                    price,
                    image_url: None,
                },
            }],
            total_price: line,
        }
    }

    /// Scripted cart transport. Responses pop FIFO; an optional gate per
    /// call lets tests control resolution order.
    #[derive(Default)]
    struct FakeCartApi {
        calls: Mutex<Vec<String>>,
        responses: Mutex<VecDeque<Result<Cart>>>,
        gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
        clear_ok: bool,
        started: AtomicUsize,
    }

    impl FakeCartApi {
        fn new() -> Self {
            Self {
                clear_ok: true,
                ..Self::default()
            }
        }

        fn push_ok(&self, cart: Cart) {
            self.responses.lock().unwrap().push_back(Ok(cart));
        }

        fn push_err(&self, err: ApiError) {
            self.responses.lock().unwrap().push_back(Err(err));
        }

        fn push_gate(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().push_back(rx);
            tx
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        async fn answer(&self, call: &str) -> Result<Cart> {
            self.calls.lock().unwrap().push(call.to_owned());
            let gate = self.gates.lock().unwrap().pop_front();
            // Pair the response with the call at issue time so gates only
            // control resolution order, not response assignment
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected cart call");
            self.started.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            response
        }
    }

    impl CartApi for &FakeCartApi {
        async fn fetch_cart(&self) -> Result<Cart> {
            self.answer("fetch").await
        }

        async fn add_item(&self, product_id: ProductId, quantity: i32) -> Result<Cart> {
            self.answer(&format!("add {product_id} x{quantity}")).await
        }

        async fn update_item(&self, product_id: ProductId, quantity: i32) -> Result<Cart> {
            self.answer(&format!("update {product_id} x{quantity}")).await
        }

        async fn remove_item(&self, product_id: ProductId) -> Result<Cart> {
            self.answer(&format!("remove {product_id}")).await
        }

        async fn clear_cart(&self) -> Result<()> {
            self.calls.lock().unwrap().push("clear".to_owned());
            self.started.fetch_add(1, Ordering::SeqCst);
            if self.clear_ok {
                Ok(())
            } else {
                Err(ApiError::Server {
                    status: 500,
                    message: "boom".to_owned(),
                })
            }
        }
    }

    #[tokio::test]
    async fn test_identity_present_triggers_fetch() {
        let api = FakeCartApi::new();
        api.push_ok(cart_with(7, 2, "25.5"));
        let sync = CartSynchronizer::new(&api);
        assert_eq!(sync.state().phase, CartPhase::NoSession);

        sync.apply_identity(Some(&identity()));
        assert_eq!(sync.state().phase, CartPhase::Loading);

        sync.refresh().await.unwrap();
        let state = sync.state();
        assert_eq!(state.phase, CartPhase::Ready);
        let cart = state.cart.unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total_price, cart.computed_total());
        assert_eq!(api.calls(), vec!["fetch"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_enters_error_with_empty_cart() {
        let api = FakeCartApi::new();
        api.push_err(ApiError::Server {
            status: 500,
            message: "down".to_owned(),
        });
        let sync = CartSynchronizer::new(&api);

        sync.apply_identity(Some(&identity()));
        assert!(sync.refresh().await.is_err());

        let state = sync.state();
        assert_eq!(state.phase, CartPhase::Error);
        assert!(state.cart.is_none());
        assert!(state.error.unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_error_retried_on_explicit_refresh_only() {
        let api = FakeCartApi::new();
        api.push_err(ApiError::Server {
            status: 502,
            message: "bad gateway".to_owned(),
        });
        api.push_ok(cart_with(7, 1, "3.25"));
        let sync = CartSynchronizer::new(&api);

        sync.apply_identity(Some(&identity()));
        assert!(sync.refresh().await.is_err());
        assert_eq!(sync.state().phase, CartPhase::Error);
        // No background retry happened
        assert_eq!(api.calls(), vec!["fetch"]);

        sync.refresh().await.unwrap();
        assert_eq!(sync.state().phase, CartPhase::Ready);
        assert_eq!(api.calls(), vec!["fetch", "fetch"]);
    }

    #[tokio::test]
    async fn test_logout_discards_cart_without_server_call() {
        let api = FakeCartApi::new();
        api.push_ok(cart_with(7, 2, "25.5"));
        let sync = CartSynchronizer::new(&api);
        sync.apply_identity(Some(&identity()));
        sync.refresh().await.unwrap();

        sync.apply_identity(None);

        let state = sync.state();
        assert_eq!(state.phase, CartPhase::NoSession);
        assert!(state.cart.is_none());
        // The fetch was the only network call; logout made none
        assert_eq!(api.calls(), vec!["fetch"]);

        // And further cart operations are refused until a new identity
        assert!(matches!(
            sync.add(ProductId::new(7), 1).await,
            Err(ApiError::NoSession)
        ));
        assert_eq!(api.calls(), vec!["fetch"]);
    }

    #[tokio::test]
    async fn test_add_replaces_snapshot_from_empty() {
        let api = FakeCartApi::new();
        api.push_ok(Cart {
            id: CartId::new(12),
            items: Vec::new(),
            total_price: Decimal::ZERO,
        });
        api.push_ok(cart_with(7, 2, "25.5"));
        let sync = CartSynchronizer::new(&api);
        sync.apply_identity(Some(&identity()));
        sync.refresh().await.unwrap();

        let cart = sync.add(ProductId::new(7), 2).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.items[0].product.id, ProductId::new(7));
        assert_eq!(
            cart.total_price,
            cart.items[0].product.price * Decimal::from(2)
        );
        assert_eq!(sync.state().cart.unwrap(), cart);
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_quantity_before_dispatch() {
        let api = FakeCartApi::new();
        api.push_ok(cart_with(7, 1, "1"));
        let sync = CartSynchronizer::new(&api);
        sync.apply_identity(Some(&identity()));
        sync.refresh().await.unwrap();

        assert!(matches!(
            sync.add(ProductId::new(7), 0).await,
            Err(ApiError::Validation(_))
        ));
        assert_eq!(api.calls(), vec!["fetch"]);
    }

    #[tokio::test]
    async fn test_update_zero_issues_remove() {
        let api = FakeCartApi::new();
        api.push_ok(cart_with(5, 3, "2"));
        api.push_ok(Cart {
            id: CartId::new(12),
            items: Vec::new(),
            total_price: Decimal::ZERO,
        });
        let sync = CartSynchronizer::new(&api);
        sync.apply_identity(Some(&identity()));
        sync.refresh().await.unwrap();

        let cart = sync.update(ProductId::new(5), 0).await.unwrap();
        assert!(cart.items.is_empty());
        // The wire saw a remove, not an update with quantity 0
        assert_eq!(api.calls(), vec!["fetch", "remove 5"]);
    }

    #[tokio::test]
    async fn test_mutation_failure_keeps_snapshot() {
        let api = FakeCartApi::new();
        api.push_ok(cart_with(7, 2, "25.5"));
        api.push_err(ApiError::Validation("out of stock".to_owned()));
        let sync = CartSynchronizer::new(&api);
        sync.apply_identity(Some(&identity()));
        sync.refresh().await.unwrap();
        let before = sync.state().cart.unwrap();

        let err = sync.update(ProductId::new(7), 50).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let state = sync.state();
        assert_eq!(state.phase, CartPhase::Error);
        assert_eq!(state.cart.unwrap(), before);
        assert_eq!(state.error.as_deref(), Some("validation error: out of stock"));
    }

    #[tokio::test]
    async fn test_clear_synthesizes_empty_snapshot() {
        let api = FakeCartApi::new();
        api.push_ok(cart_with(7, 2, "25.5"));
        let sync = CartSynchronizer::new(&api);
        sync.apply_identity(Some(&identity()));
        sync.refresh().await.unwrap();

        sync.clear().await.unwrap();

        let state = sync.state();
        assert_eq!(state.phase, CartPhase::Ready);
        let cart = state.cart.unwrap();
        assert_eq!(cart.id, CartId::new(12));
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_price, Decimal::ZERO);
        // clear was fire-and-forget: no follow-up fetch
        assert_eq!(api.calls(), vec!["fetch", "clear"]);
    }

    #[tokio::test]
    async fn test_clear_failure_keeps_snapshot() {
        let api = FakeCartApi {
            clear_ok: false,
            ..FakeCartApi::default()
        };
        api.push_ok(cart_with(7, 2, "25.5"));
        let sync = CartSynchronizer::new(&api);
        sync.apply_identity(Some(&identity()));
        sync.refresh().await.unwrap();
        let before = sync.state().cart.unwrap();

        assert!(sync.clear().await.is_err());
        let state = sync.state();
        assert_eq!(state.phase, CartPhase::Error);
        assert_eq!(state.cart.unwrap(), before);
    }

    #[tokio::test]
    async fn test_last_response_to_resolve_wins() {
        let api: &'static FakeCartApi = Box::leak(Box::new(FakeCartApi::new()));
        api.push_ok(cart_with(5, 1, "2"));
        // First issued: update to 3. Second issued: update to 1.
        api.push_ok(cart_with(5, 3, "2"));
        api.push_ok(cart_with(5, 1, "2"));
        let first_gate = api.push_gate();
        let second_gate = api.push_gate();

        let sync = CartSynchronizer::new(api);
        sync.apply_identity(Some(&identity()));
        sync.refresh().await.unwrap();

        let first = tokio::spawn({
            let sync = sync.clone();
            async move { sync.update(ProductId::new(5), 3).await }
        });
        while api.started.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }
        let second = tokio::spawn({
            let sync = sync.clone();
            async move { sync.update(ProductId::new(5), 1).await }
        });
        while api.started.load(Ordering::SeqCst) < 3 {
            tokio::task::yield_now().await;
        }

        // The second request's response arrives first...
        second_gate.send(()).unwrap();
        second.await.unwrap().unwrap();
        assert_eq!(sync.state().cart.unwrap().items[0].quantity, 1);

        // ...and the first request's response resolves last, so it wins
        first_gate.send(()).unwrap();
        first.await.unwrap().unwrap();
        assert_eq!(sync.state().cart.unwrap().items[0].quantity, 3);
        assert_eq!(sync.state().phase, CartPhase::Ready);
    }

    #[tokio::test]
    async fn test_response_after_logout_is_discarded() {
        let api: &'static FakeCartApi = Box::leak(Box::new(FakeCartApi::new()));
        api.push_ok(cart_with(5, 1, "2"));
        api.push_ok(cart_with(5, 4, "2"));
        let gate = api.push_gate();

        let sync = CartSynchronizer::new(api);
        sync.apply_identity(Some(&identity()));
        sync.refresh().await.unwrap();

        let pending = tokio::spawn({
            let sync = sync.clone();
            async move { sync.update(ProductId::new(5), 4).await }
        });
        while api.started.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }

        // Logout while the mutation is in flight
        sync.apply_identity(None);
        assert_eq!(sync.state().phase, CartPhase::NoSession);

        // The response resolves afterwards and must not resurrect the cart
        gate.send(()).unwrap();
        pending.await.unwrap().unwrap();

        let state = sync.state();
        assert_eq!(state.phase, CartPhase::NoSession);
        assert!(state.cart.is_none());
    }

    #[tokio::test]
    async fn test_run_driver_follows_identity_changes() {
        let api: &'static FakeCartApi = Box::leak(Box::new(FakeCartApi::new()));
        api.push_ok(cart_with(7, 2, "25.5"));

        let (identity_tx, identity_rx) = watch::channel(None);
        let sync = CartSynchronizer::new(api);
        let driver = tokio::spawn(sync.clone().run(identity_rx));

        let mut states = sync.subscribe();

        identity_tx.send_replace(Some(identity()));
        loop {
            states.changed().await.unwrap();
            let phase = states.borrow_and_update().phase;
            if phase == CartPhase::Ready {
                break;
            }
        }
        assert_eq!(sync.state().cart.as_ref().unwrap().item_count(), 2);

        identity_tx.send_replace(None);
        loop {
            states.changed().await.unwrap();
            let phase = states.borrow_and_update().phase;
            if phase == CartPhase::NoSession {
                break;
            }
        }
        assert!(sync.state().cart.is_none());
        assert_eq!(api.calls(), vec!["fetch"]);

        drop(identity_tx);
        driver.await.unwrap();
    }
}
