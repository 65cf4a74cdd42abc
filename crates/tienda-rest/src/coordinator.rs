//! Response-stage middleware: recover sessions after authentication failure.
//!
//! When a request comes back 401, the coordinator exchanges the stored
//! refresh token for a new access token and replays the request. Only one
//! exchange runs at a time: every 401 observed while it is outstanding waits
//! for its outcome instead of starting another.
//!
//! The gate (`refreshing`) and the FIFO of waiting callers live behind one
//! mutex. The gate is set when the exchange starts and cleared in the same
//! critical section that takes the queue, after the new token pair has been
//! persisted. On failure the stored session is wiped and navigation reset
//! before the gate reopens, so a late 401 cannot start a second exchange with
//! the rejected refresh token.
//!
//! Callers decide between leading and joining before awaiting anything. The
//! refresh token is read by the exchange task itself, never by a caller that
//! could hold it across a completed rotation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use tienda_core::error::{AuthError, Error, ProtocolError};
use tienda_core::{
    AccessToken, ApiRequest, ApiResponse, CredentialStore, Navigator, RefreshToken, Result,
    Transport,
};

use crate::endpoints::{REFRESH_TOKEN, RefreshRequest, RefreshResponse};

type Waiter = oneshot::Sender<Result<AccessToken>>;

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    pending: Vec<Waiter>,
}

/// Coordinates token refresh for every request sent through a client.
///
/// Cheap to clone; clones share the same gate and queue.
#[derive(Clone)]
pub struct SessionCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<RefreshState>,
}

impl SessionCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                transport,
                store,
                navigator,
                state: Mutex::new(RefreshState::default()),
            }),
        }
    }

    /// Returns true while a refresh exchange is outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.inner.lock_state().refreshing
    }

    /// Inspect a response and recover from authentication failure.
    ///
    /// Responses that are not 401, and responses to requests that are
    /// anonymous or were already replayed once, pass through unchanged.
    /// Otherwise the request is replayed with a refreshed token and the
    /// replay's response is returned.
    ///
    /// # Errors
    ///
    /// - the original 401 as a protocol error when no refresh token is stored
    /// - the refresh exchange's error when the exchange fails
    /// - transport errors from the replay
    #[instrument(skip_all, fields(method = %request.method(), path = request.path()))]
    pub async fn recover(&self, mut request: ApiRequest, response: ApiResponse) -> Result<ApiResponse> {
        if !response.is_auth_failure() || request.is_retried() || request.is_anonymous() {
            return Ok(response);
        }

        request.mark_retried();

        let token = match self.await_refresh().await {
            Ok(token) => token,
            Err(Error::Auth(AuthError::RefreshTokenMissing)) => {
                return Err(response.into_error().into());
            }
            Err(e) => return Err(e),
        };

        request.set_bearer(&token);
        debug!("replaying request with refreshed token");
        self.inner.transport.send(request).await
    }

    /// Refresh the session now, joining an exchange already in flight.
    ///
    /// # Errors
    ///
    /// [`AuthError::RefreshTokenMissing`] when no refresh token is stored,
    /// after ending the session; otherwise the exchange's error.
    pub async fn refresh(&self) -> Result<AccessToken> {
        self.await_refresh().await
    }

    /// Wait for the outcome of the current exchange, starting one if idle.
    ///
    /// Joining or leading is decided under the state lock before anything
    /// else is awaited; the leader's task reads the refresh token.
    async fn await_refresh(&self) -> Result<AccessToken> {
        let (tx, rx) = oneshot::channel();

        let start = {
            let mut state = self.inner.lock_state();
            state.pending.push(tx);
            if state.refreshing {
                debug!(queued = state.pending.len(), "refresh in flight, queuing request");
                false
            } else {
                state.refreshing = true;
                true
            }
        };

        if start {
            // The exchange runs on its own task so that dropping the caller's
            // future cannot leave the gate closed and the queue stranded.
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { inner.run_refresh().await });
        }

        rx.await
            .unwrap_or_else(|_| Err(AuthError::RefreshAborted.into()))
    }
}

impl CoordinatorInner {
    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_refresh(self: Arc<Self>) {
        let mut gate = Gate {
            inner: &self,
            settled: false,
        };

        let outcome = match self.stored_refresh_token().await {
            Some(refresh_token) => {
                info!("refreshing session");
                self.exchange_and_persist(&refresh_token).await
            }
            None => Err(AuthError::RefreshTokenMissing.into()),
        };

        if let Err(ref e) = outcome {
            warn!(error = %e, "session refresh failed, ending session");
            self.end_session().await;
        } else {
            info!("session refreshed");
        }

        gate.settle(outcome);
    }

    /// An unreadable store counts as a missing refresh token.
    async fn stored_refresh_token(&self) -> Option<RefreshToken> {
        match self.store.refresh_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "failed to read refresh token");
                None
            }
        }
    }

    async fn exchange_and_persist(&self, refresh_token: &RefreshToken) -> Result<AccessToken> {
        let request = ApiRequest::post(REFRESH_TOKEN)
            .json(&RefreshRequest {
                refresh_token: refresh_token.as_str(),
            })?
            .anonymous();

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(response.into_error().into());
        }

        let status = response.status();
        let payload = response.json::<RefreshResponse>()?.into_payload();

        let access = payload
            .token
            .filter(|t| !t.is_empty())
            .map(AccessToken::new)
            .ok_or_else(|| ProtocolError::unexpected_body(status, "refresh response carried no token"))?;
        let refresh = payload
            .refresh_token
            .filter(|t| !t.is_empty())
            .map(RefreshToken::new)
            .unwrap_or_else(|| refresh_token.clone());

        self.store.store_tokens(&access, &refresh).await?;
        self.transport.set_default_authorization(Some(&access)).await;

        Ok(access)
    }

    /// Wipe stored credentials and send the user back to sign-in.
    async fn end_session(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear stored credentials");
        }
        self.transport.set_default_authorization(None).await;
        self.navigator.reset_to_unauthenticated();
    }
}

/// Reopens the gate and drains the queue exactly once.
///
/// If the refresh task unwinds before settling, dropping the gate rejects
/// every waiter with [`AuthError::RefreshAborted`].
struct Gate<'a> {
    inner: &'a CoordinatorInner,
    settled: bool,
}

impl Gate<'_> {
    fn settle(&mut self, outcome: Result<AccessToken>) {
        self.settled = true;

        let pending = {
            let mut state = self.inner.lock_state();
            state.refreshing = false;
            std::mem::take(&mut state.pending)
        };

        debug!(waiters = pending.len(), ok = outcome.is_ok(), "draining refresh queue");
        for waiter in pending {
            // A waiter whose caller went away is skipped.
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for Gate<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(Err(AuthError::RefreshAborted.into()));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tienda_core::{CredentialKey, MemoryCredentialStore};

    use super::*;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Accepts only `Bearer <valid>`; answers the refresh exchange after a delay.
    struct FakeTransport {
        log: Log,
        valid: Mutex<String>,
        refresh_status: u16,
        refresh_body: String,
        refresh_delay: Duration,
        refresh_calls: AtomicUsize,
    }

    impl FakeTransport {
        fn new(log: Log, valid: &str, refresh_status: u16, refresh_body: &str) -> Self {
            Self {
                log,
                valid: Mutex::new(valid.to_string()),
                refresh_status,
                refresh_body: refresh_body.to_string(),
                refresh_delay: Duration::from_millis(50),
                refresh_calls: AtomicUsize::new(0),
            }
        }

        fn refresh_calls(&self) -> usize {
            self.refresh_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            if request.path() == REFRESH_TOKEN {
                self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                assert!(request.authorization().is_none());
                self.log.lock().unwrap().push("refresh".to_string());
                tokio::time::sleep(self.refresh_delay).await;
                return Ok(ApiResponse::new(self.refresh_status, self.refresh_body.clone()));
            }

            let auth = request.authorization().unwrap_or("none").to_string();
            self.log
                .lock()
                .unwrap()
                .push(format!("send {} {}", request.path(), auth));

            let valid = format!("Bearer {}", self.valid.lock().unwrap());
            if auth == valid {
                Ok(ApiResponse::new(200, r#"{"data":[]}"#))
            } else {
                Ok(ApiResponse::new(401, r#"{"error":"Unauthorized"}"#))
            }
        }
    }

    /// Memory store that records writes into the shared log.
    struct LoggingStore {
        inner: MemoryCredentialStore,
        log: Log,
    }

    #[async_trait]
    impl CredentialStore for LoggingStore {
        async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn get_many(&self, keys: &[CredentialKey]) -> Result<Vec<Option<String>>> {
            self.inner.get_many(keys).await
        }

        async fn set_many(&self, entries: &[(CredentialKey, String)]) -> Result<()> {
            self.inner.set_many(entries).await?;
            self.log.lock().unwrap().push("persist".to_string());
            Ok(())
        }

        async fn remove_many(&self, keys: &[CredentialKey]) -> Result<()> {
            self.inner.remove_many(keys).await?;
            self.log.lock().unwrap().push("wipe".to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingNavigator {
        signed_out: AtomicUsize,
    }

    impl Navigator for CountingNavigator {
        fn reset_to_unauthenticated(&self) {
            self.signed_out.fetch_add(1, Ordering::SeqCst);
        }

        fn reset_to_authenticated(&self) {}
    }

    struct Harness {
        log: Log,
        transport: Arc<FakeTransport>,
        store: Arc<LoggingStore>,
        navigator: Arc<CountingNavigator>,
        coordinator: SessionCoordinator,
    }

    fn harness(refresh_token: Option<&str>, refresh_status: u16, refresh_body: &str) -> Harness {
        let log: Log = Arc::default();
        let transport = Arc::new(FakeTransport::new(log.clone(), "T2", refresh_status, refresh_body));

        let mut entries = vec![(CredentialKey::AccessToken, "T1".to_string())];
        if let Some(token) = refresh_token {
            entries.push((CredentialKey::RefreshToken, token.to_string()));
        }
        entries.push((CredentialKey::Email, "ana@example.com".to_string()));
        let store = Arc::new(LoggingStore {
            inner: MemoryCredentialStore::with_entries(entries),
            log: log.clone(),
        });
        let navigator = Arc::new(CountingNavigator::default());
        let coordinator =
            SessionCoordinator::new(transport.clone(), store.clone(), navigator.clone());

        Harness {
            log,
            transport,
            store,
            navigator,
            coordinator,
        }
    }

    impl Harness {
        /// One pass through the pipeline with the stale token.
        async fn call(&self, path: &str) -> Result<ApiResponse> {
            let mut request = ApiRequest::get(path);
            request.set_bearer(&AccessToken::new("T1"));
            let response = self.transport.send(request.clone()).await?;
            self.coordinator.recover(request, response).await
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    #[tokio::test]
    async fn non_401_passes_through() {
        let h = harness(Some("R1"), 200, r#"{"token":"T2"}"#);
        let request = ApiRequest::get("products");
        let response = ApiResponse::new(500, "boom");

        let out = h.coordinator.recover(request, response).await.unwrap();

        assert_eq!(out.status(), 500);
        assert_eq!(h.transport.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn concurrent_failures_share_one_refresh() {
        let h = harness(Some("R1"), 200, r#"{"data":{"token":"T2","refreshToken":"R2"}}"#);

        let (a, b, c, d) = tokio::join!(
            h.call("users"),
            h.call("stores"),
            h.call("products"),
            h.call("orders"),
        );

        for result in [a, b, c, d] {
            assert_eq!(result.unwrap().status(), 200);
        }
        assert_eq!(h.transport.refresh_calls(), 1);
        assert!(!h.coordinator.is_refreshing());

        let (access, refresh) = h.store.tokens().await.unwrap();
        assert_eq!(access, Some(AccessToken::new("T2")));
        assert_eq!(refresh, Some(RefreshToken::new("R2")));
    }

    #[tokio::test]
    async fn replays_are_sent_only_after_tokens_are_persisted() {
        let h = harness(Some("R1"), 200, r#"{"token":"T2","refreshToken":"R2"}"#);

        let _ = tokio::join!(h.call("users"), h.call("reviews"), h.call("orderItems"));

        let log = h.log();
        let persisted_at = log.iter().position(|e| e == "persist").unwrap();
        let first_replay = log.iter().position(|e| e.ends_with("Bearer T2")).unwrap();
        assert!(persisted_at < first_replay, "log: {:?}", log);
        assert_eq!(log.iter().filter(|e| e.ends_with("Bearer T2")).count(), 3);
    }

    #[tokio::test]
    async fn missing_refresh_token_in_response_keeps_previous_one() {
        let h = harness(Some("R1"), 200, r#"{"token":"T2"}"#);

        h.call("users").await.unwrap();

        let (access, refresh) = h.store.tokens().await.unwrap();
        assert_eq!(access, Some(AccessToken::new("T2")));
        assert_eq!(refresh, Some(RefreshToken::new("R1")));
    }

    #[tokio::test]
    async fn replay_failing_again_is_not_retried() {
        let h = harness(Some("R1"), 200, r#"{"token":"T3","refreshToken":"R3"}"#);

        let response = h.call("users").await.unwrap();

        assert_eq!(response.status(), 401);
        assert_eq!(h.transport.refresh_calls(), 1);
        assert_eq!(h.navigator.signed_out.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_refresh_token_ends_session_without_exchange() {
        let h = harness(None, 200, r#"{"token":"T2"}"#);

        let err = h.call("users").await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(h.transport.refresh_calls(), 0);
        assert!(h.store.inner.is_empty().await);
        assert_eq!(h.navigator.signed_out.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_exchange_fans_out_and_resets_once() {
        let h = harness(Some("R1"), 500, "Internal Server Error");

        let (a, b, c) = tokio::join!(h.call("users"), h.call("stores"), h.call("products"));

        for result in [a, b, c] {
            assert_eq!(result.unwrap_err().status(), Some(500));
        }
        assert_eq!(h.transport.refresh_calls(), 1);
        assert!(h.store.inner.is_empty().await);
        assert_eq!(h.navigator.signed_out.load(Ordering::SeqCst), 1);
        assert!(!h.coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn token_less_refresh_response_is_a_failure() {
        let h = harness(Some("R1"), 200, r#"{"success":true,"data":{}}"#);

        let err = h.call("users").await.unwrap_err();

        assert_eq!(err.status(), Some(200));
        assert!(h.store.inner.is_empty().await);
        assert_eq!(h.navigator.signed_out.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn a_new_episode_starts_after_settling() {
        let h = harness(Some("R1"), 200, r#"{"token":"T2","refreshToken":"R2"}"#);

        h.call("users").await.unwrap();
        h.call("users").await.unwrap();

        assert_eq!(h.transport.refresh_calls(), 2);
    }

    /// Memory store whose first refresh-token read stalls after reading.
    struct StallingStore {
        inner: MemoryCredentialStore,
        stall: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl CredentialStore for StallingStore {
        async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
            let value = self.inner.get(key).await?;
            if key == CredentialKey::RefreshToken && self.stall.swap(false, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            Ok(value)
        }

        async fn get_many(&self, keys: &[CredentialKey]) -> Result<Vec<Option<String>>> {
            self.inner.get_many(keys).await
        }

        async fn set_many(&self, entries: &[(CredentialKey, String)]) -> Result<()> {
            self.inner.set_many(entries).await
        }

        async fn remove_many(&self, keys: &[CredentialKey]) -> Result<()> {
            self.inner.remove_many(keys).await
        }
    }

    #[tokio::test]
    async fn slow_token_read_cannot_start_a_second_exchange() {
        let log: Log = Arc::default();
        let transport = Arc::new(FakeTransport::new(
            log,
            "T2",
            200,
            r#"{"token":"T2","refreshToken":"R2"}"#,
        ));
        let store = Arc::new(StallingStore {
            inner: MemoryCredentialStore::with_entries([
                (CredentialKey::AccessToken, "T1".to_string()),
                (CredentialKey::RefreshToken, "R1".to_string()),
            ]),
            stall: std::sync::atomic::AtomicBool::new(true),
        });
        let navigator = Arc::new(CountingNavigator::default());
        let coordinator =
            SessionCoordinator::new(transport.clone(), store.clone(), navigator.clone());

        let call = |path: &'static str| {
            let transport = transport.clone();
            let coordinator = coordinator.clone();
            async move {
                let mut request = ApiRequest::get(path);
                request.set_bearer(&AccessToken::new("T1"));
                let response = transport.send(request.clone()).await?;
                coordinator.recover(request, response).await
            }
        };

        let (a, b) = tokio::join!(call("users"), call("stores"));

        assert_eq!(a.unwrap().status(), 200);
        assert_eq!(b.unwrap().status(), 200);
        assert_eq!(transport.refresh_calls(), 1);
        assert_eq!(navigator.signed_out.load(Ordering::SeqCst), 0);
        assert_eq!(
            store.refresh_token().await.unwrap(),
            Some(RefreshToken::new("R2"))
        );
    }

    #[tokio::test]
    async fn missing_refresh_token_rejects_every_waiter() {
        let h = harness(None, 200, r#"{"token":"T2"}"#);

        let (a, b) = tokio::join!(h.call("users"), h.call("products"));

        assert_eq!(a.unwrap_err().status(), Some(401));
        assert_eq!(b.unwrap_err().status(), Some(401));
        assert_eq!(h.transport.refresh_calls(), 0);
        assert_eq!(h.navigator.signed_out.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn explicit_refresh_without_token_is_rejected() {
        let h = harness(None, 200, r#"{"token":"T2"}"#);

        let err = h.coordinator.refresh().await.unwrap_err();

        assert!(matches!(
            err,
            tienda_core::Error::Auth(AuthError::RefreshTokenMissing)
        ));
        assert_eq!(h.navigator.signed_out.load(Ordering::SeqCst), 1);
    }
}
