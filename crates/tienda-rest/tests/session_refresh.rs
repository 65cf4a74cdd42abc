//! Session refresh tests against a mock marketplace API.
//!
//! These drive the full client pipeline over HTTP: the access token is
//! attached, 401 responses are recovered with a single refresh exchange, and
//! failed exchanges end the session.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use tienda_core::error::{Error, TransportError};
use tienda_core::{
    AccessToken, CredentialKey, CredentialStore, MemoryCredentialStore, Navigator, RefreshToken,
};
use tienda_rest::{ApiClient, ClientConfig, NavigationHook};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

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

struct Fixture {
    client: ApiClient,
    store: Arc<MemoryCredentialStore>,
    navigator: Arc<CountingNavigator>,
}

fn fixture(server: &MockServer, refresh_token: Option<&str>) -> Fixture {
    let mut entries = vec![
        (CredentialKey::AccessToken, "T1".to_string()),
        (CredentialKey::UserId, "7".to_string()),
        (CredentialKey::Email, "ana@example.com".to_string()),
        (CredentialKey::FirstName, "Ana".to_string()),
        (CredentialKey::LastName, "Ruiz".to_string()),
        (CredentialKey::Role, "USER".to_string()),
    ];
    if let Some(token) = refresh_token {
        entries.push((CredentialKey::RefreshToken, token.to_string()));
    }

    let store = Arc::new(MemoryCredentialStore::with_entries(entries));
    let navigator = Arc::new(CountingNavigator::default());
    let hook = Arc::new(NavigationHook::new());
    hook.mount(navigator.clone());

    let config = ClientConfig::from_url(&format!("{}/api", server.uri())).unwrap();
    let client = ApiClient::new(&config, store.clone(), hook).unwrap();

    Fixture {
        client,
        store,
        navigator,
    }
}

/// Mount a collection that rejects `T1` and serves `T2`.
async fn mount_collection(server: &MockServer, name: &str) {
    let route = format!("/api/{}", name);

    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Unauthorized",
            "message": "Token expired"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": []
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Single-flight refresh
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    for name in ["users", "stores", "products"] {
        mount_collection(&server, name).await;
    }

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/token"))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "success": true,
                    "message": "Token refreshed",
                    "data": {"token": "T2", "refreshToken": "R2"}
                }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let f = fixture(&server, Some("R1"));

    let (users, stores, products) = tokio::join!(
        f.client.users().list(),
        f.client.stores().list(),
        f.client.products().list(),
    );

    assert!(users.unwrap().is_empty());
    assert!(stores.unwrap().is_empty());
    assert!(products.unwrap().is_empty());

    let (access, refresh) = f.store.tokens().await.unwrap();
    assert_eq!(access, Some(AccessToken::new("T2")));
    assert_eq!(refresh, Some(RefreshToken::new("R2")));
    assert_eq!(f.navigator.signed_out.load(Ordering::SeqCst), 0);
    assert!(!f.client.coordinator().is_refreshing());
}

#[tokio::test]
async fn bare_refresh_body_is_accepted() {
    let server = MockServer::start().await;
    mount_collection(&server, "orders").await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "T2"})))
        .expect(1)
        .mount(&server)
        .await;

    let f = fixture(&server, Some("R1"));

    f.client.orders().list().await.unwrap();

    let (access, refresh) = f.store.tokens().await.unwrap();
    assert_eq!(access, Some(AccessToken::new("T2")));
    assert_eq!(refresh, Some(RefreshToken::new("R1")));
}

#[tokio::test]
async fn replayed_request_is_not_retried_again() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Forbidden",
            "message": "Account suspended"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"token": "T2", "refreshToken": "R2"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let f = fixture(&server, Some("R1"));

    let err = f.client.reviews().list().await.unwrap_err();

    assert!(err.is_auth_failure());
    assert!(err.to_string().contains("Account suspended"));
    assert_eq!(f.navigator.signed_out.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Session termination
// ============================================================================

#[tokio::test]
async fn missing_refresh_token_ends_session() {
    let server = MockServer::start().await;
    mount_collection(&server, "users").await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "T2"})))
        .expect(0)
        .mount(&server)
        .await;

    let f = fixture(&server, None);

    let err = f.client.users().list().await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(f.store.is_empty().await);
    assert_eq!(f.navigator.signed_out.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_refresh_rejects_every_waiter() {
    let server = MockServer::start().await;
    for name in ["users", "stores"] {
        mount_collection(&server, name).await;
    }

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/token"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": "InternalError", "message": "boom"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let f = fixture(&server, Some("R1"));

    let (users, stores) = tokio::join!(f.client.users().list(), f.client.stores().list());

    assert_eq!(users.unwrap_err().status(), Some(500));
    assert_eq!(stores.unwrap_err().status(), Some(500));
    for key in CredentialKey::ALL {
        assert_eq!(f.store.get(key).await.unwrap(), None, "{} left behind", key);
    }
    assert_eq!(f.navigator.signed_out.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn timeouts_do_not_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_entries([
        (CredentialKey::AccessToken, "T1".to_string()),
        (CredentialKey::RefreshToken, "R1".to_string()),
    ]));
    let config = ClientConfig::from_url(&format!("{}/api", server.uri()))
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    let client = ApiClient::new(&config, store.clone(), Arc::new(NavigationHook::new())).unwrap();

    let err = client.products().list().await.unwrap_err();

    assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })));
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn explicit_refresh_uses_the_same_exchange() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/token"))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"token": "T2", "refreshToken": "R2"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let f = fixture(&server, Some("R1"));

    let token = f.client.auth().refresh_session().await.unwrap();

    assert_eq!(token, AccessToken::new("T2"));
    assert_eq!(
        f.store.refresh_token().await.unwrap(),
        Some(RefreshToken::new("R2"))
    );
}
