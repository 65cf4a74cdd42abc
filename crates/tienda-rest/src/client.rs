//! The authenticated API client.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use tienda_core::models::{Order, OrderItem, Product, Resource, Review, Store, User};
use tienda_core::{ApiRequest, ApiResponse, CredentialStore, Navigator, Result, Transport};

use crate::api::{AuthApi, DashboardApi, ResourceApi};
use crate::authenticator::RequestAuthenticator;
use crate::config::ClientConfig;
use crate::coordinator::SessionCoordinator;
use crate::transport::HttpTransport;

/// Client for the marketplace REST API.
///
/// Every request passes through the same pipeline: the stored access token
/// is attached, the request is sent, and a 401 response is recovered by the
/// shared [`SessionCoordinator`]. Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    authenticator: RequestAuthenticator,
    coordinator: SessionCoordinator,
}

impl ApiClient {
    /// Create a client that talks HTTP to the configured base URL.
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport), store, navigator))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let authenticator = RequestAuthenticator::new(store.clone());
        let coordinator =
            SessionCoordinator::new(transport.clone(), store.clone(), navigator.clone());

        Self {
            inner: Arc::new(ClientInner {
                transport,
                store,
                navigator,
                authenticator,
                coordinator,
            }),
        }
    }

    /// Send a request through the pipeline and return the response, any status.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        self.inner.authenticator.attach(&mut request).await;

        let response = self.inner.transport.send(request.clone()).await?;
        debug!(status = response.status(), "response");

        self.inner.coordinator.recover(request, response).await
    }

    /// Send a request and fail on any non-2xx final status.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let response = self.send(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(response.into_error().into())
        }
    }

    /// Send a request and decode the JSON body of a 2xx response.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.execute(request).await?.json()
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn dashboard(&self) -> DashboardApi<'_> {
        DashboardApi::new(self)
    }

    /// CRUD operations for any [`Resource`].
    pub fn resource<R: Resource>(&self) -> ResourceApi<'_, R> {
        ResourceApi::new(self)
    }

    pub fn users(&self) -> ResourceApi<'_, User> {
        self.resource()
    }

    pub fn stores(&self) -> ResourceApi<'_, Store> {
        self.resource()
    }

    pub fn products(&self) -> ResourceApi<'_, Product> {
        self.resource()
    }

    pub fn orders(&self) -> ResourceApi<'_, Order> {
        self.resource()
    }

    pub fn order_items(&self) -> ResourceApi<'_, OrderItem> {
        self.resource()
    }

    pub fn reviews(&self) -> ResourceApi<'_, Review> {
        self.resource()
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    pub fn coordinator(&self) -> &SessionCoordinator {
        &self.inner.coordinator
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.transport
    }

    pub(crate) fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("refreshing", &self.inner.coordinator.is_refreshing())
            .finish_non_exhaustive()
    }
}
