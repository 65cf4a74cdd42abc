//! Request-stage middleware: attach the stored bearer credential.

use std::sync::Arc;

use tracing::{trace, warn};

use tienda_core::{ApiRequest, CredentialStore};

/// Attaches the current access token to outgoing requests.
#[derive(Clone)]
pub struct RequestAuthenticator {
    store: Arc<dyn CredentialStore>,
}

impl RequestAuthenticator {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Set `Authorization: Bearer <token>` when a token is stored.
    ///
    /// A missing token or an unreadable store leaves the request unchanged;
    /// unauthenticated endpoints must keep working.
    pub async fn attach(&self, request: &mut ApiRequest) {
        if request.is_anonymous() {
            return;
        }

        match self.store.access_token().await {
            Ok(Some(token)) => request.set_bearer(&token),
            Ok(None) => trace!(path = request.path(), "no access token stored"),
            Err(e) => warn!(error = %e, "failed to read access token, sending without it"),
        }
    }
}
