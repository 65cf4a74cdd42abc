//! Transport trait.

use async_trait::async_trait;

use crate::request::{ApiRequest, ApiResponse};
use crate::tokens::AccessToken;
use crate::Result;

/// Sends API requests over the network.
///
/// A transport returns every HTTP response, whatever its status, as
/// `Ok(ApiResponse)`. `Err` is reserved for failures where no response
/// arrived: connection errors, timeouts.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the response.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;

    /// Replace the authorization applied to requests that carry none.
    ///
    /// Anonymous requests are never given the default. Transports without a
    /// default header ignore this.
    async fn set_default_authorization(&self, _token: Option<&AccessToken>) {}
}
