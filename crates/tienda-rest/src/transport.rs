//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

use tienda_core::error::{Error, InvalidInputError, TransportError};
use tienda_core::{AccessToken, ApiRequest, ApiResponse, ApiUrl, Method, Result, Transport};

use crate::config::ClientConfig;

/// HTTP transport for the REST API.
///
/// Holds the base URL, the request timeout, and a default authorization
/// header applied to non-anonymous requests that carry none of their own.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: ApiUrl,
    default_authorization: RwLock<Option<String>>,
}

impl HttpTransport {
    /// Create a transport from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(map_reqwest)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            default_authorization: RwLock::new(None),
        })
    }

    /// Returns the base URL this transport is configured for.
    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.base_url.endpoint(request.path());
        debug!(%url, retried = request.is_retried(), "sending request");

        let mut builder = self.client.request(Self::method(request.method()), &url);

        for (name, value) in request.headers() {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid_header(name, e))?;
            let value = HeaderValue::from_str(value).map_err(|e| invalid_header(name.as_str(), e))?;
            builder = builder.header(name, value);
        }

        if request.authorization().is_none() && !request.is_anonymous() {
            if let Some(default) = self.default_authorization.read().await.as_deref() {
                builder = builder.header(AUTHORIZATION, default);
            }
        }

        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_reqwest)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest)?;
        trace!(status, bytes = body.len(), "response received");

        Ok(ApiResponse::new(status, body))
    }

    async fn set_default_authorization(&self, token: Option<&AccessToken>) {
        *self.default_authorization.write().await = token.map(AccessToken::bearer);
        debug!(present = token.is_some(), "updated default authorization");
    }
}

fn invalid_header(name: &str, err: impl std::fmt::Display) -> Error {
    InvalidInputError::Other {
        message: format!("invalid header '{}': {}", name, err),
    }
    .into()
}

/// Classify a reqwest failure. Timeouts never reach the refresh path.
pub(crate) fn map_reqwest(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout {
            message: err.to_string(),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}
