//! Transport-neutral request and response descriptors.
//!
//! An [`ApiRequest`] carries everything needed to send (and later replay) a
//! call: method, path relative to the API base, headers, JSON body, and the
//! one-shot marker recording that it was already retried after a refresh.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Result;
use crate::error::{InvalidInputError, ProtocolError};
use crate::tokens::AccessToken;

/// Name of the authorization header, lowercase as stored in [`ApiRequest`].
pub const AUTHORIZATION: &str = "authorization";

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to the REST API.
#[derive(Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    headers: BTreeMap<String, String>,
    body: Option<serde_json::Value>,
    anonymous: bool,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
            anonymous: false,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Other {
            message: format!("request body is not serializable: {}", e),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Mark this request as sent without a bearer credential.
    ///
    /// Anonymous requests are never given an authorization header and never
    /// enter the refresh path.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// Set a header. Names are stored lowercase.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Set the authorization header to a bearer credential.
    pub fn set_bearer(&mut self, token: &AccessToken) {
        self.headers.insert(AUTHORIZATION.to_string(), token.bearer());
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn authorization(&self) -> Option<&str> {
        self.headers.get(AUTHORIZATION).map(String::as_str)
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Returns true once the request has been replayed after a refresh.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub fn mark_retried(&mut self) {
        self.retried = true;
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let value = if name == AUTHORIZATION {
                    "[REDACTED]"
                } else {
                    value.as_str()
                };
                (name.as_str(), value)
            })
            .collect();

        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &headers)
            .field("has_body", &self.body.is_some())
            .field("anonymous", &self.anonymous)
            .field("retried", &self.retried)
            .finish()
    }
}

/// A response from the REST API, any status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: String,
}

/// Error body shape used by the backend.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if the API rejected the request's credentials.
    pub fn is_auth_failure(&self) -> bool {
        self.status == 401
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            ProtocolError::unexpected_body(self.status, format!("undecodable body: {}", e)).into()
        })
    }

    /// Convert a non-success response into a protocol error.
    pub fn into_error(self) -> ProtocolError {
        match serde_json::from_str::<ErrorBody>(&self.body) {
            Ok(body) => ProtocolError::new(self.status, body.error, body.message),
            Err(_) => ProtocolError::new(self.status, None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_authorization() {
        let mut request = ApiRequest::get("products");
        request.set_bearer(&AccessToken::new("T1-secret"));
        let debug = format!("{:?}", request);
        assert!(!debug.contains("T1-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn set_bearer_overwrites_previous_token() {
        let mut request = ApiRequest::get("products").header("Authorization", "Bearer T1");
        request.set_bearer(&AccessToken::new("T2"));
        assert_eq!(request.authorization(), Some("Bearer T2"));
    }

    #[test]
    fn retried_marker_is_one_way() {
        let mut request = ApiRequest::get("orders");
        assert!(!request.is_retried());
        request.mark_retried();
        assert!(request.clone().is_retried());
    }

    #[test]
    fn error_body_is_parsed() {
        let response = ApiResponse::new(409, r#"{"error":"Conflict","message":"email taken"}"#);
        let err = response.into_error();
        assert_eq!(err.status, 409);
        assert_eq!(err.error.as_deref(), Some("Conflict"));
        assert_eq!(err.message.as_deref(), Some("email taken"));
    }

    #[test]
    fn non_json_error_body_keeps_status() {
        let err = ApiResponse::new(500, "Internal Server Error").into_error();
        assert_eq!(err.status, 500);
        assert!(err.message.is_none());
    }
}
