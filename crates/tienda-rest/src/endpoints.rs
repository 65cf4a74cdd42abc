//! Endpoint paths and request/response types for the auth API.

use serde::{Deserialize, Serialize};

/// POST, anonymous: email/password sign-in.
pub const LOGIN: &str = "auth/login";

/// POST, anonymous: account registration.
pub const REGISTER: &str = "auth/register";

/// GET: profile of the signed-in user.
pub const ME: &str = "auth/me";

/// POST, anonymous: refresh-token exchange.
pub const REFRESH_TOKEN: &str = "auth/refresh/token";

/// GET: dashboard aggregation.
pub const DASHBOARD: &str = "dashboard";

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from login and register, at the top level of the body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub authuser_id: Option<serde_json::Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Token pair returned by the refresh exchange.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshPayload {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// The refresh exchange body: enveloped under `data`, or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RefreshResponse {
    Enveloped { data: RefreshPayload },
    Bare(RefreshPayload),
}

impl RefreshResponse {
    pub fn into_payload(self) -> RefreshPayload {
        match self {
            RefreshResponse::Enveloped { data } => data,
            RefreshResponse::Bare(payload) => payload,
        }
    }
}
