//! Sign-in, registration and session lifecycle.

use serde_json::Value;
use tracing::{info, instrument, warn};

use tienda_core::error::AuthError;
use tienda_core::{
    AccessToken, ApiRequest, CredentialBundle, Credentials, Profile, RefreshToken, Result,
};

use crate::client::ApiClient;
use crate::endpoints::{AuthenticationResponse, LOGIN, LoginRequest, ME, REGISTER, RegisterRequest};
use crate::envelope::MaybeEnveloped;

/// Authentication endpoints and the stored session.
#[derive(Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Sign in and persist the session.
    ///
    /// The whole credential bundle is written in one store call before
    /// navigation is reset to the authenticated root.
    #[instrument(skip(self, credentials), fields(email = credentials.email()))]
    pub async fn login(self, credentials: &Credentials) -> Result<Profile> {
        let request = ApiRequest::post(LOGIN)
            .json(&LoginRequest {
                email: credentials.email(),
                password: credentials.password(),
            })?
            .anonymous();

        let response: MaybeEnveloped<AuthenticationResponse> =
            self.client.execute_json(request).await?;
        let bundle = bundle_from(response.into_inner(), credentials.email());

        self.client.store().store_bundle(&bundle).await?;
        self.client
            .transport()
            .set_default_authorization(Some(&bundle.access_token))
            .await;
        self.client.navigator().reset_to_authenticated();

        info!(user_id = %bundle.profile.user_id, "signed in");
        Ok(bundle.profile)
    }

    /// Create an account. Does not sign in.
    ///
    /// Returns the server's confirmation message, if it sent one.
    #[instrument(skip(self, credentials), fields(email = credentials.email()))]
    pub async fn register(
        self,
        first_name: &str,
        last_name: &str,
        credentials: &Credentials,
    ) -> Result<Option<String>> {
        let request = ApiRequest::post(REGISTER)
            .json(&RegisterRequest {
                firstname: first_name,
                lastname: last_name,
                email: credentials.email(),
                password: credentials.password(),
            })?
            .anonymous();

        let response = self.client.execute(request).await?;
        let message = serde_json::from_str::<Value>(response.text())
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string));

        info!("account registered");
        Ok(message)
    }

    /// Profile of the signed-in user, as returned by the server.
    ///
    /// Fails with [`AuthError::NotAuthenticated`] without a request when no
    /// session is stored.
    pub async fn me(self) -> Result<Value> {
        if !self.is_authenticated().await {
            return Err(AuthError::NotAuthenticated.into());
        }
        self.client.execute_json(ApiRequest::get(ME)).await
    }

    /// Exchange the stored refresh token for a new access token now.
    pub async fn refresh_session(self) -> Result<AccessToken> {
        self.client.coordinator().refresh().await
    }

    /// Erase the stored session and reset navigation to sign-in.
    ///
    /// The default authorization header and navigation are reset even when
    /// the store fails to erase; the store error is still returned.
    #[instrument(skip(self))]
    pub async fn logout(self) -> Result<()> {
        let cleared = self.client.store().clear().await;
        self.client.transport().set_default_authorization(None).await;
        self.client.navigator().reset_to_unauthenticated();

        if cleared.is_ok() {
            info!("signed out");
        }
        cleared
    }

    /// Returns true if an access token is stored.
    pub async fn is_authenticated(self) -> bool {
        match self.client.store().access_token().await {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!(error = %e, "failed to read access token, treating as signed out");
                false
            }
        }
    }

    /// The stored session profile, if signed in.
    pub async fn current_profile(self) -> Result<Option<Profile>> {
        Ok(self.client.store().load_bundle().await?.map(|b| b.profile))
    }
}

fn bundle_from(response: AuthenticationResponse, email: &str) -> CredentialBundle {
    let user_id = match response.authuser_id {
        Some(Value::String(id)) => id,
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    };

    CredentialBundle {
        access_token: AccessToken::new(response.token),
        refresh_token: response
            .refresh_token
            .filter(|t| !t.is_empty())
            .map(RefreshToken::new),
        profile: Profile {
            user_id,
            email: response.email.unwrap_or_else(|| email.to_string()),
            first_name: response.firstname.unwrap_or_default(),
            last_name: response.lastname.unwrap_or_default(),
            role: response.role.unwrap_or_default(),
        },
    }
}
