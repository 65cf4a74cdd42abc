//! Credential store trait.

use async_trait::async_trait;

use crate::session::{CredentialBundle, CredentialKey};
use crate::tokens::{AccessToken, RefreshToken};
use crate::Result;

/// Durable key-value storage for session credentials.
///
/// `set_many` and `remove_many` must apply all of their keys together: a
/// reader never observes half of a write. `get_many` reads all of its keys
/// from one consistent state.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read one key.
    async fn get(&self, key: CredentialKey) -> Result<Option<String>>;

    /// Read several keys from one consistent state.
    async fn get_many(&self, keys: &[CredentialKey]) -> Result<Vec<Option<String>>>;

    /// Write several keys as one atomic update.
    async fn set_many(&self, entries: &[(CredentialKey, String)]) -> Result<()>;

    /// Remove several keys as one atomic update.
    async fn remove_many(&self, keys: &[CredentialKey]) -> Result<()>;

    /// Returns the stored access token, if any.
    async fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self
            .get(CredentialKey::AccessToken)
            .await?
            .filter(|t| !t.is_empty())
            .map(AccessToken::new))
    }

    /// Returns the stored refresh token, if any.
    async fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        Ok(self
            .get(CredentialKey::RefreshToken)
            .await?
            .filter(|t| !t.is_empty())
            .map(RefreshToken::new))
    }

    /// Returns the stored token pair, read together.
    async fn tokens(&self) -> Result<(Option<AccessToken>, Option<RefreshToken>)> {
        let mut values = self
            .get_many(&CredentialKey::TOKENS)
            .await?
            .into_iter()
            .map(|v| v.filter(|t| !t.is_empty()));
        let access = values.next().flatten().map(AccessToken::new);
        let refresh = values.next().flatten().map(RefreshToken::new);
        Ok((access, refresh))
    }

    /// Replace the token pair in one write.
    async fn store_tokens(&self, access: &AccessToken, refresh: &RefreshToken) -> Result<()> {
        self.set_many(&[
            (CredentialKey::AccessToken, access.as_str().to_string()),
            (CredentialKey::RefreshToken, refresh.as_str().to_string()),
        ])
        .await
    }

    /// Write a full session bundle in one write.
    async fn store_bundle(&self, bundle: &CredentialBundle) -> Result<()> {
        self.set_many(&bundle.entries()).await
    }

    /// Read the full session bundle, if a session is stored.
    async fn load_bundle(&self) -> Result<Option<CredentialBundle>> {
        let values = self.get_many(&CredentialKey::ALL).await?;
        Ok(CredentialBundle::from_values(values))
    }

    /// Erase every session key.
    async fn clear(&self) -> Result<()> {
        self.remove_many(&CredentialKey::ALL).await
    }
}
