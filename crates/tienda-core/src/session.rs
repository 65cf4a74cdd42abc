//! Persisted session data: credential keys and the credential bundle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tokens::{AccessToken, RefreshToken};

/// A key in the credential store.
///
/// Key names are shared with the other clients of the backend, so a store
/// written by one client stays readable by another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
    UserId,
    Email,
    FirstName,
    LastName,
    Role,
}

impl CredentialKey {
    /// Every key of a session, in storage order.
    pub const ALL: [CredentialKey; 7] = [
        CredentialKey::AccessToken,
        CredentialKey::RefreshToken,
        CredentialKey::UserId,
        CredentialKey::Email,
        CredentialKey::FirstName,
        CredentialKey::LastName,
        CredentialKey::Role,
    ];

    /// The two keys rewritten by a token refresh.
    pub const TOKENS: [CredentialKey; 2] = [CredentialKey::AccessToken, CredentialKey::RefreshToken];

    /// Returns the storage name of this key.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::AccessToken => "token",
            CredentialKey::RefreshToken => "refreshToken",
            CredentialKey::UserId => "authuserId",
            CredentialKey::Email => "email",
            CredentialKey::FirstName => "firstname",
            CredentialKey::LastName => "lastname",
            CredentialKey::Role => "role",
        }
    }

    /// Looks up a key by its storage name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile fields stored alongside the tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

/// Everything persisted for a signed-in session.
///
/// The bundle is written as one set and erased as one set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    pub access_token: AccessToken,
    pub refresh_token: Option<RefreshToken>,
    pub profile: Profile,
}

impl CredentialBundle {
    /// Returns the key/value pairs to write.
    ///
    /// A missing refresh token is stored as an empty string, which reads back as absent.
    pub fn entries(&self) -> Vec<(CredentialKey, String)> {
        vec![
            (CredentialKey::AccessToken, self.access_token.as_str().to_string()),
            (
                CredentialKey::RefreshToken,
                self.refresh_token
                    .as_ref()
                    .map(|t| t.as_str().to_string())
                    .unwrap_or_default(),
            ),
            (CredentialKey::UserId, self.profile.user_id.clone()),
            (CredentialKey::Email, self.profile.email.clone()),
            (CredentialKey::FirstName, self.profile.first_name.clone()),
            (CredentialKey::LastName, self.profile.last_name.clone()),
            (CredentialKey::Role, self.profile.role.clone()),
        ]
    }

    /// Rebuilds a bundle from values read in [`CredentialKey::ALL`] order.
    ///
    /// Returns `None` when no access token is stored.
    pub fn from_values(values: Vec<Option<String>>) -> Option<Self> {
        let mut values = values.into_iter().map(|v| v.filter(|s| !s.is_empty()));
        let mut next = || values.next().flatten();

        let access_token = AccessToken::new(next()?);
        let refresh_token = next().map(RefreshToken::new);
        let profile = Profile {
            user_id: next().unwrap_or_default(),
            email: next().unwrap_or_default(),
            first_name: next().unwrap_or_default(),
            last_name: next().unwrap_or_default(),
            role: next().unwrap_or_default(),
        };

        Some(Self {
            access_token,
            refresh_token,
            profile,
        })
    }
}
