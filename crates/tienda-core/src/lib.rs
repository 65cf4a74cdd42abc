//! tienda-core - Core types and traits for the tienda marketplace client.
//!
//! This crate holds everything the client stack shares: the error taxonomy,
//! token and credential types, the credential store and transport seams,
//! and the marketplace entity models.

pub mod credentials;
pub mod error;
pub mod memory;
pub mod models;
pub mod request;
pub mod session;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use memory::MemoryCredentialStore;
pub use request::{ApiRequest, ApiResponse, Method};
pub use session::{CredentialBundle, CredentialKey, Profile};
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{CredentialStore, Navigator, Transport};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
