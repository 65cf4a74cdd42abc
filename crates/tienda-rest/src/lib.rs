//! tienda-rest - Authenticated REST client for the tienda marketplace API.
//!
//! [`ApiClient`] sends every request through two middleware stages around a
//! [`Transport`](tienda_core::Transport): the [`RequestAuthenticator`]
//! attaches the stored access token, and the [`SessionCoordinator`] recovers
//! from 401 responses with a single-flight token refresh.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tienda_core::{Credentials, MemoryCredentialStore};
//! use tienda_rest::{ApiClient, ClientConfig, NavigationHook};
//!
//! # async fn example() -> tienda_core::Result<()> {
//! let config = ClientConfig::from_url("http://localhost:8080/api")?;
//! let client = ApiClient::new(
//!     &config,
//!     Arc::new(MemoryCredentialStore::new()),
//!     Arc::new(NavigationHook::new()),
//! )?;
//!
//! client
//!     .auth()
//!     .login(&Credentials::new("ana@example.com", "s3cret"))
//!     .await?;
//! for product in client.products().list().await? {
//!     println!("{} {}", product.id, product.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod authenticator;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod endpoints;
pub mod envelope;
pub mod navigation;
pub mod transport;

pub use authenticator::RequestAuthenticator;
pub use client::ApiClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use coordinator::SessionCoordinator;
pub use navigation::NavigationHook;
pub use transport::HttpTransport;
