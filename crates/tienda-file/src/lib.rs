//! tienda-file - File-backed credential store.
//!
//! Persists the session's credential bundle as a small JSON document so a
//! signed-in session survives across process runs.

mod store;

pub use store::FileCredentialStore;
