//! Seams between the session machinery and its collaborators.

mod navigator;
mod store;
mod transport;

pub use navigator::Navigator;
pub use store::CredentialStore;
pub use transport::Transport;
