//! Navigation reset trait.

/// Receives session transitions from the client.
///
/// Implementations move the user interface to the signed-out or signed-in
/// root. They must not block.
pub trait Navigator: Send + Sync {
    /// Reset to the unauthenticated root (sign-in).
    fn reset_to_unauthenticated(&self);

    /// Reset to the authenticated root.
    fn reset_to_authenticated(&self);
}
