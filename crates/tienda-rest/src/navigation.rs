//! Navigation reset hook.

use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use tienda_core::Navigator;

/// Forwards session transitions to a navigator once one is mounted.
///
/// Calls made before [`NavigationHook::mount`] are dropped: there is no
/// navigation root to reset yet.
#[derive(Default)]
pub struct NavigationHook {
    root: RwLock<Option<Arc<dyn Navigator>>>,
}

impl NavigationHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount the navigation root. Replaces any previously mounted root.
    pub fn mount(&self, navigator: Arc<dyn Navigator>) {
        match self.root.write() {
            Ok(mut root) => *root = Some(navigator),
            Err(poisoned) => *poisoned.into_inner() = Some(navigator),
        }
        debug!("navigation root mounted");
    }

    /// Unmount the navigation root.
    pub fn unmount(&self) {
        match self.root.write() {
            Ok(mut root) => *root = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.current().is_some()
    }

    fn current(&self) -> Option<Arc<dyn Navigator>> {
        match self.root.read() {
            Ok(root) => root.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Navigator for NavigationHook {
    fn reset_to_unauthenticated(&self) {
        match self.current() {
            Some(root) => {
                info!("resetting navigation to sign-in");
                root.reset_to_unauthenticated();
            }
            None => debug!("navigation not mounted, ignoring reset to sign-in"),
        }
    }

    fn reset_to_authenticated(&self) {
        match self.current() {
            Some(root) => {
                info!("resetting navigation to main");
                root.reset_to_authenticated();
            }
            None => debug!("navigation not mounted, ignoring reset to main"),
        }
    }
}
