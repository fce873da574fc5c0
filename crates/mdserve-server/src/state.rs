//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use mdserve_vfs::FileSystem;
use tokio::sync::watch;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Filesystem requests are served from.
    pub(crate) fs: Arc<dyn FileSystem>,
    /// Stop the server on the first render failure.
    pub(crate) strict: bool,
    /// Carries the failure that stops a strict server.
    pub(crate) abort: watch::Sender<Option<String>>,
}

impl AppState {
    /// Create state serving `fs`.
    pub(crate) fn new(fs: Arc<dyn FileSystem>, strict: bool) -> Self {
        let (abort, _) = watch::channel(None);
        Self { fs, strict, abort }
    }

    /// Record a render failure; in strict mode this stops the server.
    ///
    /// Only the first failure is kept.
    pub(crate) fn report_render_failure(&self, message: String) {
        if !self.strict {
            return;
        }
        let first = self.abort.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(message);
            true
        });
        if first {
            tracing::error!("Strict mode: stopping server after render failure");
        }
    }

    /// Failure that stopped the server, if any.
    pub(crate) fn abort_reason(&self) -> Option<String> {
        self.abort.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use mdserve_vfs::DirFs;

    use super::*;

    fn state(strict: bool) -> AppState {
        AppState::new(Arc::new(DirFs::new(".")), strict)
    }

    #[test]
    fn test_lenient_ignores_failures() {
        let state = state(false);
        state.report_render_failure("boom".to_owned());
        assert_eq!(state.abort_reason(), None);
    }

    #[test]
    fn test_strict_keeps_first_failure() {
        let state = state(true);
        let mut rx = state.abort.subscribe();

        state.report_render_failure("first".to_owned());
        state.report_render_failure("second".to_owned());

        assert!(rx.has_changed().unwrap());
        assert_eq!(state.abort_reason().as_deref(), Some("first"));
        assert_eq!(rx.borrow_and_update().as_deref(), Some("first"));
    }
}
