//! Materialized assets awaiting removal at shutdown.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::assets::AssetSet;
use crate::error::CleanupError;

/// Assets written during the server's lifetime that must be deleted when it
/// stops.
///
/// Shared by every local render. Registering the same path twice keeps a
/// single entry, so repeated renders of the same root do not grow the list.
#[derive(Debug, Default)]
pub struct PendingCleanup {
    paths: Mutex<BTreeSet<PathBuf>>,
}

impl PendingCleanup {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of the paths written by one materialization.
    pub fn register(&self, assets: AssetSet) {
        let mut paths = self.paths.lock().unwrap_or_else(PoisonError::into_inner);
        paths.extend(assets);
    }

    /// Number of distinct paths awaiting removal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if nothing awaits removal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every registered asset and empty the collection.
    ///
    /// Every path is attempted even if an earlier one fails. A path that is
    /// already gone is skipped without error. Returns the number of files
    /// deleted.
    pub fn drain(&self) -> Result<usize, CleanupError> {
        let paths = std::mem::take(
            &mut *self.paths.lock().unwrap_or_else(PoisonError::into_inner),
        );

        let mut removed = 0;
        let mut failures = Vec::new();
        for path in paths {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Removed asset");
                    removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "Asset already removed");
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove asset");
                    failures.push((path, e));
                }
            }
        }

        if failures.is_empty() {
            Ok(removed)
        } else {
            Err(CleanupError { failures })
        }
    }
}
