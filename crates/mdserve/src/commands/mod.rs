//! CLI command implementations.

pub(crate) mod index;
pub(crate) mod serve;

use std::path::Path;

pub(crate) use index::IndexArgs;
pub(crate) use serve::ServeArgs;

use crate::error::CliError;

/// Fail unless `root` is an existing directory.
pub(crate) fn require_dir(root: &Path) -> Result<(), CliError> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(CliError::Validation(format!(
            "Not a directory: {}",
            root.display()
        )))
    }
}
