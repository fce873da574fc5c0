//! Error types for page rendering.

use std::path::PathBuf;

/// Render error.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The served root cannot be turned into an absolute path.
    #[error("invalid render root {}: {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An embedded asset payload is missing from the binary.
    #[error("embedded asset not found: {0}")]
    AssetMissing(String),

    /// Writing a materialized asset to disk failed.
    #[error("failed to write asset {}: {source}", path.display())]
    AssetWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote rendering API could not be reached or its body not read.
    #[error("remote render request failed: {0}")]
    Transport(#[from] ureq::Error),

    /// The remote rendering API answered with a non-success status.
    #[error("remote renderer returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl RenderError {
    /// Whether the failure came from the remote rendering API.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

/// Failure to remove one or more materialized assets.
#[derive(Debug, thiserror::Error)]
#[error("failed to remove {} asset(s): {}", failures.len(), describe(failures))]
pub struct CleanupError {
    /// Each asset that could not be removed, with the reason.
    pub failures: Vec<(PathBuf, std::io::Error)>,
}

fn describe(failures: &[(PathBuf, std::io::Error)]) -> String {
    failures
        .iter()
        .map(|(path, err)| format!("{} ({err})", path.display()))
        .collect::<Vec<_>>()
        .join(", ")
}
