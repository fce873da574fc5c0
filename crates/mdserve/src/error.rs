//! CLI error types.

use mdserve_config::ConfigError;
use mdserve_renderer::CleanupError;
use mdserve_server::ServerError;
use mdserve_vfs::FsError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{0}")]
    Cleanup(#[from] CleanupError),

    #[error("{0}")]
    Index(#[from] FsError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}
