//! Server error types.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use mdserve_renderer::RenderError;
use mdserve_vfs::{FsError, FsErrorKind};

/// Errors from starting the server or answering a request.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Opening or reading through the virtual filesystem failed.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// The render strategy could not be set up.
    #[error("Renderer setup failed: {0}")]
    Renderer(#[from] RenderError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A response could not be built.
    #[error("Invalid response: {0}")]
    Http(#[from] axum::http::Error),

    /// A blocking request task panicked or was cancelled.
    #[error("Request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Strict mode stopped the server after a render failure.
    #[error("Stopped after render failure: {0}")]
    StrictAbort(String),
}

impl ServerError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Fs(e) => match e.kind {
                FsErrorKind::NotFound | FsErrorKind::InvalidPath => StatusCode::NOT_FOUND,
                FsErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
                FsErrorKind::Render if e.render_error().is_some_and(RenderError::is_remote) => {
                    StatusCode::BAD_GATEWAY
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Details stay in the server log; they may name on-disk paths
        let body = match status {
            StatusCode::NOT_FOUND => "404 page not found".to_owned(),
            _ => format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Error")
            ),
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}
