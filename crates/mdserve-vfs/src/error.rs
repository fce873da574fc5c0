//! Filesystem error type.

use std::path::PathBuf;

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FsErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Path escapes the root or is malformed.
    InvalidPath,
    /// Directory operation on a non-directory handle.
    NotADirectory,
    /// Rendering the file's content failed.
    Render,
    /// Other/unknown error category.
    Other,
}

/// Filesystem error with semantic kind and underlying source.
#[derive(Debug)]
pub struct FsError {
    /// Semantic error category.
    pub kind: FsErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FsError {
    /// Create a new filesystem error.
    #[must_use]
    pub fn new(kind: FsErrorKind) -> Self {
        Self {
            kind,
            path: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(FsErrorKind::NotFound).with_path(path)
    }

    /// Create an error for a failed render of `path`.
    #[must_use]
    pub fn render(err: mdserve_renderer::RenderError, path: impl Into<PathBuf>) -> Self {
        Self::new(FsErrorKind::Render).with_path(path).with_source(err)
    }

    /// The render failure behind a [`FsErrorKind::Render`] error.
    #[must_use]
    pub fn render_error(&self) -> Option<&mdserve_renderer::RenderError> {
        self.downcast_source()
    }

    /// Create a filesystem error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => FsErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => FsErrorKind::PermissionDenied,
            std::io::ErrorKind::NotADirectory => FsErrorKind::NotADirectory,
            std::io::ErrorKind::InvalidFilename | std::io::ErrorKind::InvalidInput => {
                FsErrorKind::InvalidPath
            }
            _ => FsErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "Kind: message (path: /foo/bar)"
        let kind_str = match self.kind {
            FsErrorKind::NotFound => "Not found",
            FsErrorKind::PermissionDenied => "Permission denied",
            FsErrorKind::InvalidPath => "Invalid path",
            FsErrorKind::NotADirectory => "Not a directory",
            FsErrorKind::Render => "Render failed",
            FsErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}
