//! Markdown page rendering for mdserve.
//!
//! Turns raw Markdown bytes into a standalone, styled HTML page. Two
//! strategies exist, selected once at startup:
//!
//! - [`LocalRenderer`]: converts with `pulldown-cmark` and links stylesheets
//!   that are written into the served root on every render
//! - [`RemoteRenderer`]: posts the Markdown to a rendering API and links
//!   externally hosted stylesheets
//!
//! Stylesheets written by the local strategy are tracked by a shared
//! [`PendingCleanup`] which the server drains when it stops.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use std::sync::Arc;
//! use mdserve_renderer::{PendingCleanup, Renderer};
//!
//! let cleanup = Arc::new(PendingCleanup::new());
//! let renderer = Renderer::local(Path::new("docs"), Arc::clone(&cleanup))?;
//! let page = renderer.render(b"# Hello")?;
//! cleanup.drain()?;
//! ```

mod assets;
mod cleanup;
mod error;
mod local;
mod page;
mod remote;

use std::path::Path;
use std::sync::Arc;

pub use assets::{AssetSet, materialize};
pub use cleanup::PendingCleanup;
pub use error::{CleanupError, RenderError};
pub use local::{LocalRenderer, markdown_to_html, stylesheet_links};
pub use page::{assemble, style_link};
pub use remote::{DEFAULT_ENDPOINT, DEFAULT_STYLESHEETS, RemoteRenderer};

/// Page rendering strategy.
#[derive(Debug)]
pub enum Renderer {
    /// Embedded converter, stylesheets materialized into the served root.
    Local(LocalRenderer),
    /// External rendering API, hosted stylesheets.
    Remote(RemoteRenderer),
}

impl Renderer {
    /// Create a local renderer for `root`.
    pub fn local(root: &Path, cleanup: Arc<PendingCleanup>) -> Result<Self, RenderError> {
        LocalRenderer::new(root, cleanup).map(Self::Local)
    }

    /// Render Markdown bytes into a complete HTML page.
    ///
    /// Either the whole page is returned or an error; there is no partial
    /// output.
    pub fn render(&self, markdown: &[u8]) -> Result<Vec<u8>, RenderError> {
        match self {
            Self::Local(renderer) => renderer.render(markdown),
            Self::Remote(renderer) => renderer.render(markdown),
        }
    }

    /// Short strategy name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "remote",
        }
    }
}

impl From<RemoteRenderer> for Renderer {
    fn from(renderer: RemoteRenderer) -> Self {
        Self::Remote(renderer)
    }
}
