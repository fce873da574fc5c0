//! Filesystem that renders Markdown files as HTML pages on open.

use std::io::Read;
use std::path::Path;

use mdserve_renderer::Renderer;

use crate::error::FsError;
use crate::fs::{File, FileSystem};
use crate::virtual_file::VirtualFile;

/// File extensions treated as Markdown (compared case-insensitively).
pub const MARKDOWN_EXTENSIONS: [&str; 4] = ["md", "markdown", "mdown", "mkd"];

/// Which regular files are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderScope {
    /// Only files with a Markdown extension.
    #[default]
    MarkdownOnly,
    /// Every regular file, whatever its extension.
    All,
}

impl RenderScope {
    /// Scope for the `render_all` setting.
    #[must_use]
    pub fn from_render_all(render_all: bool) -> Self {
        if render_all {
            Self::All
        } else {
            Self::MarkdownOnly
        }
    }

    /// True if a regular file called `name` is rendered.
    #[must_use]
    pub fn selects(self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::MarkdownOnly => is_markdown(name),
        }
    }
}

/// True if `name` has a Markdown extension.
#[must_use]
pub fn is_markdown(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|md| ext.eq_ignore_ascii_case(md))
        })
}

/// Wraps a filesystem so opening a Markdown file yields its rendered page.
///
/// Directories and files outside the [`RenderScope`] are returned exactly as
/// the inner filesystem opened them. Every selected open reads the whole file
/// and renders it again; nothing is cached.
#[derive(Debug)]
pub struct VirtualFs<F> {
    inner: F,
    renderer: Renderer,
    scope: RenderScope,
}

impl<F: FileSystem> VirtualFs<F> {
    /// Create a rendering view of `inner`.
    pub fn new(inner: F, renderer: Renderer, scope: RenderScope) -> Self {
        Self {
            inner,
            renderer,
            scope,
        }
    }

    /// The wrapped filesystem.
    #[must_use]
    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Active render strategy.
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Active render scope.
    #[must_use]
    pub fn scope(&self) -> RenderScope {
        self.scope
    }
}

impl<F: FileSystem> FileSystem for VirtualFs<F> {
    fn open(&self, name: &str) -> Result<Box<dyn File>, FsError> {
        let mut file = self.inner.open(name)?;
        let stat = file.stat()?;

        if stat.is_dir() || !self.scope.selects(name) {
            tracing::debug!(path = name, dir = stat.is_dir(), "Opened pass-through");
            return Ok(file);
        }

        let mut source = Vec::with_capacity(usize::try_from(stat.size()).unwrap_or_default());
        file.read_to_end(&mut source)
            .map_err(|e| FsError::io(e, Some(name.into())))?;

        let page = self.renderer.render(&source).map_err(|e| {
            tracing::warn!(path = name, renderer = self.renderer.name(), error = %e, "Render failed");
            FsError::render(e, name)
        })?;

        tracing::debug!(
            path = name,
            renderer = self.renderer.name(),
            source_len = source.len(),
            page_len = page.len(),
            "Rendered"
        );
        Ok(Box::new(VirtualFile::new(file, page)))
    }
}
