//! Offline rendering with the embedded Markdown converter.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pulldown_cmark::{Options, Parser};

use crate::assets::{AssetSet, materialize_into};
use crate::cleanup::PendingCleanup;
use crate::error::RenderError;
use crate::page::assemble;

/// Renders pages locally and links stylesheets written into the served root.
#[derive(Debug)]
pub struct LocalRenderer {
    root: PathBuf,
    cleanup: Arc<PendingCleanup>,
}

impl LocalRenderer {
    /// Create a renderer writing its stylesheets into `root`.
    ///
    /// Written stylesheets are registered with `cleanup` for removal at
    /// shutdown.
    pub fn new(root: &Path, cleanup: Arc<PendingCleanup>) -> Result<Self, RenderError> {
        let root = std::path::absolute(root).map_err(|source| RenderError::Root {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self { root, cleanup })
    }

    /// Absolute directory receiving the stylesheets.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Render Markdown into a full page.
    ///
    /// Stylesheets are rewritten on every call so a page never links a
    /// missing file, even if one was deleted while the server runs.
    pub fn render(&self, markdown: &[u8]) -> Result<Vec<u8>, RenderError> {
        // Register whatever landed on disk, even when a later asset failed
        let mut written = AssetSet::default();
        let materialized = materialize_into(&self.root, &mut written);
        tracing::debug!(root = %self.root.display(), assets = written.len(), "Materialized stylesheets");
        self.cleanup.register(written);
        materialized?;

        let fragment = markdown_to_html(markdown);
        Ok(assemble(fragment.as_bytes(), &stylesheet_links()))
    }
}

/// Root-relative links to the embedded stylesheets.
pub fn stylesheet_links() -> Vec<String> {
    mdserve_assets::STYLESHEETS
        .iter()
        .map(|name| format!("/{name}"))
        .collect()
}

/// Parser options for GitHub-flavoured Markdown.
fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_GFM
}

/// Convert Markdown to an HTML fragment.
///
/// Invalid UTF-8 sequences are replaced, so any byte input renders.
pub fn markdown_to_html(markdown: &[u8]) -> String {
    let source = String::from_utf8_lossy(markdown);
    let parser = Parser::new_ext(&source, parser_options());

    let mut html = String::with_capacity(source.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}
