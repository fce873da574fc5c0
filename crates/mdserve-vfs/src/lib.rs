//! Content-rewriting virtual filesystem for mdserve.
//!
//! [`VirtualFs`] wraps any [`FileSystem`] and intercepts `open`: a Markdown
//! file is read in full, rendered into a standalone HTML page, and handed back
//! as a [`VirtualFile`] whose reads, seeks and reported size all refer to the
//! page. Directories and other files pass through untouched.
//!
//! # Architecture
//!
//! - [`FileSystem`] / [`File`] / [`FileStat`]: the handle contract
//! - [`DirFs`]: handles backed by a directory on disk
//! - [`VirtualFs`] and [`VirtualFile`]: the rewriting layer
//! - [`DirectoryIndex`]: a one-shot walk mapping directories to their files
//!
//! # Example
//!
//! ```ignore
//! use std::io::Read;
//! use std::sync::Arc;
//! use mdserve_renderer::{PendingCleanup, Renderer};
//! use mdserve_vfs::{DirFs, FileSystem, RenderScope, VirtualFs};
//!
//! let cleanup = Arc::new(PendingCleanup::new());
//! let renderer = Renderer::local("docs".as_ref(), Arc::clone(&cleanup))?;
//! let fs = VirtualFs::new(DirFs::new("docs"), renderer, RenderScope::default());
//!
//! let mut page = String::new();
//! fs.open("/README.md")?.read_to_string(&mut page)?;
//! ```

mod dir;
mod error;
mod fs;
mod index;
mod virtual_file;
mod virtual_fs;

pub use dir::{DirFs, OsFile};
pub use error::{FsError, FsErrorKind};
pub use fs::{File, FileInfo, FileStat, FileSystem};
pub use index::DirectoryIndex;
pub use virtual_file::{RENDERED_MEDIA_TYPE, VirtualFile, VirtualFileInfo};
pub use virtual_fs::{MARKDOWN_EXTENSIONS, RenderScope, VirtualFs, is_markdown};
