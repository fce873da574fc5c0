//! Filesystem and file handle traits.
//!
//! A [`FileSystem`] opens handles by slash-separated path. A [`File`] handle
//! supports reading and seeking its content, querying metadata, enumerating
//! directory entries, and closing.

use std::fmt::Debug;
use std::fs::Metadata;
use std::io::{Read, Seek};
use std::time::SystemTime;

use crate::error::FsError;

/// Metadata of an opened file or directory.
pub trait FileStat: Debug + Send + Sync {
    /// Base name of the entry.
    fn name(&self) -> &str;

    /// Size in bytes of the content a reader will see.
    fn size(&self) -> u64;

    /// Unix permission bits.
    fn mode(&self) -> u32;

    /// Last modification time, if the platform reports one.
    fn modified(&self) -> Option<SystemTime>;

    /// True for directories.
    fn is_dir(&self) -> bool;
}

/// Plain metadata snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Base name of the entry.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Unix permission bits.
    pub mode: u32,
    /// Last modification time.
    pub modified: Option<SystemTime>,
    /// True for directories.
    pub is_dir: bool,
}

impl FileInfo {
    /// Snapshot `metadata` under `name`.
    #[must_use]
    pub fn from_metadata(name: impl Into<String>, metadata: &Metadata) -> Self {
        Self {
            name: name.into(),
            size: metadata.len(),
            mode: permission_bits(metadata),
            modified: metadata.modified().ok(),
            is_dir: metadata.is_dir(),
        }
    }
}

impl FileStat for FileInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn mode(&self) -> u32 {
        self.mode
    }

    fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    let base = if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    };
    if metadata.is_dir() { base | 0o111 } else { base }
}

/// An open file or directory.
///
/// Reading a directory handle fails. Enumerating a regular file handle fails
/// with [`FsErrorKind::NotADirectory`](crate::FsErrorKind::NotADirectory).
pub trait File: Read + Seek + Send + Debug {
    /// Metadata for the handle.
    fn stat(&self) -> Result<Box<dyn FileStat>, FsError>;

    /// Enumerate up to `count` further directory entries.
    ///
    /// `count == 0` returns every remaining entry. Once the directory is
    /// exhausted an empty list is returned.
    fn readdir(&mut self, count: usize) -> Result<Vec<FileInfo>, FsError>;

    /// Release the handle.
    fn close(self: Box<Self>) -> Result<(), FsError>;

    /// Media type of the content, when the handle knows it better than the
    /// file name does.
    fn media_type(&self) -> Option<&'static str> {
        None
    }
}

/// Opens file handles by slash-separated path.
pub trait FileSystem: Send + Sync {
    /// Open `name`, relative to the filesystem root.
    fn open(&self, name: &str) -> Result<Box<dyn File>, FsError>;
}

impl<T: FileSystem + ?Sized> FileSystem for std::sync::Arc<T> {
    fn open(&self, name: &str) -> Result<Box<dyn File>, FsError> {
        (**self).open(name)
    }
}
