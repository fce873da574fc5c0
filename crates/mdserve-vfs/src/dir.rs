//! Filesystem backed by a directory on disk.

use std::fs::{self, ReadDir};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{FsError, FsErrorKind};
use crate::fs::{File, FileInfo, FileStat, FileSystem};

/// Serves files below a root directory.
///
/// Paths are slash-separated and resolved relative to the root. A leading
/// slash is ignored; `..` components are rejected so no path escapes the
/// root.
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    /// Create a filesystem rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path onto the root.
    fn resolve(&self, name: &str) -> Result<PathBuf, FsError> {
        let mut path = self.root.clone();
        for component in name.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    return Err(FsError::new(FsErrorKind::InvalidPath).with_path(name));
                }
                c if c.contains(['\0', '\\']) => {
                    return Err(FsError::new(FsErrorKind::InvalidPath).with_path(name));
                }
                c => path.push(c),
            }
        }
        Ok(path)
    }
}

impl FileSystem for DirFs {
    fn open(&self, name: &str) -> Result<Box<dyn File>, FsError> {
        let path = self.resolve(name)?;
        let metadata = fs::metadata(&path).map_err(|e| FsError::io(e, Some(path.clone())))?;

        let handle = if metadata.is_dir() {
            Handle::Dir { entries: None }
        } else {
            let file = fs::File::open(&path).map_err(|e| FsError::io(e, Some(path.clone())))?;
            Handle::File(file)
        };

        let name = path
            .file_name()
            .map_or_else(|| ".".to_owned(), |n| n.to_string_lossy().into_owned());

        Ok(Box::new(OsFile { path, name, handle }))
    }
}

#[derive(Debug)]
enum Handle {
    File(fs::File),
    /// Entries are read lazily on the first `readdir`.
    Dir { entries: Option<ReadDir> },
}

/// Handle to a file or directory on disk.
#[derive(Debug)]
pub struct OsFile {
    path: PathBuf,
    name: String,
    handle: Handle,
}

impl OsFile {
    fn is_dir_error(&self) -> io::Error {
        io::Error::new(
            io::ErrorKind::IsADirectory,
            format!("{} is a directory", self.path.display()),
        )
    }
}

impl Read for OsFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Handle::File(file) = &mut self.handle {
            return file.read(buf);
        }
        Err(self.is_dir_error())
    }
}

impl Seek for OsFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        if let Handle::File(file) = &mut self.handle {
            return file.seek(pos);
        }
        Err(self.is_dir_error())
    }
}

impl File for OsFile {
    fn stat(&self) -> Result<Box<dyn FileStat>, FsError> {
        let metadata = match &self.handle {
            Handle::File(file) => file.metadata(),
            Handle::Dir { .. } => fs::metadata(&self.path),
        }
        .map_err(|e| FsError::io(e, Some(self.path.clone())))?;

        Ok(Box::new(FileInfo::from_metadata(&self.name, &metadata)))
    }

    fn readdir(&mut self, count: usize) -> Result<Vec<FileInfo>, FsError> {
        let Handle::Dir { entries } = &mut self.handle else {
            return Err(FsError::new(FsErrorKind::NotADirectory).with_path(&self.path));
        };

        let mut iter = match entries.take() {
            Some(iter) => iter,
            None => {
                fs::read_dir(&self.path).map_err(|e| FsError::io(e, Some(self.path.clone())))?
            }
        };

        let limit = if count == 0 { usize::MAX } else { count };
        let result = collect_entries(&mut iter, limit);
        *entries = Some(iter);
        result
    }

    fn close(self: Box<Self>) -> Result<(), FsError> {
        // Dropping releases the descriptor
        drop(self);
        Ok(())
    }
}

fn collect_entries(iter: &mut ReadDir, limit: usize) -> Result<Vec<FileInfo>, FsError> {
    let mut infos = Vec::new();
    for entry in iter.take(limit) {
        let entry = entry.map_err(|e| FsError::io(e, None))?;
        let entry_path = entry.path();
        // Follow symlinks so a linked directory lists as a directory
        let metadata = fs::metadata(&entry_path)
            .or_else(|_| entry.metadata())
            .map_err(|e| FsError::io(e, Some(entry_path.clone())))?;
        infos.push(FileInfo::from_metadata(
            entry.file_name().to_string_lossy(),
            &metadata,
        ));
    }
    Ok(infos)
}
