//! File handle whose content is replaced by rendered bytes.

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::time::SystemTime;

use crate::error::FsError;
use crate::fs::{File, FileInfo, FileStat};

/// Media type of rendered pages.
pub const RENDERED_MEDIA_TYPE: &str = "text/html; charset=utf-8";

/// The original handle, limited to the operations it still serves once its
/// content has been replaced.
struct Underlying(Box<dyn File>);

impl Underlying {
    fn stat(&self) -> Result<Box<dyn FileStat>, FsError> {
        self.0.stat()
    }

    fn readdir(&mut self, count: usize) -> Result<Vec<FileInfo>, FsError> {
        self.0.readdir(count)
    }

    fn close(self) -> Result<(), FsError> {
        self.0.close()
    }
}

/// A file handle that reads from an in-memory page instead of the file it
/// was opened from.
///
/// Reads and seeks go to the page. `stat` reports the page length as the
/// size. `readdir` and `close` are forwarded to the original handle.
pub struct VirtualFile {
    underlying: Underlying,
    content: Cursor<Vec<u8>>,
}

impl VirtualFile {
    /// Wrap `underlying`, serving `content` in its place.
    #[must_use]
    pub fn new(underlying: Box<dyn File>, content: Vec<u8>) -> Self {
        Self {
            underlying: Underlying(underlying),
            content: Cursor::new(content),
        }
    }

    /// The replacement content.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        self.content.get_ref()
    }
}

impl std::fmt::Debug for VirtualFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualFile")
            .field("len", &self.content.get_ref().len())
            .field("position", &self.content.position())
            .finish_non_exhaustive()
    }
}

impl Read for VirtualFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.content.read(buf)
    }
}

impl Seek for VirtualFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.content.seek(pos)
    }
}

impl File for VirtualFile {
    fn stat(&self) -> Result<Box<dyn FileStat>, FsError> {
        Ok(Box::new(VirtualFileInfo {
            inner: self.underlying.stat()?,
            size: self.content.get_ref().len() as u64,
        }))
    }

    fn readdir(&mut self, count: usize) -> Result<Vec<FileInfo>, FsError> {
        self.underlying.readdir(count)
    }

    fn close(self: Box<Self>) -> Result<(), FsError> {
        self.underlying.close()
    }

    fn media_type(&self) -> Option<&'static str> {
        Some(RENDERED_MEDIA_TYPE)
    }
}

/// Metadata of the original file with the size of the replacement content.
#[derive(Debug)]
pub struct VirtualFileInfo {
    inner: Box<dyn FileStat>,
    size: u64,
}

impl FileStat for VirtualFileInfo {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn mode(&self) -> u32 {
        self.inner.mode()
    }

    fn modified(&self) -> Option<SystemTime> {
        self.inner.modified()
    }

    fn is_dir(&self) -> bool {
        self.inner.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::FsErrorKind;

    /// In-memory handle recording which operations reach it.
    #[derive(Debug)]
    struct TrackedFile {
        data: Cursor<Vec<u8>>,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl TrackedFile {
        fn with_data(data: &[u8]) -> (Self, Arc<Mutex<Vec<&'static str>>>) {
            let tracked = Self {
                data: Cursor::new(data.to_vec()),
                calls: Arc::default(),
            };
            let calls = Arc::clone(&tracked.calls);
            (tracked, calls)
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl Read for TrackedFile {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.record("read");
            self.data.read(buf)
        }
    }

    impl Seek for TrackedFile {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.record("seek");
            self.data.seek(pos)
        }
    }

    impl File for TrackedFile {
        fn stat(&self) -> Result<Box<dyn FileStat>, FsError> {
            self.record("stat");
            Ok(Box::new(FileInfo {
                name: "doc.md".to_owned(),
                size: self.data.get_ref().len() as u64,
                mode: 0o640,
                modified: Some(SystemTime::UNIX_EPOCH),
                is_dir: false,
            }))
        }

        fn readdir(&mut self, _count: usize) -> Result<Vec<FileInfo>, FsError> {
            self.record("readdir");
            Err(FsError::new(FsErrorKind::NotADirectory))
        }

        fn close(self: Box<Self>) -> Result<(), FsError> {
            self.record("close");
            Ok(())
        }
    }

    #[test]
    fn test_reads_replacement_content() {
        let (tracked, calls) = TrackedFile::with_data(b"# original");
        let mut file = VirtualFile::new(Box::new(tracked), b"<html>page</html>".to_vec());

        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();

        assert_eq!(content, "<html>page</html>");
        assert!(!calls.lock().unwrap().contains(&"read"));
    }

    #[test]
    fn test_stat_size_matches_content() {
        let (tracked, _calls) = TrackedFile::with_data(b"short");
        let file = VirtualFile::new(Box::new(tracked), vec![b'x'; 1234]);

        let stat = file.stat().unwrap();

        assert_eq!(stat.size(), 1234);
        assert_eq!(stat.size(), file.content().len() as u64);
    }

    #[test]
    fn test_stat_passes_other_fields_through() {
        let (tracked, _calls) = TrackedFile::with_data(b"short");
        let file = VirtualFile::new(Box::new(tracked), b"longer content".to_vec());

        let stat = file.stat().unwrap();

        assert_eq!(stat.name(), "doc.md");
        assert_eq!(stat.mode(), 0o640);
        assert_eq!(stat.modified(), Some(SystemTime::UNIX_EPOCH));
        assert!(!stat.is_dir());
    }

    #[test]
    fn test_seek_then_read() {
        let (tracked, calls) = TrackedFile::with_data(b"ignored");
        let mut file = VirtualFile::new(Box::new(tracked), b"0123456789".to_vec());

        file.seek(SeekFrom::Start(4)).unwrap();
        let mut buf = [0; 3];
        file.read_exact(&mut buf).unwrap();

        assert_eq!(&buf, b"456");
        assert_eq!(file.seek(SeekFrom::End(-1)).unwrap(), 9);
        assert!(!calls.lock().unwrap().contains(&"seek"));
    }

    #[test]
    fn test_readdir_and_close_are_forwarded() {
        let (tracked, calls) = TrackedFile::with_data(b"x");
        let mut file: Box<dyn File> = Box::new(VirtualFile::new(Box::new(tracked), b"y".to_vec()));

        let err = file.readdir(0).unwrap_err();
        file.close().unwrap();

        assert_eq!(err.kind, FsErrorKind::NotADirectory);
        assert_eq!(*calls.lock().unwrap(), vec!["readdir", "close"]);
    }

    #[test]
    fn test_media_type_is_html() {
        let (tracked, _calls) = TrackedFile::with_data(b"x");
        let file = VirtualFile::new(Box::new(tracked), Vec::new());

        assert_eq!(file.media_type(), Some(RENDERED_MEDIA_TYPE));
    }
}
