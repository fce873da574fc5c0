//! Directory-to-children index built by one recursive walk.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{FsError, FsErrorKind};

/// Immediate child file names of every directory below a root.
///
/// Every directory has an entry, empty or not. Names within an entry keep the
/// order the walk produced them in. Read-only once built.
#[derive(Debug, Default)]
pub struct DirectoryIndex {
    root: PathBuf,
    entries: HashMap<PathBuf, Vec<String>>,
}

impl DirectoryIndex {
    /// Walk `root` and record the files in each directory.
    ///
    /// Hidden files and ignore files get no special treatment; everything on
    /// disk is indexed. Symlinks are not followed.
    pub fn build(root: &Path) -> Result<Self, FsError> {
        let mut entries: HashMap<PathBuf, Vec<String>> = HashMap::new();

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .build();

        for result in walker {
            let entry = result.map_err(|e| walk_error(e, root))?;
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            let path = entry.into_path();

            if is_dir {
                entries.entry(path).or_default();
            } else if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
                entries
                    .entry(parent.to_path_buf())
                    .or_default()
                    .push(name.to_string_lossy().into_owned());
            }
        }

        tracing::debug!(root = %root.display(), dirs = entries.len(), "Built directory index");
        Ok(Self {
            root: root.to_path_buf(),
            entries,
        })
    }

    /// Directory that was walked.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File names directly inside `dir`.
    #[must_use]
    pub fn get(&self, dir: &Path) -> Option<&[String]> {
        self.entries.get(dir).map(Vec::as_slice)
    }

    /// Number of directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over directories and their files in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &[String])> {
        self.entries
            .iter()
            .map(|(dir, names)| (dir.as_path(), names.as_slice()))
    }

    /// Sorted copy keyed by directory path relative to the root.
    ///
    /// The root itself is keyed `"."`.
    #[must_use]
    pub fn to_sorted_map(&self) -> BTreeMap<String, Vec<String>> {
        self.iter()
            .map(|(dir, names)| {
                let key = match dir.strip_prefix(&self.root) {
                    Ok(rel) if rel.as_os_str().is_empty() => ".".to_owned(),
                    Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
                    Err(_) => dir.to_string_lossy().into_owned(),
                };
                let mut names = names.to_vec();
                names.sort();
                (key, names)
            })
            .collect()
    }
}

fn walk_error(err: ignore::Error, root: &Path) -> FsError {
    let kind = match err.io_error().map(std::io::Error::kind) {
        Some(std::io::ErrorKind::NotFound) => FsErrorKind::NotFound,
        Some(std::io::ErrorKind::PermissionDenied) => FsErrorKind::PermissionDenied,
        _ => FsErrorKind::Other,
    };
    FsError::new(kind).with_path(root).with_source(err)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;

    fn set(names: &[String]) -> BTreeSet<&str> {
        names.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_two_levels_of_ten_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        for i in 0..10 {
            std::fs::write(dir.path().join(format!("test_{i}.md")), "").unwrap();
            std::fs::write(nested.join(format!("test_{i}.md")), "").unwrap();
        }

        let index = DirectoryIndex::build(dir.path()).unwrap();

        let expected: BTreeSet<String> = (0..10).map(|i| format!("test_{i}.md")).collect();
        let expected: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
        assert_eq!(index.root(), dir.path());
        assert_eq!(index.len(), 2);
        assert_eq!(set(index.get(dir.path()).unwrap()), expected);
        assert_eq!(set(index.get(&nested).unwrap()), expected);
    }

    #[test]
    fn test_empty_directories_have_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();

        let index = DirectoryIndex::build(dir.path()).unwrap();

        assert_eq!(index.len(), 3);
        assert!(index.get(&dir.path().join("a/b")).unwrap().is_empty());
        assert!(index.get(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_hidden_files_are_indexed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".hidden"), "").unwrap();
        std::fs::write(dir.path().join(".gitignore"), "*.md\n").unwrap();
        std::fs::write(dir.path().join("doc.md"), "").unwrap();

        let index = DirectoryIndex::build(dir.path()).unwrap();

        assert_eq!(
            set(index.get(dir.path()).unwrap()),
            BTreeSet::from([".gitignore", ".hidden", "doc.md"])
        );
    }

    #[test]
    fn test_to_sorted_map() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.md"), "").unwrap();
        std::fs::write(dir.path().join("a.md"), "").unwrap();
        std::fs::write(dir.path().join("sub/c.md"), "").unwrap();

        let map = DirectoryIndex::build(dir.path()).unwrap().to_sorted_map();

        assert_eq!(
            map,
            BTreeMap::from([
                (".".to_owned(), vec!["a.md".to_owned(), "b.md".to_owned()]),
                ("sub".to_owned(), vec!["c.md".to_owned()]),
            ])
        );
    }

    #[test]
    fn test_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();

        let err = DirectoryIndex::build(&dir.path().join("missing")).unwrap_err();

        assert_eq!(err.kind, FsErrorKind::NotFound);
    }
}
