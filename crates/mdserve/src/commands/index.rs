//! `mdserve index` command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use mdserve_vfs::DirectoryIndex;

use super::require_dir;
use crate::error::CliError;

/// Arguments for the index command.
#[derive(Args)]
pub(crate) struct IndexArgs {
    /// Directory to index (default: current directory).
    #[arg(short, long)]
    dir: Option<PathBuf>,
}

impl IndexArgs {
    /// Execute the index command, printing the index as JSON to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be walked or output fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let root = match self.dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        require_dir(&root)?;

        let mut stdout = std::io::stdout().lock();
        write_index(&root, &mut stdout)
    }
}

/// Build the index of `root` and write it to `out` as pretty JSON.
fn write_index(root: &Path, out: &mut impl Write) -> Result<(), CliError> {
    let index = DirectoryIndex::build(root)?;
    tracing::info!(root = %index.root().display(), directories = index.len(), "Indexed directory");

    serde_json::to_writer_pretty(&mut *out, &index.to_sorted_map())?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_write_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "# A").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), "b").unwrap();

        let mut buf = Vec::new();
        write_index(dir.path(), &mut buf).unwrap();

        let parsed: BTreeMap<String, Vec<String>> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["."], vec!["a.md".to_owned()]);
        assert_eq!(parsed["sub"], vec!["b.txt".to_owned()]);
        assert!(buf.ends_with(b"\n"));
    }

    #[test]
    fn test_missing_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = IndexArgs {
            dir: Some(dir.path().join("missing")),
        };

        let err = args.execute().unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
    }
}
