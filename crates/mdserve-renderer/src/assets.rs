//! Writes embedded stylesheets into the served root.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::RenderError;

/// File mode for materialized assets.
#[cfg(unix)]
const ASSET_MODE: u32 = 0o644;

/// Paths written by one materialization.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssetSet {
    paths: Vec<PathBuf>,
}

impl AssetSet {
    /// Written paths, in write order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of written paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True if nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl From<Vec<PathBuf>> for AssetSet {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl IntoIterator for AssetSet {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

/// Write every embedded asset into `root`, overwriting existing files.
///
/// Stops at the first failure. Assets written before the failing one stay
/// on disk.
pub fn materialize(root: &Path) -> Result<AssetSet, RenderError> {
    let mut set = AssetSet::default();
    materialize_into(root, &mut set)?;
    Ok(set)
}

/// Write every embedded asset into `root`, recording each written path in
/// `written` as it lands.
///
/// On failure `written` holds the assets already on disk. Each asset is
/// written to a temporary file in `root` and renamed over its target, so a
/// concurrent reader sees either the previous file or the new one, never a
/// partial write.
pub(crate) fn materialize_into(root: &Path, written: &mut AssetSet) -> Result<(), RenderError> {
    let mut names: Vec<_> = mdserve_assets::names().collect();
    names.sort();

    for name in names {
        let path = root.join(name.as_ref());
        let data = mdserve_assets::get(&name)
            .ok_or_else(|| RenderError::AssetMissing(name.clone().into_owned()))?;

        write_asset(root, &path, &data).map_err(|source| RenderError::AssetWrite {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Wrote asset");

        written.paths.push(path);
    }

    Ok(())
}

fn write_asset(root: &Path, path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(root)?;
    tmp.write_all(data)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(ASSET_MODE))?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
