//! Atomic rewrite of cache files.
//!
//! The cache is always rewritten in full. To keep a crash from leaving a
//! half-written file behind, records go to a sibling temporary file first,
//! which is then renamed over the target. Renames within one filesystem are
//! atomic on POSIX systems, so readers see either the old or the new file.
//!
//! # Examples
//!
//! ```no_run
//! use elph_cache::{write_edges_atomic, EdgeRecord};
//!
//! # async fn example() -> elph_cache::Result<()> {
//! let edges = vec![EdgeRecord::new("com.example.app", "com.example.lib")];
//! write_edges_atomic(".elph/bnd-deps.cache", &edges).await?;
//! # Ok(())
//! # }
//! ```

use crate::codec::EdgeRecord;
use crate::writer::EdgeWriter;
use crate::Result;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Atomically replaces the file at `path` with the given records.
///
/// The parent directory is created if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the directory or temporary file cannot be created, if
/// writing fails, or if the final rename fails. On failure the original file
/// (if any) is left unchanged and the temporary file is removed on a
/// best-effort basis.
pub async fn write_edges_atomic<'a, P, I>(path: P, records: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a EdgeRecord>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let temp_path = make_temp_path(path);
    if let Err(e) = write_to_temp_file(&temp_path, records).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Appends `.tmp` to the file's extension, or uses `tmp` when there is none.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => std::ffi::OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}

async fn write_to_temp_file<'a, I>(temp_path: &Path, records: I) -> Result<()>
where
    I: IntoIterator<Item = &'a EdgeRecord>,
{
    let file = File::create(temp_path).await?;
    let mut writer = EdgeWriter::new(file);
    writer.write_all(records).await?;
    writer.flush().await?;
    writer.into_inner().into_inner().sync_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn temp_path_keeps_extension() {
        assert_eq!(
            make_temp_path(Path::new("dir/bnd-deps.cache")),
            PathBuf::from("dir/bnd-deps.cache.tmp")
        );
        assert_eq!(
            make_temp_path(Path::new("dir/edges")),
            PathBuf::from("dir/edges.tmp")
        );
    }

    #[tokio::test]
    async fn creates_parent_and_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("edges.cache");

        write_edges_atomic(&path, &[EdgeRecord::new("a", "b")])
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a -> b\n");

        write_edges_atomic(&path, &[EdgeRecord::new("c", "d")])
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "c -> d\n");
        assert!(!path.with_extension("cache.tmp").exists());
    }
}
