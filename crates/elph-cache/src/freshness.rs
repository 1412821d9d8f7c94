//! Timestamp-based staleness detection.
//!
//! A cache file is only trusted when none of the inputs it was derived from
//! changed after it was written. The comparison is all-or-nothing: a single
//! newer input makes the whole file stale.

use crate::Result;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Outcome of comparing a cache file against its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// No cache file exists.
    Missing,
    /// At least one input is newer than the cache.
    Stale {
        /// Modification time of the cache file.
        cache_modified: SystemTime,
        /// The newest input timestamp.
        newest_input: SystemTime,
    },
    /// Every input is at least as old as the cache.
    Fresh {
        /// Modification time of the cache file.
        cache_modified: SystemTime,
    },
}

impl Freshness {
    /// Returns `true` if the cache may be used.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh { .. })
    }
}

/// Compares the modification time of `cache_path` against `input_timestamps`.
///
/// # Errors
///
/// Returns an error if the cache file exists but its metadata cannot be read.
///
/// # Examples
///
/// ```
/// use elph_cache::freshness::{check_freshness, Freshness};
/// use std::time::SystemTime;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> elph_cache::Result<()> {
/// let state = check_freshness("does/not/exist.cache", [SystemTime::UNIX_EPOCH]).await?;
/// assert_eq!(state, Freshness::Missing);
/// # Ok(())
/// # }
/// ```
pub async fn check_freshness<P, I>(cache_path: P, input_timestamps: I) -> Result<Freshness>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = SystemTime>,
{
    let cache_modified = match tokio::fs::metadata(cache_path.as_ref()).await {
        Ok(meta) if meta.is_file() => meta.modified()?,
        Ok(_) => return Ok(Freshness::Missing),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Freshness::Missing),
        Err(e) => return Err(e.into()),
    };

    Ok(compare(cache_modified, input_timestamps))
}

fn compare<I>(cache_modified: SystemTime, input_timestamps: I) -> Freshness
where
    I: IntoIterator<Item = SystemTime>,
{
    match input_timestamps.into_iter().max() {
        Some(newest_input) if newest_input > cache_modified => Freshness::Stale {
            cache_modified,
            newest_input,
        },
        _ => Freshness::Fresh { cache_modified },
    }
}
