//! Cache reading operations.
//!
//! This module provides async, line-by-line reading of edge cache files with
//! line number tracking, plus [`read_edges_resilient`], which loads a whole
//! file while skipping (and reporting) every line it cannot decode.

use crate::codec::{parse_line, EdgeRecord};
use crate::warning::Warning;
use crate::Result;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async reader for edge cache data.
///
/// `EdgeReader` wraps an async reader in a [`BufReader`] and counts lines so
/// that warnings can point at the offending line.
///
/// # Examples
///
/// ```
/// use elph_cache::reader::EdgeReader;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> elph_cache::Result<()> {
/// let mut reader = EdgeReader::new(&b"a -> b\nbroken\n"[..]);
/// let first = reader.next_record().await?.unwrap();
/// assert_eq!(first.unwrap().target, "b");
/// assert!(reader.next_record().await?.unwrap().is_err());
/// assert!(reader.next_record().await?.is_none());
/// assert_eq!(reader.line_number(), 2);
/// # Ok(())
/// # }
/// ```
pub struct EdgeReader<R> {
    reader: BufReader<R>,
    /// 1-based number of the last line read, 0 before any line.
    line_number: usize,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> EdgeReader<R> {
    /// Creates a new `EdgeReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buf: Vec::new(),
        }
    }

    /// Returns the 1-based number of the last line read, or 0.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next raw line without its terminator.
    ///
    /// Returns `Ok(None)` at end of input. Lines that are not valid UTF-8 are
    /// returned as `Ok(Some(Err(warning)))` so callers can keep going.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reader fails.
    pub async fn next_line(&mut self) -> Result<Option<std::result::Result<String, Warning>>> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf).await?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        match String::from_utf8(std::mem::take(&mut self.buf)) {
            Ok(line) => Ok(Some(Ok(line))),
            Err(e) => Ok(Some(Err(Warning::SkippedLine {
                line_number: self.line_number,
                reason: format!("invalid UTF-8: {e}"),
            }))),
        }
    }

    /// Reads and decodes the next non-blank line.
    ///
    /// Blank lines are skipped silently; they are produced by hand edits and
    /// carry no information.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reader fails. Decoding failures are
    /// reported in-band as `Some(Err(warning))`.
    pub async fn next_record(
        &mut self,
    ) -> Result<Option<std::result::Result<EdgeRecord, Warning>>> {
        loop {
            let line = match self.next_line().await? {
                None => return Ok(None),
                Some(Err(warning)) => return Ok(Some(Err(warning))),
                Some(Ok(line)) => line,
            };
            if line.trim().is_empty() {
                continue;
            }
            return Ok(Some(parse_line(&line).map_err(|e| Warning::MalformedLine {
                line_number: self.line_number,
                line: line.clone(),
                error: e.to_string(),
            })));
        }
    }

    /// Consumes the reader, returning the underlying buffered reader.
    #[must_use]
    pub fn into_inner(self) -> BufReader<R> {
        self.reader
    }
}

/// Reads every decodable record of a cache file.
///
/// Malformed lines are skipped and reported as warnings; each one is also
/// logged at `warn` level. Only I/O failures abort the read.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub async fn read_edges_resilient<P: AsRef<Path>>(
    path: P,
) -> Result<(Vec<EdgeRecord>, Vec<Warning>)> {
    let path = path.as_ref();
    let file = File::open(path).await?;
    let mut reader = EdgeReader::new(file);
    let mut warnings = Vec::new();
    let mut records = Vec::new();

    while let Some(next) = reader.next_record().await? {
        match next {
            Ok(record) => records.push(record),
            Err(warning) => {
                tracing::warn!(path = %path.display(), "{}", warning);
                warnings.push(warning);
            }
        }
    }

    tracing::debug!(
        path = %path.display(),
        records = records.len(),
        warnings = warnings.len(),
        "Read edge cache"
    );
    Ok((records, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_reader_starts_at_line_zero() {
        let reader = EdgeReader::new(&b""[..]);
        assert_eq!(reader.line_number(), 0);
    }

    #[tokio::test]
    async fn blank_lines_are_skipped_but_counted() {
        let mut reader = EdgeReader::new(&b"\n\n  \na -> b\n"[..]);
        let record = reader.next_record().await.unwrap().unwrap().unwrap();
        assert_eq!(record, EdgeRecord::new("a", "b"));
        assert_eq!(reader.line_number(), 4);
    }

    #[tokio::test]
    async fn last_line_without_newline_is_read() {
        let mut reader = EdgeReader::new(&b"a -> b\nc -> d"[..]);
        reader.next_record().await.unwrap();
        let second = reader.next_record().await.unwrap().unwrap().unwrap();
        assert_eq!(second, EdgeRecord::new("c", "d"));
        assert!(reader.next_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_line_reports_line_number() {
        let mut reader = EdgeReader::new(&b"a -> b\nnot an edge\n"[..]);
        reader.next_record().await.unwrap();
        let warning = reader.next_record().await.unwrap().unwrap().unwrap_err();
        assert_eq!(warning.line_number(), 2);
        assert_eq!(warning.kind(), "malformed_line");
    }

    #[tokio::test]
    async fn invalid_utf8_is_a_skipped_line() {
        let mut reader = EdgeReader::new(&b"\xff\xfe -> b\n"[..]);
        let warning = reader.next_record().await.unwrap().unwrap().unwrap_err();
        assert_eq!(warning.kind(), "skipped_line");
        assert_eq!(warning.line_number(), 1);
    }
}
