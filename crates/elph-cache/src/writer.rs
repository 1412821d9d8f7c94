//! Cache writing operations.
//!
//! This module provides buffered async writing of edge records, one per line.

use crate::codec::{EdgeRecord, SEPARATOR};
use crate::Result;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Async writer for edge cache data.
///
/// Each record becomes one `source -> target` line followed by `\n`.
/// Call [`flush`](Self::flush) before dropping the writer.
///
/// # Examples
///
/// ```
/// use elph_cache::codec::EdgeRecord;
/// use elph_cache::writer::EdgeWriter;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> elph_cache::Result<()> {
/// let mut writer = EdgeWriter::new(Vec::new());
/// writer.write_record(&EdgeRecord::new("a", "b")).await?;
/// writer.flush().await?;
/// assert_eq!(writer.into_inner().into_inner(), b"a -> b\n");
/// # Ok(())
/// # }
/// ```
pub struct EdgeWriter<W> {
    writer: BufWriter<W>,
    written: usize,
}

impl<W: AsyncWrite + Unpin> EdgeWriter<W> {
    /// Creates a new `EdgeWriter` wrapping the given async writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            written: 0,
        }
    }

    /// Writes a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub async fn write_record(&mut self, record: &EdgeRecord) -> Result<()> {
        self.writer.write_all(record.source.as_bytes()).await?;
        self.writer.write_all(SEPARATOR.as_bytes()).await?;
        self.writer.write_all(record.target.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.written += 1;
        Ok(())
    }

    /// Writes every record yielded by the iterator.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub async fn write_all<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a EdgeRecord>,
    {
        for record in records {
            self.write_record(record).await?;
        }
        Ok(())
    }

    /// Flushes buffered data to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.written
    }

    /// Consumes the writer, returning the underlying buffered writer.
    ///
    /// This does not flush.
    #[must_use]
    pub fn into_inner(self) -> BufWriter<W> {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_records_in_order() {
        let mut writer = EdgeWriter::new(Vec::new());
        let records = [EdgeRecord::new("a", "b"), EdgeRecord::new("a", "c")];
        writer.write_all(&records).await.unwrap();
        writer.flush().await.unwrap();
        assert_eq!(writer.records_written(), 2);
        assert_eq!(writer.into_inner().into_inner(), b"a -> b\na -> c\n");
    }

    #[tokio::test]
    async fn empty_input_writes_nothing() {
        let mut writer = EdgeWriter::new(Vec::new());
        writer.write_all(&Vec::<EdgeRecord>::new()).await.unwrap();
        writer.flush().await.unwrap();
        assert!(writer.into_inner().into_inner().is_empty());
    }
}
