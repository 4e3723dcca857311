//! JSONL writing operations.
//!
//! This module provides async, buffered writing of JSONL data. Each value is
//! serialized to a single compact JSON line followed by a newline.

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::error::Result;

/// Async writer for JSONL (JSON Lines) data.
///
/// `JsonlWriter` wraps an async writer in a [`BufWriter`] so that writing
/// many small records does not issue one system call per record. Data stays
/// in the buffer until [`flush`](Self::flush) is called.
///
/// # Examples
///
/// ```no_run
/// use truss_jsonl::JsonlWriter;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::create("output.jsonl").await?;
/// let mut writer = JsonlWriter::new(file);
/// writer.write(&serde_json::json!({"id": 1})).await?;
/// writer.flush().await?;
/// # Ok(())
/// # }
/// ```
pub struct JsonlWriter<W> {
    writer: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin> JsonlWriter<W> {
    /// Creates a new `JsonlWriter` wrapping the given async writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Creates a new `JsonlWriter` with a custom buffer capacity.
    #[must_use]
    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, writer),
        }
    }

    /// Serializes one value as a JSON line and writes it to the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the underlying write
    /// fails.
    pub async fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let mut buf = serde_json::to_vec(value)?;
        buf.push(b'\n');
        self.writer.write_all(&buf).await?;
        Ok(())
    }

    /// Writes every value from an iterator as consecutive JSON lines.
    ///
    /// # Errors
    ///
    /// Returns the first serialization or write error; values after the
    /// failing one are not written.
    pub async fn write_all<T, I>(&mut self, values: I) -> Result<()>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.write(&value).await?;
        }
        Ok(())
    }

    /// Flushes buffered data to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying flush fails.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Returns a reference to the underlying buffered writer.
    #[must_use]
    pub fn get_ref(&self) -> &BufWriter<W> {
        &self.writer
    }

    /// Returns a mutable reference to the underlying buffered writer.
    ///
    /// Writing directly to the buffer can produce malformed JSONL output.
    pub fn get_mut(&mut self) -> &mut BufWriter<W> {
        &mut self.writer
    }

    /// Consumes the writer, returning the underlying buffered writer.
    ///
    /// This does not flush; call [`flush`](Self::flush) first to make sure
    /// all data has been written.
    #[must_use]
    pub fn into_inner(self) -> BufWriter<W> {
        self.writer
    }
}

impl<W: AsyncWrite + Unpin + Default> Default for JsonlWriter<W> {
    fn default() -> Self {
        Self::new(W::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Cursor;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Record {
        id: u32,
        name: String,
    }

    fn written_bytes(writer: JsonlWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        writer.into_inner().into_inner().into_inner()
    }

    #[tokio::test]
    async fn write_produces_one_line_per_value() {
        let mut writer = JsonlWriter::new(Cursor::new(Vec::new()));

        writer
            .write(&Record {
                id: 1,
                name: "Alice".to_string(),
            })
            .await
            .unwrap();
        writer
            .write(&Record {
                id: 2,
                name: "Bob".to_string(),
            })
            .await
            .unwrap();
        writer.flush().await.unwrap();

        let output = String::from_utf8(written_bytes(writer)).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"id":1,"name":"Alice"}"#);
        assert_eq!(lines[1], r#"{"id":2,"name":"Bob"}"#);
    }

    #[tokio::test]
    async fn write_all_accepts_iterators() {
        let mut writer = JsonlWriter::new(Cursor::new(Vec::new()));

        let records = (0..3).map(|id| Record {
            id,
            name: format!("r{}", id),
        });
        writer.write_all(records).await.unwrap();
        writer.flush().await.unwrap();

        let output = String::from_utf8(written_bytes(writer)).unwrap();
        assert_eq!(output.lines().count(), 3);
    }

    #[tokio::test]
    async fn write_all_accepts_references() {
        let mut writer = JsonlWriter::new(Cursor::new(Vec::new()));

        let records = vec![
            Record {
                id: 1,
                name: "a".to_string(),
            },
            Record {
                id: 2,
                name: "b".to_string(),
            },
        ];
        writer.write_all(records.iter()).await.unwrap();
        writer.flush().await.unwrap();

        let output = String::from_utf8(written_bytes(writer)).unwrap();
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn with_capacity_creates_writer() {
        let buffer = Cursor::new(Vec::new());
        let _writer = JsonlWriter::with_capacity(buffer, 8192);
    }
}
