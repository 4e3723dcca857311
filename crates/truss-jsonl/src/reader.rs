//! JSONL reading operations.
//!
//! This module provides async, line-by-line reading of JSONL data with line
//! number tracking for error reporting, plus resilient variants that skip
//! damaged lines and collect [`Warning`]s instead of failing.

use std::path::Path;

use futures::Stream;
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

use crate::error::Result;
use crate::warning::{Warning, WarningCollector};

/// Async reader for JSONL (JSON Lines) data.
///
/// `JsonlReader` wraps an async reader in a [`BufReader`] and parses one JSON
/// value per line. Empty and whitespace-only lines are skipped. Line numbers
/// are tracked with 1-based indexing so parse failures can be reported
/// against the source file.
///
/// # Examples
///
/// ```no_run
/// use truss_jsonl::JsonlReader;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("data.jsonl").await?;
/// let mut reader = JsonlReader::new(file);
/// while let Some(value) = reader.read_line::<serde_json::Value>().await? {
///     println!("{}", value);
/// }
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    reader: BufReader<R>,
    /// 1-based line counter; 0 before any lines are read.
    line_number: usize,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
        }
    }

    /// Creates a new `JsonlReader` with a custom buffer capacity.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
        }
    }

    /// Returns the 1-based number of the last line read, or 0 before any
    /// lines have been read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads and parses the next non-empty line.
    ///
    /// Returns `Ok(None)` at end of input. Empty and whitespace-only lines
    /// are skipped without producing a value.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or if a non-empty line is not valid
    /// JSON for `T`. For parse-tolerant reading use
    /// [`stream_resilient`](Self::stream_resilient) instead.
    pub async fn read_line<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes = self.reader.read_line(&mut line).await?;
            if bytes == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(Some(serde_json::from_str(trimmed)?));
        }
    }

    /// Consumes the reader and returns a stream of parsed values plus a
    /// [`WarningCollector`].
    ///
    /// Lines that fail to parse are recorded as [`Warning::MalformedJson`]
    /// entries and skipped; the stream keeps yielding subsequent valid
    /// values. Empty and whitespace-only lines are skipped silently. The
    /// returned collector is a live handle: it can be inspected while the
    /// stream is still being consumed, and warnings appear in file order.
    ///
    /// An IO error while reading ends the stream after recording a
    /// [`Warning::SkippedLine`] for the position where reading stopped.
    pub fn stream_resilient<T>(self) -> (impl Stream<Item = T>, WarningCollector)
    where
        T: DeserializeOwned,
    {
        let collector = WarningCollector::new();
        let stream_collector = collector.clone();

        let stream = futures::stream::unfold(self, move |mut reader| {
            let collector = stream_collector.clone();
            async move {
                let mut line = String::new();
                loop {
                    line.clear();
                    match reader.reader.read_line(&mut line).await {
                        Ok(0) => return None,
                        Ok(_) => {
                            reader.line_number += 1;
                            let trimmed = line.trim();
                            if trimmed.is_empty() {
                                continue;
                            }
                            match serde_json::from_str::<T>(trimmed) {
                                Ok(value) => return Some((value, reader)),
                                Err(err) => {
                                    collector.add(Warning::MalformedJson {
                                        line_number: reader.line_number,
                                        error: err.to_string(),
                                    });
                                }
                            }
                        }
                        Err(err) => {
                            collector.add(Warning::SkippedLine {
                                line_number: reader.line_number + 1,
                                reason: format!("read error: {}", err),
                            });
                            return None;
                        }
                    }
                }
            }
        });

        (stream, collector)
    }

    /// Returns a reference to the underlying buffered reader.
    #[must_use]
    pub fn get_ref(&self) -> &BufReader<R> {
        &self.reader
    }

    /// Returns a mutable reference to the underlying buffered reader.
    ///
    /// Reading directly from the buffer makes line number tracking
    /// inaccurate.
    pub fn get_mut(&mut self) -> &mut BufReader<R> {
        &mut self.reader
    }

    /// Consumes the reader, returning the underlying buffered reader.
    #[must_use]
    pub fn into_inner(self) -> BufReader<R> {
        self.reader
    }
}

impl<R: AsyncRead + Unpin + Default> Default for JsonlReader<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

/// Reads an entire JSONL file, skipping damaged lines.
///
/// Opens `path`, parses every non-empty line as `T`, and returns the parsed
/// records in file order together with one [`Warning`] per skipped line.
/// Damaged lines never abort the load.
///
/// # Errors
///
/// Returns an error only if the file itself cannot be opened or read at the
/// start; per-line problems are reported as warnings.
///
/// # Examples
///
/// ```no_run
/// use truss_jsonl::read_jsonl_resilient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (records, warnings) =
///     read_jsonl_resilient::<serde_json::Value, _>("data.jsonl").await?;
/// println!("{} records, {} warnings", records.len(), warnings.len());
/// # Ok(())
/// # }
/// ```
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    use futures::StreamExt;

    let path = path.as_ref();
    let file = File::open(path).await?;
    let reader = JsonlReader::new(file);
    let (stream, collector) = reader.stream_resilient::<T>();
    let records: Vec<T> = std::pin::pin!(stream).collect().await;
    let warnings = collector.into_warnings();

    if !warnings.is_empty() {
        debug!(
            path = %path.display(),
            skipped = warnings.len(),
            loaded = records.len(),
            "Skipped damaged lines during resilient load"
        );
    }

    Ok((records, warnings))
}
