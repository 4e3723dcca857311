//! Atomic write operations for JSONL files.
//!
//! On POSIX systems a rename within one filesystem is atomic. These helpers
//! exploit that: data is first written to a `.tmp` sibling, flushed, and then
//! renamed over the target path. A crash mid-write leaves the original file
//! intact (at worst a stray temp file remains).

use std::path::Path;

use serde::Serialize;
use tokio::fs::File;

use crate::error::Result;
use crate::writer::JsonlWriter;

/// Atomically writes a slice of values to a JSONL file.
///
/// Either the target file ends up containing every value, or it is left
/// unchanged.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, a value fails
/// to serialize, an IO error occurs during writing, or the final rename
/// fails. On failure the temporary file is removed on a best-effort basis.
///
/// # Examples
///
/// ```no_run
/// use truss_jsonl::write_jsonl_atomic;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Record {
///     id: u32,
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let records = vec![Record { id: 1 }, Record { id: 2 }];
/// write_jsonl_atomic("data.jsonl", &records).await?;
/// # Ok(())
/// # }
/// ```
pub async fn write_jsonl_atomic<T, P>(path: P, values: &[T]) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_jsonl_atomic_iter(path, values.iter()).await
}

/// Atomically writes an iterator of values to a JSONL file.
///
/// Iterator-accepting variant of [`write_jsonl_atomic`] for callers that do
/// not want to collect into a slice first.
///
/// # Errors
///
/// See [`write_jsonl_atomic`].
pub async fn write_jsonl_atomic_iter<T, I, P>(path: P, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    let write_result = write_to_temp_file(&temp_path, values).await;
    if let Err(e) = write_result {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Builds the temp path by appending `.tmp` to the target's extension
/// (or adding one when the target has none).
fn make_temp_path(path: &Path) -> std::path::PathBuf {
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

/// Writes values to the temp file and flushes before returning.
async fn write_to_temp_file<T, I>(temp_path: &Path, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(temp_path).await?;
    let mut writer = JsonlWriter::new(file);
    writer.write_all(values).await?;
    writer.flush().await?;
    Ok(())
}
