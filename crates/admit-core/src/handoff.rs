//! JSONL hand-off file between the scrape and load stages.
//!
//! One serialized [`Admission`] per line. The file is append-only so that
//! successive pulls accumulate into the same file.

use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::AppError;
use crate::models::Admission;

/// Appends `records` to `path`, creating the file if missing.
///
/// Returns the number of lines written.
pub async fn append_records(path: &Path, records: &[Admission]) -> Result<usize, AppError> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut buffer = Vec::new();
    for record in records {
        serde_json::to_writer(&mut buffer, record)?;
        buffer.push(b'\n');
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(&buffer).await?;
    file.flush().await?;

    Ok(records.len())
}

/// Reads every record from `path`.
///
/// Blank lines are ignored; malformed lines are logged and skipped.
pub async fn read_records(path: &Path) -> Result<Vec<Admission>, AppError> {
    let content = tokio::fs::read_to_string(path).await?;
    let mut records = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Admission>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed hand-off line"
                );
            }
        }
    }

    Ok(records)
}
