//! triage-ingest: load task batches from JSON or CSV into engine `Task`s.
//!
//! This is the input boundary: optional fields get their documented defaults
//! here, and malformed input is rejected before anything is scored.

pub mod parsers;
pub mod types;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use triage_core::Task;

pub use parsers::csv_tasks::parse_tasks_csv;
pub use parsers::json::parse_tasks_json;
pub use types::{IngestError, RawTask, DEFAULT_ESTIMATED_HOURS, DEFAULT_IMPORTANCE};

/// Load a batch from disk. `.csv` files go through the CSV parser, anything else is JSON.
pub fn load_tasks(path: impl AsRef<Path>) -> Result<Vec<Task>> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let tasks = if is_csv {
        let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
        parse_tasks_csv(file).with_context(|| format!("parsing {}", path.display()))?
    } else {
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        parse_tasks_json(&text).with_context(|| format!("parsing {}", path.display()))?
    };

    tracing::debug!(path = %path.display(), tasks = tasks.len(), "loaded task batch");
    Ok(tasks)
}
