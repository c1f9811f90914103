use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use triage_core::Task;

/// Defaults applied to optional fields at the input boundary.
pub const DEFAULT_ESTIMATED_HOURS: f64 = 4.0;
pub const DEFAULT_IMPORTANCE: i32 = 5;

/// Input date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a list of tasks (or an object with a \"tasks\" list)")]
    NotAList,

    #[error("task #{index}: {source}")]
    InvalidTask {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("task #{index}: missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("task #{index}: due_date '{value}' is not in YYYY-MM-DD format")]
    InvalidDate { index: usize, value: String },

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Loosely typed task as it arrives from a file or request body.
///
/// `id`, `title` and `due_date` are required. Everything else falls back to
/// `DEFAULT_ESTIMATED_HOURS`, `DEFAULT_IMPORTANCE` and no dependencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTask {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub importance: Option<i64>,
    #[serde(default)]
    pub dependencies: Option<Vec<String>>,
}

impl RawTask {
    /// Apply defaults and check the required fields. `index` is only used in errors.
    pub fn into_task(self, index: usize) -> Result<Task, IngestError> {
        let id = required(self.id, index, "id")?;
        let title = required(self.title, index, "title")?;
        let due_raw = required(self.due_date, index, "due_date")?;
        let due_date = NaiveDate::parse_from_str(&due_raw, DATE_FORMAT)
            .map_err(|_| IngestError::InvalidDate { index, value: due_raw.clone() })?;

        // Out-of-range ratings are the engine's to clamp; only keep them representable.
        let importance = self
            .importance
            .map(|i| i.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
            .unwrap_or(DEFAULT_IMPORTANCE);

        let mut dependencies: Vec<String> = Vec::new();
        for dep in self.dependencies.unwrap_or_default() {
            let dep = dep.trim();
            if !dep.is_empty() && !dependencies.iter().any(|d| d == dep) {
                dependencies.push(dep.to_string());
            }
        }

        Ok(Task {
            id,
            title,
            due_date,
            estimated_hours: self.estimated_hours.unwrap_or(DEFAULT_ESTIMATED_HOURS),
            importance,
            dependencies,
        })
    }
}

fn required(value: Option<String>, index: usize, field: &'static str) -> Result<String, IngestError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(IngestError::MissingField { index, field })
}
