//! JSON task batches.
//!
//! Accepts either a bare list of tasks or an analyze-request shaped object
//! with a `tasks` list (other keys are ignored here).

use serde_json::Value;
use triage_core::Task;

use crate::types::{IngestError, RawTask};

pub fn parse_tasks_json(text: &str) -> Result<Vec<Task>, IngestError> {
    let value: Value = serde_json::from_str(text)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("tasks") {
            Some(Value::Array(items)) => items,
            _ => return Err(IngestError::NotAList),
        },
        _ => return Err(IngestError::NotAList),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let raw: RawTask = serde_json::from_value(item)
                .map_err(|source| IngestError::InvalidTask { index, source })?;
            raw.into_task(index)
        })
        .collect()
}
