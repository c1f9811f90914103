//! CSV task batches.
//!
//! Expected header (order free, optional columns may be absent):
//! id,title,due_date,estimated_hours,importance,dependencies
//!
//! `dependencies` holds ids separated by `;` or `|`.

use serde::Deserialize;
use std::io::Read;
use triage_core::Task;

use crate::types::{IngestError, RawTask};

#[derive(Debug, Deserialize)]
struct CsvRow {
    id: Option<String>,
    title: Option<String>,
    due_date: Option<String>,
    estimated_hours: Option<f64>,
    importance: Option<i64>,
    dependencies: Option<String>,
}

impl From<CsvRow> for RawTask {
    fn from(row: CsvRow) -> Self {
        RawTask {
            id: row.id,
            title: row.title,
            due_date: row.due_date,
            estimated_hours: row.estimated_hours,
            importance: row.importance,
            dependencies: row.dependencies.map(|d| {
                d.split(|c: char| c == ';' || c == '|')
                    .map(|s| s.to_string())
                    .collect()
            }),
        }
    }
}

pub fn parse_tasks_csv<R: Read>(reader: R) -> Result<Vec<Task>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for (index, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let raw: RawTask = row?.into();
        out.push(raw.into_task(index)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_with_optional_columns() {
        let data = "\
id,title,due_date,estimated_hours,importance,dependencies
design,Write design,2026-03-01,2.5,9,
impl,Implement,2026-03-05,,,design
ship,Ship it,2026-03-06,1,10,impl;design
";
        let tasks = parse_tasks_csv(data.as_bytes()).unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].estimated_hours, 2.5);
        assert!(tasks[0].dependencies.is_empty());
        assert_eq!(tasks[1].importance, 5);
        assert_eq!(tasks[1].dependencies, vec!["design"]);
        assert_eq!(tasks[2].dependencies, vec!["impl", "design"]);
    }

    #[test]
    fn missing_optional_column_is_fine() {
        let data = "id,title,due_date\na,Task A,2026-03-01\n";
        let tasks = parse_tasks_csv(data.as_bytes()).unwrap();
        assert_eq!(tasks[0].importance, 5);
    }

    #[test]
    fn missing_title_is_rejected() {
        let data = "id,title,due_date\na,,2026-03-01\n";
        let err = parse_tasks_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::MissingField { index: 0, field: "title" }));
    }

    #[test]
    fn non_numeric_hours_is_a_csv_error() {
        let data = "id,title,due_date,estimated_hours\na,A,2026-03-01,lots\n";
        assert!(matches!(parse_tasks_csv(data.as_bytes()), Err(IngestError::Csv(_))));
    }
}
