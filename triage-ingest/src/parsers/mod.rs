pub mod csv_tasks;
pub mod json;
