//! Task model for the priority scoring engine.
//!
//! `Task` is the input shape handed to the engine for one analysis run;
//! `AnalyzedTask` is the scored output. Neither is persisted here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Categorical priority tier derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub fn label(self) -> &'static str {
        match self {
            PriorityLevel::Critical => "Critical",
            PriorityLevel::High => "High",
            PriorityLevel::Medium => "Medium",
            PriorityLevel::Low => "Low",
        }
    }
}

impl std::fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Core task type.
///
/// Raw values are kept as the caller supplied them; clamping happens inside
/// the factor calculators and never leaks back into these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub due_date: NaiveDate,

    /// Hours. May be zero or negative in raw input.
    pub estimated_hours: f64,

    /// 1-10, higher means more important. Out-of-range values are clamped when scored.
    pub importance: i32,

    /// Ids of tasks that must be done first. Ids outside the batch are treated as satisfied.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            due_date,
            estimated_hours: 4.0,
            importance: 5,
            dependencies: Vec::new(),
        }
    }

    pub fn with_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    pub fn with_importance(mut self, importance: i32) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    pub fn with_dependencies<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(ids.into_iter().map(Into::into));
        self
    }
}

/// The four normalized factor scores of one task.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FactorScores {
    pub urgency: f64,
    pub importance: f64,
    pub effort: f64,
    pub blocking: f64,
}

/// A task after scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedTask {
    #[serde(flatten)]
    pub task: Task,

    pub urgency_score: f64,
    pub importance_score: f64,
    pub effort_score: f64,
    pub blocking_score: f64,
    pub priority_score: f64,
    pub priority_level: PriorityLevel,

    pub is_overdue: bool,
    /// Negative means overdue. Business days when the weekend adjustment applied.
    pub days_until_due: i64,
    pub in_dependency_cycle: bool,

    /// Date classification that fed the urgency factor.
    pub is_corporate: bool,
    pub is_urgent_task: bool,

    pub score_explanation: String,
}

impl AnalyzedTask {
    pub fn id(&self) -> &str {
        &self.task.id
    }

    pub fn factors(&self) -> FactorScores {
        FactorScores {
            urgency: self.urgency_score,
            importance: self.importance_score,
            effort: self.effort_score,
            blocking: self.blocking_score,
        }
    }
}
