//! Presentation views over an already analyzed (and sorted) task list.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::graph::DependencyGraph;
use crate::task::{AnalyzedTask, Task};

/// First `n` tasks of a ranked list.
pub fn suggest_top(analyzed: &[AnalyzedTask], n: usize) -> Vec<AnalyzedTask> {
    analyzed.iter().take(n).cloned().collect()
}

/// Axis cut points of the Eisenhower matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixThresholds {
    pub urgency: f64,
    pub importance: f64,
}

impl Default for MatrixThresholds {
    fn default() -> Self {
        Self {
            urgency: 0.6,
            importance: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// Urgent and important.
    DoNow,
    /// Important, not urgent.
    Schedule,
    /// Urgent, not important.
    Delegate,
    /// Neither.
    Drop,
}

impl Quadrant {
    pub fn of(task: &AnalyzedTask, thresholds: &MatrixThresholds) -> Quadrant {
        let urgent = task.is_overdue || task.urgency_score >= thresholds.urgency;
        let important = task.importance_score >= thresholds.importance;
        match (urgent, important) {
            (true, true) => Quadrant::DoNow,
            (false, true) => Quadrant::Schedule,
            (true, false) => Quadrant::Delegate,
            (false, false) => Quadrant::Drop,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Quadrant::DoNow => "Do now (urgent + important)",
            Quadrant::Schedule => "Schedule (important, not urgent)",
            Quadrant::Delegate => "Delegate (urgent, not important)",
            Quadrant::Drop => "Drop (neither)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EisenhowerMatrix {
    pub do_now: Vec<AnalyzedTask>,
    pub schedule: Vec<AnalyzedTask>,
    pub delegate: Vec<AnalyzedTask>,
    pub drop: Vec<AnalyzedTask>,
}

impl EisenhowerMatrix {
    pub fn quadrant(&self, q: Quadrant) -> &[AnalyzedTask] {
        match q {
            Quadrant::DoNow => &self.do_now,
            Quadrant::Schedule => &self.schedule,
            Quadrant::Delegate => &self.delegate,
            Quadrant::Drop => &self.drop,
        }
    }

    pub fn len(&self) -> usize {
        self.do_now.len() + self.schedule.len() + self.delegate.len() + self.drop.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Put every task into exactly one quadrant, preserving input order within each.
pub fn categorize_matrix(analyzed: &[AnalyzedTask], thresholds: &MatrixThresholds) -> EisenhowerMatrix {
    let mut m = EisenhowerMatrix::default();
    for t in analyzed {
        let bucket = match Quadrant::of(t, thresholds) {
            Quadrant::DoNow => &mut m.do_now,
            Quadrant::Schedule => &mut m.schedule,
            Quadrant::Delegate => &mut m.delegate,
            Quadrant::Drop => &mut m.drop,
        };
        bucket.push(t.clone());
    }
    m
}

/// Re-order a ranked list so no task comes before one of its in-batch dependencies.
///
/// Among tasks that are free to go, the input (priority) order decides. Tasks
/// on or behind a dependency cycle have no valid order and follow in priority order.
pub fn dependency_order(analyzed: &[AnalyzedTask]) -> Vec<AnalyzedTask> {
    let tasks: Vec<Task> = analyzed.iter().map(|a| a.task.clone()).collect();
    let graph = DependencyGraph::build(&tasks);

    let position: HashMap<&str, usize> = analyzed
        .iter()
        .enumerate()
        .map(|(i, a)| (a.id(), i))
        .collect();
    let by_id: HashMap<&str, &AnalyzedTask> = analyzed.iter().map(|a| (a.id(), a)).collect();

    graph
        .topological_order(|id| position.get(id).copied().unwrap_or(usize::MAX))
        .iter()
        .filter_map(|id| by_id.get(id.as_str()).map(|a| (*a).clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::NoAdvisor;
    use crate::engine::ScoringEngine;
    use crate::weights::{Strategy, WeightPolicy};
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 20).unwrap()
    }

    fn analyze(tasks: &[Task]) -> Vec<AnalyzedTask> {
        ScoringEngine::new(NoAdvisor)
            .analyze(tasks, &WeightPolicy::Preset(Strategy::SmartBalance), false, today())
            .unwrap()
            .tasks
    }

    fn due_in(days: i64) -> NaiveDate {
        today() + chrono::Duration::days(days)
    }

    #[test]
    fn suggest_top_is_prefix() {
        let analyzed = analyze(&[
            Task::new("a", "x", due_in(1)),
            Task::new("b", "x", due_in(10)),
            Task::new("c", "x", due_in(-2)),
        ]);
        let top = suggest_top(&analyzed, 2);
        assert_eq!(top, analyzed[..2].to_vec());
        assert_eq!(suggest_top(&analyzed, 10).len(), 3);
        assert!(suggest_top(&analyzed, 0).is_empty());
    }

    #[test]
    fn matrix_quadrants_follow_thresholds() {
        let analyzed = analyze(&[
            Task::new("now", "x", due_in(2)).with_importance(9),
            Task::new("sched", "x", due_in(25)).with_importance(8),
            Task::new("deleg", "x", due_in(1)).with_importance(2),
            Task::new("drop", "x", due_in(40)).with_importance(3),
            Task::new("late", "x", due_in(-1)).with_importance(1),
        ]);
        let m = categorize_matrix(&analyzed, &MatrixThresholds::default());
        let ids = |q: Quadrant| m.quadrant(q).iter().map(|t| t.id().to_string()).collect::<Vec<_>>();

        assert_eq!(ids(Quadrant::DoNow), vec!["now"]);
        assert_eq!(ids(Quadrant::Schedule), vec!["sched"]);
        let mut deleg = ids(Quadrant::Delegate);
        deleg.sort();
        assert_eq!(deleg, vec!["deleg", "late"]);
        assert_eq!(ids(Quadrant::Drop), vec!["drop"]);
        assert_eq!(m.len(), analyzed.len());
    }

    #[test]
    fn matrix_thresholds_are_pinned() {
        let t = MatrixThresholds::default();
        assert_eq!(t.urgency, 0.6);
        assert_eq!(t.importance, 0.6);
    }

    #[test]
    fn dependency_order_never_puts_dependents_first() {
        // "ship" outranks "build" on urgency but depends on it.
        let analyzed = analyze(&[
            Task::new("ship", "x", due_in(-3)).with_importance(10).with_dependency("build"),
            Task::new("build", "x", due_in(20)).with_importance(2).with_hours(30.0),
            Task::new("email", "x", due_in(5)),
        ]);
        assert_eq!(analyzed[0].id(), "ship");

        let ordered = dependency_order(&analyzed);
        let ids: Vec<&str> = ordered.iter().map(|t| t.id()).collect();
        let pos = |id: &str| ids.iter().position(|x| *x == id).unwrap();
        assert!(pos("build") < pos("ship"));
        assert_eq!(ids.len(), 3);
    }
}
