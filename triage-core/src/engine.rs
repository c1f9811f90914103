//! Scoring engine: factors + graph facts + weights -> ranked, explained tasks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::advisory::{DateAdvisor, DateClass};
use crate::error::AnalyzeError;
use crate::factors;
use crate::graph::DependencyGraph;
use crate::task::{AnalyzedTask, FactorScores, PriorityLevel, Task};
use crate::views::MatrixThresholds;
use crate::weights::{Factor, WeightPolicy, WeightSet};

/// Cut points for `PriorityLevel`. A score at a cut point belongs to the higher tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            critical: 0.90,
            high: 0.70,
            medium: 0.40,
        }
    }
}

impl TierThresholds {
    pub fn level(&self, score: f64) -> PriorityLevel {
        if score >= self.critical {
            PriorityLevel::Critical
        } else if score >= self.high {
            PriorityLevel::High
        } else if score >= self.medium {
            PriorityLevel::Medium
        } else {
            PriorityLevel::Low
        }
    }
}

/// Policy constants of the engine and its views.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tiers: TierThresholds,
    pub matrix: MatrixThresholds,
}

/// Result of one `analyze` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Descending priority; ties by earlier due date, then smaller id.
    pub tasks: Vec<AnalyzedTask>,
    pub has_cycles: bool,
    pub cycle_task_ids: Vec<String>,
    pub weights: WeightSet,
    /// Preset name, or "custom".
    pub strategy: String,
}

impl AnalysisReport {
    pub fn get(&self, id: &str) -> Option<&AnalyzedTask> {
        self.tasks.iter().find(|t| t.task.id == id)
    }
}

/// Orchestrates one analysis run. Holds no per-run state.
#[derive(Debug, Clone)]
pub struct ScoringEngine<D: DateAdvisor> {
    advisor: D,
    config: EngineConfig,
}

impl<D: DateAdvisor> ScoringEngine<D> {
    pub fn new(advisor: D) -> Self {
        Self::with_config(advisor, EngineConfig::default())
    }

    pub fn with_config(advisor: D, config: EngineConfig) -> Self {
        Self { advisor, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score and rank a batch.
    ///
    /// Rejects malformed batches and invalid custom weights before any scoring.
    /// The date advisory is consulted only when `consider_weekends` is set;
    /// when it cannot answer, the task keeps plain calendar-day urgency and
    /// the rest of the batch is scored without asking it again.
    pub fn analyze(
        &self,
        tasks: &[Task],
        policy: &WeightPolicy,
        consider_weekends: bool,
        today: NaiveDate,
    ) -> Result<AnalysisReport, AnalyzeError> {
        validate_batch(tasks)?;
        let weights = policy.weights()?;

        debug!(
            tasks = tasks.len(),
            strategy = %policy.label(),
            consider_weekends,
            %today,
            "analyzing batch"
        );

        let graph = DependencyGraph::build(tasks);
        let cycle_task_ids = graph.cycle_members();
        let in_cycle: HashSet<&str> = cycle_task_ids.iter().map(String::as_str).collect();
        if !cycle_task_ids.is_empty() {
            debug!(ids = ?cycle_task_ids, "dependency cycle detected");
        }

        // After the first failure the advisory is not asked again for this
        // batch, so an unreachable endpoint costs one timeout, not one per task.
        let mut advisory_down = false;
        let mut unavailable = 0usize;
        let mut analyzed: Vec<AnalyzedTask> = tasks
            .iter()
            .map(|task| {
                let class = if !consider_weekends {
                    DateClass::default()
                } else if advisory_down {
                    unavailable += 1;
                    DateClass::default()
                } else {
                    match self.advisor.classify(task) {
                        Ok(c) => c,
                        Err(e) => {
                            debug!(task = %task.id, error = %e, "date advisory fallback");
                            advisory_down = true;
                            unavailable += 1;
                            DateClass::default()
                        }
                    }
                };

                let blocked = graph.blocking_count(&task.id);
                self.score_task(
                    task,
                    &weights,
                    class,
                    blocked,
                    tasks.len(),
                    in_cycle.contains(task.id.as_str()),
                    today,
                )
            })
            .collect();

        if unavailable > 0 {
            warn!(
                tasks = unavailable,
                "date advisory unavailable; weekend adjustment skipped for these tasks"
            );
        }

        analyzed.sort_by(compare_ranked);

        Ok(AnalysisReport {
            tasks: analyzed,
            has_cycles: !cycle_task_ids.is_empty(),
            cycle_task_ids,
            weights,
            strategy: policy.label(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn score_task(
        &self,
        task: &Task,
        weights: &WeightSet,
        class: DateClass,
        blocked: usize,
        batch_size: usize,
        in_dependency_cycle: bool,
        today: NaiveDate,
    ) -> AnalyzedTask {
        let business_days = class.uses_business_days();
        let days_until_due = factors::days_until_due(task.due_date, today, business_days);

        let scores = FactorScores {
            urgency: factors::urgency_score(days_until_due),
            importance: factors::importance_score(task.importance),
            effort: factors::effort_score(task.estimated_hours),
            blocking: factors::blocking_score(blocked, batch_size),
        };
        let priority_score = weights.combine(&scores);

        let facts = ExplainFacts {
            task,
            days_until_due,
            business_days,
            blocked,
            in_dependency_cycle,
        };

        AnalyzedTask {
            task: task.clone(),
            urgency_score: scores.urgency,
            importance_score: scores.importance,
            effort_score: scores.effort,
            blocking_score: scores.blocking,
            priority_score,
            priority_level: self.config.tiers.level(priority_score),
            is_overdue: task.due_date < today,
            days_until_due,
            in_dependency_cycle,
            is_corporate: class.is_corporate,
            is_urgent_task: class.is_urgent,
            score_explanation: explain(&scores, weights, &facts),
        }
    }
}

fn validate_batch(tasks: &[Task]) -> Result<(), AnalyzeError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(tasks.len());
    for (index, t) in tasks.iter().enumerate() {
        if t.id.trim().is_empty() {
            return Err(AnalyzeError::EmptyId { index });
        }
        if t.title.trim().is_empty() {
            return Err(AnalyzeError::EmptyTitle { id: t.id.clone() });
        }
        if !seen.insert(t.id.as_str()) {
            return Err(AnalyzeError::DuplicateId { id: t.id.clone() });
        }
    }
    Ok(())
}

/// Ranking order used for every analyzed list.
pub fn compare_ranked(a: &AnalyzedTask, b: &AnalyzedTask) -> Ordering {
    b.priority_score
        .total_cmp(&a.priority_score)
        .then_with(|| a.task.due_date.cmp(&b.task.due_date))
        .then_with(|| a.task.id.cmp(&b.task.id))
}

struct ExplainFacts<'a> {
    task: &'a Task,
    days_until_due: i64,
    business_days: bool,
    blocked: usize,
    in_dependency_cycle: bool,
}

/// Name the dominant weighted term, and the runner-up when it is at least half as large.
fn explain(scores: &FactorScores, weights: &WeightSet, facts: &ExplainFacts<'_>) -> String {
    let mut terms: Vec<(Factor, f64)> = Factor::ALL
        .iter()
        .map(|&f| (f, weights.get(f) * scores.get(f)))
        .collect();
    // Stable sort: equal contributions keep urgency/importance/effort/blocking order.
    terms.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (top, top_value) = terms[0];
    let mut sentence = if top_value <= 0.0 {
        "No factor stands out.".to_string()
    } else {
        let (second, second_value) = terms[1];
        if second_value > 0.0 && second_value >= top_value * 0.5 {
            format!(
                "Driven by {} and {}.",
                describe(top, scores, facts),
                describe(second, scores, facts)
            )
        } else {
            format!("Driven by {}.", describe(top, scores, facts))
        }
    };

    if facts.in_dependency_cycle {
        sentence.push_str(" Part of a dependency cycle, so no valid completion order exists.");
    }
    sentence
}

fn describe(factor: Factor, scores: &FactorScores, facts: &ExplainFacts<'_>) -> String {
    match factor {
        Factor::Urgency => {
            let unit = if facts.business_days { "business day" } else { "day" };
            let d = facts.days_until_due;
            if d < 0 {
                format!("urgency (overdue by {})", plural(d.unsigned_abs(), unit))
            } else if d == 0 {
                "urgency (due today)".to_string()
            } else {
                format!("urgency (due in {})", plural(d.unsigned_abs(), unit))
            }
        }
        Factor::Importance => {
            format!("importance (rated {}/10)", facts.task.importance.clamp(1, 10))
        }
        Factor::Effort => {
            let hours = facts.task.estimated_hours.max(0.0);
            if scores.effort >= 0.7 {
                format!("effort (quick win at {hours:.1}h)")
            } else {
                format!("effort ({hours:.1}h estimated)")
            }
        }
        Factor::Blocking => {
            format!("blocking (unblocks {})", plural(facts.blocked as u64, "task"))
        }
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::{AdvisoryUnavailable, NoAdvisor};
    use crate::weights::Strategy;

    fn today() -> NaiveDate {
        // A Friday.
        NaiveDate::from_ymd_opt(2026, 2, 20).unwrap()
    }

    fn due_in(days: i64) -> NaiveDate {
        today() + chrono::Duration::days(days)
    }

    struct AlwaysCorporate;
    impl DateAdvisor for AlwaysCorporate {
        fn classify(&self, _task: &Task) -> Result<DateClass, AdvisoryUnavailable> {
            Ok(DateClass {
                is_corporate: true,
                is_urgent: false,
            })
        }
    }

    fn smart() -> WeightPolicy {
        WeightPolicy::Preset(Strategy::SmartBalance)
    }

    #[test]
    fn tiers_use_pinned_defaults() {
        let t = TierThresholds::default();
        assert_eq!(t.level(0.95), PriorityLevel::Critical);
        assert_eq!(t.level(0.90), PriorityLevel::Critical);
        assert_eq!(t.level(0.70), PriorityLevel::High);
        assert_eq!(t.level(0.40), PriorityLevel::Medium);
        assert_eq!(t.level(0.39), PriorityLevel::Low);
    }

    #[test]
    fn empty_batch_is_empty_report() {
        let engine = ScoringEngine::new(NoAdvisor);
        let r = engine.analyze(&[], &smart(), true, today()).unwrap();
        assert!(r.tasks.is_empty());
        assert!(!r.has_cycles);
    }

    #[test]
    fn rejects_malformed_batches() {
        let engine = ScoringEngine::new(NoAdvisor);

        let err = engine
            .analyze(&[Task::new(" ", "x", today())], &smart(), false, today())
            .unwrap_err();
        assert_eq!(err, AnalyzeError::EmptyId { index: 0 });

        let err = engine
            .analyze(&[Task::new("a", "", today())], &smart(), false, today())
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::EmptyTitle { .. }));

        let dup = [Task::new("a", "x", today()), Task::new("a", "y", today())];
        let err = engine.analyze(&dup, &smart(), false, today()).unwrap_err();
        assert_eq!(err, AnalyzeError::DuplicateId { id: "a".to_string() });
    }

    #[test]
    fn single_task_has_no_blocking() {
        let engine = ScoringEngine::new(NoAdvisor);
        let t = Task::new("a", "solo", due_in(3)).with_dependency("a");
        let r = engine.analyze(&[t], &smart(), false, today()).unwrap();
        assert_eq!(r.tasks[0].blocking_score, 0.0);
        assert!(r.tasks[0].in_dependency_cycle);
    }

    #[test]
    fn corporate_tasks_count_business_days() {
        let engine = ScoringEngine::new(AlwaysCorporate);
        // Friday -> Monday: 3 calendar days, 1 business day.
        let t = Task::new("a", "quarterly report", due_in(3));

        let r = engine.analyze(&[t.clone()], &smart(), true, today()).unwrap();
        assert_eq!(r.tasks[0].days_until_due, 1);
        assert!(r.tasks[0].is_corporate);

        let r = engine.analyze(&[t], &smart(), false, today()).unwrap();
        assert_eq!(r.tasks[0].days_until_due, 3);
        assert!(!r.tasks[0].is_corporate);
    }

    #[test]
    fn corporate_weekend_due_date_is_overdue_on_monday() {
        let engine = ScoringEngine::new(AlwaysCorporate);
        let monday = NaiveDate::from_ymd_opt(2026, 2, 23).unwrap();
        let tasks = [
            Task::new("sat", "client report", NaiveDate::from_ymd_opt(2026, 2, 21).unwrap()),
            Task::new("sun", "client report", NaiveDate::from_ymd_opt(2026, 2, 22).unwrap()),
            Task::new("mon", "client report", monday),
        ];
        let r = engine.analyze(&tasks, &smart(), true, monday).unwrap();

        for id in ["sat", "sun"] {
            let t = r.get(id).unwrap();
            assert!(t.is_overdue, "{id}");
            assert!(t.days_until_due < 0, "{id}");
            assert!(t.urgency_score > 1.0, "{id}");
        }
        let today_task = r.get("mon").unwrap();
        assert!(!today_task.is_overdue);
        assert_eq!(today_task.urgency_score, 1.0);
        assert_eq!(r.tasks[2].id(), "mon");
    }

    #[test]
    fn unavailable_advisory_means_no_adjustment() {
        let engine = ScoringEngine::new(NoAdvisor);
        let t = Task::new("a", "quarterly report", due_in(3));
        let r = engine.analyze(&[t], &smart(), true, today()).unwrap();
        assert_eq!(r.tasks[0].days_until_due, 3);
        assert!(!r.tasks[0].is_corporate);
    }

    #[test]
    fn failed_advisory_is_asked_once_per_batch() {
        use std::cell::Cell;

        struct Flaky {
            calls: Cell<usize>,
        }
        impl DateAdvisor for Flaky {
            fn classify(&self, _task: &Task) -> Result<DateClass, AdvisoryUnavailable> {
                self.calls.set(self.calls.get() + 1);
                Err(AdvisoryUnavailable::new("timed out"))
            }
        }

        let flaky = Flaky { calls: Cell::new(0) };
        let engine = ScoringEngine::new(&flaky);
        let tasks: Vec<Task> = (0..50)
            .map(|i| Task::new(format!("t{i}"), "quarterly report", due_in(3)))
            .collect();
        let r = engine.analyze(&tasks, &smart(), true, today()).unwrap();

        assert_eq!(flaky.calls.get(), 1);
        assert!(r.tasks.iter().all(|t| !t.is_corporate && t.days_until_due == 3));
    }

    #[test]
    fn ties_break_on_due_date_then_id() {
        let engine = ScoringEngine::new(NoAdvisor);
        // Urgency saturates at 0 beyond 30 days, so these all score equally.
        let tasks = [
            Task::new("b", "x", due_in(60)),
            Task::new("c", "x", due_in(45)),
            Task::new("a", "x", due_in(60)),
        ];
        let r = engine.analyze(&tasks, &smart(), false, today()).unwrap();
        let ids: Vec<&str> = r.tasks.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn explanation_names_dominant_factors() {
        let engine = ScoringEngine::new(NoAdvisor);
        let t = Task::new("a", "x", due_in(-4)).with_importance(9).with_hours(30.0);
        let r = engine
            .analyze(&[t], &WeightPolicy::Preset(Strategy::DeadlineDriven), false, today())
            .unwrap();
        let text = &r.tasks[0].score_explanation;
        assert!(text.starts_with("Driven by urgency (overdue by 4 days)"), "{text}");
    }

    #[test]
    fn explanation_flags_cycles() {
        let engine = ScoringEngine::new(NoAdvisor);
        let tasks = [
            Task::new("a", "x", due_in(1)).with_dependency("b"),
            Task::new("b", "y", due_in(1)).with_dependency("a"),
        ];
        let r = engine.analyze(&tasks, &smart(), false, today()).unwrap();
        assert!(r.has_cycles);
        assert_eq!(r.cycle_task_ids, vec!["a", "b"]);
        assert!(r.tasks.iter().all(|t| t.score_explanation.contains("dependency cycle")));
    }

    #[test]
    fn custom_weights_are_validated() {
        let engine = ScoringEngine::new(NoAdvisor);
        let t = Task::new("a", "x", due_in(1));
        let bad = WeightPolicy::Custom(WeightSet::custom(0.3, 0.3, 0.2, 0.1));
        let err = engine.analyze(&[t], &bad, false, today()).unwrap_err();
        assert!(matches!(err, AnalyzeError::InvalidWeights(_)));
    }
}
