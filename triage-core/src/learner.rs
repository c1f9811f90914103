//! Feedback-driven weight adjustment.
//!
//! The heuristic path always runs first and is the answer unless the weight
//! advisory returns a proposal that passes `WeightSet::validate`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::advisory::WeightAdvisor;
use crate::task::FactorScores;
use crate::weights::{Factor, WeightSet};

/// A user's verdict on one suggested task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub task_id: String,
    pub helpful: bool,
    #[serde(default)]
    pub comment: Option<String>,
    pub recorded_at: DateTime<Utc>,
    /// Factor scores the task had when it was suggested.
    #[serde(default)]
    pub snapshot: Option<FactorScores>,
}

impl FeedbackRecord {
    pub fn new(task_id: impl Into<String>, helpful: bool, recorded_at: DateTime<Utc>) -> Self {
        Self {
            task_id: task_id.into(),
            helpful,
            comment: None,
            recorded_at,
            snapshot: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_snapshot(mut self, snapshot: FactorScores) -> Self {
        self.snapshot = Some(snapshot);
        self
    }
}

/// Aggregate view of feedback. This, not raw task content, is what leaves the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub helpful: usize,
    pub not_helpful: usize,
    /// Records that carried a factor snapshot.
    pub with_snapshots: usize,
    pub helpful_means: Option<FactorScores>,
    pub not_helpful_means: Option<FactorScores>,
}

impl FeedbackSummary {
    pub fn from_records(records: &[FeedbackRecord]) -> Self {
        let helpful = records.iter().filter(|r| r.helpful).count();
        let snapshots = |want: bool| -> Vec<FactorScores> {
            records
                .iter()
                .filter(|r| r.helpful == want)
                .filter_map(|r| r.snapshot)
                .collect()
        };
        let good = snapshots(true);
        let bad = snapshots(false);

        Self {
            helpful,
            not_helpful: records.len() - helpful,
            with_snapshots: good.len() + bad.len(),
            helpful_means: mean(&good),
            not_helpful_means: mean(&bad),
        }
    }

    pub fn total(&self) -> usize {
        self.helpful + self.not_helpful
    }
}

fn mean(scores: &[FactorScores]) -> Option<FactorScores> {
    if scores.is_empty() {
        return None;
    }
    let n = scores.len() as f64;
    let sum = |f: Factor| scores.iter().map(|s| s.get(f)).sum::<f64>() / n;
    Some(FactorScores {
        urgency: sum(Factor::Urgency),
        importance: sum(Factor::Importance),
        effort: sum(Factor::Effort),
        blocking: sum(Factor::Blocking),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnSource {
    /// Not enough feedback; weights returned as given.
    Unchanged,
    Heuristic,
    Advisory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnOutcome {
    pub previous: WeightSet,
    pub weights: WeightSet,
    pub rationale: String,
    pub summary: FeedbackSummary,
    pub source: LearnSource,
}

/// Tuning knobs of the heuristic path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackLearner {
    /// Helpful mean must beat the not-helpful mean by more than this.
    pub margin: f64,
    /// Additive change per learning pass.
    pub step: f64,
    /// Floor applied before renormalizing.
    pub min_weight: f64,
}

impl Default for FeedbackLearner {
    fn default() -> Self {
        Self {
            margin: 0.05,
            step: 0.05,
            min_weight: 0.05,
        }
    }
}

/// Stand-in mean for a partition with no snapshots.
const NEUTRAL: FactorScores = FactorScores {
    urgency: 0.5,
    importance: 0.5,
    effort: 0.5,
    blocking: 0.5,
};

impl FeedbackLearner {
    /// Heuristic only.
    pub fn learn_heuristic(&self, current: &WeightSet, records: &[FeedbackRecord]) -> LearnOutcome {
        let summary = FeedbackSummary::from_records(records);
        self.heuristic(current, summary)
    }

    /// Heuristic first, then try to upgrade to the advisory's proposal.
    pub fn learn<W: WeightAdvisor>(
        &self,
        current: &WeightSet,
        records: &[FeedbackRecord],
        advisor: &W,
    ) -> LearnOutcome {
        let summary = FeedbackSummary::from_records(records);
        info!(
            helpful = summary.helpful,
            not_helpful = summary.not_helpful,
            with_snapshots = summary.with_snapshots,
            "learning weights from feedback"
        );

        let fallback = self.heuristic(current, summary);
        if summary.total() == 0 {
            return fallback;
        }

        match advisor.propose_weights(current, &summary) {
            Ok(proposal) => match proposal.weights.validate() {
                Ok(()) => {
                    debug!(rationale = %proposal.rationale, "accepted advisory weights");
                    LearnOutcome {
                        previous: *current,
                        weights: WeightSet {
                            custom_weights_enabled: true,
                            ..proposal.weights
                        },
                        rationale: proposal.rationale,
                        summary,
                        source: LearnSource::Advisory,
                    }
                }
                Err(e) => {
                    warn!(error = %e, "advisory proposed invalid weights; keeping heuristic result");
                    fallback
                }
            },
            Err(e) => {
                warn!(error = %e, "weight advisory unavailable; keeping heuristic result");
                fallback
            }
        }
    }

    fn heuristic(&self, current: &WeightSet, summary: FeedbackSummary) -> LearnOutcome {
        if summary.with_snapshots == 0 {
            let rationale = if summary.total() == 0 {
                "No feedback recorded yet; weights unchanged.".to_string()
            } else {
                format!(
                    "{} feedback record(s) carry no factor snapshot; weights unchanged.",
                    summary.total()
                )
            };
            return LearnOutcome {
                previous: *current,
                weights: *current,
                rationale,
                summary,
                source: LearnSource::Unchanged,
            };
        }

        let good = summary.helpful_means.unwrap_or(NEUTRAL);
        let bad = summary.not_helpful_means.unwrap_or(NEUTRAL);
        let favoured = |f: Factor| good.get(f) - bad.get(f) > self.margin;

        let mut weights = current.adjusted(self.min_weight, |f, w| {
            if favoured(f) { w + self.step } else { w - self.step }
        });
        weights.custom_weights_enabled = true;

        let raised: Vec<&str> = Factor::ALL.iter().filter(|f| favoured(**f)).map(|f| f.label()).collect();
        let lowered: Vec<&str> = Factor::ALL.iter().filter(|f| !favoured(**f)).map(|f| f.label()).collect();

        let change = match (raised.is_empty(), lowered.is_empty()) {
            (true, _) => "No factor separated helpful from unhelpful suggestions; weights evened out".to_string(),
            (false, true) => format!("Raised {}", raised.join(", ")),
            (false, false) => format!("Raised {}; lowered {}", raised.join(", "), lowered.join(", ")),
        };
        let rationale = format!(
            "{change} (from {} helpful and {} not helpful rating(s)).",
            summary.helpful, summary.not_helpful
        );

        LearnOutcome {
            previous: *current,
            weights,
            rationale,
            summary,
            source: LearnSource::Heuristic,
        }
    }
}
