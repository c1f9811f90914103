//! Advisory collaborators the engine may consult.
//!
//! Both advisories are optional. Every call site computes its fallback first
//! and only upgrades to the advisory answer when the call succeeds, so an
//! unavailable advisory never changes anything beyond "no upgrade".

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::learner::FeedbackSummary;
use crate::task::Task;
use crate::weights::WeightSet;

/// Advisory could not answer (disabled, timed out, bad reply, transport error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("advisory unavailable: {reason}")]
pub struct AdvisoryUnavailable {
    pub reason: String,
}

impl AdvisoryUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// How the calendar should treat a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateClass {
    /// Business task: weekends do not count toward its deadline.
    pub is_corporate: bool,
    /// Needs doing regardless of weekends; overrides the corporate adjustment.
    pub is_urgent: bool,
}

impl DateClass {
    pub fn uses_business_days(&self) -> bool {
        self.is_corporate && !self.is_urgent
    }
}

/// Date-classification advisory.
pub trait DateAdvisor {
    fn classify(&self, task: &Task) -> Result<DateClass, AdvisoryUnavailable>;
}

/// A proposed weight set with the advisory's reasoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightProposal {
    pub weights: WeightSet,
    pub rationale: String,
}

/// Weight-optimization advisory.
pub trait WeightAdvisor {
    fn propose_weights(
        &self,
        current: &WeightSet,
        summary: &FeedbackSummary,
    ) -> Result<WeightProposal, AdvisoryUnavailable>;
}

impl<T: DateAdvisor + ?Sized> DateAdvisor for &T {
    fn classify(&self, task: &Task) -> Result<DateClass, AdvisoryUnavailable> {
        (**self).classify(task)
    }
}

impl<T: WeightAdvisor + ?Sized> WeightAdvisor for &T {
    fn propose_weights(
        &self,
        current: &WeightSet,
        summary: &FeedbackSummary,
    ) -> Result<WeightProposal, AdvisoryUnavailable> {
        (**self).propose_weights(current, summary)
    }
}

/// Advisory that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdvisor;

impl DateAdvisor for NoAdvisor {
    fn classify(&self, _task: &Task) -> Result<DateClass, AdvisoryUnavailable> {
        Err(AdvisoryUnavailable::new("no date advisory configured"))
    }
}

impl WeightAdvisor for NoAdvisor {
    fn propose_weights(
        &self,
        _current: &WeightSet,
        _summary: &FeedbackSummary,
    ) -> Result<WeightProposal, AdvisoryUnavailable> {
        Err(AdvisoryUnavailable::new("no weight advisory configured"))
    }
}

/// Offline classifier: keyword overlap on the task title.
///
/// Deterministic and cheap; used when no LLM advisory is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordDateAdvisor;

const CORPORATE_WORDS: &[&str] = &[
    "client", "customer", "meeting", "report", "project", "deadline", "review", "deploy",
    "release", "invoice", "proposal", "presentation", "sprint", "standup", "contract", "budget",
    "quarterly", "stakeholder", "team", "manager", "office", "work", "bug", "feature", "api",
    "audit", "compliance", "onboarding", "interview", "roadmap",
];

const URGENT_WORDS: &[&str] = &[
    "urgent", "asap", "emergency", "critical", "immediately", "outage", "incident", "hotfix",
    "blocker", "production",
];

fn tokenize(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

impl DateAdvisor for KeywordDateAdvisor {
    fn classify(&self, task: &Task) -> Result<DateClass, AdvisoryUnavailable> {
        let tokens = tokenize(&task.title);
        let hits = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));
        Ok(DateClass {
            is_corporate: hits(CORPORATE_WORDS),
            is_urgent: hits(URGENT_WORDS),
        })
    }
}
