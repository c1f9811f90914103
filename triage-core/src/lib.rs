//! triage-core: priority scoring and dependency analysis engine.
//!
//! Given a batch of tasks, compute four normalized factor scores per task,
//! analyze the dependency graph, combine the factors under a weighting policy
//! and rank the result. Feedback on suggestions feeds back into the weights.

pub mod advisory;
pub mod engine;
pub mod error;
pub mod factors;
pub mod graph;
pub mod learner;
pub mod store;
pub mod task;
pub mod views;
pub mod weights;

pub use advisory::{
    AdvisoryUnavailable, DateAdvisor, DateClass, KeywordDateAdvisor, NoAdvisor, WeightAdvisor,
    WeightProposal,
};
pub use engine::{AnalysisReport, EngineConfig, ScoringEngine, TierThresholds};
pub use error::{AnalyzeError, WeightError};
pub use graph::DependencyGraph;
pub use learner::{FeedbackLearner, FeedbackRecord, FeedbackSummary, LearnOutcome, LearnSource};
pub use store::{FeedbackStore, MemoryStore, WeightStore};
pub use task::{AnalyzedTask, FactorScores, PriorityLevel, Task};
pub use views::{
    categorize_matrix, dependency_order, suggest_top, EisenhowerMatrix, MatrixThresholds, Quadrant,
};
pub use weights::{Factor, Strategy, WeightPolicy, WeightSet};
