//! Storage contracts for persisted preferences and feedback.
//!
//! The engine never persists anything itself; callers load inputs through
//! these traits and save what `learn` returns.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::learner::FeedbackRecord;
use crate::weights::WeightSet;

pub trait WeightStore {
    fn load_weights(&self, user: &str) -> Result<Option<WeightSet>>;
    fn save_weights(&self, user: &str, weights: &WeightSet) -> Result<()>;
}

pub trait FeedbackStore {
    fn load_feedback(&self, user: &str) -> Result<Vec<FeedbackRecord>>;
    fn save_feedback(&self, user: &str, record: FeedbackRecord) -> Result<()>;
}

/// In-process store. Last write wins.
#[derive(Debug, Default)]
pub struct MemoryStore {
    weights: Mutex<HashMap<String, WeightSet>>,
    feedback: Mutex<HashMap<String, Vec<FeedbackRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow::anyhow!("memory store lock poisoned")
}

impl WeightStore for MemoryStore {
    fn load_weights(&self, user: &str) -> Result<Option<WeightSet>> {
        Ok(self.weights.lock().map_err(poisoned)?.get(user).copied())
    }

    fn save_weights(&self, user: &str, weights: &WeightSet) -> Result<()> {
        self.weights
            .lock()
            .map_err(poisoned)?
            .insert(user.to_string(), *weights);
        Ok(())
    }
}

impl FeedbackStore for MemoryStore {
    fn load_feedback(&self, user: &str) -> Result<Vec<FeedbackRecord>> {
        Ok(self
            .feedback
            .lock()
            .map_err(poisoned)?
            .get(user)
            .cloned()
            .unwrap_or_default())
    }

    fn save_feedback(&self, user: &str, record: FeedbackRecord) -> Result<()> {
        self.feedback
            .lock()
            .map_err(poisoned)?
            .entry(user.to_string())
            .or_default()
            .push(record);
        Ok(())
    }
}
