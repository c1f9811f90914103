use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use triage_core::{AnalysisReport, FeedbackRecord, FeedbackStore, WeightSet, WeightStore};

pub fn triage_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TRIAGE_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".triage"))
}

pub fn ensure_triage_home() -> Result<PathBuf> {
    let dir = triage_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// JSON files under the triage home, one directory per user.
///
/// Writes are whole-file replacements; the last writer wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn user_dir(&self, user: &str) -> PathBuf {
        self.root.join("users").join(safe_name(user))
    }

    fn weights_path(&self, user: &str) -> PathBuf {
        self.user_dir(user).join("weights.json")
    }

    fn feedback_path(&self, user: &str) -> PathBuf {
        self.user_dir(user).join("feedback.json")
    }

    fn last_analysis_path(&self, user: &str) -> PathBuf {
        self.user_dir(user).join("last_analysis.json")
    }

    pub fn clear_weights(&self, user: &str) -> Result<bool> {
        let p = self.weights_path(user);
        if !p.exists() {
            return Ok(false);
        }
        fs::remove_file(&p).with_context(|| format!("remove {}", p.display()))?;
        Ok(true)
    }

    /// Kept per user so feedback attaches the factor scores that user was shown.
    pub fn save_last_analysis(&self, user: &str, report: &AnalysisReport) -> Result<()> {
        write_json(&self.last_analysis_path(user), report)
    }

    pub fn load_last_analysis(&self, user: &str) -> Result<Option<AnalysisReport>> {
        read_json(&self.last_analysis_path(user))
    }
}

impl WeightStore for FileStore {
    fn load_weights(&self, user: &str) -> Result<Option<WeightSet>> {
        read_json(&self.weights_path(user))
    }

    fn save_weights(&self, user: &str, weights: &WeightSet) -> Result<()> {
        write_json(&self.weights_path(user), weights)
    }
}

impl FeedbackStore for FileStore {
    fn load_feedback(&self, user: &str) -> Result<Vec<FeedbackRecord>> {
        Ok(read_json(&self.feedback_path(user))?.unwrap_or_default())
    }

    fn save_feedback(&self, user: &str, record: FeedbackRecord) -> Result<()> {
        let mut all = self.load_feedback(user)?;
        all.push(record);
        write_json(&self.feedback_path(user), &all)
    }
}

/// Keep user names usable as a single path component.
fn safe_name(user: &str) -> String {
    let s: String = user
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if s.is_empty() { "default".to_string() } else { s }
}

fn read_json<T: DeserializeOwned>(p: &Path) -> Result<Option<T>> {
    if !p.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let v = serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    Ok(Some(v))
}

fn write_json<T: Serialize + ?Sized>(p: &Path, value: &T) -> Result<()> {
    if let Some(dir) = p.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
