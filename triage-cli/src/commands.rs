use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::path::PathBuf;
use tracing::{info, warn};
use triage_core::{
    categorize_matrix, dependency_order, suggest_top, AnalysisReport, FeedbackLearner,
    FeedbackRecord, FeedbackStore, LearnOutcome, LearnSource, ScoringEngine, Strategy,
    WeightPolicy, WeightSet, WeightStore,
};
use triage_ingest::load_tasks;

use crate::advisors::Advisors;
use crate::config::{config_path, load_config, Config};
use crate::output;
use crate::state::FileStore;
use crate::time::today_in;
use crate::{AnalyzeArgs, Order};

/// Learning looks at this many of the most recent feedback records.
pub const FEEDBACK_WINDOW: usize = 50;

/// Everything a command needs: where state lives, config, and whose data it is.
#[derive(Debug, Clone)]
pub struct Ctx {
    pub home: PathBuf,
    pub config: Config,
    pub store: FileStore,
    pub user: String,
}

impl Ctx {
    pub fn load(home: PathBuf, user: Option<String>) -> Result<Self> {
        let config = load_config(&home)?;
        let user = user
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| config.defaults.user.clone());
        Ok(Self {
            store: FileStore::new(&home),
            home,
            config,
            user,
        })
    }

    fn strategy(&self, flag: Option<&str>) -> Result<Strategy> {
        let name = flag.unwrap_or(&self.config.defaults.strategy);
        name.parse::<Strategy>().map_err(|e| anyhow::anyhow!(e))
    }

    /// `--weights` beats stored custom weights, which beat the strategy preset.
    pub fn policy(&self, args: &AnalyzeArgs) -> Result<WeightPolicy> {
        if let Some(raw) = &args.weights {
            return Ok(WeightPolicy::Custom(parse_weights(raw)?));
        }
        let strategy = self.strategy(args.strategy.as_deref())?;
        let stored = self.store.load_weights(&self.user)?;
        Ok(WeightPolicy::resolve(strategy, stored))
    }

    /// Weights the next analysis would use without flags.
    pub fn current_weights(&self) -> Result<WeightSet> {
        let stored = self.store.load_weights(&self.user)?;
        let policy = WeightPolicy::resolve(self.strategy(None)?, stored);
        match policy.weights() {
            Ok(w) => Ok(w),
            Err(e) => {
                warn!(error = %e, "stored weights are invalid; using preset");
                Ok(self.strategy(None)?.weights())
            }
        }
    }

    pub fn run_analysis(&self, args: &AnalyzeArgs) -> Result<AnalysisReport> {
        let tasks = load_tasks(&args.file)?;
        let policy = self.policy(args)?;
        let today = today_in(&self.config.defaults.timezone)?;
        let consider_weekends = self.config.defaults.consider_weekends && !args.no_weekends;

        let advisors = Advisors::from_config(&self.config.advisor, args.offline);
        info!(advisory = advisors.label(), tasks = tasks.len(), "running analysis");
        let engine = ScoringEngine::with_config(advisors, self.config.engine);
        let report = engine.analyze(&tasks, &policy, consider_weekends, today)?;

        self.store.save_last_analysis(&self.user, &report)?;
        Ok(report)
    }

    pub fn record_feedback(
        &self,
        task_id: &str,
        helpful: bool,
        comment: Option<String>,
    ) -> Result<FeedbackRecord> {
        let task_id = task_id.trim();
        if task_id.is_empty() {
            bail!("task id must not be empty");
        }

        let mut record = FeedbackRecord::new(task_id, helpful, Utc::now());
        if let Some(c) = comment.filter(|c| !c.trim().is_empty()) {
            record = record.with_comment(c.trim());
        }

        let last = self.store.load_last_analysis(&self.user)?;
        match last.as_ref().and_then(|r| r.get(task_id)) {
            Some(t) => record = record.with_snapshot(t.factors()),
            None => warn!(task_id, "task not in the last analysis; feedback stored without factor scores"),
        }

        self.store.save_feedback(&self.user, record.clone())?;
        Ok(record)
    }

    pub fn run_learn(&self, offline: bool) -> Result<LearnOutcome> {
        let current = self.current_weights()?;
        let mut records = self.store.load_feedback(&self.user)?;
        if records.len() > FEEDBACK_WINDOW {
            records.drain(..records.len() - FEEDBACK_WINDOW);
        }

        let learner = FeedbackLearner::default();
        let advisors = Advisors::from_config(&self.config.advisor, offline);
        Ok(learner.learn(&current, &records, &advisors))
    }
}

/// "0.3,0.3,0.2,0.2" in urgency, importance, effort, blocking order.
pub fn parse_weights(raw: &str) -> Result<WeightSet> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .with_context(|| format!("invalid weight '{}'", p.trim()))
        })
        .collect::<Result<_>>()?;
    let [u, i, e, b] = parts[..] else {
        bail!("expected 4 comma-separated weights (urgency,importance,effort,blocking), got {}", parts.len());
    };
    let ws = WeightSet::custom(u, i, e, b);
    ws.validate()?;
    Ok(ws)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn analyze(ctx: &Ctx, args: &AnalyzeArgs, order: Order) -> Result<()> {
    let report = ctx.run_analysis(args)?;
    let tasks = match order {
        Order::Priority => report.tasks.clone(),
        Order::Dependency => dependency_order(&report.tasks),
    };

    if args.json {
        return print_json(&AnalysisReport { tasks, ..report });
    }
    print!("{}", output::render_report(&report, &tasks));
    Ok(())
}

pub fn suggest(ctx: &Ctx, args: &AnalyzeArgs, count: usize) -> Result<()> {
    let report = ctx.run_analysis(args)?;
    let top = suggest_top(&report.tasks, count);

    if args.json {
        return print_json(&top);
    }
    if top.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    println!("Top {} of {} task(s):\n", top.len(), report.tasks.len());
    print!("{}", output::render_tasks(&top));
    Ok(())
}

pub fn matrix(ctx: &Ctx, args: &AnalyzeArgs) -> Result<()> {
    let report = ctx.run_analysis(args)?;
    let m = categorize_matrix(&report.tasks, &ctx.config.engine.matrix);

    if args.json {
        return print_json(&m);
    }
    print!("{}", output::render_matrix(&m));
    Ok(())
}

pub fn weights_show(ctx: &Ctx) -> Result<()> {
    let w = ctx.current_weights()?;
    let source = if w.custom_weights_enabled {
        "custom".to_string()
    } else {
        format!("preset {}", ctx.strategy(None)?)
    };
    println!("Weights for {} ({source}):", ctx.user);
    print!("{}", output::render_weights(&w));
    Ok(())
}

pub fn weights_set(ctx: &Ctx, urgency: f64, importance: f64, effort: f64, blocking: f64) -> Result<()> {
    let ws = WeightSet::custom(urgency, importance, effort, blocking);
    ws.validate()?;
    ctx.store.save_weights(&ctx.user, &ws)?;
    println!("Saved custom weights for {}:", ctx.user);
    print!("{}", output::render_weights(&ws));
    Ok(())
}

pub fn weights_reset(ctx: &Ctx) -> Result<()> {
    if ctx.store.clear_weights(&ctx.user)? {
        println!("Custom weights removed for {}.", ctx.user);
    } else {
        println!("No custom weights stored for {}.", ctx.user);
    }
    Ok(())
}

pub fn feedback(ctx: &Ctx, task_id: &str, helpful: bool, comment: Option<String>) -> Result<()> {
    let record = ctx.record_feedback(task_id, helpful, comment)?;
    let rating = if record.helpful { "helpful" } else { "not helpful" };
    println!("Recorded '{}' as {rating}.", record.task_id);
    Ok(())
}

pub fn learn(ctx: &Ctx, offline: bool, dry_run: bool) -> Result<()> {
    let outcome = ctx.run_learn(offline)?;
    print!("{}", output::render_learn(&outcome));

    if outcome.source == LearnSource::Unchanged {
        println!("Nothing saved.");
    } else if dry_run {
        println!("Dry run; nothing saved.");
    } else {
        ctx.store.save_weights(&ctx.user, &outcome.weights)?;
        println!("Saved new weights for {}.", ctx.user);
    }
    Ok(())
}

pub fn config_show(ctx: &Ctx) -> Result<()> {
    println!("# {}", config_path(&ctx.home).display());
    print!("{}", toml::to_string_pretty(&ctx.config).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const BATCH: &str = r#"[
        {"id": "report", "title": "Quarterly client report", "due_date": "2020-01-10", "importance": 9, "estimated_hours": 3},
        {"id": "review", "title": "Review report", "due_date": "2099-01-01", "dependencies": ["report"]},
        {"id": "garden", "title": "Weed the garden", "due_date": "2099-06-01", "importance": 2}
    ]"#;

    fn setup() -> (TempDir, Ctx, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tasks.json");
        fs::write(&file, BATCH).unwrap();
        let ctx = Ctx::load(dir.path().to_path_buf(), Some("tester".into())).unwrap();
        (dir, ctx, file)
    }

    fn args(file: PathBuf) -> AnalyzeArgs {
        AnalyzeArgs {
            file,
            strategy: None,
            weights: None,
            no_weekends: false,
            offline: true,
            json: false,
        }
    }

    #[test]
    fn parse_weights_accepts_valid_and_rejects_bad() {
        let ws = parse_weights("0.3, 0.3, 0.2, 0.2").unwrap();
        assert!(ws.custom_weights_enabled);
        assert!(parse_weights("0.3,0.3,0.2").is_err());
        assert!(parse_weights("0.5,0.5,0.5,0.5").is_err());
        assert!(parse_weights("a,b,c,d").is_err());
    }

    #[test]
    fn policy_precedence() {
        let (_dir, ctx, file) = setup();
        let mut a = args(file);

        assert_eq!(ctx.policy(&a).unwrap(), WeightPolicy::Preset(Strategy::SmartBalance));

        a.strategy = Some("deadline-driven".into());
        assert_eq!(ctx.policy(&a).unwrap(), WeightPolicy::Preset(Strategy::DeadlineDriven));

        let stored = WeightSet::custom(0.4, 0.3, 0.2, 0.1);
        ctx.store.save_weights("tester", &stored).unwrap();
        assert_eq!(ctx.policy(&a).unwrap(), WeightPolicy::Custom(stored));

        a.weights = Some("0.25,0.25,0.25,0.25".into());
        assert_eq!(ctx.policy(&a).unwrap().label(), "custom");
        assert_eq!(ctx.policy(&a).unwrap().weights().unwrap().effort_weight, 0.25);
    }

    #[test]
    fn analysis_is_saved_and_feedback_gets_snapshot() {
        let (_dir, ctx, file) = setup();
        let report = ctx.run_analysis(&args(file)).unwrap();
        assert_eq!(report.tasks[0].id(), "report");

        let rec = ctx.record_feedback("report", true, Some(" useful ".into())).unwrap();
        assert_eq!(rec.comment.as_deref(), Some("useful"));
        assert_eq!(rec.snapshot, Some(report.get("report").unwrap().factors()));

        let unknown = ctx.record_feedback("nope", false, None).unwrap();
        assert!(unknown.snapshot.is_none());
        assert_eq!(ctx.store.load_feedback("tester").unwrap().len(), 2);
    }

    #[test]
    fn feedback_snapshot_comes_from_own_analysis_only() {
        let (dir, alice, file) = setup();
        alice.run_analysis(&args(file)).unwrap();

        let bob = Ctx::load(dir.path().to_path_buf(), Some("bob".into())).unwrap();
        let rec = bob.record_feedback("report", true, None).unwrap();
        assert!(rec.snapshot.is_none());
        assert!(alice.store.load_feedback("tester").unwrap().is_empty());

        let rec = alice.record_feedback("report", true, None).unwrap();
        assert!(rec.snapshot.is_some());
    }

    #[test]
    fn learn_without_feedback_is_unchanged() {
        let (_dir, ctx, _file) = setup();
        let outcome = ctx.run_learn(true).unwrap();
        assert_eq!(outcome.source, LearnSource::Unchanged);
        assert_eq!(outcome.weights, Strategy::SmartBalance.weights());
    }

    #[test]
    fn learn_offline_moves_toward_helpful_factors() {
        let (_dir, ctx, file) = setup();
        ctx.run_analysis(&args(file)).unwrap();
        // Overdue, important task rated helpful; the far-off low-value one not.
        for _ in 0..3 {
            ctx.record_feedback("report", true, None).unwrap();
            ctx.record_feedback("garden", false, None).unwrap();
        }

        let outcome = ctx.run_learn(true).unwrap();
        assert_eq!(outcome.source, LearnSource::Heuristic);
        assert!(outcome.weights.validate().is_ok());
        assert!(outcome.weights.urgency_weight > outcome.previous.urgency_weight);
        assert!(outcome.weights.custom_weights_enabled);
    }

    #[test]
    fn learn_uses_recent_window() {
        let (_dir, ctx, _file) = setup();
        for i in 0..(FEEDBACK_WINDOW + 10) {
            ctx.store
                .save_feedback("tester", FeedbackRecord::new(format!("t{i}"), i % 2 == 0, Utc::now()))
                .unwrap();
        }
        let outcome = ctx.run_learn(true).unwrap();
        assert_eq!(outcome.summary.total(), FEEDBACK_WINDOW);
    }

    #[test]
    fn user_defaults_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Ctx::load(dir.path().to_path_buf(), Some("  ".into())).unwrap();
        assert_eq!(ctx.user, "default");
    }
}
