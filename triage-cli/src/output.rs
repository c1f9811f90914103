//! Plain-text rendering for the terminal.

use std::fmt::Write;
use triage_core::{
    AnalysisReport, AnalyzedTask, EisenhowerMatrix, Factor, LearnOutcome, LearnSource, Quadrant,
    WeightSet,
};

pub fn task_line(rank: usize, t: &AnalyzedTask) -> String {
    let mut flags = Vec::new();
    if t.is_overdue {
        flags.push("OVERDUE");
    }
    if t.in_dependency_cycle {
        flags.push("CYCLE");
    }
    if t.is_corporate {
        flags.push("corporate");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };

    format!(
        "{rank:>3}. {:<8} {:.3}  {} | due {} ({}d){flags}\n       {}",
        t.priority_level.label(),
        t.priority_score,
        t.task.title,
        t.task.due_date,
        t.days_until_due,
        t.score_explanation
    )
}

pub fn render_tasks(tasks: &[AnalyzedTask]) -> String {
    let mut s = String::new();
    for (i, t) in tasks.iter().enumerate() {
        let _ = writeln!(s, "{}", task_line(i + 1, t));
    }
    s
}

pub fn render_report(report: &AnalysisReport, tasks: &[AnalyzedTask]) -> String {
    let mut s = format!(
        "{} task(s), strategy: {}\n\n",
        report.tasks.len(),
        report.strategy
    );
    s.push_str(&render_tasks(tasks));
    if report.has_cycles {
        let _ = writeln!(
            s,
            "\nDependency cycle(s) among: {}",
            report.cycle_task_ids.join(", ")
        );
    }
    s
}

pub fn render_matrix(m: &EisenhowerMatrix) -> String {
    let mut s = String::new();
    for q in [
        Quadrant::DoNow,
        Quadrant::Schedule,
        Quadrant::Delegate,
        Quadrant::Drop,
    ] {
        let tasks = m.quadrant(q);
        let _ = writeln!(s, "{} ({})", q.title(), tasks.len());
        for t in tasks {
            let _ = writeln!(s, "  - {} [{:.3}] due {}", t.task.title, t.priority_score, t.task.due_date);
        }
        s.push('\n');
    }
    s
}

pub fn render_weights(w: &WeightSet) -> String {
    let mut s = String::new();
    for f in Factor::ALL {
        let _ = writeln!(s, "  {:<11} {:.3}", f.label(), w.get(f));
    }
    let _ = writeln!(s, "  custom      {}", w.custom_weights_enabled);
    s
}

pub fn render_learn(outcome: &LearnOutcome) -> String {
    let source = match outcome.source {
        LearnSource::Unchanged => "unchanged",
        LearnSource::Heuristic => "heuristic",
        LearnSource::Advisory => "advisory",
    };
    let mut s = format!(
        "Feedback: {} helpful, {} not helpful ({} with snapshots)\nSource: {source}\n\nPrevious weights:\n",
        outcome.summary.helpful, outcome.summary.not_helpful, outcome.summary.with_snapshots
    );
    s.push_str(&render_weights(&outcome.previous));
    s.push_str("\nNew weights:\n");
    s.push_str(&render_weights(&outcome.weights));
    let _ = writeln!(s, "\n{}", outcome.rationale);
    s
}
