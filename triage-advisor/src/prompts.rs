use triage_core::{Factor, FactorScores, FeedbackSummary, Task, WeightSet};

pub const CLASSIFY_SYSTEM: &str = "You classify tasks for a deadline planner. \
A task is corporate when it is work done for an employer or client, where weekends \
are not working days. A task is urgent when it must be done as soon as possible \
regardless of weekends. Reply with JSON only: \
{\"is_corporate\": bool, \"is_urgent\": bool}.";

pub const WEIGHTS_SYSTEM: &str = "You tune the weights of a task prioritization score. \
The score is a weighted sum of four factors in [0,1]: urgency, importance, effort \
(quick wins score high) and blocking (how many tasks wait on this one). Given \
aggregate feedback on past suggestions, propose new weights. Every weight must be \
non-negative and the four must sum to exactly 1.0. Reply with JSON only: \
{\"urgency\": n, \"importance\": n, \"effort\": n, \"blocking\": n, \"reasoning\": \"...\"}.";

pub fn classify_prompt(task: &Task) -> String {
    format!(
        "Task: {}\nDue: {}\nEstimated hours: {}",
        task.title.trim(),
        task.due_date,
        task.estimated_hours
    )
}

/// Only counts and means go out; never task titles or ids.
pub fn weights_prompt(current: &WeightSet, summary: &FeedbackSummary) -> String {
    let mut s = String::new();
    s.push_str("Current weights:\n");
    for f in Factor::ALL {
        s.push_str(&format!("- {}: {:.3}\n", f.label(), current.get(f)));
    }
    s.push_str(&format!(
        "\nFeedback: {} helpful, {} not helpful ({} with factor snapshots).\n",
        summary.helpful, summary.not_helpful, summary.with_snapshots
    ));
    push_means(&mut s, "helpful", summary.helpful_means.as_ref());
    push_means(&mut s, "not helpful", summary.not_helpful_means.as_ref());
    s
}

fn push_means(s: &mut String, label: &str, means: Option<&FactorScores>) {
    match means {
        Some(m) => {
            s.push_str(&format!("\nMean factor scores of {label} suggestions:\n"));
            for f in Factor::ALL {
                s.push_str(&format!("- {}: {:.3}\n", f.label(), m.get(f)));
            }
        }
        None => s.push_str(&format!("\nNo factor snapshots for {label} suggestions.\n")),
    }
}
