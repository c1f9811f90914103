//! Factor calculators: one raw task attribute in, one normalized score out.
//!
//! All functions here are pure. "Today" is always passed in so callers (and
//! tests) control the clock.

use chrono::{Datelike, NaiveDate};

/// Days over which urgency decays linearly from 1.0 to 0.0.
pub const URGENCY_HORIZON_DAYS: f64 = 30.0;

/// Cap on the extra urgency an overdue task can earn.
pub const OVERDUE_BONUS_CAP: f64 = 0.3;

/// Overdue days are divided by this to get the bonus.
pub const OVERDUE_BONUS_DIVISOR: f64 = 100.0;

/// Lower clamp for effort hours; keeps the logarithm away from its domain edge.
pub const MIN_EFFORT_HOURS: f64 = 0.01;

/// Upper clamp for effort hours. Scoring only; the stored hours are untouched.
pub const MAX_EFFORT_HOURS: f64 = 10_000.0;

/// Signed calendar days from `today` to `due`.
pub fn calendar_days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

/// Count Mon-Fri days in `[start, end)`. Negative when `end < start`.
pub fn business_days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return -business_days_between(end, start);
    }

    let total = (end - start).num_days();
    let full_weeks = total / 7;
    let remainder = (total % 7) as usize;

    // Every full week holds exactly five weekdays; only the tail needs walking.
    let tail_start = start + chrono::Duration::days(full_weeks * 7);
    let tail = tail_start
        .iter_days()
        .take(remainder)
        .filter(|d| d.weekday().number_from_monday() <= 5)
        .count() as i64;

    full_weeks * 5 + tail
}

/// Distance to the due date, in business days when `business_days` is set.
///
/// A past due date is always negative, even when no weekday lies between it
/// and today (due Saturday, seen on Monday).
pub fn days_until_due(due: NaiveDate, today: NaiveDate, business_days: bool) -> i64 {
    if !business_days {
        return calendar_days_until(due, today);
    }
    let d = business_days_between(today, due);
    if due < today { d.min(-1) } else { d }
}

/// Urgency from a signed day distance.
///
/// - `d >= 0`: linear decay from 1.0 (due today) to 0.0 at 30 days, clamped at 0.
/// - `d < 0`: `1.0 + min(0.3, |d| / 100)`, so any overdue task beats any task that is not.
pub fn urgency_score(days_until_due: i64) -> f64 {
    if days_until_due < 0 {
        let overdue = days_until_due.unsigned_abs() as f64;
        1.0 + (overdue / OVERDUE_BONUS_DIVISOR).min(OVERDUE_BONUS_CAP)
    } else {
        (1.0 - days_until_due as f64 / URGENCY_HORIZON_DAYS).max(0.0)
    }
}

/// Clamp a 1-10 rating and scale it into `(0, 1]`.
pub fn importance_score(importance: i32) -> f64 {
    f64::from(importance.clamp(1, 10)) / 10.0
}

/// Quick-win score: near 1.0 for short tasks, near 0.0 for the longest ones.
pub fn effort_score(estimated_hours: f64) -> f64 {
    let hours = if estimated_hours.is_nan() {
        MIN_EFFORT_HOURS
    } else {
        estimated_hours.clamp(MIN_EFFORT_HOURS, MAX_EFFORT_HOURS)
    };

    let score = 1.0 - (hours + 1.0).ln() / (MAX_EFFORT_HOURS + 1.0).ln();
    score.clamp(0.0, 1.0)
}

/// `sqrt(blocked / (batch_size - 1))`, with diminishing returns on large counts.
pub fn blocking_score(blocked: usize, batch_size: usize) -> f64 {
    if batch_size <= 1 || blocked == 0 {
        return 0.0;
    }
    let others = (batch_size - 1).max(1) as f64;
    (blocked as f64 / others).sqrt().clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn urgency_due_today_is_one() {
        assert!((urgency_score(0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn urgency_decays_to_zero_at_horizon() {
        assert!((urgency_score(15) - 0.5).abs() < 1e-12);
        assert_eq!(urgency_score(30), 0.0);
        assert_eq!(urgency_score(365), 0.0);
    }

    #[test]
    fn urgency_overdue_bonus_is_capped() {
        assert!((urgency_score(-1) - 1.01).abs() < 1e-12);
        assert!((urgency_score(-10) - 1.1).abs() < 1e-12);
        assert!((urgency_score(-30) - 1.3).abs() < 1e-12);
        assert!((urgency_score(-500) - 1.3).abs() < 1e-12);
        assert!(urgency_score(-1) > urgency_score(0));
    }

    #[test]
    fn importance_is_clamped() {
        assert_eq!(importance_score(0), importance_score(1));
        assert_eq!(importance_score(-5), importance_score(1));
        assert_eq!(importance_score(11), importance_score(10));
        assert_eq!(importance_score(100), importance_score(10));
        assert!((importance_score(7) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn effort_bounds_and_clamps() {
        assert!(effort_score(0.01) > 0.9);
        assert!(effort_score(10_000.0) <= 0.1);
        assert_eq!(effort_score(-3.0), effort_score(MIN_EFFORT_HOURS));
        assert_eq!(effort_score(0.0), effort_score(MIN_EFFORT_HOURS));
        assert_eq!(effort_score(f64::NAN), effort_score(MIN_EFFORT_HOURS));
        assert_eq!(effort_score(50_000.0), effort_score(MAX_EFFORT_HOURS));
    }

    #[test]
    fn effort_is_non_increasing() {
        let hours = [0.0, 0.1, 0.5, 1.0, 2.0, 8.0, 40.0, 200.0, 5_000.0, 10_000.0];
        for w in hours.windows(2) {
            assert!(effort_score(w[0]) >= effort_score(w[1]), "{} vs {}", w[0], w[1]);
        }
    }

    #[test]
    fn blocking_guards_small_batches() {
        assert_eq!(blocking_score(0, 0), 0.0);
        assert_eq!(blocking_score(1, 1), 0.0);
        assert_eq!(blocking_score(0, 10), 0.0);
        assert!((blocking_score(9, 10) - 1.0).abs() < 1e-12);
        assert!((blocking_score(1, 5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn business_days_skip_weekends() {
        // 2026-02-20 is a Friday.
        let fri = d(2026, 2, 20);
        let mon = d(2026, 2, 23);
        assert_eq!(business_days_between(fri, mon), 1);
        assert_eq!(business_days_between(mon, fri), -1);
        assert_eq!(business_days_between(mon, mon), 0);
        // Three full weeks.
        assert_eq!(business_days_between(mon, d(2026, 3, 16)), 15);
    }

    #[test]
    fn business_days_match_day_by_day_walk() {
        let start = d(2026, 1, 1);
        for offset in 0..60 {
            let end = start + chrono::Duration::days(offset);
            let walked = start
                .iter_days()
                .take(offset as usize)
                .filter(|d| d.weekday().number_from_monday() <= 5)
                .count() as i64;
            assert_eq!(business_days_between(start, end), walked, "offset {offset}");
        }
    }

    #[test]
    fn days_until_due_switches_mode() {
        let fri = d(2026, 2, 20);
        let next_mon = d(2026, 2, 23);
        assert_eq!(days_until_due(next_mon, fri, false), 3);
        assert_eq!(days_until_due(next_mon, fri, true), 1);
    }

    #[test]
    fn weekend_due_date_seen_on_monday_is_still_overdue() {
        let mon = d(2026, 2, 23);
        for due in [d(2026, 2, 21), d(2026, 2, 22)] {
            assert_eq!(business_days_between(mon, due), 0);
            assert_eq!(days_until_due(due, mon, true), -1);
            assert!(urgency_score(days_until_due(due, mon, true)) > 1.0);
        }
        // Due the Friday before: one business day late, unchanged.
        assert_eq!(days_until_due(d(2026, 2, 20), mon, true), -1);
        assert_eq!(days_until_due(d(2026, 2, 13), mon, true), -6);
    }
}
