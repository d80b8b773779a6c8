//! Consecutive-day streak computation.

use chrono::NaiveDate;
use std::collections::HashSet;

/// Count consecutive calendar days with activity, walking backward from
/// `today` and stopping at the first gap.
///
/// No activity on `today` itself means a streak of zero, regardless of
/// history.
pub fn consecutive_days(active_dates: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut expected = today;

    while active_dates.contains(&expected) {
        streak += 1;
        match expected.pred_opt() {
            Some(previous) => expected = previous,
            None => break,
        }
    }

    streak
}
