//! Consecutive-day workout streaks.
//!
//! Walks backward from today one calendar day at a time. Rest days are
//! skipped without breaking or extending the streak; a scheduled day with no
//! completed log ends it.

use crate::schedule::resolve;
use crate::{ScheduleDefinition, WorkoutHistory};
use chrono::{Duration, NaiveDate};

/// Default bound on how far back the walk goes
pub const DEFAULT_MAX_LOOKBACK_DAYS: u32 = 730;

/// Current streak with the default lookback bound
pub fn current_streak(
    today: NaiveDate,
    schedule: &ScheduleDefinition,
    history: &WorkoutHistory,
) -> u32 {
    current_streak_within(today, schedule, history, DEFAULT_MAX_LOOKBACK_DAYS)
}

/// Current streak, examining at most `max_lookback_days` calendar days
pub fn current_streak_within(
    today: NaiveDate,
    schedule: &ScheduleDefinition,
    history: &WorkoutHistory,
    max_lookback_days: u32,
) -> u32 {
    let mut streak = 0;

    for offset in 0..max_lookback_days {
        let Some(day) = today.checked_sub_signed(Duration::days(offset as i64)) else {
            break;
        };

        if resolve(day, schedule).is_rest() {
            continue;
        }

        if history.completed_on(day) {
            streak += 1;
        } else {
            break;
        }
    }

    tracing::debug!("Current streak as of {}: {}", today, streak);
    streak
}

/// Longest run of completed scheduled days anywhere in history
///
/// Only spans the range between the first and last recorded log.
pub fn longest_streak(schedule: &ScheduleDefinition, history: &WorkoutHistory) -> u32 {
    let (Some(first), Some(last)) = (history.logs.keys().next(), history.logs.keys().next_back())
    else {
        return 0;
    };

    let mut best = 0;
    let mut run = 0;
    let mut day = *first;
    while day <= *last {
        if !resolve(day, schedule).is_rest() {
            if history.completed_on(day) {
                run += 1;
                best = best.max(run);
            } else {
                run = 0;
            }
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    best
}
