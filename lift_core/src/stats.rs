//! History statistics.

use crate::WorkoutHistory;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Totals over the workout history
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistorySummary {
    pub completed_workouts: usize,
    pub completed_sets: usize,
    /// Σ weight × reps over completed sets
    pub total_volume: f64,
    pub total_duration_seconds: u64,
    /// Completed workouts in the 7 days ending today
    pub workouts_last_7_days: usize,
    /// Completed workouts per day label
    pub by_label: BTreeMap<String, usize>,
}

impl HistorySummary {
    /// Mean duration of a completed workout, in seconds
    pub fn average_duration_seconds(&self) -> u64 {
        if self.completed_workouts == 0 {
            0
        } else {
            self.total_duration_seconds / self.completed_workouts as u64
        }
    }
}

/// Summarize completed sessions
pub fn summarize(history: &WorkoutHistory, today: NaiveDate) -> HistorySummary {
    let week_start = today - Duration::days(6);
    let mut summary = HistorySummary::default();

    for log in history.logs.values().filter(|l| l.completed) {
        summary.completed_workouts += 1;
        summary.completed_sets += log.completed_sets().count();
        summary.total_volume += log.volume();
        summary.total_duration_seconds += log.duration_seconds;
        if log.date >= week_start && log.date <= today {
            summary.workouts_last_7_days += 1;
        }
        *summary.by_label.entry(log.label.clone()).or_default() += 1;
    }

    summary
}

/// Heaviest completed set for an exercise
#[derive(Clone, Debug, PartialEq)]
pub struct PersonalRecord {
    pub exercise_id: String,
    pub exercise_name: String,
    pub weight: f64,
    pub reps: u32,
    pub date: NaiveDate,
}

/// Heaviest completed set per exercise, ties broken by more reps then the
/// earlier date. Sorted by exercise name.
pub fn personal_records(history: &WorkoutHistory) -> Vec<PersonalRecord> {
    let mut best: BTreeMap<String, PersonalRecord> = BTreeMap::new();

    for log in history.logs.values() {
        for set in log.completed_sets().filter(|s| s.weight > 0.0) {
            let better = match best.get(&set.exercise_id) {
                None => true,
                Some(pr) => {
                    set.weight > pr.weight || (set.weight == pr.weight && set.actual_reps > pr.reps)
                }
            };
            if better {
                best.insert(
                    set.exercise_id.clone(),
                    PersonalRecord {
                        exercise_id: set.exercise_id.clone(),
                        exercise_name: set.exercise_name.clone(),
                        weight: set.weight,
                        reps: set.actual_reps,
                        date: log.date,
                    },
                );
            }
        }
    }

    let mut records: Vec<_> = best.into_values().collect();
    records.sort_by(|a, b| a.exercise_name.cmp(&b.exercise_name));
    records
}
