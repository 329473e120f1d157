//! CSV export of workout history.
//!
//! One row per logged set. The file is written to a temp file in the target
//! directory, synced, then renamed into place.

use crate::{Error, Result, WorkoutHistory};
use chrono::NaiveDate;
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    date: String,
    day: &'a str,
    log_id: String,
    duration_seconds: u64,
    exercise_id: &'a str,
    exercise: &'a str,
    set: u32,
    target_reps: String,
    reps: u32,
    weight: f64,
    completed: bool,
}

/// Write every set in history (optionally only logs on or after `since`)
///
/// Returns the number of rows written, excluding the header.
pub fn history_to_csv(
    history: &WorkoutHistory,
    csv_path: &Path,
    since: Option<NaiveDate>,
) -> Result<usize> {
    let dir = match csv_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let temp = NamedTempFile::new_in(dir)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(temp.as_file());

    let mut rows = 0;
    for log in history
        .logs
        .values()
        .filter(|l| since.map_or(true, |s| l.date >= s))
    {
        for set in &log.sets {
            writer.serialize(CsvRow {
                date: log.date.to_string(),
                day: &log.label,
                log_id: log.id.to_string(),
                duration_seconds: log.duration_seconds,
                exercise_id: &set.exercise_id,
                exercise: &set.exercise_name,
                set: set.set_number,
                target_reps: set.target_reps.to_string(),
                reps: set.actual_reps,
                weight: set.weight,
                completed: set.completed,
            })?;
            rows += 1;
        }
    }

    writer.flush()?;
    drop(writer);
    temp.as_file().sync_all()?;
    temp.persist(csv_path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} sets to {:?}", rows, csv_path);
    Ok(rows)
}
