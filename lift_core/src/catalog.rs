//! Default catalog of exercises and Push/Pull/Legs day templates.
//!
//! This module provides the built-in exercise library and the exercise
//! list each rotation category starts a session with.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

fn exercise(
    id: &str,
    name: &str,
    body_part: &str,
    target: &str,
    secondary: &[&str],
    equipment: &str,
) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        body_part: body_part.into(),
        target_muscle: target.into(),
        secondary_muscles: secondary.iter().map(|s| s.to_string()).collect(),
        equipment: equipment.into(),
        video_url: None,
    }
}

/// Builds the default catalog with built-in exercises and day templates
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalogs.
pub fn build_default_catalog() -> Catalog {
    let exercises: HashMap<String, Exercise> = [
        // Push
        exercise("bench_press", "Barbell Bench Press", "chest", "pectorals", &["triceps", "delts"], "barbell"),
        exercise("incline_db_press", "Incline Dumbbell Press", "chest", "pectorals", &["delts", "triceps"], "dumbbell"),
        exercise("overhead_press", "Overhead Press", "shoulders", "delts", &["triceps"], "barbell"),
        exercise("lateral_raise", "Lateral Raise", "shoulders", "delts", &[], "dumbbell"),
        exercise("tricep_pushdown", "Tricep Pushdown", "upper arms", "triceps", &[], "cable"),
        exercise("dips", "Parallel Bar Dips", "chest", "pectorals", &["triceps"], "body weight"),
        // Pull
        exercise("deadlift", "Deadlift", "back", "spine", &["glutes", "hamstrings", "lats"], "barbell"),
        exercise("pull_up", "Pull-up", "back", "lats", &["biceps"], "body weight"),
        exercise("barbell_row", "Barbell Row", "back", "upper back", &["lats", "biceps"], "barbell"),
        exercise("face_pull", "Face Pull", "shoulders", "delts", &["upper back"], "cable"),
        exercise("bicep_curl", "Dumbbell Bicep Curl", "upper arms", "biceps", &[], "dumbbell"),
        exercise("lat_pulldown", "Lat Pulldown", "back", "lats", &["biceps"], "cable"),
        // Legs
        exercise("back_squat", "Barbell Back Squat", "upper legs", "quads", &["glutes", "hamstrings"], "barbell"),
        exercise("romanian_deadlift", "Romanian Deadlift", "upper legs", "hamstrings", &["glutes"], "barbell"),
        exercise("leg_press", "Leg Press", "upper legs", "quads", &["glutes"], "leverage machine"),
        exercise("leg_curl", "Lying Leg Curl", "upper legs", "hamstrings", &[], "leverage machine"),
        exercise("calf_raise", "Standing Calf Raise", "lower legs", "calves", &[], "body weight"),
        exercise("walking_lunge", "Walking Lunge", "upper legs", "glutes", &["quads"], "dumbbell"),
    ]
    .into_iter()
    .map(|e| (e.id.clone(), e))
    .collect();

    let mut day_templates = HashMap::new();

    day_templates.insert(
        WorkoutCategory::Push,
        vec![
            PlannedExercise::new("bench_press", "Barbell Bench Press", 4, 6, 10),
            PlannedExercise::new("overhead_press", "Overhead Press", 3, 8, 12),
            PlannedExercise::new("incline_db_press", "Incline Dumbbell Press", 3, 8, 12),
            PlannedExercise::new("lateral_raise", "Lateral Raise", 3, 12, 15),
            PlannedExercise::new("tricep_pushdown", "Tricep Pushdown", 3, 10, 15),
        ],
    );

    day_templates.insert(
        WorkoutCategory::Pull,
        vec![
            PlannedExercise::new("deadlift", "Deadlift", 3, 5, 8),
            PlannedExercise::new("pull_up", "Pull-up", 4, 6, 10),
            PlannedExercise::new("barbell_row", "Barbell Row", 3, 8, 12),
            PlannedExercise::new("face_pull", "Face Pull", 3, 12, 15),
            PlannedExercise::new("bicep_curl", "Dumbbell Bicep Curl", 3, 10, 12),
        ],
    );

    day_templates.insert(
        WorkoutCategory::Legs,
        vec![
            PlannedExercise::new("back_squat", "Barbell Back Squat", 4, 6, 10),
            PlannedExercise::new("romanian_deadlift", "Romanian Deadlift", 3, 8, 12),
            PlannedExercise::new("leg_press", "Leg Press", 3, 10, 15),
            PlannedExercise::new("leg_curl", "Lying Leg Curl", 3, 10, 15),
            PlannedExercise::new("calf_raise", "Standing Calf Raise", 4, 12, 20),
        ],
    );

    day_templates.insert(WorkoutCategory::Rest, Vec::new());

    Catalog {
        exercises,
        day_templates,
    }
}

impl Catalog {
    /// Exercise list a category starts a session with
    pub fn template_for(&self, category: WorkoutCategory) -> Vec<PlannedExercise> {
        self.day_templates.get(&category).cloned().unwrap_or_default()
    }

    /// Exercises sorted by id, for stable listing and pagination
    pub fn sorted_exercises(&self) -> Vec<&Exercise> {
        let mut all: Vec<_> = self.exercises.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Validate catalog integrity
    ///
    /// Returns a list of validation errors (empty if valid)
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (category, planned) in &self.day_templates {
            for p in planned {
                if !self.exercises.contains_key(&p.exercise_id) {
                    errors.push(format!(
                        "Template '{}' references unknown exercise '{}'",
                        category, p.exercise_id
                    ));
                }
                if p.target_sets == 0 {
                    errors.push(format!(
                        "Template '{}': exercise '{}' has zero target sets",
                        category, p.exercise_id
                    ));
                }
                if p.rep_range.min > p.rep_range.max {
                    errors.push(format!(
                        "Template '{}': exercise '{}' min reps {} > max {}",
                        category, p.exercise_id, p.rep_range.min, p.rep_range.max
                    ));
                }
            }
        }

        for category in WorkoutCategory::TRAINING {
            let has_template = self
                .day_templates
                .get(&category)
                .map(|t| !t.is_empty())
                .unwrap_or(false);
            if !has_template {
                errors.push(format!("Catalog has no exercises for {}", category.label()));
            }
        }

        errors
    }
}
