//! Core domain types for Lift.
//!
//! This module defines the fundamental types used throughout the system:
//! - Workout categories, planned exercises and day assignments
//! - Schedule definitions (rotation table and user-defined days)
//! - Set records, session logs and recovery snapshots
//! - User profile and settings

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Categories and Exercises
// ============================================================================

/// Workout category of the Push/Pull/Legs rotation
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutCategory {
    Push,
    Pull,
    Legs,
    Rest,
}

impl WorkoutCategory {
    /// Categories that carry a workout
    pub const TRAINING: [WorkoutCategory; 3] = [
        WorkoutCategory::Push,
        WorkoutCategory::Pull,
        WorkoutCategory::Legs,
    ];

    /// Human-readable label ("Push Day", "Rest Day", ...)
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutCategory::Push => "Push Day",
            WorkoutCategory::Pull => "Pull Day",
            WorkoutCategory::Legs => "Leg Day",
            WorkoutCategory::Rest => "Rest Day",
        }
    }

    /// Parse a category name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "push" => Some(WorkoutCategory::Push),
            "pull" => Some(WorkoutCategory::Pull),
            "legs" | "leg" => Some(WorkoutCategory::Legs),
            "rest" => Some(WorkoutCategory::Rest),
            _ => None,
        }
    }
}

impl fmt::Display for WorkoutCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkoutCategory::Push => "push",
            WorkoutCategory::Pull => "pull",
            WorkoutCategory::Legs => "legs",
            WorkoutCategory::Rest => "rest",
        };
        f.write_str(name)
    }
}

/// Inclusive target repetition range
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepRange {
    pub min: u32,
    pub max: u32,
}

impl RepRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Integer midpoint of the range, used to seed logged reps
    pub fn midpoint(&self) -> u32 {
        ((u64::from(self.min) + u64::from(self.max)) / 2) as u32
    }
}

impl fmt::Display for RepRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// An exercise as planned for a workout day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannedExercise {
    pub exercise_id: String,
    pub name: String,
    pub target_sets: u32,
    pub rep_range: RepRange,
}

impl PlannedExercise {
    pub fn new(exercise_id: &str, name: &str, target_sets: u32, min: u32, max: u32) -> Self {
        Self {
            exercise_id: exercise_id.to_string(),
            name: name.to_string(),
            target_sets,
            rep_range: RepRange::new(min, max),
        }
    }
}

/// An exercise in the library
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub body_part: String,
    pub target_muscle: String,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    pub equipment: String,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// The built-in exercise library and per-category day templates
#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: HashMap<String, Exercise>,
    pub day_templates: HashMap<WorkoutCategory, Vec<PlannedExercise>>,
}

// ============================================================================
// Schedule Types
// ============================================================================

/// Identifies the workout a day is assigned to
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DayId {
    Category(WorkoutCategory),
    Custom(String),
}

impl fmt::Display for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayId::Category(c) => write!(f, "{}", c),
            DayId::Custom(id) => f.write_str(id),
        }
    }
}

/// The workout resolved for a calendar day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutDayAssignment {
    pub id: DayId,
    pub label: String,
    pub exercises: Vec<PlannedExercise>,
}

impl WorkoutDayAssignment {
    /// True for the designated rest category
    pub fn is_rest(&self) -> bool {
        self.id == DayId::Category(WorkoutCategory::Rest)
    }

    /// Number of sets a session for this day will track
    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.target_sets).sum()
    }
}

/// A day defined by the user, optionally pinned to a weekday
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CustomDay {
    pub id: String,
    pub name: String,
    /// 0 = Monday .. 6 = Sunday; None leaves the day unscheduled
    #[serde(default)]
    pub weekday: Option<u8>,
    #[serde(default)]
    pub exercises: Vec<PlannedExercise>,
}

impl CustomDay {
    /// Create a day with a fresh random id
    pub fn new(name: &str, weekday: Option<Weekday>, exercises: Vec<PlannedExercise>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            weekday: weekday.map(|w| w.num_days_from_monday() as u8),
            exercises,
        }
    }

    pub fn is_bound_to(&self, weekday: Weekday) -> bool {
        self.weekday == Some(weekday.num_days_from_monday() as u8)
    }
}

/// Weekday → category table; weekdays without an entry are rest days
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RotationTable {
    /// Keyed by weekday index, 0 = Monday
    pub slots: BTreeMap<u8, WorkoutCategory>,
}

impl RotationTable {
    /// Mon Push, Tue Pull, Wed Legs, Thu Push, Fri Pull, Sat Legs, Sunday rest
    pub fn push_pull_legs() -> Self {
        let slots = [
            WorkoutCategory::Push,
            WorkoutCategory::Pull,
            WorkoutCategory::Legs,
            WorkoutCategory::Push,
            WorkoutCategory::Pull,
            WorkoutCategory::Legs,
        ]
        .into_iter()
        .enumerate()
        .map(|(i, c)| (i as u8, c))
        .collect();
        Self { slots }
    }

    pub fn category_for(&self, weekday: Weekday) -> WorkoutCategory {
        self.slots
            .get(&(weekday.num_days_from_monday() as u8))
            .copied()
            .unwrap_or(WorkoutCategory::Rest)
    }
}

impl Default for RotationTable {
    fn default() -> Self {
        Self::push_pull_legs()
    }
}

/// How the user's week is laid out
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ScheduleDefinition {
    #[serde(default)]
    pub rotation: RotationTable,
    /// Checked in order before the rotation table
    #[serde(default)]
    pub custom_days: Vec<CustomDay>,
}

// ============================================================================
// Session and History Types
// ============================================================================

/// One set of one exercise within a session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetRecord {
    pub exercise_id: String,
    pub exercise_name: String,
    /// 1-based position within the exercise
    pub set_number: u32,
    pub target_reps: RepRange,
    pub actual_reps: u32,
    pub weight: f64,
    pub completed: bool,
}

impl SetRecord {
    /// Weight × reps
    pub fn volume(&self) -> f64 {
        self.weight * self.actual_reps as f64
    }
}

/// A finished session as stored in history
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionLog {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub date: NaiveDate,
    pub day_id: DayId,
    pub label: String,
    pub completed: bool,
    pub duration_seconds: u64,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub sets: Vec<SetRecord>,
}

impl SessionLog {
    pub fn completed_sets(&self) -> impl Iterator<Item = &SetRecord> {
        self.sets.iter().filter(|s| s.completed)
    }

    /// Volume over completed sets
    pub fn volume(&self) -> f64 {
        self.completed_sets().map(SetRecord::volume).sum()
    }
}

/// Session logs keyed by calendar date, one per day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct WorkoutHistory {
    pub logs: BTreeMap<NaiveDate, SessionLog>,
}

impl WorkoutHistory {
    /// Store a log, replacing any log already recorded for its date
    pub fn insert(&mut self, log: SessionLog) -> Option<SessionLog> {
        self.logs.insert(log.date, log)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&SessionLog> {
        self.logs.get(&date)
    }

    /// True if a completed session is recorded for the date
    pub fn completed_on(&self, date: NaiveDate) -> bool {
        self.logs.get(&date).map(|l| l.completed).unwrap_or(false)
    }

    /// Logs newest first
    pub fn recent(&self) -> impl Iterator<Item = &SessionLog> {
        self.logs.values().rev()
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

/// Persisted image of an active session, used to resume after a crash
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RecoverySnapshot {
    pub day: WorkoutDayAssignment,
    pub start_timestamp: DateTime<Utc>,
    pub elapsed_seconds_at_save: u64,
    pub sets: Vec<SetRecord>,
    pub saved_at: DateTime<Utc>,
}

// ============================================================================
// User Types
// ============================================================================

/// Self-reported training experience
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Some(ExperienceLevel::Beginner),
            "intermediate" => Some(ExperienceLevel::Intermediate),
            "advanced" => Some(ExperienceLevel::Advanced),
            _ => None,
        }
    }
}

/// Profile captured during onboarding
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub experience: ExperienceLevel,
    pub onboarded_at: DateTime<Utc>,
}

/// Unit weights are displayed in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Kg => f.write_str("kg"),
            WeightUnit::Lb => f.write_str("lb"),
        }
    }
}

/// User preferences
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserSettings {
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default = "default_rest_timer_seconds")]
    pub rest_timer_seconds: u32,
}

fn default_rest_timer_seconds() -> u32 {
    90
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            weight_unit: WeightUnit::default(),
            rest_timer_seconds: default_rest_timer_seconds(),
        }
    }
}
