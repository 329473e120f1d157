#![forbid(unsafe_code)]

//! Core domain model and business logic for the Lift workout tracker.
//!
//! This crate provides:
//! - Domain types (exercises, schedules, sets, session logs)
//! - Weekly schedule resolution
//! - The active-session state machine with crash recovery
//! - Streaks and history statistics
//! - Persistence (key-value store, CSV export)
//! - Exercise library access with caching

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod clock;
pub mod ticker;
pub mod store;
pub mod repository;
pub mod schedule;
pub mod session;
pub mod streak;
pub mod stats;
pub mod export;
pub mod library;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use clock::{Clock, ManualClock, SystemClock};
pub use ticker::{ManualTicks, ThreadTicker, Tick, TickSource};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use repository::Repository;
pub use schedule::{find_day, resolve, week_schedule};
pub use session::{RecoveryOutcome, SessionEvent, SessionMachine, SessionPhase, SessionState};
pub use streak::{current_streak, longest_streak};
pub use stats::{personal_records, summarize};
pub use export::history_to_csv;
pub use library::{CachedExerciseApi, CatalogExerciseApi, ExerciseApi, ExerciseFilters, Page};
