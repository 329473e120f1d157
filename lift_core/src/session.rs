//! Active workout session lifecycle.
//!
//! [`SessionMachine`] is the single owner of the in-progress session. All
//! mutation goes through its transition methods:
//!
//! ```text
//! Idle --start--> Running <--pause/resume--> Paused
//! Running|Paused --complete/reset--> Idle
//! Idle --recover--> Paused
//! ```
//!
//! Transitions that leave a session active write a [`RecoverySnapshot`] so a
//! crash loses at most the latest in-memory change. Snapshot writes are best
//! effort: a failed write is logged and retried by the next transition, and
//! the in-memory state stays authoritative.

use crate::clock::{Clock, SystemClock};
use crate::repository::Repository;
use crate::store::KeyValueStore;
use crate::ticker::{ManualTicks, Tick, TickSource};
use crate::{Error, RecoverySnapshot, Result, SessionLog, SetRecord, WorkoutDayAssignment};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use uuid::Uuid;

/// Default maximum snapshot age for crash recovery
pub const DEFAULT_RECOVERY_WINDOW_MINUTES: i64 = 120;

/// Coarse lifecycle phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Running,
    Paused,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Running => "running",
            SessionPhase::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// State of the session in progress
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub day: WorkoutDayAssignment,
    pub is_paused: bool,
    pub start_timestamp: DateTime<Utc>,
    pub elapsed_seconds: u64,
    pub sets: Vec<SetRecord>,
    pub last_persisted_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// (completed, total) set counts
    pub fn progress(&self) -> (usize, usize) {
        let done = self.sets.iter().filter(|s| s.completed).count();
        (done, self.sets.len())
    }

    pub fn all_sets_completed(&self) -> bool {
        self.sets.iter().all(|s| s.completed)
    }

    fn find_set_mut(&mut self, exercise_id: &str, set_index: usize) -> Option<&mut SetRecord> {
        self.sets
            .iter_mut()
            .filter(|s| s.exercise_id == exercise_id)
            .nth(set_index)
    }

    fn snapshot(&self, saved_at: DateTime<Utc>) -> RecoverySnapshot {
        RecoverySnapshot {
            day: self.day.clone(),
            start_timestamp: self.start_timestamp,
            elapsed_seconds_at_save: self.elapsed_seconds,
            sets: self.sets.clone(),
            saved_at,
        }
    }
}

/// Notifications sent to subscribers after each transition
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Started { label: String, total_sets: usize },
    Paused { elapsed_seconds: u64 },
    Resumed { elapsed_seconds: u64 },
    Ticked { elapsed_seconds: u64 },
    SetUpdated { exercise_id: String, set_index: usize },
    SetToggled { exercise_id: String, set_index: usize, completed: bool },
    Completed { date: NaiveDate, duration_seconds: u64 },
    Reset,
    Recovered { elapsed_seconds: u64 },
}

/// Result of a recovery attempt
#[derive(Clone, Debug, PartialEq)]
pub enum RecoveryOutcome {
    /// Nothing was stored
    NoSnapshot,
    /// The snapshot was older than the recovery window and was discarded
    Stale { age: Duration },
    /// The session was restored in the paused phase
    Restored { elapsed_seconds: u64 },
}

/// Owner of the active session
pub struct SessionMachine<S: KeyValueStore, C: Clock = SystemClock, T: TickSource = ManualTicks> {
    repo: Repository<S>,
    clock: C,
    ticks: T,
    recovery_window: Duration,
    state: Option<SessionState>,
    persist_failed: bool,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl<S: KeyValueStore, C: Clock, T: TickSource> SessionMachine<S, C, T> {
    pub fn new(repo: Repository<S>, clock: C, ticks: T) -> Self {
        Self {
            repo,
            clock,
            ticks,
            recovery_window: Duration::minutes(DEFAULT_RECOVERY_WINDOW_MINUTES),
            state: None,
            persist_failed: false,
            subscribers: Vec::new(),
        }
    }

    pub fn with_recovery_window(mut self, window: Duration) -> Self {
        self.recovery_window = window;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn phase(&self) -> SessionPhase {
        match &self.state {
            None => SessionPhase::Idle,
            Some(s) if s.is_paused => SessionPhase::Paused,
            Some(_) => SessionPhase::Running,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.state.as_ref().map(|s| s.elapsed_seconds).unwrap_or(0)
    }

    pub fn sets(&self) -> &[SetRecord] {
        self.state.as_ref().map(|s| s.sets.as_slice()).unwrap_or(&[])
    }

    pub fn day(&self) -> Option<&WorkoutDayAssignment> {
        self.state.as_ref().map(|s| &s.day)
    }

    pub fn recovery_window(&self) -> Duration {
        self.recovery_window
    }

    pub fn repository(&self) -> &Repository<S> {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut Repository<S> {
        &mut self.repo
    }

    pub fn ticks(&self) -> &T {
        &self.ticks
    }

    /// Receive a [`SessionEvent`] for every subsequent transition
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Start a session for the given day
    ///
    /// Creates one set per exercise × target sets with reps seeded to the
    /// midpoint of the rep range and zero weight.
    pub fn start(&mut self, day: WorkoutDayAssignment) -> Result<()> {
        if self.state.is_some() {
            return Err(self.reject("start"));
        }

        let sets: Vec<SetRecord> = day
            .exercises
            .iter()
            .flat_map(|ex| {
                (1..=ex.target_sets).map(move |n| SetRecord {
                    exercise_id: ex.exercise_id.clone(),
                    exercise_name: ex.name.clone(),
                    set_number: n,
                    target_reps: ex.rep_range,
                    actual_reps: ex.rep_range.midpoint(),
                    weight: 0.0,
                    completed: false,
                })
            })
            .collect();

        if sets.is_empty() {
            return Err(self.reject("start an empty workout"));
        }

        let total_sets = sets.len();
        let label = day.label.clone();
        self.state = Some(SessionState {
            day,
            is_paused: false,
            start_timestamp: self.clock.now(),
            elapsed_seconds: 0,
            sets,
            last_persisted_at: None,
        });
        self.ticks.start();
        self.persist_snapshot();

        tracing::info!("Started {} with {} sets", label, total_sets);
        self.emit(SessionEvent::Started { label, total_sets });
        Ok(())
    }

    /// Stop the clock
    pub fn pause(&mut self) -> Result<()> {
        if self.phase() != SessionPhase::Running {
            return Err(self.reject("pause"));
        }

        self.ticks.stop();
        let elapsed_seconds = match self.state.as_mut() {
            Some(state) => {
                state.is_paused = true;
                state.elapsed_seconds
            }
            None => 0,
        };
        self.persist_snapshot();

        tracing::debug!("Paused at {}s", elapsed_seconds);
        self.emit(SessionEvent::Paused { elapsed_seconds });
        Ok(())
    }

    /// Restart the clock from the accumulated elapsed time
    pub fn resume(&mut self) -> Result<()> {
        if self.phase() != SessionPhase::Paused {
            return Err(self.reject("resume"));
        }

        let elapsed_seconds = match self.state.as_mut() {
            Some(state) => {
                state.is_paused = false;
                state.elapsed_seconds
            }
            None => 0,
        };
        self.ticks.start();
        self.persist_snapshot();

        tracing::debug!("Resumed at {}s", elapsed_seconds);
        self.emit(SessionEvent::Resumed { elapsed_seconds });
        Ok(())
    }

    /// Advance the clock by one second while running
    ///
    /// Returns false (and changes nothing) while paused or idle.
    pub fn tick(&mut self) -> bool {
        let elapsed_seconds = match self.state.as_mut() {
            Some(state) if !state.is_paused => {
                state.elapsed_seconds += 1;
                state.elapsed_seconds
            }
            _ => return false,
        };
        self.emit(SessionEvent::Ticked { elapsed_seconds });
        true
    }

    /// Apply a tick delivered by the tick source
    ///
    /// Ticks from a schedule that has since been stopped are ignored.
    pub fn on_tick(&mut self, tick: Tick) -> bool {
        if !self.ticks.is_current(&tick) {
            tracing::trace!("Dropping stale tick {}", tick.generation());
            return false;
        }
        self.tick()
    }

    /// Record weight and reps for a set
    ///
    /// `set_index` is the zero-based position of the set within its exercise.
    /// Returns `Ok(false)` if no such set exists.
    pub fn update_set(
        &mut self,
        exercise_id: &str,
        set_index: usize,
        weight: f64,
        reps: u32,
    ) -> Result<bool> {
        let Some(state) = self.state.as_mut() else {
            return Err(self.reject("update a set"));
        };

        let Some(set) = state.find_set_mut(exercise_id, set_index) else {
            tracing::debug!("No set {} for exercise {}", set_index, exercise_id);
            return Ok(false);
        };
        set.weight = weight;
        set.actual_reps = reps;

        self.persist_snapshot();
        self.emit(SessionEvent::SetUpdated {
            exercise_id: exercise_id.to_string(),
            set_index,
        });
        Ok(true)
    }

    /// Flip the completed flag of a set
    ///
    /// Returns `Ok(false)` if no such set exists.
    pub fn toggle_set_completion(&mut self, exercise_id: &str, set_index: usize) -> Result<bool> {
        let Some(state) = self.state.as_mut() else {
            return Err(self.reject("toggle a set"));
        };

        let Some(set) = state.find_set_mut(exercise_id, set_index) else {
            tracing::debug!("No set {} for exercise {}", set_index, exercise_id);
            return Ok(false);
        };
        set.completed = !set.completed;
        let completed = set.completed;

        self.persist_snapshot();
        self.emit(SessionEvent::SetToggled {
            exercise_id: exercise_id.to_string(),
            set_index,
            completed,
        });
        Ok(true)
    }

    /// Finish the session and record it in history
    ///
    /// Every set must be completed. The log replaces any log already stored
    /// for today's date.
    pub fn complete(&mut self) -> Result<SessionLog> {
        let Some(state) = self.state.as_ref() else {
            return Err(self.reject("complete"));
        };
        if !state.all_sets_completed() {
            return Err(self.reject("complete with unfinished sets"));
        }

        let now = self.clock.now();
        let log = SessionLog {
            id: Uuid::new_v4(),
            date: self.clock.today(),
            day_id: state.day.id.clone(),
            label: state.day.label.clone(),
            completed: true,
            duration_seconds: state.elapsed_seconds,
            started_at: Some(state.start_timestamp),
            completed_at: Some(now),
            sets: state.sets.clone(),
        };

        // The session and its snapshot stay in place until history has the log
        if let Err(e) = self.repo.save_workout_log(&log) {
            tracing::warn!("Failed to save workout log for {}: {}", log.date, e);
            return Err(e);
        }

        self.ticks.stop();
        self.state = None;
        self.discard_snapshot();

        tracing::info!(
            "Completed {} in {}s ({} sets)",
            log.label,
            log.duration_seconds,
            log.sets.len()
        );
        self.emit(SessionEvent::Completed {
            date: log.date,
            duration_seconds: log.duration_seconds,
        });
        Ok(log)
    }

    /// Abandon the session without logging it
    pub fn reset(&mut self) -> Result<()> {
        if self.state.is_none() {
            return Err(self.reject("reset"));
        }

        self.ticks.stop();
        self.state = None;
        self.discard_snapshot();

        tracing::info!("Session reset");
        self.emit(SessionEvent::Reset);
        Ok(())
    }

    /// Restore a session from a snapshot
    ///
    /// A snapshot at least `recovery_window` old is discarded. Otherwise the
    /// time since it was saved is added to the elapsed clock and the session
    /// comes back paused.
    pub fn recover(&mut self, snapshot: RecoverySnapshot) -> Result<RecoveryOutcome> {
        if self.state.is_some() {
            return Err(self.reject("recover"));
        }

        let age = self.clock.now() - snapshot.saved_at;
        if age >= self.recovery_window {
            tracing::info!(
                "Discarding session snapshot saved {} minutes ago",
                age.num_minutes()
            );
            self.discard_snapshot();
            return Ok(RecoveryOutcome::Stale { age });
        }

        // A snapshot from the future (clock change) adds nothing
        let offline = age.num_seconds().max(0) as u64;
        let elapsed_seconds = snapshot.elapsed_seconds_at_save + offline;

        self.state = Some(SessionState {
            day: snapshot.day,
            is_paused: true,
            start_timestamp: snapshot.start_timestamp,
            elapsed_seconds,
            sets: snapshot.sets,
            last_persisted_at: Some(snapshot.saved_at),
        });

        tracing::info!("Recovered session at {}s (paused)", elapsed_seconds);
        self.emit(SessionEvent::Recovered { elapsed_seconds });
        Ok(RecoveryOutcome::Restored { elapsed_seconds })
    }

    /// Recover from the snapshot held by the repository, if any
    pub fn recover_from_store(&mut self) -> Result<RecoveryOutcome> {
        if self.state.is_some() {
            return Err(self.reject("recover"));
        }
        match self.repo.load_recovery()? {
            Some(snapshot) => self.recover(snapshot),
            None => Ok(RecoveryOutcome::NoSnapshot),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn reject(&self, action: &'static str) -> Error {
        let phase = self.phase();
        tracing::debug!("Rejected {} while {}", action, phase);
        Error::InvalidTransition { action, phase }
    }

    fn persist_snapshot(&mut self) {
        let now = self.clock.now();
        let Some(snapshot) = self.state.as_ref().map(|s| s.snapshot(now)) else {
            return;
        };

        match self.repo.save_recovery(&snapshot) {
            Ok(()) => {
                if let Some(state) = self.state.as_mut() {
                    state.last_persisted_at = Some(now);
                }
                if self.persist_failed {
                    tracing::info!("Session snapshot persisted after earlier failure");
                    self.persist_failed = false;
                }
            }
            Err(e) => {
                if !self.persist_failed {
                    tracing::warn!("Failed to persist session snapshot: {}", e);
                }
                self.persist_failed = true;
            }
        }
    }

    fn discard_snapshot(&mut self) {
        if let Err(e) = self.repo.clear_recovery() {
            tracing::warn!("Failed to discard session snapshot: {}", e);
        }
        self.persist_failed = false;
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl<S: KeyValueStore, C: Clock, T: TickSource> Drop for SessionMachine<S, C, T> {
    fn drop(&mut self) {
        self.ticks.stop();
    }
}
