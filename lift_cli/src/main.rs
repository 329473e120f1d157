use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use lift_core::library::CacheTtl;
use lift_core::schedule::{parse_weekday, WEEK};
use lift_core::streak::current_streak_within;
use lift_core::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "lift")]
#[command(about = "Push/pull/legs workout tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Save your profile and preferences
    Onboard {
        #[arg(long)]
        name: String,

        /// beginner, intermediate or advanced
        #[arg(long, default_value = "beginner")]
        experience: String,

        /// Weight unit (kg or lb)
        #[arg(long, default_value = "kg")]
        unit: String,
    },

    /// Show the workout scheduled for a day (default)
    Today {
        /// Date to resolve instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show or edit the weekly schedule
    #[command(visible_alias = "week")]
    Schedule {
        #[command(subcommand)]
        action: Option<ScheduleAction>,
    },

    /// Start a session for today's workout or a named day
    Start {
        /// Category (push, pull, legs) or custom day id
        #[arg(long)]
        day: Option<String>,
    },

    /// Show the active session
    Status,

    /// Record weight and reps for a set
    Log {
        #[arg(long)]
        exercise: String,

        /// Set number within the exercise, starting at 1
        #[arg(long)]
        set: usize,

        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,
    },

    /// Toggle a set as done
    Done {
        #[arg(long, required_unless_present = "all")]
        exercise: Option<String>,

        /// Set number within the exercise, starting at 1
        #[arg(long, required_unless_present = "all")]
        set: Option<usize>,

        /// Mark every remaining set done
        #[arg(long, conflicts_with_all = ["exercise", "set"])]
        all: bool,
    },

    /// Run the session clock interactively
    Run,

    /// Finish the session and record it
    Complete,

    /// Abandon the session without recording it
    Reset,

    /// Show the current and longest streak
    Streak {
        /// Evaluate as of this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List recorded sessions, newest first
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Show totals and personal records
    Stats,

    /// Export history to CSV
    Export {
        /// Output file (defaults to <data-dir>/history.csv)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Only sessions on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,
    },

    /// Browse the exercise library
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },
}

#[derive(Subcommand)]
enum ScheduleAction {
    /// Show Monday through Sunday (default)
    Show,

    /// Add a custom day
    Add {
        #[arg(long)]
        name: String,

        /// Weekday to bind the day to (mon..sun); omit to leave it unscheduled
        #[arg(long)]
        weekday: Option<String>,

        /// Exercise as id:sets:min-max, e.g. bench_press:4:6-10 (repeatable)
        #[arg(long = "exercise", required = true)]
        exercises: Vec<String>,
    },

    /// Remove a custom day by id
    Remove { id: String },

    /// Drop all custom days
    Clear,
}

#[derive(Subcommand)]
enum LibraryAction {
    /// List exercises, optionally filtered
    List {
        #[arg(long)]
        body_part: Option<String>,

        #[arg(long)]
        muscle: Option<String>,

        #[arg(long)]
        equipment: Option<String>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Search exercises by name, muscle or equipment
    Search {
        query: String,

        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Show one exercise
    Show { id: String },

    /// List target muscles
    Muscles,

    /// List equipment
    Equipment,
}

type Machine<T = ManualTicks> = SessionMachine<FileStore, SystemClock, T>;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        lift_core::logging::init_with_level("debug");
    } else {
        lift_core::logging::init();
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Onboard {
            name,
            experience,
            unit,
        }) => cmd_onboard(&data_dir, &name, &experience, &unit),
        Some(Commands::Today { date }) => cmd_today(&data_dir, date),
        Some(Commands::Schedule { action }) => cmd_schedule(&data_dir, action),
        Some(Commands::Start { day }) => cmd_start(&data_dir, &config, day),
        Some(Commands::Status) => cmd_status(&data_dir, &config),
        Some(Commands::Log {
            exercise,
            set,
            weight,
            reps,
        }) => cmd_log(&data_dir, &config, &exercise, set, weight, reps),
        Some(Commands::Done { exercise, set, all }) => {
            cmd_done(&data_dir, &config, exercise, set, all)
        }
        Some(Commands::Run) => cmd_run(&data_dir, &config),
        Some(Commands::Complete) => cmd_complete(&data_dir, &config),
        Some(Commands::Reset) => cmd_reset(&data_dir, &config),
        Some(Commands::Streak { date }) => cmd_streak(&data_dir, &config, date),
        Some(Commands::History { limit }) => cmd_history(&data_dir, limit),
        Some(Commands::Stats) => cmd_stats(&data_dir),
        Some(Commands::Export { output, since }) => cmd_export(&data_dir, output, since),
        Some(Commands::Library { action }) => cmd_library(&config, action),
        None => {
            // Default to "today" command
            cmd_today(&data_dir, None)
        }
    }
}

fn open_repository(data_dir: &Path) -> Result<Repository<FileStore>> {
    let store_dir = data_dir.join("store");
    std::fs::create_dir_all(&store_dir)?;
    Ok(Repository::new(FileStore::new(store_dir)))
}

/// Open the session machine and pick up any session left by a previous run
fn open_machine<T: TickSource>(data_dir: &Path, config: &Config, ticks: T) -> Result<Machine<T>> {
    let repo = open_repository(data_dir)?;
    let mut machine = SessionMachine::new(repo, SystemClock, ticks)
        .with_recovery_window(config.session.recovery_window());

    match machine.recover_from_store()? {
        RecoveryOutcome::Stale { age } => println!(
            "Discarded a session last saved {} minutes ago.",
            age.num_minutes()
        ),
        RecoveryOutcome::Restored { elapsed_seconds } => {
            tracing::debug!("Carried over session at {}s", elapsed_seconds)
        }
        RecoveryOutcome::NoSnapshot => {}
    }
    Ok(machine)
}

fn require_active<T: TickSource>(machine: &Machine<T>) -> Result<()> {
    if machine.is_active() {
        Ok(())
    } else {
        Err(Error::Other(
            "No active session. Start one with `lift start`.".into(),
        ))
    }
}

fn cmd_onboard(data_dir: &Path, name: &str, experience: &str, unit: &str) -> Result<()> {
    let experience = ExperienceLevel::parse(experience)
        .ok_or_else(|| Error::Other(format!("Unknown experience level: {}", experience)))?;
    let weight_unit = match unit.trim().to_lowercase().as_str() {
        "kg" => WeightUnit::Kg,
        "lb" | "lbs" => WeightUnit::Lb,
        other => return Err(Error::Other(format!("Unknown weight unit: {}", other))),
    };

    let mut repo = open_repository(data_dir)?;
    repo.save_profile(&UserProfile {
        name: name.to_string(),
        experience,
        onboarded_at: Utc::now(),
    })?;
    let mut settings = repo.load_settings()?;
    settings.weight_unit = weight_unit;
    repo.save_settings(&settings)?;
    repo.set_onboarded(true)?;

    println!("✓ Welcome, {}!", name);
    Ok(())
}

fn cmd_today(data_dir: &Path, date: Option<NaiveDate>) -> Result<()> {
    let repo = open_repository(data_dir)?;
    let date = date.unwrap_or_else(|| SystemClock.today());
    let schedule = repo.load_schedule()?;
    let day = resolve(date, &schedule);

    match repo.load_profile()? {
        Some(profile) => println!("Hi {}!", profile.name),
        None if !repo.is_onboarded()? => {
            println!("Tip: run `lift onboard` to set up your profile.")
        }
        None => {}
    }
    println!("{} ({})", date, date.weekday());
    display_day(&day);

    if let Some(log) = repo.get_workout_log(date)? {
        if log.completed {
            println!("\n✓ Completed in {}", format_duration(log.duration_seconds));
        }
    }
    Ok(())
}

fn cmd_schedule(data_dir: &Path, action: Option<ScheduleAction>) -> Result<()> {
    let mut repo = open_repository(data_dir)?;
    let mut schedule = repo.load_schedule()?;

    match action.unwrap_or(ScheduleAction::Show) {
        ScheduleAction::Show => {
            for (weekday, day) in week_schedule(&schedule) {
                if day.is_rest() {
                    println!("{:<4} {}", weekday.to_string(), day.label);
                } else {
                    println!(
                        "{:<4} {} ({} exercises, {} sets)",
                        weekday.to_string(),
                        day.label,
                        day.exercises.len(),
                        day.total_sets()
                    );
                }
            }
            if !schedule.custom_days.is_empty() {
                println!("\nCustom days:");
                for day in &schedule.custom_days {
                    let bound = day
                        .weekday
                        .and_then(|i| WEEK.get(i as usize))
                        .map(|w| w.to_string())
                        .unwrap_or_else(|| "unscheduled".into());
                    println!("  {}  {} [{}]", day.id, day.name, bound);
                }
            }
        }
        ScheduleAction::Add {
            name,
            weekday,
            exercises,
        } => {
            let weekday = weekday
                .map(|w| {
                    parse_weekday(&w).ok_or_else(|| Error::Other(format!("Unknown weekday: {}", w)))
                })
                .transpose()?;
            let exercises = exercises
                .iter()
                .map(|entry| parse_planned_exercise(entry))
                .collect::<Result<Vec<_>>>()?;

            let day = CustomDay::new(&name, weekday, exercises);
            println!("✓ Added {} ({})", day.name, day.id);
            schedule.custom_days.push(day);
            repo.save_schedule(&schedule)?;
        }
        ScheduleAction::Remove { id } => {
            let before = schedule.custom_days.len();
            schedule.custom_days.retain(|d| d.id != id);
            if schedule.custom_days.len() == before {
                return Err(Error::NotFound(format!("custom day '{}'", id)));
            }
            repo.save_schedule(&schedule)?;
            println!("✓ Removed {}", id);
        }
        ScheduleAction::Clear => {
            schedule.custom_days.clear();
            repo.save_schedule(&schedule)?;
            println!("✓ Custom days cleared");
        }
    }
    Ok(())
}

/// Parse `id:sets:min-max`
fn parse_planned_exercise(entry: &str) -> Result<PlannedExercise> {
    let invalid = || Error::Other(format!("Expected id:sets:min-max, got '{}'", entry));

    let mut parts = entry.split(':');
    let (Some(id), Some(sets), Some(range), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    let sets: u32 = sets.trim().parse().map_err(|_| invalid())?;
    let (min, max) = range.split_once('-').ok_or_else(invalid)?;
    let min: u32 = min.trim().parse().map_err(|_| invalid())?;
    let max: u32 = max.trim().parse().map_err(|_| invalid())?;
    if sets == 0 || min > max {
        return Err(invalid());
    }

    let id = id.trim();
    let name = get_default_catalog()
        .exercises
        .get(id)
        .map(|e| e.name.clone())
        .unwrap_or_else(|| id.to_string());
    Ok(PlannedExercise::new(id, &name, sets, min, max))
}

fn cmd_start(data_dir: &Path, config: &Config, day: Option<String>) -> Result<()> {
    let errors = get_default_catalog().validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Other("Invalid catalog".into()));
    }

    let mut machine = open_machine(data_dir, config, ManualTicks::new())?;
    let schedule = machine.repository().load_schedule()?;

    let day = match day {
        Some(id) => find_day(&schedule, &id)
            .ok_or_else(|| Error::NotFound(format!("day '{}'", id)))?,
        None => resolve(SystemClock.today(), &schedule),
    };
    if day.is_rest() {
        println!("Today is a rest day. Use --day to train anyway.");
        return Ok(());
    }

    machine.start(day)?;
    println!("✓ Session started");
    display_session(&machine)?;
    Ok(())
}

fn cmd_status(data_dir: &Path, config: &Config) -> Result<()> {
    let machine = open_machine(data_dir, config, ManualTicks::new())?;
    if machine.is_active() {
        display_session(&machine)?;
    } else {
        println!("No active session.");
    }
    Ok(())
}

fn cmd_log(
    data_dir: &Path,
    config: &Config,
    exercise: &str,
    set: usize,
    weight: f64,
    reps: u32,
) -> Result<()> {
    let mut machine = open_machine(data_dir, config, ManualTicks::new())?;
    require_active(&machine)?;

    let index = set_index(set)?;
    if !machine.update_set(exercise, index, weight, reps)? {
        return Err(Error::NotFound(format!("set {} of '{}'", set, exercise)));
    }
    println!("✓ {} set {}: {} x {}", exercise, set, weight, reps);
    Ok(())
}

fn cmd_done(
    data_dir: &Path,
    config: &Config,
    exercise: Option<String>,
    set: Option<usize>,
    all: bool,
) -> Result<()> {
    let mut machine = open_machine(data_dir, config, ManualTicks::new())?;
    require_active(&machine)?;

    if all {
        let pending = pending_sets(machine.sets());
        for (exercise_id, index) in &pending {
            machine.toggle_set_completion(exercise_id, *index)?;
        }
        println!("✓ Marked {} sets done", pending.len());
        return Ok(());
    }

    let (Some(exercise), Some(set)) = (exercise, set) else {
        return Err(Error::Other("--exercise and --set are required".into()));
    };
    let index = set_index(set)?;
    if !machine.toggle_set_completion(&exercise, index)? {
        return Err(Error::NotFound(format!("set {} of '{}'", set, exercise)));
    }
    let done = machine
        .sets()
        .iter()
        .filter(|s| s.exercise_id == exercise)
        .nth(index)
        .map(|s| s.completed)
        .unwrap_or(false);
    println!(
        "✓ {} set {} {}",
        exercise,
        set,
        if done { "done" } else { "not done" }
    );
    Ok(())
}

/// (exercise id, zero-based index) of every set not yet completed
fn pending_sets(sets: &[SetRecord]) -> Vec<(String, usize)> {
    let mut seen = std::collections::HashMap::<&str, usize>::new();
    let mut pending = Vec::new();
    for set in sets {
        let index = seen.entry(set.exercise_id.as_str()).or_default();
        if !set.completed {
            pending.push((set.exercise_id.clone(), *index));
        }
        *index += 1;
    }
    pending
}

fn set_index(set: usize) -> Result<usize> {
    set.checked_sub(1)
        .ok_or_else(|| Error::Other("Set numbers start at 1".into()))
}

fn cmd_complete(data_dir: &Path, config: &Config) -> Result<()> {
    let mut machine = open_machine(data_dir, config, ManualTicks::new())?;
    let log = machine.complete()?;

    println!("\n✓ {} complete!", log.label);
    println!("  Duration: {}", format_duration(log.duration_seconds));
    println!("  Sets: {}", log.completed_sets().count());
    println!("  Volume: {:.1}", log.volume());

    let repo = machine.repository();
    let streak = current_streak_within(
        log.date,
        &repo.load_schedule()?,
        &repo.load_history()?,
        config.streak.max_lookback_days,
    );
    println!("  Streak: {} days", streak);
    Ok(())
}

fn cmd_reset(data_dir: &Path, config: &Config) -> Result<()> {
    let mut machine = open_machine(data_dir, config, ManualTicks::new())?;
    machine.reset()?;
    println!("✓ Session discarded");
    Ok(())
}

fn cmd_run(data_dir: &Path, config: &Config) -> Result<()> {
    let (ticker, ticks) = ThreadTicker::channel(config.session.tick_interval());
    let mut machine = open_machine(data_dir, config, ticker)?;
    require_active(&machine)?;

    // Lines are read on their own thread so the clock keeps ticking
    let (line_tx, lines) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines().map_while(|l| l.ok()) {
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    display_session(&machine)?;
    if machine.phase() == SessionPhase::Paused {
        println!("Timer paused. Enter p to resume.");
    }
    print_run_help();
    prompt()?;

    loop {
        for tick in ticks.try_iter() {
            if !machine.on_tick(tick) {
                tracing::trace!("Ignored tick {}", tick.generation());
            }
        }

        let line = match lines.recv_timeout(Duration::from_millis(100)) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                detach(&mut machine)?;
                return Ok(());
            }
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        let outcome = match words.as_slice() {
            [] | ["s"] => display_session(&machine),
            ["p"] => match machine.phase() {
                SessionPhase::Running => machine.pause().map(|_| println!("Paused")),
                _ => machine.resume().map(|_| println!("Resumed")),
            },
            ["d", exercise, set] => run_toggle(&mut machine, exercise, set),
            ["l", exercise, set, weight, reps] => run_log(&mut machine, exercise, set, weight, reps),
            ["c"] => match machine.complete() {
                Ok(log) => {
                    println!(
                        "\n✓ {} complete in {}",
                        log.label,
                        format_duration(log.duration_seconds)
                    );
                    return Ok(());
                }
                Err(e) => Err(e),
            },
            ["q"] => {
                detach(&mut machine)?;
                return Ok(());
            }
            ["?"] | ["h"] => {
                print_run_help();
                Ok(())
            }
            _ => {
                println!("Unknown command: {}", line.trim());
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("{}", e);
        }
        prompt()?;
    }
}

/// Leave the session to be picked up by the next run
fn detach(machine: &mut Machine<ThreadTicker>) -> Result<()> {
    if machine.phase() == SessionPhase::Running {
        machine.pause()?;
    }
    println!(
        "\nSession saved at {}.",
        format_duration(machine.elapsed_seconds())
    );
    Ok(())
}

fn run_toggle(machine: &mut Machine<ThreadTicker>, exercise: &str, set: &str) -> Result<()> {
    let set: usize = set
        .parse()
        .map_err(|_| Error::Other(format!("Not a set number: {}", set)))?;
    if machine.toggle_set_completion(exercise, set_index(set)?)? {
        let (done, total) = machine.state().map(|s| s.progress()).unwrap_or((0, 0));
        println!("✓ {}/{} sets done", done, total);
        Ok(())
    } else {
        Err(Error::NotFound(format!("set {} of '{}'", set, exercise)))
    }
}

fn run_log(
    machine: &mut Machine<ThreadTicker>,
    exercise: &str,
    set: &str,
    weight: &str,
    reps: &str,
) -> Result<()> {
    let parse_err = |what: &str, v: &str| Error::Other(format!("Not a valid {}: {}", what, v));
    let set: usize = set.parse().map_err(|_| parse_err("set number", set))?;
    let weight: f64 = weight.parse().map_err(|_| parse_err("weight", weight))?;
    let reps: u32 = reps.parse().map_err(|_| parse_err("rep count", reps))?;

    if machine.update_set(exercise, set_index(set)?, weight, reps)? {
        println!("✓ {} set {}: {} x {}", exercise, set, weight, reps);
        Ok(())
    } else {
        Err(Error::NotFound(format!("set {} of '{}'", set, exercise)))
    }
}

fn print_run_help() {
    println!("─────────────────────────────────────────");
    println!("  s                          show session");
    println!("  p                          pause / resume");
    println!("  l <exercise> <set> <w> <r> log weight and reps");
    println!("  d <exercise> <set>         toggle set done");
    println!("  c                          complete session");
    println!("  q                          save and quit");
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush()?;
    Ok(())
}

fn cmd_streak(data_dir: &Path, config: &Config, date: Option<NaiveDate>) -> Result<()> {
    let repo = open_repository(data_dir)?;
    let schedule = repo.load_schedule()?;
    let history = repo.load_history()?;
    let today = date.unwrap_or_else(|| SystemClock.today());

    let current =
        current_streak_within(today, &schedule, &history, config.streak.max_lookback_days);
    println!("Current streak: {} days", current);
    println!("Longest streak: {} days", longest_streak(&schedule, &history));
    Ok(())
}

fn cmd_history(data_dir: &Path, limit: usize) -> Result<()> {
    let repo = open_repository(data_dir)?;
    let history = repo.load_history()?;

    if history.is_empty() {
        println!("No workouts recorded yet.");
        return Ok(());
    }

    for log in history.recent().take(limit) {
        let (done, total) = (log.completed_sets().count(), log.sets.len());
        println!(
            "{}  {:<12} {:>8}  {}/{} sets  {}",
            log.date,
            log.label,
            format_duration(log.duration_seconds),
            done,
            total,
            if log.completed { "✓" } else { "incomplete" }
        );
    }
    Ok(())
}

fn cmd_stats(data_dir: &Path) -> Result<()> {
    let repo = open_repository(data_dir)?;
    let history = repo.load_history()?;
    let unit = repo.load_settings()?.weight_unit;
    let summary = summarize(&history, SystemClock.today());

    println!("Workouts completed: {}", summary.completed_workouts);
    println!("  Last 7 days: {}", summary.workouts_last_7_days);
    for (label, count) in &summary.by_label {
        println!("  {}: {}", label, count);
    }
    println!("Sets completed: {}", summary.completed_sets);
    println!("Total volume: {:.1} {}", summary.total_volume, unit);
    println!(
        "Average duration: {}",
        format_duration(summary.average_duration_seconds())
    );

    let records = personal_records(&history);
    if !records.is_empty() {
        println!("\nPersonal records:");
        for pr in records {
            println!(
                "  {:<24} {} {} x {} ({})",
                pr.exercise_name, pr.weight, unit, pr.reps, pr.date
            );
        }
    }
    Ok(())
}

fn cmd_export(data_dir: &Path, output: Option<PathBuf>, since: Option<NaiveDate>) -> Result<()> {
    let repo = open_repository(data_dir)?;
    let history = repo.load_history()?;
    let csv_path = output.unwrap_or_else(|| data_dir.join("history.csv"));

    let count = history_to_csv(&history, &csv_path, since)?;
    tracing::info!("Exported {} sets to {:?}", count, csv_path);

    println!("✓ Exported {} sets to CSV", count);
    println!("  CSV: {}", csv_path.display());
    Ok(())
}

fn cmd_library(config: &Config, action: LibraryAction) -> Result<()> {
    let api = CachedExerciseApi::new(
        CatalogExerciseApi::new(get_default_catalog()),
        SystemClock,
        CacheTtl::from(&config.library),
    );
    let page_size = config.library.page_size;
    let offset_for = |page: usize| page.saturating_sub(1) * page_size;

    match action {
        LibraryAction::List {
            body_part,
            muscle,
            equipment,
            page,
        } => {
            let filters = ExerciseFilters {
                body_part,
                target_muscle: muscle,
                equipment,
                offset: offset_for(page),
                limit: page_size,
            };
            display_page(&api.list_exercises(&filters)?);
        }
        LibraryAction::Search { query, page } => {
            display_page(&api.search_exercises(&query, offset_for(page), page_size)?);
        }
        LibraryAction::Show { id } => {
            let exercise = api.get_exercise(&id)?;
            println!("{}", exercise.name);
            println!("  Body part: {}", exercise.body_part);
            println!("  Target: {}", exercise.target_muscle);
            if !exercise.secondary_muscles.is_empty() {
                println!("  Secondary: {}", exercise.secondary_muscles.join(", "));
            }
            println!("  Equipment: {}", exercise.equipment);
            if let Some(ref url) = exercise.video_url {
                println!("  ℹ Video: {}", url);
            }
        }
        LibraryAction::Muscles => {
            for muscle in api.list_muscles()? {
                println!("{}", muscle);
            }
        }
        LibraryAction::Equipment => {
            for equipment in api.list_equipment()? {
                println!("{}", equipment);
            }
        }
    }
    Ok(())
}

fn display_page(page: &Page<Exercise>) {
    if page.items.is_empty() {
        println!("No exercises found.");
        return;
    }
    for exercise in &page.items {
        println!(
            "{:<20} {:<26} {} / {}",
            exercise.id, exercise.name, exercise.target_muscle, exercise.equipment
        );
    }
    println!(
        "\n{}-{} of {}",
        page.offset + 1,
        page.offset + page.items.len(),
        page.total
    );
}

fn display_day(day: &WorkoutDayAssignment) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", day.label.to_uppercase());
    println!("╰─────────────────────────────────────────╯");

    if day.is_rest() {
        println!("\n  Recover and come back tomorrow.");
        return;
    }

    println!();
    for exercise in &day.exercises {
        println!(
            "  {:<26} {} x {}  ({})",
            exercise.name, exercise.target_sets, exercise.rep_range, exercise.exercise_id
        );
    }
}

fn display_session<T: TickSource>(machine: &Machine<T>) -> Result<()> {
    let Some(state) = machine.state() else {
        println!("No active session.");
        return Ok(());
    };
    let unit = machine.repository().load_settings()?.weight_unit;
    let (done, total) = state.progress();

    println!("\n{} ({})", state.day.label, machine.phase());
    println!("  Elapsed: {}", format_duration(state.elapsed_seconds));
    println!("  Sets: {}/{} done", done, total);

    let mut current = "";
    for set in &state.sets {
        if set.exercise_id != current {
            current = set.exercise_id.as_str();
            println!("\n  {} ({})", set.exercise_name, set.exercise_id);
        }
        println!(
            "    [{}] {}  {} {} x {}  (target {})",
            if set.completed { "x" } else { " " },
            set.set_number,
            set.weight,
            unit,
            set.actual_reps,
            set.target_reps
        );
    }
    println!();
    Ok(())
}

fn format_duration(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
