use cali_core::*;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "calicraft")]
#[command(about = "Calisthenics skill tracker and workout generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the exercise catalogue
    Exercises {
        /// Only exercises working this muscle
        #[arg(long)]
        muscle: Option<String>,
    },

    /// Track skill progressions
    Skills {
        #[command(subcommand)]
        command: SkillsCommand,
    },

    /// Generate a workout locally (default)
    Generate {
        #[command(flatten)]
        selection: Selection,

        /// Seed for a repeatable workout
        #[arg(long)]
        seed: Option<u64>,

        /// Append the workout to the history log
        #[arg(long)]
        log: bool,
    },

    /// Ask the remote planner for a workout
    Plan {
        #[command(flatten)]
        selection: Selection,

        /// Generate locally if the planner can't be reached
        #[arg(long)]
        fallback_local: bool,

        /// Append the workout to the history log
        #[arg(long)]
        log: bool,
    },

    /// Show recently logged workouts
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum SkillsCommand {
    /// Show progressions with unlock marks
    List {
        #[arg(long)]
        category: Option<String>,
    },

    /// Flip a step between locked and unlocked
    Toggle {
        #[command(flatten)]
        step: StepArgs,

        /// Toggle the whole progression: clear it when complete, otherwise fill it
        #[arg(long)]
        all: bool,
    },

    /// Mark a step unlocked
    Unlock {
        #[command(flatten)]
        step: StepArgs,

        /// Also unlock every earlier step of the progression
        #[arg(long, conflicts_with = "all")]
        through: bool,

        /// Unlock every step of the progression
        #[arg(long)]
        all: bool,
    },

    /// Mark a step locked
    Lock {
        #[command(flatten)]
        step: StepArgs,

        /// Lock every step of the progression
        #[arg(long)]
        all: bool,
    },

    /// Print unlocked skills as JSON
    Export,
}

#[derive(Args)]
struct StepArgs {
    /// Step name, e.g. "Tuck Front Lever"
    name: String,

    /// Restrict the lookup to a category
    #[arg(long)]
    category: Option<String>,

    /// Restrict the lookup to a progression title
    #[arg(long)]
    progression: Option<String>,
}

#[derive(Args, Default)]
struct Selection {
    /// Focus skill; ranks exercises by muscle overlap with it
    #[arg(long)]
    skill: Option<String>,

    /// Target muscle (repeatable)
    #[arg(long = "muscle")]
    muscles: Vec<String>,

    /// Number of exercises
    #[arg(long)]
    count: Option<usize>,
}

impl Selection {
    fn muscle_set(&self) -> BTreeSet<String> {
        self.muscles.iter().cloned().collect()
    }
}

fn main() -> Result<()> {
    // Initialize logging
    cali_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Exercises { muscle }) => cmd_exercises(&config, muscle),
        Some(Commands::Skills { command }) => cmd_skills(data_dir, command),
        Some(Commands::Generate {
            selection,
            seed,
            log,
        }) => cmd_generate(data_dir, &config, &selection, seed, log),
        Some(Commands::Plan {
            selection,
            fallback_local,
            log,
        }) => cmd_plan(data_dir, &config, &selection, fallback_local, log),
        Some(Commands::History { limit }) => cmd_history(data_dir, limit),
        None => {
            // Default to "generate" with configured defaults
            cmd_generate(data_dir, &config, &Selection::default(), None, false)
        }
    }
}

fn load_catalogue(config: &Config) -> Result<Catalogue> {
    let catalogue = Catalogue::load(config.data.catalogue_path.as_deref());
    let errors = catalogue.validate();
    if !errors.is_empty() {
        tracing::warn!("Catalogue has {} validation problems", errors.len());
        eprintln!("Catalogue validation warnings:");
        for error in errors {
            eprintln!("  - {}", error);
        }
    }
    Ok(catalogue)
}

fn open_tracker(data_dir: &Path) -> Result<SkillTracker<FileBlobStore>> {
    let template = validated_default_template()?;
    let tracker = SkillTracker::open(FileBlobStore::progressions(data_dir), template)?;
    if let LoadSource::Recovered { reason } = tracker.source() {
        eprintln!(
            "Saved progressions could not be read ({}); starting from defaults.",
            reason
        );
    }
    Ok(tracker)
}

fn parse_category(input: &str) -> CategoryKey {
    match Category::parse_loose(input) {
        Some(category) => CategoryKey::Known(category),
        None => CategoryKey::Other(input.to_string()),
    }
}

fn cmd_exercises(config: &Config, muscle: Option<String>) -> Result<()> {
    let catalogue = load_catalogue(config)?;
    if catalogue.is_empty() {
        println!("No exercises in catalogue.");
        return Ok(());
    }

    if let Some(muscle) = muscle {
        let matching: Vec<&Exercise> = catalogue
            .exercises()
            .iter()
            .filter(|e| e.muscles.all().contains(muscle.as_str()))
            .collect();
        if matching.is_empty() {
            println!("No exercises work '{}'.", muscle);
        }
        for exercise in matching {
            display_exercise(exercise);
        }
        return Ok(());
    }

    for (region, muscles) in catalogue.grouped_by_region() {
        println!("{}", region);
        for (muscle, exercises) in muscles {
            println!("  {}", muscle);
            for exercise in exercises {
                println!("    - {} (difficulty {})", exercise.name, exercise.difficulty);
            }
        }
    }
    Ok(())
}

fn display_exercise(exercise: &Exercise) {
    println!("{} (difficulty {})", exercise.name, exercise.difficulty);
    println!("  {}", exercise.description);
    if !exercise.required_skills.is_empty() {
        println!("  Requires: {}", exercise.required_skills.join(", "));
    }
}

fn cmd_skills(data_dir: PathBuf, command: SkillsCommand) -> Result<()> {
    let mut tracker = open_tracker(&data_dir)?;

    match command {
        SkillsCommand::List { category } => {
            let wanted = category.as_deref().map(parse_category);
            let mut shown = 0;
            for (key, progressions) in tracker.tree() {
                if wanted.as_ref().map_or(false, |w| w != key) {
                    continue;
                }
                shown += 1;
                let (unlocked, total) = tracker.counts(key);
                println!("{} ({}/{})", key, unlocked, total);
                for progression in progressions {
                    let (done, steps) = progression.counts();
                    println!("  {} ({}/{})", progression.title, done, steps);
                    for step in &progression.steps {
                        let mark = if step.is_unlocked { "x" } else { " " };
                        match &step.note {
                            Some(note) => println!("    [{}] {} ({})", mark, step.name, note),
                            None => println!("    [{}] {}", mark, step.name),
                        }
                    }
                }
            }
            if shown == 0 {
                if let Some(category) = category {
                    println!("No category '{}'.", category);
                }
            }
        }

        SkillsCommand::Toggle { step, all: true } => {
            let location = resolve_step(&tracker, &step)?;
            let complete = tracker.toggle_progression(&location.category, &location.title)?;
            let verb = if complete { "Unlocked" } else { "Locked" };
            println!("✓ {} all of {} ({})", verb, location.title, location.category);
        }

        SkillsCommand::Toggle { step, all: false } => {
            let location = resolve_step(&tracker, &step)?;
            let now = tracker.toggle(&location)?;
            let verb = if now { "Unlocked" } else { "Locked" };
            println!(
                "✓ {} '{}' ({} / {})",
                verb, location.step, location.category, location.title
            );
        }

        SkillsCommand::Unlock { step, through, all } => {
            let location = resolve_step(&tracker, &step)?;
            if all {
                let count = tracker.set_progression(&location.category, &location.title, true)?;
                println!("✓ Unlocked all {} steps of {}", count, location.title);
            } else if through {
                let count = tracker.unlock_through(&location)?;
                println!(
                    "✓ Unlocked {} steps of {} through '{}'",
                    count, location.title, location.step
                );
            } else {
                tracker.set_unlocked(&location, true)?;
                println!(
                    "✓ Unlocked '{}' ({} / {})",
                    location.step, location.category, location.title
                );
            }
        }

        SkillsCommand::Lock { step, all } => {
            let location = resolve_step(&tracker, &step)?;
            if all {
                let count = tracker.set_progression(&location.category, &location.title, false)?;
                println!("✓ Locked all {} steps of {}", count, location.title);
            } else {
                tracker.set_unlocked(&location, false)?;
                println!(
                    "✓ Locked '{}' ({} / {})",
                    location.step, location.category, location.title
                );
            }
        }

        SkillsCommand::Export => {
            let export = tracker.export_unlocked();
            println!("{}", serde_json::to_string_pretty(&export)?);
        }
    }

    Ok(())
}

fn resolve_step(tracker: &SkillTracker<FileBlobStore>, args: &StepArgs) -> Result<StepLocation> {
    let category = args.category.as_deref().map(parse_category);
    tracker
        .find_step(&args.name, category.as_ref(), args.progression.as_deref())
        .ok_or_else(|| Error::UnknownStep(args.name.clone()))
}

fn cmd_generate(
    data_dir: PathBuf,
    config: &Config,
    selection: &Selection,
    seed: Option<u64>,
    log: bool,
) -> Result<()> {
    let catalogue = load_catalogue(config)?;
    let tracker = open_tracker(&data_dir)?;

    let request = WorkoutRequest {
        unlocked_skills: tracker.unlocked_skills(),
        focus_skill: selection.skill.clone(),
        target_muscles: selection.muscle_set(),
        count: selection.count.unwrap_or(config.workout.count),
    };

    tracing::debug!("Generator seed: {:?}", seed);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let workout = generate(catalogue.exercises(), &request, &mut rng);

    if workout.is_empty() {
        println!("No exercises available. Unlock more skills or pick other muscles.");
        return Ok(());
    }

    let heading = match &workout.mode {
        GenerationMode::Focus { skill } => format!("WORKOUT: {} focus", skill),
        GenerationMode::Muscles if request.target_muscles.is_empty() => "WORKOUT".to_string(),
        GenerationMode::Muscles => format!(
            "WORKOUT: {}",
            request
                .target_muscles
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };
    display_workout(&heading, &workout.exercises, &workout.sorted_focus(), &[]);

    if log {
        let mut workout_log = WorkoutLog::in_dir(&data_dir);
        workout_log.append(&WorkoutRecord::from_local(&workout))?;
        println!("✓ Workout logged!");
    }

    Ok(())
}

fn cmd_plan(
    data_dir: PathBuf,
    config: &Config,
    selection: &Selection,
    fallback_local: bool,
    log: bool,
) -> Result<()> {
    let catalogue = load_catalogue(config)?;
    let tracker = open_tracker(&data_dir)?;

    let mut request = PlanRequest::build(
        &config.planner,
        catalogue.exercises(),
        &tracker.unlocked_skills(),
        selection.skill.as_deref(),
        &selection.muscle_set(),
    );
    if let Some(count) = selection.count {
        request.number_of_exercises = count;
    }

    let client = HttpPlanClient::new(&config.planner.base_url)?;
    tracing::debug!("Requesting plan from {}", config.planner.base_url);
    match request_plan(&client, &request, catalogue.exercises()) {
        PlanOutcome::Planned(plan) => {
            if plan.exercises.is_empty() {
                println!("The planner returned an empty plan.");
                return Ok(());
            }
            let heading = match &selection.skill {
                Some(skill) => format!("PLANNED WORKOUT: {} focus", skill),
                None => "PLANNED WORKOUT".to_string(),
            };
            display_workout(&heading, &plan.exercises, &plan.sorted_focus(), &plan.notes);

            if log {
                let mut workout_log = WorkoutLog::in_dir(&data_dir);
                workout_log.append(&WorkoutRecord::from_remote(&plan, selection.skill.as_deref()))?;
                println!("✓ Workout logged!");
            }
            Ok(())
        }
        PlanOutcome::NoTargets => {
            println!("No targets. Pass --skill or --muscle.");
            Ok(())
        }
        PlanOutcome::Failed { reason } if fallback_local => {
            eprintln!("Planner unavailable ({}); generating locally.", reason);
            cmd_generate(data_dir, config, selection, None, log)
        }
        PlanOutcome::Failed { reason } => Err(Error::Planner(reason)),
    }
}

fn display_workout(heading: &str, exercises: &[Exercise], focus: &[(&str, u32)], notes: &[String]) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", heading);
    println!("╰─────────────────────────────────────────╯");
    println!();

    for (i, exercise) in exercises.iter().enumerate() {
        println!("  {}. {} (difficulty {})", i + 1, exercise.name, exercise.difficulty);
        if let Some(ref reps) = exercise.reps {
            println!("     → {}", reps);
        }
    }

    if !focus.is_empty() {
        println!();
        println!("  Training focus:");
        for (muscle, score) in focus {
            println!("    {:<22} {}", muscle, score);
        }
    }

    if !notes.is_empty() {
        println!();
        for note in notes {
            println!("  ℹ {}", note);
        }
    }

    println!();
}

fn cmd_history(data_dir: PathBuf, limit: usize) -> Result<()> {
    let log = WorkoutLog::in_dir(&data_dir);
    let records = cali_core::workout_log::read_recent(log.path(), limit)?;

    if records.is_empty() {
        println!("No workouts logged yet.");
        return Ok(());
    }

    for record in records {
        let source = match record.source {
            WorkoutSource::Local => "local",
            WorkoutSource::Remote => "remote",
        };
        let focus = record.focus_skill.as_deref().unwrap_or("-");
        println!(
            "{}  {:<6}  {}  ({} exercises)",
            record.generated_at.format("%Y-%m-%d %H:%M"),
            source,
            focus,
            record.exercises.len()
        );
        println!("    {}", record.exercises.join(", "));
    }

    Ok(())
}
