use chrono::Duration;
use clap::{Parser, Subcommand};
use fit_core::*;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fittrack")]
#[command(about = "Daily exercise log with sets, history and statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a new exercise with one or more sets
    Log {
        /// Exercise name (known exercises reuse their unit and body parts)
        name: String,

        /// Unit sets are measured in (reps, seconds, ...)
        #[arg(long, default_value = "reps")]
        unit: String,

        /// Body part worked; repeat for several
        #[arg(long = "body-part")]
        body_parts: Vec<String>,

        /// A set as REPS, REPSxWEIGHT or REPS@WEIGHT; repeat for several
        #[arg(long = "set", required = true, value_parser = parse_set)]
        sets: Vec<SetArg>,

        /// Day to log on (YYYY-MM-DD, today, yesterday)
        #[arg(long, value_parser = parse_date)]
        date: Option<DateKey>,
    },

    /// Add sets to an exercise already logged
    AddSets {
        /// Exercise id as shown by `list`
        #[arg(long)]
        id: String,

        #[arg(long = "set", required = true, value_parser = parse_set)]
        sets: Vec<SetArg>,

        #[arg(long, value_parser = parse_date)]
        date: Option<DateKey>,
    },

    /// Show the exercises logged on a day (default)
    List {
        #[arg(long, value_parser = parse_date)]
        date: Option<DateKey>,
    },

    /// Delete one set of a logged exercise
    DeleteSet {
        #[arg(long)]
        id: String,

        /// Set number as shown by `list` (starting at 1)
        #[arg(long)]
        number: usize,

        #[arg(long, value_parser = parse_date)]
        date: Option<DateKey>,
    },

    /// Delete a logged exercise with all its sets
    Delete {
        #[arg(long)]
        id: String,

        #[arg(long, value_parser = parse_date)]
        date: Option<DateKey>,
    },

    /// List known exercise types
    Types,

    /// Show statistics for a date range
    Stats {
        /// First day of the range (default: today)
        #[arg(long, value_parser = parse_date)]
        from: Option<DateKey>,

        /// Last day of the range (default: same as --from)
        #[arg(long, value_parser = parse_date)]
        to: Option<DateKey>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a backup of all data to a JSON file
    Export {
        /// Output file (default: fit-tracker-backup-<date>.json)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace all data with the contents of a backup file
    Import {
        file: PathBuf,

        /// Don't ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Debug)]
struct SetArg {
    reps: f64,
    weight: Option<f64>,
}

fn parse_set(s: &str) -> std::result::Result<SetArg, String> {
    let s = s.trim();
    let (reps, weight) = match s.split_once(['x', 'X', '@']) {
        Some((reps, weight)) => (reps.trim(), Some(weight.trim())),
        None => (s, None),
    };

    let reps: f64 = reps
        .parse()
        .map_err(|_| format!("invalid reps in set '{}'", s))?;
    let weight = weight
        .map(|w| w.parse::<f64>())
        .transpose()
        .map_err(|_| format!("invalid weight in set '{}'", s))?;
    Ok(SetArg { reps, weight })
}

fn parse_date(s: &str) -> std::result::Result<DateKey, String> {
    let today = DateKey::today();
    match s.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => today.pred().ok_or_else(|| "date out of range".to_string()),
        other => other.parse().map_err(|e: Error| e.to_string()),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    fit_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let mut tracker = Tracker::open(JsonFileStore::new(&data_dir))?;
    let unit = config.display.weight_unit.as_str();

    match cli.command {
        Some(Commands::Log {
            name,
            unit: rep_unit,
            body_parts,
            sets,
            date,
        }) => cmd_log(&mut tracker, &name, &rep_unit, body_parts, &sets, date, unit),
        Some(Commands::AddSets { id, sets, date }) => {
            cmd_add_sets(&mut tracker, &id, &sets, date, unit)
        }
        Some(Commands::List { date }) => {
            cmd_list(&tracker, date.unwrap_or_else(DateKey::today), unit);
            Ok(())
        }
        Some(Commands::DeleteSet { id, number, date }) => {
            cmd_delete_set(&mut tracker, &id, number, date)
        }
        Some(Commands::Delete { id, date }) => {
            let date = date.unwrap_or_else(DateKey::today);
            tracker.delete_exercise(date, &id)?;
            println!("✓ Exercise deleted");
            Ok(())
        }
        Some(Commands::Types) => {
            cmd_types(&tracker);
            Ok(())
        }
        Some(Commands::Stats { from, to, json }) => cmd_stats(&tracker, from, to, json, unit),
        Some(Commands::Export { out }) => cmd_export(&tracker, out),
        Some(Commands::Import { file, yes }) => cmd_import(&mut tracker, file, yes),
        None => {
            // Default to today's list
            cmd_list(&tracker, DateKey::today(), unit);
            Ok(())
        }
    }
}

fn cmd_log(
    tracker: &mut Tracker<JsonFileStore>,
    name: &str,
    rep_unit: &str,
    body_parts: Vec<String>,
    sets: &[SetArg],
    date: Option<DateKey>,
    weight_unit: &str,
) -> Result<()> {
    let date = date.unwrap_or_else(DateKey::today);

    // Check every set before a new exercise type gets registered.
    for set in sets {
        ExerciseSet::new(set.reps, set.weight)?;
    }

    let mut draft = tracker.start_session(name, rep_unit, body_parts)?;
    for set in sets {
        draft = tracker.add_set_to_draft(draft, set.reps, set.weight)?;
    }

    let id = tracker.commit(draft, date)?;
    println!("✓ Logged on {}", date);
    if let Some(entry) = tracker.list_for_date(date).iter().find(|e| e.id == id) {
        print_entry(entry, weight_unit);
    }
    Ok(())
}

fn cmd_add_sets(
    tracker: &mut Tracker<JsonFileStore>,
    id: &str,
    sets: &[SetArg],
    date: Option<DateKey>,
    weight_unit: &str,
) -> Result<()> {
    let date = date.unwrap_or_else(DateKey::today);

    let mut draft = tracker.start_session_for_entry(date, id)?;
    for set in sets {
        draft = tracker.add_set_to_draft(draft, set.reps, set.weight)?;
    }
    let added = draft.sets().len();
    tracker.commit(draft, date)?;

    println!("✓ Added {} sets", added);
    if let Some(entry) = tracker.list_for_date(date).iter().find(|e| e.id == id) {
        print_entry(entry, weight_unit);
    }
    Ok(())
}

fn cmd_delete_set(
    tracker: &mut Tracker<JsonFileStore>,
    id: &str,
    number: usize,
    date: Option<DateKey>,
) -> Result<()> {
    let date = date.unwrap_or_else(DateKey::today);
    let index = number
        .checked_sub(1)
        .ok_or_else(|| Error::InvalidInput("set numbers start at 1".into()))?;

    tracker.delete_set(date, id, index)?;
    println!("✓ Set {} deleted", number);
    if tracker.list_for_date(date).iter().all(|e| e.id != id) {
        println!("  Exercise had no sets left and was removed");
    }
    Ok(())
}

fn cmd_list(tracker: &Tracker<JsonFileStore>, date: DateKey, weight_unit: &str) {
    let entries = tracker.list_for_date(date);
    let label = if date == DateKey::today() {
        format!("Today - {}", date.date().format("%A, %B %-d, %Y"))
    } else {
        date.date().format("%A, %B %-d, %Y").to_string()
    };

    println!("{}", label);
    println!();

    if entries.is_empty() {
        println!("  No exercises logged yet");
        return;
    }

    for entry in &entries {
        print_entry(entry, weight_unit);
    }
}

fn cmd_types(tracker: &Tracker<JsonFileStore>) {
    let types: Vec<&ExerciseType> = tracker.exercise_types().collect();
    if types.is_empty() {
        println!("No exercise types yet - log an exercise to add one.");
        return;
    }

    for exercise_type in types {
        let parts: Vec<&str> = exercise_type.body_parts.iter().map(String::as_str).collect();
        if parts.is_empty() {
            println!("  {} ({})", exercise_type.display_name, exercise_type.rep_unit);
        } else {
            println!(
                "  {} ({}) [{}]",
                exercise_type.display_name,
                exercise_type.rep_unit,
                parts.join(", ")
            );
        }
    }
}

fn cmd_stats(
    tracker: &Tracker<JsonFileStore>,
    from: Option<DateKey>,
    to: Option<DateKey>,
    json: bool,
    weight_unit: &str,
) -> Result<()> {
    let start = from.unwrap_or_else(DateKey::today);
    let end = to.unwrap_or(start);
    if start > end {
        return Err(Error::InvalidInput(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }

    let summary = tracker.summarize_range(start, end);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let days = (end.date() - start.date()) + Duration::days(1);
    println!("Statistics {} to {} ({} days)", start, end, days.num_days());
    println!();
    println!("  Exercises:    {}", summary.total_exercises);
    println!("  Sets:         {}", summary.total_sets);
    println!(
        "  Weight moved: {:.1} {}",
        summary.total_weight_moved, weight_unit
    );

    for series in summary.chart_series(weight_unit) {
        println!();
        println!("  {}", series.title);
        let max = series
            .points
            .iter()
            .map(|p| p.value)
            .fold(0.0_f64, f64::max);
        let label_width = series
            .points
            .iter()
            .map(|p| p.label.chars().count())
            .max()
            .unwrap_or(0);
        for point in &series.points {
            let width = if max > 0.0 {
                ((point.value / max) * 30.0).round() as usize
            } else {
                0
            };
            println!(
                "    {:<lw$}  {:<30}  {}",
                point.label,
                "█".repeat(width),
                format_number(point.value),
                lw = label_width
            );
        }
    }

    Ok(())
}

fn cmd_export(tracker: &Tracker<JsonFileStore>, out: Option<PathBuf>) -> Result<()> {
    let path = out.unwrap_or_else(|| PathBuf::from(backup_filename(DateKey::today())));
    let document = tracker.export().to_json_pretty()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, document)?;

    println!("✓ Exported backup to {}", path.display());
    Ok(())
}

fn cmd_import(tracker: &mut Tracker<JsonFileStore>, file: PathBuf, yes: bool) -> Result<()> {
    let document = std::fs::read_to_string(&file)?;

    // Reject bad files before asking anything.
    fit_core::backup::parse_import(&document)?;

    if !yes && !confirm("This will replace all your current data with the backup. Continue?")? {
        println!("Import cancelled.");
        return Ok(());
    }

    tracker.import(&document)?;
    println!("✓ Backup restored from {}", file.display());
    Ok(())
}

fn print_entry(entry: &ExerciseEntry, weight_unit: &str) {
    let parts: Vec<&str> = entry.body_parts.iter().map(String::as_str).collect();
    if parts.is_empty() {
        println!("  {}", entry.name);
    } else {
        println!("  {} [{}]", entry.name, parts.join(", "));
    }
    println!("    id: {}", entry.id);
    println!(
        "    {} sets · {} total {}",
        entry.set_count(),
        format_number(entry.total_reps()),
        entry.rep_unit
    );

    for (index, set) in entry.sets.iter().enumerate() {
        let weight = set
            .weight
            .filter(|w| *w > 0.0)
            .map(|w| format!(" @ {} {}", format_number(w), weight_unit))
            .unwrap_or_default();
        println!(
            "    Set {}: {} {}{}",
            index + 1,
            format_number(set.reps),
            entry.rep_unit,
            weight
        );
    }
    println!();
}

/// Whole numbers without a trailing ".0", everything else to one decimal
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
