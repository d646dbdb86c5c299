// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use bmi_tracker::{write_csv, BmiCalculator, HistoryRecord, DEFAULT_DB_PATH, TIMESTAMP_FORMAT};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "bmi-tracker")]
#[command(about = "BMI calculator with a local history", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// SQLite database holding the history
    #[arg(long, env = "BMI_DB_PATH", default_value = DEFAULT_DB_PATH, global = true)]
    db: PathBuf,

    /// Directory for the log file
    #[arg(long, env = "BMI_LOG_DIR", default_value = ".", global = true)]
    log_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal UI (default)
    Ui,

    /// Calculate BMI once and save it to the history
    Calc {
        /// Label stored with the record
        #[arg(long, default_value = "")]
        name: String,

        /// Weight in kilograms
        #[arg(long, allow_hyphen_values = true)]
        weight: String,

        /// Height in centimeters
        #[arg(long, allow_hyphen_values = true)]
        height: String,
    },

    /// Print every saved record
    History {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Write the history to a CSV file
    Export {
        /// Destination file
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ui_mode = matches!(cli.command, None | Some(Commands::Ui));

    init_logging(&cli.log_dir, ui_mode)
        .with_context(|| format!("Failed to open log directory {}", cli.log_dir.display()))?;

    let calculator = BmiCalculator::open(&cli.db)
        .with_context(|| format!("Failed to open history database {}", cli.db.display()))?;
    info!(db = %cli.db.display(), "history database ready");

    match cli.command {
        None | Some(Commands::Ui) => run_ui_mode(calculator),
        Some(Commands::Calc { name, weight, height }) => run_calc(calculator, &name, &weight, &height),
        Some(Commands::History { format }) => run_history(calculator, format),
        Some(Commands::Export { path }) => run_export(calculator, &path),
    }
}

/// Logs go to a file always, and to stderr unless the terminal UI owns the screen
fn init_logging(log_dir: &Path, ui_mode: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bmi_tracker=info"));

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("bmi-tracker.log")
        .build(log_dir)?;
    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);

    let stderr_layer = if ui_mode {
        None
    } else {
        Some(fmt::layer().with_writer(io::stderr))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

fn run_calc(calculator: BmiCalculator, name: &str, weight: &str, height: &str) -> Result<()> {
    let calculation = match calculator.calculate(name, weight, height) {
        Ok(c) => c,
        Err(e) => {
            calculator.shutdown()?;
            return Err(e.into());
        }
    };

    println!("{}", calculation.bmi_line());
    println!("{}", calculation.category_line());
    println!("Saved as record #{}", calculation.record.id);

    calculator.shutdown()?;
    Ok(())
}

fn run_history(calculator: BmiCalculator, format: OutputFormat) -> Result<()> {
    let records = calculator.history()?;

    match format {
        OutputFormat::Table => print_table(&records),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Csv => write_csv(&records, io::stdout().lock())?,
    }

    calculator.shutdown()?;
    Ok(())
}

fn print_table(records: &[HistoryRecord]) {
    if records.is_empty() {
        println!("No BMI data to display.");
        return;
    }

    println!(
        "{:>5}  {:<19}  {:<20}  {:>7}  {:>6}  {:>6}  {}",
        "ID", "Date", "Name", "Weight", "Height", "BMI", "Category"
    );
    for r in records {
        println!(
            "{:>5}  {:<19}  {:<20}  {:>7.1}  {:>6.2}  {:>6.2}  {}",
            r.id,
            r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            r.name,
            r.weight,
            r.height,
            r.bmi,
            r.category
        );
    }
}

fn run_export(calculator: BmiCalculator, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let written = calculator.store().export_csv(file)?;

    println!("✓ Exported {} records to {}", written, path.display());
    info!(records = written, path = %path.display(), "history exported");

    calculator.shutdown()?;
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(calculator: BmiCalculator) -> Result<()> {
    let mut app = ui::App::new(calculator);
    let res = ui::run_ui(&mut app);

    // Close the store even when the UI loop failed
    app.into_calculator().shutdown()?;
    res
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(calculator: BmiCalculator) -> Result<()> {
    calculator.shutdown()?;
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: bmi-tracker calc --weight <KG> --height <CM>");
    std::process::exit(1);
}
