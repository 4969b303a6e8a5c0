// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use journal_ingest::app_config::{Config, LogLevel};
use journal_ingest::database::{DatabaseConnection, Repository, SqliteEntryStore};
use journal_ingest::extraction::TextPageExtractor;
use journal_ingest::file_utils::FileManager;
use journal_ingest::persistence::{EntryStore, InMemoryEntryStore};
use journal_ingest::pipeline::{Document, PipelineController, PipelineReport};

// @const: Interval between status polls while documents are processing
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest journal exports (files, or directories searched for .txt files)
    Ingest {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Run the full pipeline against an in-memory store
        #[arg(long)]
        dry_run: bool,
    },

    /// Show stored entry counts and database size
    Stats,

    /// Vacuum and analyze the database
    Optimize,

    /// Delete every stored entry
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Generate shell completions for journal-ingest
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// journal-ingest - dated journal ingestion into SQLite
///
/// Splits exported journal documents into dated entries, cleans and
/// validates them, and stores the survivors.
#[derive(Parser, Debug)]
#[command(name = "journal-ingest")]
#[command(version)]
#[command(about = "Ingest dated journal exports into SQLite")]
#[command(long_about = "journal-ingest splits exported journal documents into dated entries, cleans and validates them, and stores them in SQLite.

EXAMPLES:
    journal-ingest ingest 2021.txt                 # Ingest one document
    journal-ingest ingest journals/                # Ingest every .txt under a directory
    journal-ingest ingest --dry-run 2021.txt       # Run the pipeline without storing
    journal-ingest stats                           # Show what is stored
    journal-ingest reset --yes                     # Delete all stored entries
    journal-ingest completions bash > ji.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config: PathBuf,

    /// SQLite database path (overrides the configuration)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and marker for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌"),
            Level::Warn => ("1;33", "🚧"),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍"),
            Level::Trace => ("1;35", "📋"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                marker,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Level is adjusted once the configuration is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "journal-ingest", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    match cli.command {
        Commands::Ingest { paths, dry_run } => run_ingest(config, &paths, dry_run).await,
        Commands::Stats => run_stats(&config).await,
        Commands::Optimize => {
            let repo = open_repository(&config)?;
            repo.optimize().await?;
            info!("Database optimized: {}", repo.stats().await?);
            Ok(())
        }
        Commands::Reset { yes } => {
            if !yes {
                return Err(anyhow!("Refusing to delete all entries without --yes"));
            }
            let repo = open_repository(&config)?;
            let deleted = repo.delete_all().await?;
            info!("Deleted {} entries", deleted);
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load the configuration file (creating a default one when missing) and apply CLI overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = if cli.config.exists() {
        Config::from_file(&cli.config)
            .with_context(|| format!("Failed to load config file: {:?}", cli.config))?
    } else {
        warn!("Config file not found at {:?}, creating default config.", cli.config);
        let config = Config::default();
        config
            .save(&cli.config)
            .with_context(|| format!("Failed to write default config to file: {:?}", cli.config))?;
        config
    };

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }
    if let Some(database) = &cli.database {
        config.database_path = Some(database.clone());
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn open_database(config: &Config) -> Result<DatabaseConnection> {
    match &config.database_path {
        Some(path) => DatabaseConnection::new(path),
        None => DatabaseConnection::new_default(),
    }
}

fn open_repository(config: &Config) -> Result<Repository> {
    Ok(Repository::new(open_database(config)?))
}

async fn run_ingest(config: Config, paths: &[PathBuf], dry_run: bool) -> Result<()> {
    let files = FileManager::collect_inputs(paths)?;
    if files.is_empty() {
        warn!("No journal documents found");
        return Ok(());
    }

    let store: Arc<dyn EntryStore> = if dry_run {
        info!("Dry run: entries will not be stored");
        Arc::new(InMemoryEntryStore::new())
    } else {
        Arc::new(SqliteEntryStore::new(open_database(&config)?))
    };

    let controller = PipelineController::new(config, Arc::new(TextPageExtractor::new()), store)?;
    let multi_progress = MultiProgress::new();
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {prefix} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░");

    let mut runs = Vec::with_capacity(files.len());
    for file in &files {
        let document = Document::from_path(file)
            .await
            .with_context(|| format!("Failed to read {:?}", file))?;
        let name = document.original_name.clone();
        let (task_id, handle) = controller.submit_with_handle(document);

        let bar = multi_progress.add(ProgressBar::new(100));
        bar.set_style(style.clone());
        bar.set_prefix(name.clone());

        runs.push((name, task_id, handle, bar));
    }

    let monitors = runs
        .iter()
        .map(|(_, task_id, _, bar)| monitor_task(&controller, task_id, bar));
    futures::future::join_all(monitors).await;

    let mut failed = 0;
    for (name, _, handle, _) in runs {
        match handle.await {
            Ok(Ok(report)) => print_report(&report),
            Ok(Err(e)) => {
                failed += 1;
                error!("{}: {}", name, e);
            }
            Err(e) => {
                failed += 1;
                error!("{}: processing task panicked: {}", name, e);
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} documents failed", failed, files.len()));
    }
    Ok(())
}

/// Poll a task until it reaches a terminal stage
async fn monitor_task(controller: &PipelineController, task_id: &str, bar: &ProgressBar) {
    let mut interval = tokio::time::interval(POLL_INTERVAL);

    loop {
        interval.tick().await;
        match controller.poll(task_id) {
            Some(snapshot) => {
                bar.set_position(u64::from(snapshot.percent));
                bar.set_message(snapshot.stage.to_string());
                if snapshot.is_terminal() {
                    bar.finish_with_message(format!("{} ({} stored)", snapshot.stage, snapshot.success_count));
                    return;
                }
            }
            None => {
                bar.abandon_with_message("status expired");
                return;
            }
        }
    }
}

fn print_report(report: &PipelineReport) {
    info!("{}", report.summary());
    for message in &report.errors {
        warn!("  {}", message);
    }
}

async fn run_stats(config: &Config) -> Result<()> {
    let repo = open_repository(config)?;
    let stats = repo.stats().await?;

    println!("Database: {}", display_path(repo.connection().path()));
    println!("{}", stats);
    for year in repo.count_by_year().await? {
        println!("  {}: {} entries", year.year, year.count);
    }
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
