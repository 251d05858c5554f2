// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use capsync::app_config::{self, Config};
use capsync::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Composite one self-contained job file
    Compose {
        /// Job description (id, title, audio, words or words_path, backgrounds)
        #[arg(value_name = "JOB_JSON")]
        job_path: PathBuf,

        /// Directory for the render job (defaults to the job file's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Composite every script in a data directory
    Batch {
        /// Data directory (processed/scripts, audio, videos, final)
        #[arg(value_name = "DATA_DIR")]
        data_dir: PathBuf,
    },

    /// Generate shell completions for capsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// capsync - caption synchronisation and compositing
///
/// Turns word-level speech timings into a layered render job: background
/// footage, a title card, caption blocks and per-word highlights.
#[derive(Parser, Debug)]
#[command(name = "capsync")]
#[command(version)]
#[command(about = "Word-synced caption compositing for short-form video")]
#[command(long_about = "capsync groups word timings into captions, lays them out, times per-word highlights and
writes an ordered render job for an external renderer.

EXAMPLES:
    capsync compose job.json                     # Composite one job file
    capsync compose job.json -o out/             # Write the render job to out/
    capsync batch data/                          # Composite every script in data/
    capsync --seed 42 batch data/                # Reproducible background offsets
    capsync -f --log-level debug batch data/     # Overwrite existing output, verbose
    capsync completions bash > capsync.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in capsync.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "capsync.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Seed for background offsets and footage selection
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Pick background footage at random instead of the first clip
    #[arg(long, global = true)]
    random_background: bool,

    /// Force overwrite of existing output files
    #[arg(short, long, global = true)]
    force_overwrite: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker and ANSI colour for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (marker, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "capsync", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&cli)?;

    // If log level was not set via command line, update it from config now
    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Compose { job_path, output_dir } => {
            match controller.run_job_file(job_path, output_dir, cli.force_overwrite).await? {
                Some(report) => info!(
                    "Composited {}: {} caption layers, {} layers total",
                    report.id, report.caption_layers, report.layer_count
                ),
                None => info!("Nothing to do"),
            }
        }
        Commands::Batch { data_dir } => {
            if !data_dir.is_dir() {
                return Err(anyhow!("Data directory does not exist: {:?}", data_dir));
            }
            let summary = controller.run_data_dir(data_dir, cli.force_overwrite).await?;
            if summary.failed() > 0 {
                error!("{} of {} jobs failed", summary.failed(), summary.outcomes.len());
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

// Load or create configuration, then apply CLI overrides
fn load_config(options: &CommandLineOptions) -> Result<Config> {
    let config_path = &options.config_path;

    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path).context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let mut config = Config::default();
        if let Some(log_level) = &options.log_level {
            config.log_level = log_level.clone().into();
        }

        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if let Some(seed) = options.seed {
        config.background.seed = Some(seed);
    }
    if options.random_background {
        config.background.random_source = true;
    }

    config.validate().context("Configuration validation failed")?;

    Ok(config)
}
