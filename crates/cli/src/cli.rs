//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Course Notify - mail course results to students in bounded batches
#[derive(Parser, Debug)]
#[command(
    name = "course-notify",
    author,
    version,
    about = "Batch result notifications for course rosters",
    long_about = "Loads a course roster, splits the course's students into bounded batches \n\
                  and mails each student their result concurrently, reporting one \n\
                  outcome per student in roster order."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "COURSE_NOTIFY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "COURSE_NOTIFY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mail results to every student of a course
    Announce(AnnounceArgs),

    /// Show how recipients would be split into batches
    Plan(PlanArgs),

    /// Validate configuration file without sending anything
    Validate(ValidateArgs),
}

/// Arguments for the `announce` command
#[derive(Parser, Debug, Clone)]
pub struct AnnounceArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "COURSE_NOTIFY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the roster file (JSON)
    #[arg(short, long, env = "COURSE_NOTIFY_ROSTER")]
    pub roster: PathBuf,

    /// Course to announce, as numbered after loading the roster
    #[arg(long)]
    pub course_id: u64,

    /// Override dispatch.max_batch_size
    #[arg(long, env = "COURSE_NOTIFY_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Override dispatch.max_concurrent_workers
    #[arg(long, env = "COURSE_NOTIFY_MAX_WORKERS")]
    pub max_workers: Option<usize>,

    /// Override dispatch.timeout_ms
    #[arg(long, env = "COURSE_NOTIFY_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Override mailer.sender
    #[arg(long, env = "COURSE_NOTIFY_SENDER")]
    pub sender: Option<String>,

    /// Spool messages into this directory instead of the configured transport
    #[arg(long, env = "COURSE_NOTIFY_SPOOL_DIR")]
    pub spool_dir: Option<PathBuf>,

    /// Print the batch plan and exit without sending
    #[arg(long)]
    pub dry_run: bool,

    /// Output the announcement as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `plan` command
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Number of recipients
    #[arg(long)]
    pub total: usize,

    /// Maximum recipients per batch
    #[arg(long, default_value = "10")]
    pub batch_size: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "course-notify.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
