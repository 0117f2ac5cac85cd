//! CLI entry point for taskdeck.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use taskdeck_app::AppConfig;
use taskdeck_core::task::due_date;
use taskdeck_core::{CategoryId, Priority, TaskId};
use time::Date;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Personal task tracker with timers, archives and bulk edits.
#[derive(Parser, Debug)]
#[command(
    name = "taskdeck",
    version,
    about = "taskdeck: personal tasks with timers, archives and bulk edits"
)]
struct Cli {
    /// Config file (defaults to the user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new task.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        /// Due day as YYYY-MM-DD.
        #[arg(long, value_parser = due_date::parse)]
        due: Option<Date>,
    },

    /// List tasks, optionally narrowed to a bucket, category, or search text.
    Ls {
        #[arg(long, value_enum, default_value_t = Bucket::All)]
        bucket: Bucket,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Most recently created open tasks.
    Recent {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Show a single task as JSON.
    Show { id: TaskId },

    /// Change fields of a task.
    Edit {
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, value_parser = due_date::parse, conflicts_with = "clear_due")]
        due: Option<Date>,
        #[arg(long)]
        clear_due: bool,
    },

    /// Mark a task completed.
    Done { id: TaskId },

    /// Mark a task open again.
    Undone { id: TaskId },

    /// Delete a task permanently.
    Rm { id: TaskId },

    /// Move a task to the archive.
    Archive { id: TaskId },

    /// Bring a task back from the archive.
    Restore { id: TaskId },

    /// Time tracking.
    Timer {
        #[command(subcommand)]
        action: TimerCommand,
    },

    /// Apply one change to several tasks; unknown ids are skipped.
    Bulk {
        #[command(subcommand)]
        action: BulkCommand,
    },

    /// Summary counters.
    Stats {
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Manage categories.
    Category {
        #[command(subcommand)]
        action: CategoryCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TimerCommand {
    /// Start the timer, stopping any other running one.
    Start { id: TaskId },
    /// Stop the timer and record the session.
    Stop { id: TaskId },
    /// Same as stop.
    Pause { id: TaskId },
    /// Clear all tracked time.
    Reset { id: TaskId },
    /// Print tracked time including a running session.
    Spent { id: TaskId },
    /// Print the task whose timer is running.
    Status,
}

#[derive(Subcommand, Debug)]
enum BulkCommand {
    /// Mark tasks completed.
    Done {
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },
    /// Mark tasks open again.
    Undone {
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },
    /// Delete tasks.
    Rm {
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },
    /// Re-file tasks under another category.
    Move {
        #[arg(long)]
        category: String,
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// List categories with task counts.
    Ls {
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },
    /// Create a category.
    Add {
        name: String,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Change a category.
    Edit {
        id: CategoryId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a category; tasks keep their tag.
    Rm { id: CategoryId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LsFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Bucket {
    All,
    Today,
    Upcoming,
    Overdue,
    Completed,
    Archived,
}

fn main() -> Result<()> {
    let Cli { config, cmd } = Cli::parse();
    install_tracing();

    let config = AppConfig::load(config.as_deref())?;
    tokio::runtime::Runtime::new()?.block_on(commands::run(cmd, &config))
}

fn install_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

/// `RUST_LOG` directives when set and valid, otherwise INFO.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
