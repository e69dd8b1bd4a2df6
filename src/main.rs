//! # dayplan
//!
//! A daily task tracker for the terminal. Tasks live in color-tagged groups,
//! are checked off per day, and the last week of completions is shown as a
//! small heatmap.
//!
//! ## Usage
//!
//! Run without arguments (or with `ui`) to open the interactive view:
//!
//! ```bash
//! dayplan
//! ```
//!
//! #### TUI Key Bindings
//!
//! *   `Tab` / `1` `2` `3`: Switch between Today, Groups and Progress
//! *   `q`: Quit
//!
//! **Today**
//! *   `Space`: Toggle done for today
//! *   `a`: Add task
//! *   `h`: Hide/show task (toggles active)
//! *   `i`: Show/hide inactive tasks
//! *   `d`: Delete task
//!
//! **Groups**
//! *   `a`: Add group
//! *   `n`: Rename
//! *   `c`: Change color
//! *   `d`: Delete group (and its tasks)
//!
//! ### Command Line Interface
//!
//! ```bash
//! dayplan group add Reading --color "#FF8800"
//! dayplan task add "Read 20 pages" --group Reading --estimate "20 min"
//! dayplan today
//! dayplan done "Read 20 pages"
//! dayplan progress
//! ```
//!
//! Tasks and groups can be referred to by title/name, by full id, or by an id prefix.
//!
//! ## Data Storage
//!
//! Everything is saved to a single JSON file in your local data directory:
//! *   Linux: `~/.local/share/dayplan/daily-planner-storage.json`
//! *   macOS: `~/Library/Application Support/dayplan/daily-planner-storage.json`
//! *   Windows: `%LOCALAPPDATA%\dayplan\daily-planner-storage.json`
//!
//! You can override this by setting the `DAYPLAN_DB` environment variable.
//! Set `RUST_LOG=dayplan=debug` to see what the store is doing.

use std::io;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dayplan::commands::*;
use dayplan::models::{Frequency, GroupColor, GroupPatch, Priority, TaskPatch};
use dayplan::storage::{JsonFileSlot, StateSlot};
use dayplan::tui::run_tui;
use dayplan::{Result, TaskStore};

#[derive(Parser)]
#[command(name = "dayplan")]
#[command(about = "Daily task tracker with groups and a weekly heatmap", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's tasks and progress
    Today {
        /// Day to show in YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Toggle a task's completion for a day
    Done {
        /// Task title, id, or id prefix
        task: String,
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show whether a task is done on a day
    Status {
        task: String,
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show total completions and the last 7 days
    Progress {
        /// Last day of the history window
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Manage task groups
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Reset the database (delete all groups, tasks and history)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(Subcommand)]
enum GroupCommands {
    /// Add a new group
    Add {
        name: String,
        /// Palette name (blue, green, purple, red, orange, teal, pink, indigo, slate) or #RRGGBB
        #[arg(short, long)]
        color: Option<GroupColor>,
        #[arg(short, long)]
        icon: Option<String>,
    },
    /// List groups
    List,
    /// Edit a group
    Edit {
        /// Group name, id, or id prefix
        group: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        color: Option<GroupColor>,
        /// New icon; pass an empty string to clear it
        #[arg(short, long)]
        icon: Option<String>,
    },
    /// Remove a group and every task in it
    Remove {
        group: String,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Group name, id, or id prefix
        #[arg(short, long)]
        group: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Daily, Weekly or One-time
        #[arg(short, long)]
        frequency: Option<Frequency>,
        /// Low, Medium or High
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Estimated time, e.g. "30 min"
        #[arg(short, long)]
        estimate: Option<String>,
    },
    /// List tasks
    List {
        /// Include inactive tasks
        #[arg(short, long)]
        all: bool,
    },
    /// Edit a task; pass an empty string to clear an optional field
    Edit {
        task: String,
        #[arg(short, long)]
        title: Option<String>,
        /// Move the task to another group
        #[arg(short, long)]
        group: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        frequency: Option<Frequency>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(short, long)]
        estimate: Option<String>,
    },
    /// Remove a task and its history
    Remove {
        task: String,
    },
    /// Hide or show a task in the daily view without losing its history
    ToggleActive {
        task: String,
    },
}

/// Empty input clears an optional field.
fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| if v.trim().is_empty() { None } else { Some(v) })
}

fn run<S: StateSlot>(command: Commands, slot: S) -> Result<()> {
    // Completions never touch the data file.
    if let Commands::Completions { shell } = command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "dayplan", &mut io::stdout());
        return Ok(());
    }

    let mut store = TaskStore::open(slot)?;
    match command {
        Commands::Today { date } => cmd_today(&store, parse_date(date.as_deref())?),
        Commands::Done { task, date } => {
            cmd_done(&mut store, &task, parse_date(date.as_deref())?)?;
        }
        Commands::Status { task, date } => {
            cmd_status(&store, &task, parse_date(date.as_deref())?)?;
        }
        Commands::Progress { date } => cmd_progress(&store, parse_date(date.as_deref())?),
        Commands::Group { command } => match command {
            GroupCommands::Add { name, color, icon } => {
                cmd_group_add(&mut store, name, color, icon)?;
            }
            GroupCommands::List => cmd_group_list(&store),
            GroupCommands::Edit { group, name, color, icon } => {
                let patch = GroupPatch { name, color, icon: clearable(icon) };
                cmd_group_edit(&mut store, &group, patch)?;
            }
            GroupCommands::Remove { group } => cmd_group_remove(&mut store, &group)?,
        },
        Commands::Task { command } => match command {
            TaskCommands::Add { title, group, description, frequency, priority, estimate } => {
                let opts = TaskOptions { description, frequency, priority, estimate };
                cmd_task_add(&mut store, title, &group, opts)?;
            }
            TaskCommands::List { all } => cmd_task_list(&store, all),
            TaskCommands::Edit { task, title, group, description, frequency, priority, estimate } => {
                let priority = match clearable(priority) {
                    Some(Some(p)) => Some(Some(p.parse::<Priority>()?)),
                    Some(None) => Some(None),
                    None => None,
                };
                let patch = TaskPatch {
                    title,
                    description: clearable(description),
                    frequency,
                    priority,
                    estimated_time: clearable(estimate),
                    ..Default::default()
                };
                cmd_task_edit(&mut store, &task, group.as_deref(), patch)?;
            }
            TaskCommands::Remove { task } => cmd_task_remove(&mut store, &task)?,
            TaskCommands::ToggleActive { task } => {
                cmd_task_toggle_active(&mut store, &task)?;
            }
        },
        Commands::Reset { force } => cmd_reset(&mut store, force)?,
        Commands::Completions { .. } => {}
        Commands::Ui => run_tui(store)?,
    }
    Ok(())
}

fn main() {
    // Logging is opt-in via RUST_LOG and goes to stderr.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("off"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command.unwrap_or(Commands::Ui), JsonFileSlot::from_env()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
