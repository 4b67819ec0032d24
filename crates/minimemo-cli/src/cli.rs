use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "minimemo")]
#[command(about = "Notes and schedules whose meeting links open themselves")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding notes.json, schedules.json, and the calendar token
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Quick capture: minimemo "my note here"
    #[arg(trailing_var_arg = true)]
    pub note: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage notes
    #[command(alias = "n")]
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Manage schedules
    #[command(alias = "s")]
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
    /// Fetch calendar events and merge them into the schedule list
    Sync,
    /// Connect or disconnect the calendar
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Delete every note and schedule (the calendar stays connected)
    Reset {
        /// Skip the confirmation guard
        #[arg(long)]
        yes: bool,
    },
    /// Keep running so meeting links open when their schedules start
    Watch {
        /// Reload data and sync the calendar every SECS seconds
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        sync_every: Option<u64>,
    },
    /// Show or change CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum NoteCommands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note content (stdin or $EDITOR when omitted)
        content: Vec<String>,
    },
    /// List notes, most recently modified first
    List {
        /// Number of notes to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace a note's content
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// New content ($EDITOR when omitted)
        content: Vec<String>,
    },
    /// Delete a note
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Delete every note
    Reset {
        /// Skip the confirmation guard
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ScheduleCommands {
    /// Create a new schedule
    #[command(alias = "new")]
    Add {
        /// Schedule title
        title: String,
        /// Start time: RFC 3339, "YYYY-MM-DD HH:MM" (local), or "+30m" / "+2h" / "+1d"
        #[arg(long, value_name = "WHEN")]
        at: Option<String>,
        /// Meeting link opened when the schedule starts
        #[arg(long, value_name = "URL")]
        link: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// List schedules by start time
    List {
        /// Only show schedules with an armed meeting-link timer
        #[arg(long)]
        pending: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a schedule (omitted fields stay as they are)
    Edit {
        /// Schedule ID or unique ID prefix
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// New start time (same formats as `add --at`)
        #[arg(long, value_name = "WHEN", conflicts_with = "clear_date")]
        at: Option<String>,
        /// Remove the start time
        #[arg(long)]
        clear_date: bool,
        /// New meeting link (empty string removes it)
        #[arg(long, value_name = "URL")]
        link: Option<String>,
        /// New notes (empty string removes them)
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a schedule and its timer
    Delete {
        /// Schedule ID or unique ID prefix
        id: String,
    },
    /// Delete every schedule
    Reset {
        /// Skip the confirmation guard
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store a calendar credential
    Login {
        /// Access token (the demo calendar accepts none)
        token: Option<String>,
    },
    /// Show whether the calendar is connected
    Status,
    /// Forget the credential and remove fetched schedules
    Logout,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set one configuration value (empty value unsets it)
    Set {
        #[arg(value_enum)]
        key: ConfigKey,
        value: String,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ConfigKey {
    DataDir,
    CalendarFeed,
    CalendarToken,
    NotifyOnFire,
    OpenCommand,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
