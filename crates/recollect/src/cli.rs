use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "recollect")]
#[command(version)]
#[command(about = "Searchable project memory from AI assistant transcripts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by the manual capture commands
#[derive(Args, Debug)]
pub struct CaptureArgs {
    pub content: String,

    /// Why this holds
    #[arg(short, long)]
    pub reasoning: Option<String>,

    /// Tags, repeatable or comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Related files, repeatable or comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub files: Vec<String>,
}

#[derive(Subcommand)]
pub enum GoalAction {
    /// Add a goal
    Add { content: String },
    /// List open goals
    List,
    /// Mark the newest goal containing TEXT as done
    Done { text: String },
    /// Remove all goals
    Clear,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write default settings into the workspace
    Init {
        #[arg(long)]
        force: bool,
    },

    /// Extract knowledge from transcripts (preview unless --execute)
    Import {
        /// Transcript file or directory (defaults to this project's transcripts)
        path: Option<String>,

        /// Write entries to the store
        #[arg(long)]
        execute: bool,

        /// Confirm each transcript before it is written
        #[arg(short, long)]
        interactive: bool,
    },

    /// Show store and import status
    Status,

    /// Record a note
    Note(CaptureArgs),

    /// Record a decision
    Decision(CaptureArgs),

    /// Record a gotcha or constraint
    Gotcha(CaptureArgs),

    /// Record a preference
    Preference(CaptureArgs),

    /// Record a discovery
    Discovery(CaptureArgs),

    /// Manage goals
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Add a next step, or complete one with --done
    Next {
        text: String,

        /// Mark the newest next step containing TEXT as done
        #[arg(long)]
        done: bool,
    },

    /// Show open goals and next steps
    State,

    /// List entries with optional filters
    Read {
        #[arg(short = 't', long = "type")]
        entry_type: Option<String>,

        #[arg(long)]
        tag: Option<String>,

        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Show tags, files and branch
        #[arg(long)]
        full: bool,
    },

    /// Show the newest entries
    Recent {
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
    },

    /// Summarize what matters right now: recent entries, goals and next steps
    Context {
        #[arg(short, long, default_value_t = 7)]
        days: u32,
    },

    /// Search entries
    Search {
        query: String,

        /// Restrict to one entry type
        #[arg(short = 't', long = "type")]
        entry_type: Option<String>,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Find the reasoning behind a decision
    Why {
        query: String,

        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Show one entry
    Show { id: String },

    /// Edit an entry
    Edit {
        id: String,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        reasoning: Option<String>,

        #[arg(short = 't', long = "type")]
        entry_type: Option<String>,

        /// Replace the tags; an empty value clears them
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },

    /// Delete an entry
    Delete { id: String },

    /// List recorded sessions
    Sessions {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Print version information
    Version,

    /// Hook: start a background import
    #[command(name = "hook:session-start")]
    HookSessionStart,

    /// Hook: record the finished session (stdin JSON)
    #[command(name = "hook:session-end")]
    HookSessionEnd,
}
