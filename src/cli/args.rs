//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    activity::ActivityCommands,
    completions::CompletionsArgs,
    dashboard::DashboardCommands,
    export::ExportArgs,
    index::IndexArgs,
    init::InitArgs,
    member::MemberCommands,
    project::ProjectCommands,
    release::ReleaseCommands,
    serve::ServeArgs,
};

#[derive(Parser)]
#[command(name = "epm")]
#[command(author, version, about = "Eagle PM project tracker")]
#[command(long_about = "Track team members, releases, projects and activities in a single SQLite file, from the terminal or a small web front end.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Database file (default: EPM_DB_PATH, then config, then ./eagle_pm.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and seed reference data
    Init(InitArgs),

    /// Team member management
    #[command(subcommand)]
    Member(MemberCommands),

    /// Release management
    #[command(subcommand)]
    Release(ReleaseCommands),

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Activity management
    #[command(subcommand)]
    Activity(ActivityCommands),

    /// Re-derive release statuses from today's date
    Refresh,

    /// Daily meeting and project control boards
    #[command(subcommand)]
    Dashboard(DashboardCommands),

    /// Export an entity list as CSV
    Export(ExportArgs),

    /// Print reference tables
    Index(IndexArgs),

    /// Run the web front end
    Serve(ServeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for lists, detail view for single records
    #[default]
    Auto,
    /// Tab-aligned table
    Tsv,
    /// CSV format (for spreadsheets)
    Csv,
    /// JSON format (for programming)
    Json,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
