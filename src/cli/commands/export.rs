//! `epm export` command - CSV export of an entity list
//!
//! Takes the same filters as the matching `list` command and writes the
//! same CSV the web front end offers for download.

use chrono::Utc;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{open_store, resolve_index, resolve_member, resolve_project, resolve_release};
use crate::cli::GlobalOpts;
use crate::core::export::{self, ExportEntity};
use crate::core::index::IndexTable;
use crate::entities::{ActivityFilter, MemberFilter, ProjectFilter, ReleaseFilter};

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Entity list to export
    #[arg(value_enum)]
    pub entity: ExportEntity,

    /// Substring filter (member name, release code, project code/title, activity title)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Status filter (code or name, for the entity's own status table)
    #[arg(long)]
    pub status: Option<String>,

    /// Member role filter (members only)
    #[arg(long)]
    pub role: Option<String>,

    /// Target release filter (projects only)
    #[arg(long)]
    pub release: Option<String>,

    /// Project filter (activities only)
    #[arg(long)]
    pub project: Option<String>,

    /// Assigned member filter (activities only)
    #[arg(long)]
    pub member: Option<String>,

    /// Only activities that are not CLOSED (activities only)
    #[arg(long)]
    pub open: bool,

    /// Output file; a directory gets the default `<entity>_<timestamp>.csv` name
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    store.refresh_release_statuses()?;

    let csv = match args.entity {
        ExportEntity::Members => {
            let filter = MemberFilter {
                name_like: args.search.clone(),
                role_code: args
                    .role
                    .as_deref()
                    .map(|r| resolve_index(IndexTable::Role, r))
                    .transpose()?,
                status_code: args
                    .status
                    .as_deref()
                    .map(|s| resolve_index(IndexTable::UserStatus, s))
                    .transpose()?,
            };
            export::members_csv(&store.list_members(&filter)?)?
        }
        ExportEntity::Releases => {
            let filter = ReleaseFilter {
                code_like: args.search.clone(),
                status_code: args
                    .status
                    .as_deref()
                    .map(|s| resolve_index(IndexTable::ReleaseStatus, s))
                    .transpose()?,
            };
            export::releases_csv(&store.list_releases(&filter)?)?
        }
        ExportEntity::Projects => {
            let filter = ProjectFilter {
                search: args.search.clone(),
                status_code: args
                    .status
                    .as_deref()
                    .map(|s| resolve_index(IndexTable::ProjectStatus, s))
                    .transpose()?,
                target_release_id: args
                    .release
                    .as_deref()
                    .map(|r| resolve_release(&store, r))
                    .transpose()?,
            };
            export::projects_csv(&store.list_projects(&filter)?)?
        }
        ExportEntity::Activities => {
            let filter = ActivityFilter {
                status_code: args
                    .status
                    .as_deref()
                    .map(|s| resolve_index(IndexTable::ActivityStatus, s))
                    .transpose()?,
                project_id: args
                    .project
                    .as_deref()
                    .map(|p| resolve_project(&store, p))
                    .transpose()?,
                assigned_member_id: args
                    .member
                    .as_deref()
                    .map(|m| resolve_member(&store, m))
                    .transpose()?,
                title_like: args.search.clone(),
                open_only: args.open,
            };
            export::activities_csv(&store.list_activities(&filter)?)?
        }
    };

    match args.output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(export::export_filename(args.entity, Utc::now()))
            } else {
                path
            };
            std::fs::write(&path, csv).into_diagnostic()?;
            if !global.quiet {
                eprintln!(
                    "{} Exported {} to {}",
                    style("✓").green(),
                    args.entity,
                    style(path.display()).cyan()
                );
            }
        }
        None => print!("{}", csv),
    }
    Ok(())
}
