//! `epm project` command - Project management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{
    confirm, open_store, parse_date, print_field, print_json, print_optional, report_success,
    resolve_index, resolve_project, resolve_release,
};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::index::IndexTable;
use crate::core::Store;
use crate::entities::{ActivityFilter, Project, ProjectFilter, ProjectInput};

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List projects with filtering
    List(ListArgs),

    /// Create a project
    New(NewArgs),

    /// Show a project's details and activities
    Show(ShowArgs),

    /// Change a project's fields
    Edit(EditArgs),

    /// Delete a project (its activities are kept, detached)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search code or title (substring, case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter by status (code or name, e.g. IN_PROGRESS)
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by target release (id or code)
    #[arg(long, short = 'r')]
    pub release: Option<String>,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project code ("PR" followed by digits)
    pub code: String,

    /// Project title
    #[arg(long, short = 't')]
    pub title: String,

    /// PM responsible
    #[arg(long)]
    pub pm: String,

    /// EBA responsible
    #[arg(long)]
    pub eba: String,

    /// Status (code or name)
    #[arg(long, default_value = "PENDING_HLE")]
    pub status: String,

    /// End-to-end test date (YYYY-MM-DD)
    #[arg(long)]
    pub e2e: Option<String>,

    /// Target release (id or code, not INSTALLED)
    #[arg(long, short = 'r')]
    pub release: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project id or code
    pub project: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Project id or code
    pub project: String,

    /// New title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// New PM responsible
    #[arg(long)]
    pub pm: Option<String>,

    /// New EBA responsible
    #[arg(long)]
    pub eba: Option<String>,

    /// New status
    #[arg(long)]
    pub status: Option<String>,

    /// New end-to-end test date
    #[arg(long)]
    pub e2e: Option<String>,

    /// Remove the end-to-end test date
    #[arg(long, conflicts_with = "e2e")]
    pub clear_e2e: bool,

    /// New target release (id or code)
    #[arg(long, short = 'r')]
    pub release: Option<String>,

    /// Remove the target release
    #[arg(long, conflicts_with = "release")]
    pub clear_release: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Project id or code
    pub project: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("code", "CODE", 10),
    ColumnDef::new("title", "TITLE", 36),
    ColumnDef::new("status", "STATUS", 16),
    ColumnDef::new("pm", "PM", 16),
    ColumnDef::new("eba", "EBA", 16),
    ColumnDef::new("e2e", "E2E", 10),
    ColumnDef::new("release", "RELEASE", 14),
];

/// Run a project subcommand
pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProjectCommands::List(args) => run_list(args, global),
        ProjectCommands::New(args) => run_new(args, global),
        ProjectCommands::Show(args) => run_show(args, global),
        ProjectCommands::Edit(args) => run_edit(args, global),
        ProjectCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    store.refresh_release_statuses()?;

    let filter = ProjectFilter {
        search: args.search,
        status_code: args
            .status
            .map(|s| resolve_index(IndexTable::ProjectStatus, &s))
            .transpose()?,
        target_release_id: args
            .release
            .map(|r| resolve_release(&store, &r))
            .transpose()?,
    };
    let projects = store.list_projects(&filter)?;

    if args.count {
        println!("{}", projects.len());
        return Ok(());
    }
    if global.format == OutputFormat::Json {
        return print_json(&projects);
    }

    let rows: Vec<TableRow> = projects.iter().map(project_row).collect();
    TableFormatter::new(COLUMNS, "project")
        .with_summary(!global.quiet)
        .output(&rows, global.format);
    Ok(())
}

fn project_row(project: &Project) -> TableRow {
    TableRow::new(project.id)
        .cell("code", CellValue::Text(project.project_code.clone()))
        .cell("title", CellValue::Text(project.title.clone()))
        .cell("status", CellValue::Status(project.status_name.clone()))
        .cell("pm", CellValue::Text(project.pm_responsible.clone()))
        .cell("eba", CellValue::Text(project.eba_responsible.clone()))
        .cell("e2e", CellValue::Date(project.e2e_date))
        .cell("release", CellValue::optional(project.target_release_code.as_deref()))
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    store.refresh_release_statuses()?;

    let input = ProjectInput {
        title: args.title,
        pm_responsible: args.pm,
        eba_responsible: args.eba,
        status_code: resolve_index(IndexTable::ProjectStatus, &args.status)?,
        e2e_date: args.e2e.as_deref().map(parse_date).transpose()?,
        target_release_id: args
            .release
            .map(|r| resolve_release(&store, &r))
            .transpose()?,
    };
    let project = store.create_project(&args.code, &input)?;

    match global.format {
        OutputFormat::Id => println!("{}", project.id),
        OutputFormat::Json => print_json(&project)?,
        _ => report_success(
            global,
            format!(
                "Created project {} {}",
                style(&project.project_code).cyan(),
                style(&project.title).white()
            ),
        ),
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    store.refresh_release_statuses()?;
    let project = find_project(&store, &args.project)?;

    match global.format {
        OutputFormat::Id => println!("{}", project.id),
        OutputFormat::Json => print_json(&project)?,
        _ => {
            print_field("ID", style(project.id).cyan());
            print_field("Code", &project.project_code);
            print_field("Title", &project.title);
            print_field("Status", &project.status_name);
            print_field("PM", &project.pm_responsible);
            print_field("EBA", &project.eba_responsible);
            print_optional("E2E", project.e2e_date);
            print_optional("Target release", project.target_release_code.as_deref());
            print_field("Updated", project.updated_at.format("%Y-%m-%d %H:%M"));

            let activities = store.list_activities(&ActivityFilter {
                project_id: Some(project.id),
                ..Default::default()
            })?;
            if !activities.is_empty() {
                println!();
                println!("{}", style("Activities").bold());
                for activity in activities {
                    println!(
                        "  {} {:<12} {} {}",
                        style(activity.id).cyan(),
                        activity.status_name,
                        activity.title,
                        style(activity.assigned_member_name.unwrap_or_default()).dim()
                    );
                }
            }
        }
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    store.refresh_release_statuses()?;
    let project = find_project(&store, &args.project)?;

    let mut input = ProjectInput::from(&project);
    if let Some(title) = args.title {
        input.title = title;
    }
    if let Some(pm) = args.pm {
        input.pm_responsible = pm;
    }
    if let Some(eba) = args.eba {
        input.eba_responsible = eba;
    }
    if let Some(status) = args.status {
        input.status_code = resolve_index(IndexTable::ProjectStatus, &status)?;
    }
    if args.clear_e2e {
        input.e2e_date = None;
    } else if let Some(e2e) = args.e2e {
        input.e2e_date = Some(parse_date(&e2e)?);
    }
    if args.clear_release {
        input.target_release_id = None;
    } else if let Some(release) = args.release {
        input.target_release_id = Some(resolve_release(&store, &release)?);
    }

    let updated = store.update_project(project.id, &input)?;
    match global.format {
        OutputFormat::Id => println!("{}", updated.id),
        OutputFormat::Json => print_json(&updated)?,
        _ => report_success(
            global,
            format!(
                "Updated project {} ({})",
                style(&updated.project_code).cyan(),
                updated.status_name
            ),
        ),
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let project = find_project(&store, &args.project)?;

    if !confirm(&format!("Delete project {}?", project.project_code), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }
    store.delete_project(project.id)?;
    report_success(
        global,
        format!("Deleted project {}", style(&project.project_code).cyan()),
    );
    Ok(())
}

fn find_project(store: &Store, input: &str) -> Result<Project> {
    let id = resolve_project(store, input)?;
    Ok(store.get_project(id)?)
}
