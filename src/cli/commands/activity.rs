//! `epm activity` command - Activity management
//!
//! Closing an activity stamps its end date; reopening it clears the date.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::link::{self, LinkCommands};
use crate::cli::helpers::{
    confirm, open_store, parse_date, print_field, print_json, print_optional, report_success,
    resolve_index, resolve_member, resolve_project, resolve_release,
};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::index::IndexTable;
use crate::entities::{Activity, ActivityFilter, ActivityInput, LinkOwner};

#[derive(Subcommand, Debug)]
pub enum ActivityCommands {
    /// List activities with filtering (newest first)
    List(ListArgs),

    /// Create an activity
    New(NewArgs),

    /// Show an activity's details and links
    Show(ShowArgs),

    /// Change an activity's fields
    Edit(EditArgs),

    /// Delete an activity (its links go with it)
    Delete(DeleteArgs),

    /// Manage the activity's links
    #[command(subcommand)]
    Link(LinkCommands),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search title (substring, case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter by status (code or name, e.g. BLOCKED)
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by project (id or code)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Filter by assigned member (id or exact name)
    #[arg(long, short = 'm')]
    pub member: Option<String>,

    /// Only activities that are not CLOSED
    #[arg(long)]
    pub open: bool,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Activity title
    #[arg(long, short = 't')]
    pub title: String,

    /// Type (JIRA, INTERNAL)
    #[arg(long = "type", default_value = "JIRA")]
    pub activity_type: String,

    /// Subtype (STORY, BUG, PRODDEF, OPY, INTERNAL)
    #[arg(long, default_value = "STORY")]
    pub subtype: String,

    /// Status (PLANNED, OPEN, BLOCKED, IN_PROGRESS, CLOSED)
    #[arg(long, default_value = "PLANNED")]
    pub status: String,

    /// Ticket code
    #[arg(long)]
    pub ticket: Option<String>,

    /// Assigned member (id or exact name)
    #[arg(long, short = 'm')]
    pub member: Option<String>,

    /// Project (id or code, not CLOSED)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Target release (id or code, not INSTALLED)
    #[arg(long, short = 'r')]
    pub release: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Activity id
    pub id: i64,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Activity id
    pub id: i64,

    /// New title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// New type
    #[arg(long = "type")]
    pub activity_type: Option<String>,

    /// New subtype
    #[arg(long)]
    pub subtype: Option<String>,

    /// New status (CLOSED stamps the end date, anything else clears it)
    #[arg(long)]
    pub status: Option<String>,

    /// New ticket code (empty to clear)
    #[arg(long)]
    pub ticket: Option<String>,

    /// Assign to a member (id or exact name)
    #[arg(long, short = 'm')]
    pub member: Option<String>,

    /// Remove the assignee
    #[arg(long, conflicts_with = "member")]
    pub unassign: bool,

    /// Move to a project (id or code)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Detach from its project
    #[arg(long, conflicts_with = "project")]
    pub clear_project: bool,

    /// Target a release (id or code)
    #[arg(long, short = 'r')]
    pub release: Option<String>,

    /// Remove the target release
    #[arg(long, conflicts_with = "release")]
    pub clear_release: bool,

    /// New start date
    #[arg(long)]
    pub start: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Activity id
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("title", "TITLE", 36),
    ColumnDef::new("type", "TYPE", 18),
    ColumnDef::new("status", "STATUS", 12),
    ColumnDef::new("project", "PROJECT", 10),
    ColumnDef::new("member", "ASSIGNED", 18),
    ColumnDef::new("release", "RELEASE", 14),
    ColumnDef::new("ticket", "TICKET", 14),
    ColumnDef::new("end", "CLOSED AT", 16),
];

/// Run an activity subcommand
pub fn run(cmd: ActivityCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ActivityCommands::List(args) => run_list(args, global),
        ActivityCommands::New(args) => run_new(args, global),
        ActivityCommands::Show(args) => run_show(args, global),
        ActivityCommands::Edit(args) => run_edit(args, global),
        ActivityCommands::Delete(args) => run_delete(args, global),
        ActivityCommands::Link(cmd) => link::run(cmd, LinkOwner::Activity, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    store.refresh_release_statuses()?;

    let filter = ActivityFilter {
        status_code: args
            .status
            .map(|s| resolve_index(IndexTable::ActivityStatus, &s))
            .transpose()?,
        project_id: args
            .project
            .map(|p| resolve_project(&store, &p))
            .transpose()?,
        assigned_member_id: args
            .member
            .map(|m| resolve_member(&store, &m))
            .transpose()?,
        title_like: args.search,
        open_only: args.open,
    };
    let activities = store.list_activities(&filter)?;

    if args.count {
        println!("{}", activities.len());
        return Ok(());
    }
    if global.format == OutputFormat::Json {
        return print_json(&activities);
    }

    let rows: Vec<TableRow> = activities.iter().map(activity_row).collect();
    TableFormatter::new(COLUMNS, "activity")
        .with_summary(!global.quiet)
        .output(&rows, global.format);
    Ok(())
}

fn activity_row(activity: &Activity) -> TableRow {
    TableRow::new(activity.id)
        .cell("title", CellValue::Text(activity.title.clone()))
        .cell(
            "type",
            CellValue::Text(format!("{}/{}", activity.type_name, activity.subtype_name)),
        )
        .cell("status", CellValue::Status(activity.status_name.clone()))
        .cell("project", CellValue::optional(activity.project_code.as_deref()))
        .cell("member", CellValue::optional(activity.assigned_member_name.as_deref()))
        .cell("release", CellValue::optional(activity.target_release_code.as_deref()))
        .cell("ticket", CellValue::optional(activity.ticket_code.as_deref()))
        .cell("end", CellValue::DateTime(activity.end_date))
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    store.refresh_release_statuses()?;

    let input = ActivityInput {
        type_code: resolve_index(IndexTable::ActivityType, &args.activity_type)?,
        subtype_code: resolve_index(IndexTable::ActivitySubtype, &args.subtype)?,
        status_code: resolve_index(IndexTable::ActivityStatus, &args.status)?,
        title: args.title,
        ticket_code: args.ticket,
        assigned_member_id: args
            .member
            .map(|m| resolve_member(&store, &m))
            .transpose()?,
        project_id: args
            .project
            .map(|p| resolve_project(&store, &p))
            .transpose()?,
        target_release_id: args
            .release
            .map(|r| resolve_release(&store, &r))
            .transpose()?,
        start_date: args.start.as_deref().map(parse_date).transpose()?,
    };
    let activity = store.create_activity(&input)?;

    match global.format {
        OutputFormat::Id => println!("{}", activity.id),
        OutputFormat::Json => print_json(&activity)?,
        _ => report_success(
            global,
            format!(
                "Created activity {} {}",
                style(activity.id).cyan(),
                style(&activity.title).white()
            ),
        ),
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    store.refresh_release_statuses()?;
    let activity = store.get_activity(args.id)?;

    match global.format {
        OutputFormat::Id => println!("{}", activity.id),
        OutputFormat::Json => print_json(&activity)?,
        _ => {
            print_field("ID", style(activity.id).cyan());
            print_field("Title", &activity.title);
            print_field(
                "Type",
                format!("{} / {}", activity.type_name, activity.subtype_name),
            );
            print_field("Status", &activity.status_name);
            print_optional("Ticket", activity.ticket_code.as_deref());
            print_optional("Assigned to", activity.assigned_member_name.as_deref());
            print_optional("Project", activity.project_code.as_deref());
            print_optional("Target release", activity.target_release_code.as_deref());
            print_optional("Start", activity.start_date);
            print_optional(
                "Closed at",
                activity.end_date.map(|d| d.format("%Y-%m-%d %H:%M")),
            );
            print_field("Created", activity.created_at.format("%Y-%m-%d %H:%M"));

            let links = store.list_links(LinkOwner::Activity, activity.id)?;
            if !links.is_empty() {
                println!();
                println!("{}", style("Links").bold());
                for link in links {
                    println!(
                        "  {} [{}] {} {}",
                        style(link.id).cyan(),
                        link.type_name,
                        link.label,
                        style(&link.url).dim()
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
    let activity = store.get_activity(args.id)?;

    let mut input = ActivityInput::from(&activity);
    if let Some(title) = args.title {
        input.title = title;
    }
    if let Some(activity_type) = args.activity_type {
        input.type_code = resolve_index(IndexTable::ActivityType, &activity_type)?;
    }
    if let Some(subtype) = args.subtype {
        input.subtype_code = resolve_index(IndexTable::ActivitySubtype, &subtype)?;
    }
    if let Some(status) = args.status {
        input.status_code = resolve_index(IndexTable::ActivityStatus, &status)?;
    }
    if let Some(ticket) = args.ticket {
        input.ticket_code = Some(ticket);
    }
    if args.unassign {
        input.assigned_member_id = None;
    } else if let Some(member) = args.member {
        input.assigned_member_id = Some(resolve_member(&store, &member)?);
    }
    if args.clear_project {
        input.project_id = None;
    } else if let Some(project) = args.project {
        input.project_id = Some(resolve_project(&store, &project)?);
    }
    if args.clear_release {
        input.target_release_id = None;
    } else if let Some(release) = args.release {
        input.target_release_id = Some(resolve_release(&store, &release)?);
    }
    if let Some(start) = args.start {
        input.start_date = Some(parse_date(&start)?);
    }

    let updated = store.update_activity(activity.id, &input)?;
    match global.format {
        OutputFormat::Id => println!("{}", updated.id),
        OutputFormat::Json => print_json(&updated)?,
        _ => report_success(
            global,
            format!(
                "Updated activity {} ({})",
                style(updated.id).cyan(),
                updated.status_name
            ),
        ),
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let activity = store.get_activity(args.id)?;

    if !confirm(&format!("Delete activity '{}'?", activity.title), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }
    store.delete_activity(activity.id)?;
    report_success(global, format!("Deleted activity {}", style(activity.id).cyan()));
    Ok(())
}
