//! `epm release` command - Release management
//!
//! A release's status is never set directly: it follows from the start and
//! installation dates and today's date, and is refreshed before every listing.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::link::{self, LinkCommands};
use crate::cli::helpers::{
    confirm, open_store, parse_date, print_field, print_json, report_success, resolve_index,
    resolve_release,
};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::index::IndexTable;
use crate::core::Store;
use crate::entities::{LinkOwner, Release, ReleaseDates, ReleaseFilter};

#[derive(Subcommand, Debug)]
pub enum ReleaseCommands {
    /// List releases with filtering
    List(ListArgs),

    /// Create a release
    New(NewArgs),

    /// Show a release's details and links
    Show(ShowArgs),

    /// Change a release's dates
    Edit(EditArgs),

    /// Delete a release (its links go with it)
    Delete(DeleteArgs),

    /// Manage the release's links
    #[command(subcommand)]
    Link(LinkCommands),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by release code (substring)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter by status (PLANNED, IN_PROGRESS, INSTALLED)
    #[arg(long)]
    pub status: Option<String>,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Unique release code
    pub code: String,

    /// Delivery date (YYYY-MM-DD)
    #[arg(long, short = 'd')]
    pub delivery: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long, short = 's')]
    pub start: String,

    /// Installation date (YYYY-MM-DD)
    #[arg(long, short = 'i')]
    pub installation: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Release id or code
    pub release: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Release id or code
    pub release: String,

    /// New delivery date
    #[arg(long, short = 'd')]
    pub delivery: Option<String>,

    /// New start date
    #[arg(long, short = 's')]
    pub start: Option<String>,

    /// New installation date
    #[arg(long, short = 'i')]
    pub installation: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Release id or code
    pub release: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("code", "CODE", 20),
    ColumnDef::new("status", "STATUS", 12),
    ColumnDef::new("delivery", "DELIVERY", 10),
    ColumnDef::new("start", "START", 10),
    ColumnDef::new("installation", "INSTALLATION", 12),
];

/// Run a release subcommand
pub fn run(cmd: ReleaseCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReleaseCommands::List(args) => run_list(args, global),
        ReleaseCommands::New(args) => run_new(args, global),
        ReleaseCommands::Show(args) => run_show(args, global),
        ReleaseCommands::Edit(args) => run_edit(args, global),
        ReleaseCommands::Delete(args) => run_delete(args, global),
        ReleaseCommands::Link(cmd) => link::run(cmd, LinkOwner::Release, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    store.refresh_release_statuses()?;

    let filter = ReleaseFilter {
        code_like: args.search,
        status_code: args
            .status
            .map(|s| resolve_index(IndexTable::ReleaseStatus, &s))
            .transpose()?,
    };
    let releases = store.list_releases(&filter)?;

    if args.count {
        println!("{}", releases.len());
        return Ok(());
    }
    if global.format == OutputFormat::Json {
        return print_json(&releases);
    }

    let rows: Vec<TableRow> = releases.iter().map(release_row).collect();
    TableFormatter::new(COLUMNS, "release")
        .with_summary(!global.quiet)
        .output(&rows, global.format);
    Ok(())
}

fn release_row(release: &Release) -> TableRow {
    TableRow::new(release.id)
        .cell("code", CellValue::Text(release.release_code.clone()))
        .cell("status", CellValue::Status(release.status_name.clone()))
        .cell("delivery", CellValue::Date(Some(release.delivery_date)))
        .cell("start", CellValue::Date(Some(release.start_date)))
        .cell("installation", CellValue::Date(Some(release.installation_date)))
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let dates = ReleaseDates {
        delivery_date: parse_date(&args.delivery)?,
        start_date: parse_date(&args.start)?,
        installation_date: parse_date(&args.installation)?,
    };
    let release = store.create_release(&args.code, &dates)?;

    match global.format {
        OutputFormat::Id => println!("{}", release.id),
        OutputFormat::Json => print_json(&release)?,
        _ => report_success(
            global,
            format!(
                "Created release {} ({})",
                style(&release.release_code).cyan(),
                release.status_name
            ),
        ),
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    store.refresh_release_statuses()?;
    let release = find_release(&store, &args.release)?;

    match global.format {
        OutputFormat::Id => println!("{}", release.id),
        OutputFormat::Json => print_json(&release)?,
        _ => {
            print_field("ID", style(release.id).cyan());
            print_field("Code", &release.release_code);
            print_field("Status", &release.status_name);
            print_field("Delivery", release.delivery_date);
            print_field("Start", release.start_date);
            print_field("Installation", release.installation_date);
            print_field("Updated", release.updated_at.format("%Y-%m-%d %H:%M"));

            let links = store.list_links(LinkOwner::Release, release.id)?;
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
    let release = find_release(&store, &args.release)?;

    let mut dates = ReleaseDates::from(&release);
    if let Some(delivery) = args.delivery {
        dates.delivery_date = parse_date(&delivery)?;
    }
    if let Some(start) = args.start {
        dates.start_date = parse_date(&start)?;
    }
    if let Some(installation) = args.installation {
        dates.installation_date = parse_date(&installation)?;
    }

    let updated = store.update_release(release.id, &dates)?;
    match global.format {
        OutputFormat::Id => println!("{}", updated.id),
        OutputFormat::Json => print_json(&updated)?,
        _ => report_success(
            global,
            format!(
                "Updated release {} ({})",
                style(&updated.release_code).cyan(),
                updated.status_name
            ),
        ),
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let release = find_release(&store, &args.release)?;

    if !confirm(&format!("Delete release '{}'?", release.release_code), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }
    store.delete_release(release.id)?;
    report_success(
        global,
        format!("Deleted release {}", style(&release.release_code).cyan()),
    );
    Ok(())
}

fn find_release(store: &Store, input: &str) -> Result<Release> {
    let id = resolve_release(store, input)?;
    Ok(store.get_release(id)?)
}
