//! `epm member` command - Team member management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{
    confirm, open_store, parse_date, print_field, print_json, print_optional, report_success,
    resolve_index, resolve_member,
};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::index::IndexTable;
use crate::core::Store;
use crate::entities::{Member, MemberFilter, MemberInput};

#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// List members with filtering
    List(ListArgs),

    /// Add a team member
    New(NewArgs),

    /// Show a member's details
    Show(ShowArgs),

    /// Change a member's fields
    Edit(EditArgs),

    /// Delete a member (their activities become unassigned)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by name (substring, case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter by role (code or name, e.g. DEV)
    #[arg(long, short = 'r')]
    pub role: Option<String>,

    /// Filter by status (code or name, e.g. VACATION)
    #[arg(long)]
    pub status: Option<String>,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Member name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Role (code or name: BA, QA, DEV)
    #[arg(long, short = 'r')]
    pub role: String,

    /// Status (code or name: ACTIVE, VACATION)
    #[arg(long, default_value = "ACTIVE")]
    pub status: String,

    /// First day of vacation (YYYY-MM-DD)
    #[arg(long)]
    pub vacation_start: Option<String>,

    /// Last day of vacation (YYYY-MM-DD)
    #[arg(long)]
    pub vacation_end: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Member id or exact name
    pub member: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Member id or exact name
    pub member: String,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// New role
    #[arg(long, short = 'r')]
    pub role: Option<String>,

    /// New status
    #[arg(long)]
    pub status: Option<String>,

    /// First day of vacation (YYYY-MM-DD)
    #[arg(long)]
    pub vacation_start: Option<String>,

    /// Last day of vacation (YYYY-MM-DD)
    #[arg(long)]
    pub vacation_end: Option<String>,

    /// Remove the vacation window
    #[arg(long, conflicts_with_all = ["vacation_start", "vacation_end"])]
    pub clear_vacation: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Member id or exact name
    pub member: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 30),
    ColumnDef::new("role", "ROLE", 6),
    ColumnDef::new("status", "STATUS", 10),
    ColumnDef::new("vacation_start", "VACATION FROM", 13),
    ColumnDef::new("vacation_end", "VACATION TO", 11),
];

/// Run a member subcommand
pub fn run(cmd: MemberCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MemberCommands::List(args) => run_list(args, global),
        MemberCommands::New(args) => run_new(args, global),
        MemberCommands::Show(args) => run_show(args, global),
        MemberCommands::Edit(args) => run_edit(args, global),
        MemberCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let filter = MemberFilter {
        name_like: args.search,
        role_code: args
            .role
            .map(|r| resolve_index(IndexTable::Role, &r))
            .transpose()?,
        status_code: args
            .status
            .map(|s| resolve_index(IndexTable::UserStatus, &s))
            .transpose()?,
    };
    let members = store.list_members(&filter)?;

    if args.count {
        println!("{}", members.len());
        return Ok(());
    }
    if global.format == OutputFormat::Json {
        return print_json(&members);
    }

    let rows: Vec<TableRow> = members.iter().map(member_row).collect();
    TableFormatter::new(COLUMNS, "member")
        .with_summary(!global.quiet)
        .output(&rows, global.format);
    Ok(())
}

fn member_row(member: &Member) -> TableRow {
    TableRow::new(member.id)
        .cell("name", CellValue::Text(member.name.clone()))
        .cell("role", CellValue::Text(member.role_name.clone()))
        .cell("status", CellValue::Status(member.status_name.clone()))
        .cell("vacation_start", CellValue::Date(member.vacation_start))
        .cell("vacation_end", CellValue::Date(member.vacation_end))
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let input = MemberInput {
        name: args.name,
        role_code: resolve_index(IndexTable::Role, &args.role)?,
        status_code: resolve_index(IndexTable::UserStatus, &args.status)?,
        vacation_start: args.vacation_start.as_deref().map(parse_date).transpose()?,
        vacation_end: args.vacation_end.as_deref().map(parse_date).transpose()?,
    };
    let member = store.create_member(&input)?;

    match global.format {
        OutputFormat::Id => println!("{}", member.id),
        OutputFormat::Json => print_json(&member)?,
        _ => report_success(
            global,
            format!(
                "Created member {} {}",
                style(member.id).cyan(),
                style(&member.name).white()
            ),
        ),
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let member = find_member(&store, &args.member)?;

    match global.format {
        OutputFormat::Id => println!("{}", member.id),
        OutputFormat::Json => print_json(&member)?,
        _ => {
            let on_vacation = member.is_away_on(store.today());
            print_field("ID", style(member.id).cyan());
            print_field("Name", &member.name);
            print_field("Role", &member.role_name);
            print_field("Status", &member.status_name);
            print_optional("Vacation from", member.vacation_start);
            print_optional("Vacation to", member.vacation_end);
            print_field("Away today", if on_vacation { "yes" } else { "no" });
            print_field("Created", member.created_at.format("%Y-%m-%d %H:%M"));
            print_field("Updated", member.updated_at.format("%Y-%m-%d %H:%M"));
        }
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let member = find_member(&store, &args.member)?;

    let mut input = MemberInput::from(&member);
    if let Some(name) = args.name {
        input.name = name;
    }
    if let Some(role) = args.role {
        input.role_code = resolve_index(IndexTable::Role, &role)?;
    }
    if let Some(status) = args.status {
        input.status_code = resolve_index(IndexTable::UserStatus, &status)?;
    }
    if args.clear_vacation {
        input.vacation_start = None;
        input.vacation_end = None;
    }
    if let Some(start) = args.vacation_start {
        input.vacation_start = Some(parse_date(&start)?);
    }
    if let Some(end) = args.vacation_end {
        input.vacation_end = Some(parse_date(&end)?);
    }

    let updated = store.update_member(member.id, &input)?;
    match global.format {
        OutputFormat::Id => println!("{}", updated.id),
        OutputFormat::Json => print_json(&updated)?,
        _ => report_success(global, format!("Updated member {}", style(&updated.name).cyan())),
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let member = find_member(&store, &args.member)?;

    if !confirm(&format!("Delete member '{}'?", member.name), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }
    store.delete_member(member.id)?;
    report_success(global, format!("Deleted member {}", style(&member.name).cyan()));
    Ok(())
}

fn find_member(store: &Store, input: &str) -> Result<Member> {
    let id = resolve_member(store, input)?;
    Ok(store.get_member(id)?)
}
