//! `epm release link` / `epm activity link` - labelled URLs on a record

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{
    confirm, open_store, print_json, report_success, resolve_index, resolve_release,
};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::index::IndexTable;
use crate::core::Store;
use crate::entities::{LinkInput, LinkOwner};

#[derive(Subcommand, Debug)]
pub enum LinkCommands {
    /// Attach a link
    Add(AddArgs),

    /// List links
    List(ListArgs),

    /// Remove a link
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Owner id (releases also accept the release code)
    pub owner: String,

    /// Link label
    #[arg(long, short = 'l')]
    pub label: String,

    /// Absolute http(s) URL
    #[arg(long, short = 'u')]
    pub url: String,

    /// Link type (code or name: REQUIREMENT, JIRA, OTHER)
    #[arg(long, short = 't', default_value = "OTHER")]
    pub link_type: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Owner id (releases also accept the release code)
    pub owner: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Owner id (releases also accept the release code)
    pub owner: String,

    /// Link id
    pub link_id: i64,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("label", "LABEL", 30),
    ColumnDef::new("type", "TYPE", 12),
    ColumnDef::new("url", "URL", 60),
];

/// Run a link subcommand for the given kind of owner
pub fn run(cmd: LinkCommands, owner: LinkOwner, global: &GlobalOpts) -> Result<()> {
    match cmd {
        LinkCommands::Add(args) => run_add(args, owner, global),
        LinkCommands::List(args) => run_list(args, owner, global),
        LinkCommands::Delete(args) => run_delete(args, owner, global),
    }
}

fn resolve_owner(store: &Store, owner: LinkOwner, input: &str) -> Result<i64> {
    match owner {
        LinkOwner::Release => resolve_release(store, input),
        LinkOwner::Activity => {
            let id = input.trim().parse::<i64>().map_err(|_| {
                miette::miette!("Invalid activity id '{}' (expected a number)", input)
            })?;
            Ok(store.get_activity(id)?.id)
        }
    }
}

fn run_add(args: AddArgs, owner: LinkOwner, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let owner_id = resolve_owner(&store, owner, &args.owner)?;
    let input = LinkInput {
        label: args.label,
        type_code: resolve_index(IndexTable::LinkType, &args.link_type)?,
        url: args.url,
    };
    let link = store.add_link(owner, owner_id, &input)?;

    match global.format {
        OutputFormat::Id => println!("{}", link.id),
        OutputFormat::Json => print_json(&link)?,
        _ => report_success(
            global,
            format!(
                "Linked {} {} {} {}",
                owner,
                style(owner_id).cyan(),
                style("→").dim(),
                style(&link.url).yellow()
            ),
        ),
    }
    Ok(())
}

fn run_list(args: ListArgs, owner: LinkOwner, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let owner_id = resolve_owner(&store, owner, &args.owner)?;
    let links = store.list_links(owner, owner_id)?;

    if global.format == OutputFormat::Json {
        return print_json(&links);
    }
    let rows: Vec<TableRow> = links
        .iter()
        .map(|link| {
            TableRow::new(link.id)
                .cell("label", CellValue::Text(link.label.clone()))
                .cell("type", CellValue::Text(link.type_name.clone()))
                .cell("url", CellValue::Text(link.url.clone()))
        })
        .collect();
    TableFormatter::new(COLUMNS, "link")
        .with_summary(!global.quiet)
        .output(&rows, global.format);
    Ok(())
}

fn run_delete(args: DeleteArgs, owner: LinkOwner, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let owner_id = resolve_owner(&store, owner, &args.owner)?;

    if !confirm(&format!("Delete link {} from {} {}?", args.link_id, owner, owner_id), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }
    store.delete_link(owner, owner_id, args.link_id)?;
    report_success(global, format!("Deleted link {}", style(args.link_id).cyan()));
    Ok(())
}
