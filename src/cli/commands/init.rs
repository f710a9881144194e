//! `epm init` command - Create the database and seed reference data

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::index::IndexTable;
use crate::core::{Config, Store};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Database file to create (default: --db, EPM_DB_PATH, config, ./eagle_pm.db)
    pub path: Option<PathBuf>,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = match args.path.or_else(|| global.db.clone()) {
        Some(path) => path,
        None => Config::load()?.db_path(),
    };
    let existed = path.exists();

    // Opening creates the schema and seeds any missing reference rows
    let mut store = Store::open(&path)?;
    let changed = store.refresh_release_statuses()?;
    let version = store.schema_version()?;
    tracing::info!(path = %path.display(), version, "database ready");

    if global.quiet {
        return Ok(());
    }

    let verb = if existed { "Checked" } else { "Created" };
    println!(
        "{} {} database {} (schema v{})",
        style("✓").green(),
        verb,
        style(path.display()).cyan(),
        version
    );
    for table in IndexTable::ALL {
        println!(
            "   {:<18} {} rows",
            table.label(),
            style(table.rows().len()).dim()
        );
    }
    if changed > 0 {
        println!("   {} release status(es) refreshed", changed);
    }
    println!();
    println!("Next steps:");
    println!("  {} Add a team member", style("epm member new --name ... --role DEV").yellow());
    println!("  {} Plan a release", style("epm release new R1 -d ... -s ... -i ...").yellow());
    println!("  {} Open the web front end", style("epm serve").yellow());
    Ok(())
}
