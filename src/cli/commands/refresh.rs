//! `epm refresh` command - Re-derive release statuses for today

use console::style;
use miette::Result;

use crate::cli::helpers::open_store;
use crate::cli::{GlobalOpts, OutputFormat};

pub fn run(global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let changed = store.refresh_release_statuses()?;

    match global.format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "changed": changed })),
        OutputFormat::Id => println!("{}", changed),
        _ if global.quiet => {}
        _ => println!(
            "{} {} release status(es) changed as of {}",
            style("✓").green(),
            style(changed).cyan(),
            store.today()
        ),
    }
    Ok(())
}
