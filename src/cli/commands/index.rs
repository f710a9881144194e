//! `epm index` command - Print the reference tables

use console::style;
use miette::Result;

use crate::cli::helpers::{open_store, print_json};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::index::IndexTable;

#[derive(clap::Args, Debug)]
pub struct IndexArgs {
    /// Table to print (default: all)
    #[arg(value_enum)]
    pub table: Option<IndexTable>,
}

pub fn run(args: IndexArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let tables: Vec<IndexTable> = match args.table {
        Some(table) => vec![table],
        None => IndexTable::ALL.to_vec(),
    };

    if global.format == OutputFormat::Json {
        let mut out = serde_json::Map::new();
        for table in &tables {
            let rows: Vec<serde_json::Value> = store
                .index_options(*table)?
                .into_iter()
                .map(|(code, name)| serde_json::json!({ "code": code, "name": name }))
                .collect();
            out.insert(table.table_name().to_string(), serde_json::Value::Array(rows));
        }
        return print_json(&out);
    }

    for (i, table) in tables.iter().enumerate() {
        let rows = store.index_options(*table)?;
        match global.format {
            OutputFormat::Csv => {
                for (code, name) in rows {
                    println!("{},{},{}", table.table_name(), code, name);
                }
            }
            _ => {
                if i > 0 {
                    println!();
                }
                println!("{}", style(table.label()).bold());
                for (code, name) in rows {
                    println!("  {}  {}", style(code).cyan(), name);
                }
            }
        }
    }
    Ok(())
}
