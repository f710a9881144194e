//! Shared helper functions for CLI commands
//!
//! Store access, reference resolution and small formatting utilities used
//! across the entity command modules.

use chrono::NaiveDate;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::index::IndexTable;
use crate::core::{Config, Store};
use crate::entities::MemberFilter;

/// Open the store named by `--db`, falling back to the layered config
pub fn open_store(global: &GlobalOpts) -> Result<Store> {
    let path = match &global.db {
        Some(path) => path.clone(),
        None => Config::load()?.db_path(),
    };
    tracing::debug!(path = %path.display(), "opening store");
    Ok(Store::open(&path)?)
}

/// Resolve a reference-table value given as a code ("005") or a name ("closed")
pub fn resolve_index(table: IndexTable, input: &str) -> Result<String> {
    table.resolve_code(input).map(String::from).ok_or_else(|| {
        let names: Vec<&str> = table.rows().iter().map(|(_, name)| *name).collect();
        miette::miette!(
            "Unknown {} '{}' (expected one of: {})",
            table.label(),
            input,
            names.join(", ")
        )
    })
}

/// Resolve a release given as a release code or an id
///
/// Codes win: a numeric code such as "2407" names that release even when
/// another release has that id.
pub fn resolve_release(store: &Store, input: &str) -> Result<i64> {
    let input = input.trim();
    if let Some(release) = store.find_release_by_code(input)? {
        return Ok(release.id);
    }
    let by_id = match input.parse::<i64>() {
        Ok(id) => store.find_release(id)?,
        Err(_) => None,
    };
    by_id
        .map(|r| r.id)
        .ok_or_else(|| miette::miette!("No release found matching '{}'", input))
}

/// Resolve a project given as an id or a project code
pub fn resolve_project(store: &Store, input: &str) -> Result<i64> {
    if let Ok(id) = input.trim().parse::<i64>() {
        return Ok(store.get_project(id)?.id);
    }
    store
        .find_project_by_code(input.trim())?
        .map(|p| p.id)
        .ok_or_else(|| miette::miette!("No project found matching '{}'", input))
}

/// Resolve a member given as an id or an exact (case-insensitive) name
pub fn resolve_member(store: &Store, input: &str) -> Result<i64> {
    let input = input.trim();
    if let Ok(id) = input.parse::<i64>() {
        return Ok(store.get_member(id)?.id);
    }
    let filter = MemberFilter {
        name_like: Some(input.to_string()),
        ..Default::default()
    };
    let matches: Vec<_> = store
        .list_members(&filter)?
        .into_iter()
        .filter(|m| m.name.eq_ignore_ascii_case(input))
        .collect();
    match matches.as_slice() {
        [member] => Ok(member.id),
        [] => Err(miette::miette!("No member found matching '{}'", input)),
        _ => Err(miette::miette!(
            "Several members are named '{}'; use the member id instead",
            input
        )),
    }
}

/// Parse an ISO-8601 calendar date (YYYY-MM-DD)
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| miette::miette!("Invalid date '{}' (expected YYYY-MM-DD)", value))
}

/// Ask before a destructive action unless `--yes` was given
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    dialoguer::Confirm::with_theme(&dialoguer::theme::ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

/// Print a success line unless `--quiet`
pub fn report_success(global: &GlobalOpts, message: impl std::fmt::Display) {
    if !global.quiet {
        println!("{} {}", style("✓").green(), message);
    }
}

/// Print one `label: value` line of a detail view
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("{:<16} {}", style(format!("{}:", label)).bold(), value);
}

/// Print an optional detail value, dimmed "-" when absent
pub fn print_optional(label: &str, value: Option<impl std::fmt::Display>) {
    match value {
        Some(v) => print_field(label, v),
        None => print_field(label, style("-").dim()),
    }
}

/// Serialize a value as pretty JSON to stdout
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
