//! `epm dashboard` command - Daily meeting and project control boards

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{open_store, print_json, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::dashboard::{self, DailyMeeting, ProjectControl};
use crate::entities::Activity;
use crate::web::{page, Views};

#[derive(Subcommand, Debug)]
pub enum DashboardCommands {
    /// Every member with their open activities, plus unassigned work
    Daily(BoardArgs),

    /// Non-closed projects grouped by status
    Projects(BoardArgs),
}

#[derive(clap::Args, Debug)]
pub struct BoardArgs {
    /// Render the same HTML page the web front end serves
    #[arg(long)]
    pub html: bool,

    /// Write output to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Run a dashboard subcommand
pub fn run(cmd: DashboardCommands, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    match cmd {
        DashboardCommands::Daily(args) => {
            let board = dashboard::daily_meeting(&mut store)?;
            if args.html {
                return write_html(&args, "daily_meeting.html", "Daily Meeting", &board);
            }
            if global.format == OutputFormat::Json {
                return print_json(&board);
            }
            print_daily(&board);
            Ok(())
        }
        DashboardCommands::Projects(args) => {
            let board = dashboard::project_control(&mut store)?;
            if args.html {
                return write_html(&args, "project_control.html", "Project Control", &board);
            }
            if global.format == OutputFormat::Json {
                return print_json(&board);
            }
            print_project_control(&board);
            Ok(())
        }
    }
}

fn write_html<T: serde::Serialize>(
    args: &BoardArgs,
    template: &str,
    title: &str,
    board: &T,
) -> Result<()> {
    let views = Views::new()?;
    let mut context = page(title);
    context.insert("board", board);
    let html = views.render(template, &context)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, html).into_diagnostic()?;
            eprintln!("{} Wrote {}", style("✓").green(), style(path.display()).cyan());
        }
        None => println!("{}", html),
    }
    Ok(())
}

fn activity_line(activity: &Activity) -> String {
    let mut line = format!(
        "{} {} {}",
        style(format!("#{}", activity.id)).cyan(),
        truncate_str(&activity.title, 48),
        style(&activity.status_name).dim()
    );
    if let Some(code) = &activity.project_code {
        line.push_str(&format!(" {}", style(code).yellow()));
    }
    if let Some(ticket) = &activity.ticket_code {
        line.push_str(&format!(" {}", style(ticket).dim()));
    }
    line
}

fn print_daily(board: &DailyMeeting) {
    println!(
        "{} {}  {} open",
        style("Daily meeting").bold(),
        style(board.today).cyan(),
        board.open_activity_count()
    );
    println!();

    for agenda in &board.members {
        let mut header = format!(
            "{} {}",
            style(&agenda.member.name).bold(),
            style(&agenda.member.role_name).dim()
        );
        if agenda.on_vacation {
            header.push_str(&format!(" {}", style("(on vacation)").magenta()));
        }
        println!("{}", header);
        if agenda.activities.is_empty() {
            println!("  {}", style("nothing open").dim());
        }
        for activity in &agenda.activities {
            println!("  {}", activity_line(activity));
        }
    }

    println!();
    println!("{}", style("Unassigned").bold());
    if board.unassigned.is_empty() {
        println!("  {}", style("every open activity has an owner").dim());
    }
    for activity in &board.unassigned {
        println!("  {}", activity_line(activity));
    }
}

fn print_project_control(board: &ProjectControl) {
    for column in &board.columns {
        println!(
            "{} {}",
            style(&column.name).bold(),
            style(format!("({})", column.projects.len())).dim()
        );
        for card in &column.projects {
            let project = &card.project;
            let release = project
                .target_release_code
                .as_deref()
                .map(|code| format!(" → {}", code))
                .unwrap_or_default();
            println!(
                "  {} {}{}",
                style(&project.project_code).cyan(),
                truncate_str(&project.title, 48),
                style(release).dim()
            );
            for activity in &card.activities {
                println!("    {}", activity_line(activity));
            }
        }
    }
}
