//! CSV export of entity lists

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use clap::ValueEnum;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::entities::{Activity, Member, Project, Release};

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    #[diagnostic(code(epm::export::csv))]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8")]
    #[diagnostic(code(epm::export::encoding))]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("failed to finish CSV output: {0}")]
    #[diagnostic(code(epm::export::io))]
    Io(#[from] std::io::Error),
}

/// Entity lists that can be exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportEntity {
    Members,
    Releases,
    Projects,
    Activities,
}

impl ExportEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportEntity::Members => "members",
            ExportEntity::Releases => "releases",
            ExportEntity::Projects => "projects",
            ExportEntity::Activities => "activities",
        }
    }
}

impl std::fmt::Display for ExportEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub const MEMBER_HEADERS: &[&str] = &[
    "name",
    "role",
    "status",
    "vacation_start",
    "vacation_end",
    "created_at",
    "updated_at",
];

pub const RELEASE_HEADERS: &[&str] = &[
    "release_code",
    "status",
    "delivery_date",
    "start_date",
    "installation_date",
    "created_at",
    "updated_at",
];

pub const PROJECT_HEADERS: &[&str] = &[
    "project_code",
    "title",
    "pm_responsible",
    "eba_responsible",
    "status",
    "e2e_date",
    "target_release",
    "created_at",
    "updated_at",
];

pub const ACTIVITY_HEADERS: &[&str] = &[
    "title",
    "type",
    "subtype",
    "status",
    "project",
    "assigned_member",
    "target_release",
    "ticket_code",
    "start_date",
    "end_date",
    "created_at",
    "updated_at",
];

/// Download name for an export taken at `now`, e.g. `members_20240615_093000.csv`
pub fn export_filename(entity: ExportEntity, now: DateTime<Utc>) -> String {
    format!("{}_{}.csv", entity, now.format("%Y%m%d_%H%M%S"))
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn write_rows(headers: &[&str], rows: impl IntoIterator<Item = Vec<String>>) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

pub fn members_csv(members: &[Member]) -> Result<String, ExportError> {
    write_rows(
        MEMBER_HEADERS,
        members.iter().map(|m| {
            vec![
                m.name.clone(),
                m.role_name.clone(),
                m.status_name.clone(),
                date(m.vacation_start),
                date(m.vacation_end),
                timestamp(&m.created_at),
                timestamp(&m.updated_at),
            ]
        }),
    )
}

pub fn releases_csv(releases: &[Release]) -> Result<String, ExportError> {
    write_rows(
        RELEASE_HEADERS,
        releases.iter().map(|r| {
            vec![
                r.release_code.clone(),
                r.status_name.clone(),
                r.delivery_date.to_string(),
                r.start_date.to_string(),
                r.installation_date.to_string(),
                timestamp(&r.created_at),
                timestamp(&r.updated_at),
            ]
        }),
    )
}

pub fn projects_csv(projects: &[Project]) -> Result<String, ExportError> {
    write_rows(
        PROJECT_HEADERS,
        projects.iter().map(|p| {
            vec![
                p.project_code.clone(),
                p.title.clone(),
                p.pm_responsible.clone(),
                p.eba_responsible.clone(),
                p.status_name.clone(),
                date(p.e2e_date),
                text(p.target_release_code.as_deref()),
                timestamp(&p.created_at),
                timestamp(&p.updated_at),
            ]
        }),
    )
}

pub fn activities_csv(activities: &[Activity]) -> Result<String, ExportError> {
    write_rows(
        ACTIVITY_HEADERS,
        activities.iter().map(|a| {
            vec![
                a.title.clone(),
                a.type_name.clone(),
                a.subtype_name.clone(),
                a.status_name.clone(),
                text(a.project_code.as_deref()),
                text(a.assigned_member_name.as_deref()),
                text(a.target_release_code.as_deref()),
                text(a.ticket_code.as_deref()),
                date(a.start_date),
                a.end_date.as_ref().map(timestamp).unwrap_or_default(),
                timestamp(&a.created_at),
                timestamp(&a.updated_at),
            ]
        }),
    )
}
