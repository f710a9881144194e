//! Form bodies and list queries
//!
//! Browsers submit every field as a string, so forms keep raw strings and
//! convert to typed inputs here. Empty strings mean "absent"; malformed dates
//! or ids are invalid input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::store::RepoError;
use crate::entities::{
    Activity, ActivityFilter, ActivityInput, LinkInput, Member, MemberFilter, MemberInput, Project,
    ProjectFilter, ProjectInput, Release, ReleaseDates, ReleaseFilter,
};

fn present(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn present_owned(value: &Option<String>) -> Option<String> {
    value.as_deref().and_then(present).map(String::from)
}

pub fn parse_date(value: &str, field: &str) -> Result<Option<NaiveDate>, RepoError> {
    present(value)
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .map_err(|_| RepoError::invalid(format!("Invalid date in {}.", field)))
        })
        .transpose()
}

pub fn require_date(value: &str, field: &str) -> Result<NaiveDate, RepoError> {
    parse_date(value, field)?
        .ok_or_else(|| RepoError::invalid(format!("{} is required.", field)))
}

pub fn parse_id(value: &str, field: &str) -> Result<Option<i64>, RepoError> {
    present(value)
        .map(|v| {
            v.parse::<i64>()
                .map_err(|_| RepoError::invalid(format!("Invalid id in {}.", field)))
        })
        .transpose()
}

fn date_text(value: Option<NaiveDate>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

fn id_text(value: Option<i64>) -> String {
    value.map(|id| id.to_string()).unwrap_or_default()
}

/// Only same-site paths are accepted as redirect targets
pub fn safe_next(next: Option<&str>, fallback: &str) -> String {
    match next.and_then(present) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => fallback.to_string(),
    }
}

/// Append `msg=<code>` to a redirect target
pub fn with_msg(target: &str, code: &str) -> String {
    let separator = if target.contains('?') { '&' } else { '?' };
    format!("{}{}msg={}", target, separator, code)
}

// ===== Members =====

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberForm {
    pub name: String,
    pub role_code: String,
    pub status_code: String,
    pub vacation_start: String,
    pub vacation_end: String,
}

impl MemberForm {
    pub fn to_input(&self) -> Result<MemberInput, RepoError> {
        Ok(MemberInput {
            name: self.name.clone(),
            role_code: self.role_code.trim().to_string(),
            status_code: self.status_code.trim().to_string(),
            vacation_start: parse_date(&self.vacation_start, "vacation_start")?,
            vacation_end: parse_date(&self.vacation_end, "vacation_end")?,
        })
    }
}

impl From<&Member> for MemberForm {
    fn from(member: &Member) -> Self {
        Self {
            name: member.name.clone(),
            role_code: member.role_code.clone(),
            status_code: member.status_code.clone(),
            vacation_start: date_text(member.vacation_start),
            vacation_end: date_text(member.vacation_end),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberQuery {
    pub q: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub msg: Option<String>,
}

impl MemberQuery {
    pub fn filter(&self) -> MemberFilter {
        MemberFilter {
            name_like: present_owned(&self.q),
            role_code: present_owned(&self.role),
            status_code: present_owned(&self.status),
        }
    }
}

// ===== Releases =====

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseForm {
    /// Read on create only; codes are immutable
    pub release_code: String,
    pub delivery_date: String,
    pub start_date: String,
    pub installation_date: String,
}

impl ReleaseForm {
    pub fn to_dates(&self) -> Result<ReleaseDates, RepoError> {
        Ok(ReleaseDates {
            delivery_date: require_date(&self.delivery_date, "delivery_date")?,
            start_date: require_date(&self.start_date, "start_date")?,
            installation_date: require_date(&self.installation_date, "installation_date")?,
        })
    }
}

impl From<&Release> for ReleaseForm {
    fn from(release: &Release) -> Self {
        Self {
            release_code: release.release_code.clone(),
            delivery_date: release.delivery_date.to_string(),
            start_date: release.start_date.to_string(),
            installation_date: release.installation_date.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub msg: Option<String>,
}

impl ReleaseQuery {
    pub fn filter(&self) -> ReleaseFilter {
        ReleaseFilter {
            code_like: present_owned(&self.q),
            status_code: present_owned(&self.status),
        }
    }
}

// ===== Projects =====

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectForm {
    /// Read on create only; codes are immutable
    pub project_code: String,
    pub title: String,
    pub pm_responsible: String,
    pub eba_responsible: String,
    pub status_code: String,
    pub e2e_date: String,
    pub target_release_id: String,
}

impl ProjectForm {
    pub fn to_input(&self) -> Result<ProjectInput, RepoError> {
        Ok(ProjectInput {
            title: self.title.clone(),
            pm_responsible: self.pm_responsible.clone(),
            eba_responsible: self.eba_responsible.clone(),
            status_code: self.status_code.trim().to_string(),
            e2e_date: parse_date(&self.e2e_date, "e2e_date")?,
            target_release_id: parse_id(&self.target_release_id, "target_release_id")?,
        })
    }
}

impl From<&Project> for ProjectForm {
    fn from(project: &Project) -> Self {
        Self {
            project_code: project.project_code.clone(),
            title: project.title.clone(),
            pm_responsible: project.pm_responsible.clone(),
            eba_responsible: project.eba_responsible.clone(),
            status_code: project.status_code.clone(),
            e2e_date: date_text(project.e2e_date),
            target_release_id: id_text(project.target_release_id),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub target_release_id: Option<String>,
    pub msg: Option<String>,
}

impl ProjectQuery {
    pub fn filter(&self) -> Result<ProjectFilter, RepoError> {
        Ok(ProjectFilter {
            search: present_owned(&self.q),
            status_code: present_owned(&self.status),
            target_release_id: parse_id(
                self.target_release_id.as_deref().unwrap_or_default(),
                "target_release_id",
            )?,
        })
    }
}

// ===== Activities =====

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityForm {
    pub type_code: String,
    pub subtype_code: String,
    pub status_code: String,
    pub title: String,
    pub ticket_code: String,
    pub assigned_member_id: String,
    pub project_id: String,
    pub target_release_id: String,
    pub start_date: String,
    /// Where to go after saving
    pub next: String,
}

impl ActivityForm {
    pub fn to_input(&self) -> Result<ActivityInput, RepoError> {
        Ok(ActivityInput {
            type_code: self.type_code.trim().to_string(),
            subtype_code: self.subtype_code.trim().to_string(),
            status_code: self.status_code.trim().to_string(),
            title: self.title.clone(),
            ticket_code: present(&self.ticket_code).map(String::from),
            assigned_member_id: parse_id(&self.assigned_member_id, "assigned_member_id")?,
            project_id: parse_id(&self.project_id, "project_id")?,
            target_release_id: parse_id(&self.target_release_id, "target_release_id")?,
            start_date: parse_date(&self.start_date, "start_date")?,
        })
    }
}

impl From<&Activity> for ActivityForm {
    fn from(activity: &Activity) -> Self {
        Self {
            type_code: activity.type_code.clone(),
            subtype_code: activity.subtype_code.clone(),
            status_code: activity.status_code.clone(),
            title: activity.title.clone(),
            ticket_code: activity.ticket_code.clone().unwrap_or_default(),
            assigned_member_id: id_text(activity.assigned_member_id),
            project_id: id_text(activity.project_id),
            target_release_id: id_text(activity.target_release_id),
            start_date: date_text(activity.start_date),
            next: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<String>,
    pub assigned_member_id: Option<String>,
    /// Any non-empty value hides closed activities
    pub open: Option<String>,
    pub msg: Option<String>,
    pub next: Option<String>,
}

impl ActivityQuery {
    pub fn filter(&self) -> Result<ActivityFilter, RepoError> {
        Ok(ActivityFilter {
            status_code: present_owned(&self.status),
            project_id: parse_id(self.project_id.as_deref().unwrap_or_default(), "project_id")?,
            assigned_member_id: parse_id(
                self.assigned_member_id.as_deref().unwrap_or_default(),
                "assigned_member_id",
            )?,
            title_like: present_owned(&self.q),
            open_only: present_owned(&self.open).is_some(),
        })
    }
}

// ===== Links =====

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkForm {
    pub label: String,
    pub type_code: String,
    pub url: String,
}

impl LinkForm {
    pub fn to_input(&self) -> LinkInput {
        LinkInput {
            label: self.label.clone(),
            type_code: self.type_code.trim().to_string(),
            url: self.url.clone(),
        }
    }
}

/// Query carrying only a flash code
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FlashQuery {
    pub msg: Option<String>,
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_blank_and_invalid() {
        assert_eq!(parse_date("", "start_date").unwrap(), None);
        assert_eq!(parse_date("  ", "start_date").unwrap(), None);
        assert_eq!(
            parse_date("2024-02-29", "start_date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        let err = parse_date("29/02/2024", "start_date").unwrap_err();
        assert_eq!(err.to_string(), "Invalid date in start_date.");
    }

    #[test]
    fn test_require_date() {
        let err = require_date("", "installation_date").unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("", "project_id").unwrap(), None);
        assert_eq!(parse_id(" 12 ", "project_id").unwrap(), Some(12));
        assert!(parse_id("twelve", "project_id").is_err());
    }

    #[test]
    fn test_safe_next_rejects_offsite_targets() {
        assert_eq!(safe_next(Some("/dashboards/daily-meeting"), "/activities"), "/dashboards/daily-meeting");
        assert_eq!(safe_next(Some("https://evil.example"), "/activities"), "/activities");
        assert_eq!(safe_next(Some("//evil.example"), "/activities"), "/activities");
        assert_eq!(safe_next(Some(""), "/activities"), "/activities");
        assert_eq!(safe_next(None, "/activities"), "/activities");
    }

    #[test]
    fn test_with_msg() {
        assert_eq!(with_msg("/members", "created"), "/members?msg=created");
        assert_eq!(with_msg("/activities?open=1", "updated"), "/activities?open=1&msg=updated");
    }

    #[test]
    fn test_activity_form_blank_fields_are_absent() {
        let form = ActivityForm {
            type_code: "001".to_string(),
            subtype_code: "002".to_string(),
            status_code: "002".to_string(),
            title: "Bug".to_string(),
            ticket_code: "  ".to_string(),
            project_id: "3".to_string(),
            ..Default::default()
        };
        let input = form.to_input().unwrap();
        assert_eq!(input.ticket_code, None);
        assert_eq!(input.project_id, Some(3));
        assert_eq!(input.assigned_member_id, None);
        assert_eq!(input.start_date, None);
    }

    #[test]
    fn test_activity_query_open_flag() {
        let query = ActivityQuery {
            open: Some("1".to_string()),
            ..Default::default()
        };
        assert!(query.filter().unwrap().open_only);
        assert!(!ActivityQuery::default().filter().unwrap().open_only);
    }
}
