//! Activity entity - a unit of work, optionally tied to a project and release

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::index::IndexTable;
use crate::core::rules;

/// A tracked activity (ticket, internal task, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub type_code: String,
    pub subtype_code: String,
    pub status_code: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_member_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_release_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// Set when the activity is closed, cleared when it is reopened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub subtype_name: String,
    #[serde(default)]
    pub status_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_member_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_release_code: Option<String>,
}

impl Activity {
    pub fn is_closed(&self) -> bool {
        rules::activity_is_closed(&self.status_code)
    }

    pub(crate) fn resolve_names(&mut self) {
        self.type_name = IndexTable::ActivityType.display_name(&self.type_code);
        self.subtype_name = IndexTable::ActivitySubtype.display_name(&self.subtype_code);
        self.status_name = IndexTable::ActivityStatus.display_name(&self.status_code);
    }
}

/// Fields accepted when creating or updating an activity
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActivityInput {
    pub type_code: String,
    pub subtype_code: String,
    pub status_code: String,
    pub title: String,
    pub ticket_code: Option<String>,
    pub assigned_member_id: Option<i64>,
    pub project_id: Option<i64>,
    pub target_release_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
}

impl From<&Activity> for ActivityInput {
    fn from(activity: &Activity) -> Self {
        Self {
            type_code: activity.type_code.clone(),
            subtype_code: activity.subtype_code.clone(),
            status_code: activity.status_code.clone(),
            title: activity.title.clone(),
            ticket_code: activity.ticket_code.clone(),
            assigned_member_id: activity.assigned_member_id,
            project_id: activity.project_id,
            target_release_id: activity.target_release_id,
            start_date: activity.start_date,
        }
    }
}

/// List filters for activities
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub status_code: Option<String>,
    pub project_id: Option<i64>,
    pub assigned_member_id: Option<i64>,
    pub title_like: Option<String>,
    /// Exclude closed activities
    pub open_only: bool,
}
