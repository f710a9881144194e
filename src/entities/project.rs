//! Project entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::index::IndexTable;
use crate::core::rules;

/// A project, identified by a `PR<digits>` code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub project_code: String,
    pub title: String,
    pub pm_responsible: String,
    pub eba_responsible: String,
    pub status_code: String,

    /// End-to-end test date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e2e_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_release_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub status_name: String,

    /// Code of the target release (display only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_release_code: Option<String>,
}

impl Project {
    pub fn is_closed(&self) -> bool {
        rules::project_is_closed(&self.status_code)
    }

    pub(crate) fn resolve_names(&mut self) {
        self.status_name = IndexTable::ProjectStatus.display_name(&self.status_code);
    }
}

/// Editable project fields; the project code is fixed at creation
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProjectInput {
    pub title: String,
    pub pm_responsible: String,
    pub eba_responsible: String,
    pub status_code: String,
    pub e2e_date: Option<NaiveDate>,
    pub target_release_id: Option<i64>,
}

impl From<&Project> for ProjectInput {
    fn from(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            pm_responsible: project.pm_responsible.clone(),
            eba_responsible: project.eba_responsible.clone(),
            status_code: project.status_code.clone(),
            e2e_date: project.e2e_date,
            target_release_id: project.target_release_id,
        }
    }
}

/// List filters for projects
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    /// Substring of either the project code or the title
    pub search: Option<String>,
    pub status_code: Option<String>,
    pub target_release_id: Option<i64>,
}
