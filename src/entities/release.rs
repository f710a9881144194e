//! Release entity - a delivery window with derived status

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::index::IndexTable;
use crate::core::rules;

/// A release and its calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: i64,
    pub release_code: String,
    pub status_code: String,
    pub delivery_date: NaiveDate,
    pub start_date: NaiveDate,
    pub installation_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub status_name: String,
}

impl Release {
    /// Status as of `today`, independent of the stored `status_code`
    pub fn status_on(&self, today: NaiveDate) -> rules::ReleaseStatus {
        rules::release_status_for_dates(self.start_date, self.installation_date, today)
    }

    pub(crate) fn resolve_names(&mut self) {
        self.status_name = IndexTable::ReleaseStatus.display_name(&self.status_code);
    }
}

/// The editable dates of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ReleaseDates {
    pub delivery_date: NaiveDate,
    pub start_date: NaiveDate,
    pub installation_date: NaiveDate,
}

impl From<&Release> for ReleaseDates {
    fn from(release: &Release) -> Self {
        Self {
            delivery_date: release.delivery_date,
            start_date: release.start_date,
            installation_date: release.installation_date,
        }
    }
}

/// List filters for releases
#[derive(Debug, Clone, Default)]
pub struct ReleaseFilter {
    pub code_like: Option<String>,
    pub status_code: Option<String>,
}
