//! Status rules - pure functions deriving status from dates and codes

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::core::index::{
    ACTIVITY_STATUS_CLOSED, PROJECT_STATUS_CLOSED, RELEASE_STATUS_INSTALLED,
    RELEASE_STATUS_IN_PROGRESS, RELEASE_STATUS_PLANNED,
};
use crate::entities::Activity;

/// Release lifecycle, derived from the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseStatus {
    Planned,
    InProgress,
    Installed,
}

impl ReleaseStatus {
    /// Reference-table code for this status
    pub fn code(&self) -> &'static str {
        match self {
            ReleaseStatus::Planned => RELEASE_STATUS_PLANNED,
            ReleaseStatus::InProgress => RELEASE_STATUS_IN_PROGRESS,
            ReleaseStatus::Installed => RELEASE_STATUS_INSTALLED,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            RELEASE_STATUS_PLANNED => Some(ReleaseStatus::Planned),
            RELEASE_STATUS_IN_PROGRESS => Some(ReleaseStatus::InProgress),
            RELEASE_STATUS_INSTALLED => Some(ReleaseStatus::Installed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseStatus::Planned => write!(f, "PLANNED"),
            ReleaseStatus::InProgress => write!(f, "IN_PROGRESS"),
            ReleaseStatus::Installed => write!(f, "INSTALLED"),
        }
    }
}

/// Derive a release's status from its window and today's date
///
/// Installed from the installation date onwards, in progress from the start
/// date up to (but excluding) the installation date, planned before that.
pub fn release_status_for_dates(
    start_date: NaiveDate,
    installation_date: NaiveDate,
    today: NaiveDate,
) -> ReleaseStatus {
    if today >= installation_date {
        ReleaseStatus::Installed
    } else if today >= start_date {
        ReleaseStatus::InProgress
    } else {
        ReleaseStatus::Planned
    }
}

/// Project codes are "PR" followed by one or more ASCII digits
pub fn project_code_is_valid(code: &str) -> bool {
    code.strip_prefix("PR")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

pub fn project_is_closed(status_code: &str) -> bool {
    status_code == PROJECT_STATUS_CLOSED
}

pub fn activity_is_closed(status_code: &str) -> bool {
    status_code == ACTIVITY_STATUS_CLOSED
}

/// End timestamp of an activity after moving from `old_status` to `new_status`
///
/// Closing stamps `now` unless an end date is already recorded; leaving the
/// closed state clears it. Any other transition keeps the current value.
pub fn end_date_after_transition(
    old_status: Option<&str>,
    new_status: &str,
    end_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let was_closed = old_status.is_some_and(activity_is_closed);
    if activity_is_closed(new_status) {
        end_date.or(Some(now))
    } else if was_closed {
        None
    } else {
        end_date
    }
}

/// Move an activity to `new_status`, keeping its end date consistent
pub fn apply_activity_status(activity: &mut Activity, new_status: &str, now: DateTime<Utc>) {
    activity.end_date =
        end_date_after_transition(Some(&activity.status_code), new_status, activity.end_date, now);
    activity.status_code = new_status.to_string();
}
