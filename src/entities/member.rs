//! Member entity - a person on the team

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::index::{IndexTable, USER_STATUS_ACTIVE, USER_STATUS_VACATION};

/// A team member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub role_code: String,
    pub status_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacation_start: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacation_end: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Resolved role name (display only)
    #[serde(default)]
    pub role_name: String,

    /// Resolved status name (display only)
    #[serde(default)]
    pub status_name: String,
}

impl Member {
    pub fn is_active(&self) -> bool {
        self.status_code == USER_STATUS_ACTIVE
    }

    /// True when the member is flagged as on vacation, or today falls inside
    /// the recorded vacation window
    pub fn is_away_on(&self, today: NaiveDate) -> bool {
        if self.status_code == USER_STATUS_VACATION {
            return true;
        }
        match (self.vacation_start, self.vacation_end) {
            (Some(start), Some(end)) => start <= today && today <= end,
            (Some(start), None) => start <= today,
            (None, Some(end)) => today <= end,
            (None, None) => false,
        }
    }

    pub(crate) fn resolve_names(&mut self) {
        self.role_name = IndexTable::Role.display_name(&self.role_code);
        self.status_name = IndexTable::UserStatus.display_name(&self.status_code);
    }
}

/// Fields accepted when creating or updating a member
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MemberInput {
    pub name: String,
    pub role_code: String,
    pub status_code: String,
    pub vacation_start: Option<NaiveDate>,
    pub vacation_end: Option<NaiveDate>,
}

impl From<&Member> for MemberInput {
    fn from(member: &Member) -> Self {
        Self {
            name: member.name.clone(),
            role_code: member.role_code.clone(),
            status_code: member.status_code.clone(),
            vacation_start: member.vacation_start,
            vacation_end: member.vacation_end,
        }
    }
}

/// List filters for members
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    /// Case-insensitive substring of the name
    pub name_like: Option<String>,
    pub role_code: Option<String>,
    pub status_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(status: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Member {
        let now = Utc::now();
        Member {
            id: 1,
            name: "Ana".to_string(),
            role_code: "003".to_string(),
            status_code: status.to_string(),
            vacation_start: start,
            vacation_end: end,
            created_at: now,
            updated_at: now,
            role_name: String::new(),
            status_name: String::new(),
        }
    }

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[test]
    fn test_vacation_status_is_always_away() {
        assert!(member("002", None, None).is_away_on(d(1, 1)));
    }

    #[test]
    fn test_vacation_window_is_inclusive() {
        let m = member("001", Some(d(7, 1)), Some(d(7, 14)));
        assert!(!m.is_away_on(d(6, 30)));
        assert!(m.is_away_on(d(7, 1)));
        assert!(m.is_away_on(d(7, 14)));
        assert!(!m.is_away_on(d(7, 15)));

        let active = member("001", None, None);
        assert!(!active.is_away_on(d(7, 1)));
    }

    #[test]
    fn test_resolve_names() {
        let mut m = member("001", None, None);
        m.resolve_names();
        assert_eq!(m.role_name, "DEV");
        assert_eq!(m.status_name, "ACTIVE");
        assert!(m.is_active());
    }
}
