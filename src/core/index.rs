//! Reference data - fixed code → name lookup tables
//!
//! Every coded field on an entity (role, statuses, types, link types) points
//! at one of these tables. The rows are seeded into the database when a store
//! is opened, and the static copy here is used to resolve display names.

use clap::ValueEnum;
use serde::Serialize;

pub const USER_STATUS_ACTIVE: &str = "001";
pub const USER_STATUS_VACATION: &str = "002";

pub const RELEASE_STATUS_PLANNED: &str = "001";
pub const RELEASE_STATUS_IN_PROGRESS: &str = "002";
pub const RELEASE_STATUS_INSTALLED: &str = "003";

pub const PROJECT_STATUS_CLOSED: &str = "007";

pub const ACTIVITY_STATUS_CLOSED: &str = "005";

const ROLES: &[(&str, &str)] = &[("001", "BA"), ("002", "QA"), ("003", "DEV")];

const USER_STATUSES: &[(&str, &str)] = &[
    (USER_STATUS_ACTIVE, "ACTIVE"),
    (USER_STATUS_VACATION, "VACATION"),
];

const RELEASE_STATUSES: &[(&str, &str)] = &[
    (RELEASE_STATUS_PLANNED, "PLANNED"),
    (RELEASE_STATUS_IN_PROGRESS, "IN_PROGRESS"),
    (RELEASE_STATUS_INSTALLED, "INSTALLED"),
];

const LINK_TYPES: &[(&str, &str)] = &[("001", "REQUIREMENT"), ("002", "JIRA"), ("003", "OTHER")];

const PROJECT_STATUSES: &[(&str, &str)] = &[
    ("001", "PENDING_HLE"),
    ("002", "PENDING_APPROVAL"),
    ("003", "APPROVED"),
    ("004", "PLANNED"),
    ("005", "IN_PROGRESS"),
    ("006", "E2E"),
    (PROJECT_STATUS_CLOSED, "CLOSED"),
    ("008", "BLOCKED"),
];

const ACTIVITY_TYPES: &[(&str, &str)] = &[("001", "JIRA"), ("002", "INTERNAL")];

const ACTIVITY_SUBTYPES: &[(&str, &str)] = &[
    ("001", "STORY"),
    ("002", "BUG"),
    ("003", "PRODDEF"),
    ("004", "OPY"),
    ("005", "INTERNAL"),
];

const ACTIVITY_STATUSES: &[(&str, &str)] = &[
    ("001", "PLANNED"),
    ("002", "OPEN"),
    ("003", "BLOCKED"),
    ("004", "IN_PROGRESS"),
    (ACTIVITY_STATUS_CLOSED, "CLOSED"),
];

/// One of the reference tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum IndexTable {
    Role,
    UserStatus,
    ReleaseStatus,
    LinkType,
    ProjectStatus,
    ActivityType,
    ActivitySubtype,
    ActivityStatus,
}

impl IndexTable {
    pub const ALL: [IndexTable; 8] = [
        IndexTable::Role,
        IndexTable::UserStatus,
        IndexTable::ReleaseStatus,
        IndexTable::LinkType,
        IndexTable::ProjectStatus,
        IndexTable::ActivityType,
        IndexTable::ActivitySubtype,
        IndexTable::ActivityStatus,
    ];

    /// SQL table holding this reference data
    pub fn table_name(&self) -> &'static str {
        match self {
            IndexTable::Role => "index_role",
            IndexTable::UserStatus => "index_user_status",
            IndexTable::ReleaseStatus => "index_release_status",
            IndexTable::LinkType => "index_link_type",
            IndexTable::ProjectStatus => "index_project_status",
            IndexTable::ActivityType => "index_activity_type",
            IndexTable::ActivitySubtype => "index_activity_subtype",
            IndexTable::ActivityStatus => "index_activity_status",
        }
    }

    /// Human label used in validation messages
    pub fn label(&self) -> &'static str {
        match self {
            IndexTable::Role => "role",
            IndexTable::UserStatus => "member status",
            IndexTable::ReleaseStatus => "release status",
            IndexTable::LinkType => "link type",
            IndexTable::ProjectStatus => "project status",
            IndexTable::ActivityType => "activity type",
            IndexTable::ActivitySubtype => "activity subtype",
            IndexTable::ActivityStatus => "activity status",
        }
    }

    /// Seed rows, ordered by code
    pub fn rows(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            IndexTable::Role => ROLES,
            IndexTable::UserStatus => USER_STATUSES,
            IndexTable::ReleaseStatus => RELEASE_STATUSES,
            IndexTable::LinkType => LINK_TYPES,
            IndexTable::ProjectStatus => PROJECT_STATUSES,
            IndexTable::ActivityType => ACTIVITY_TYPES,
            IndexTable::ActivitySubtype => ACTIVITY_SUBTYPES,
            IndexTable::ActivityStatus => ACTIVITY_STATUSES,
        }
    }

    /// Look up the name for a code
    pub fn name_of(&self, code: &str) -> Option<&'static str> {
        self.rows()
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
    }

    /// Name for a code, falling back to the code itself for unknown values
    pub fn display_name(&self, code: &str) -> String {
        self.name_of(code)
            .map(String::from)
            .unwrap_or_else(|| code.to_string())
    }

    /// Resolve user input that may be either a code ("005") or a name ("closed")
    pub fn resolve_code(&self, input: &str) -> Option<&'static str> {
        let input = input.trim();
        self.rows()
            .iter()
            .find(|(code, name)| *code == input || name.eq_ignore_ascii_case(input))
            .map(|(code, _)| *code)
    }
}

impl std::fmt::Display for IndexTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
