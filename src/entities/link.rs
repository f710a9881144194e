//! Links - labelled URLs attached to a release or an activity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::index::IndexTable;

/// Which kind of record owns a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkOwner {
    Release,
    Activity,
}

impl LinkOwner {
    pub(crate) fn table(&self) -> &'static str {
        match self {
            LinkOwner::Release => "release_links",
            LinkOwner::Activity => "activity_links",
        }
    }

    pub(crate) fn owner_column(&self) -> &'static str {
        match self {
            LinkOwner::Release => "release_id",
            LinkOwner::Activity => "activity_id",
        }
    }

    pub(crate) fn owner_table(&self) -> &'static str {
        match self {
            LinkOwner::Release => "releases",
            LinkOwner::Activity => "activities",
        }
    }

    pub fn entity_name(&self) -> &'static str {
        match self {
            LinkOwner::Release => "release",
            LinkOwner::Activity => "activity",
        }
    }
}

impl std::fmt::Display for LinkOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.entity_name())
    }
}

/// A link attached to a release or activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub owner_id: i64,
    pub label: String,
    pub type_code: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub type_name: String,
}

impl Link {
    pub(crate) fn resolve_names(&mut self) {
        self.type_name = IndexTable::LinkType.display_name(&self.type_code);
    }
}

/// Fields accepted when adding a link
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LinkInput {
    pub label: String,
    pub type_code: String,
    pub url: String,
}
