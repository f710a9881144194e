//! Core module - reference data, status rules, persistence and reports

pub mod config;
pub mod dashboard;
pub mod export;
pub mod index;
pub mod rules;
pub mod store;

pub use config::{Config, ConfigError};
pub use dashboard::{DailyMeeting, MemberAgenda, ProjectCard, ProjectControl, StatusColumn};
pub use export::{ExportEntity, ExportError};
pub use index::IndexTable;
pub use rules::ReleaseStatus;
pub use store::{RepoError, RepoResult, Store};
