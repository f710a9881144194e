//! CLI command implementations

pub mod activity;
pub mod completions;
pub mod dashboard;
pub mod export;
pub mod index;
pub mod init;
pub mod link;
pub mod member;
pub mod project;
pub mod refresh;
pub mod release;
pub mod serve;
