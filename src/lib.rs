//! Eagle PM: a small project tracker
//!
//! Team members, releases, projects and activities in one SQLite file, with
//! a command-line front end and a server-rendered web front end.

pub mod cli;
pub mod core;
pub mod entities;
pub mod web;
