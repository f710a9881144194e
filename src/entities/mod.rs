//! Entity type definitions
//!
//! Eagle PM tracks four record types plus their links:
//!
//! - [`Member`] - team members with a role and availability
//! - [`Release`] - delivery windows whose status follows the calendar
//! - [`Project`] - `PR<digits>` projects optionally targeting a release
//! - [`Activity`] - work items assigned to members, projects and releases
//! - [`Link`] - labelled URLs attached to releases and activities
//!
//! Each module also carries the input and filter types the repository takes.

pub mod activity;
pub mod link;
pub mod member;
pub mod project;
pub mod release;

pub use activity::{Activity, ActivityFilter, ActivityInput};
pub use link::{Link, LinkInput, LinkOwner};
pub use member::{Member, MemberFilter, MemberInput};
pub use project::{Project, ProjectFilter, ProjectInput};
pub use release::{Release, ReleaseDates, ReleaseFilter};
