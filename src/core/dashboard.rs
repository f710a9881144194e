//! Dashboards - read-only views assembled from the store
//!
//! Both dashboards refresh release statuses before reading, so targets shown
//! next to projects reflect today's calendar.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::index::{IndexTable, PROJECT_STATUS_CLOSED};
use crate::core::store::{RepoResult, Store};
use crate::entities::{Activity, ActivityFilter, Member, MemberFilter, Project, ProjectFilter};

/// One member's row on the daily meeting board
#[derive(Debug, Clone, Serialize)]
pub struct MemberAgenda {
    pub member: Member,
    /// On vacation today (flagged or inside the vacation window)
    pub on_vacation: bool,
    /// Open activities assigned to the member
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyMeeting {
    pub today: NaiveDate,
    pub members: Vec<MemberAgenda>,
    /// Open activities nobody is assigned to
    pub unassigned: Vec<Activity>,
}

impl DailyMeeting {
    pub fn open_activity_count(&self) -> usize {
        self.members.iter().map(|m| m.activities.len()).sum::<usize>() + self.unassigned.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectCard {
    pub project: Project,
    pub activities: Vec<Activity>,
}

/// Projects sharing one status
#[derive(Debug, Clone, Serialize)]
pub struct StatusColumn {
    pub code: String,
    pub name: String,
    pub projects: Vec<ProjectCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectControl {
    pub columns: Vec<StatusColumn>,
}

/// Build the daily meeting board: every member with their open work
pub fn daily_meeting(store: &mut Store) -> RepoResult<DailyMeeting> {
    store.refresh_release_statuses()?;
    let today = store.today();

    let members = store.list_members(&MemberFilter::default())?;
    let open = store.list_activities(&ActivityFilter {
        open_only: true,
        ..Default::default()
    })?;

    let mut by_member: HashMap<i64, Vec<Activity>> = HashMap::new();
    let mut unassigned = Vec::new();
    for activity in open {
        match activity.assigned_member_id {
            Some(member_id) => by_member.entry(member_id).or_default().push(activity),
            None => unassigned.push(activity),
        }
    }

    let members = members
        .into_iter()
        .map(|member| MemberAgenda {
            on_vacation: member.is_away_on(today),
            activities: by_member.remove(&member.id).unwrap_or_default(),
            member,
        })
        .collect();

    Ok(DailyMeeting {
        today,
        members,
        unassigned,
    })
}

/// Build the project control board: one column per non-closed status
pub fn project_control(store: &mut Store) -> RepoResult<ProjectControl> {
    store.refresh_release_statuses()?;

    let mut open_by_project: HashMap<i64, Vec<Activity>> = HashMap::new();
    for activity in store.list_activities(&ActivityFilter {
        open_only: true,
        ..Default::default()
    })? {
        if let Some(project_id) = activity.project_id {
            open_by_project.entry(project_id).or_default().push(activity);
        }
    }

    // list_projects orders by code, so each column stays sorted
    let mut projects_by_status: HashMap<String, Vec<ProjectCard>> = HashMap::new();
    for project in store.list_projects(&ProjectFilter::default())? {
        if project.is_closed() {
            continue;
        }
        let activities = open_by_project.remove(&project.id).unwrap_or_default();
        projects_by_status
            .entry(project.status_code.clone())
            .or_default()
            .push(ProjectCard {
                project,
                activities,
            });
    }

    let columns = store
        .index_options(IndexTable::ProjectStatus)?
        .into_iter()
        .filter(|(code, _)| code != PROJECT_STATUS_CLOSED)
        .map(|(code, name)| StatusColumn {
            projects: projects_by_status.remove(&code).unwrap_or_default(),
            code,
            name,
        })
        .collect();

    Ok(ProjectControl { columns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ActivityInput, MemberInput, ProjectInput};

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn activity(title: &str, status: &str) -> ActivityInput {
        ActivityInput {
            type_code: "002".to_string(),
            subtype_code: "005".to_string(),
            status_code: status.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn project(title: &str, status: &str) -> ProjectInput {
        ProjectInput {
            title: title.to_string(),
            pm_responsible: "Laura".to_string(),
            eba_responsible: "Pedro".to_string(),
            status_code: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_daily_meeting_groups_open_work() {
        let mut store = Store::open_in_memory().unwrap().with_today(d(7, 5));
        let ana = store
            .create_member(&MemberInput {
                name: "Ana".to_string(),
                role_code: "001".to_string(),
                status_code: "001".to_string(),
                ..Default::default()
            })
            .unwrap();
        let bruno = store
            .create_member(&MemberInput {
                name: "Bruno".to_string(),
                role_code: "003".to_string(),
                status_code: "002".to_string(),
                vacation_start: Some(d(7, 1)),
                vacation_end: Some(d(7, 10)),
            })
            .unwrap();

        let mut open = activity("Write tests", "004");
        open.assigned_member_id = Some(ana.id);
        store.create_activity(&open).unwrap();
        let mut done = activity("Old task", "005");
        done.assigned_member_id = Some(ana.id);
        store.create_activity(&done).unwrap();
        store.create_activity(&activity("Nobody's", "002")).unwrap();

        let board = daily_meeting(&mut store).unwrap();
        assert_eq!(board.today, d(7, 5));
        assert_eq!(board.members.len(), 2);

        let ana_row = &board.members[0];
        assert_eq!(ana_row.member.id, ana.id);
        assert!(!ana_row.on_vacation);
        assert_eq!(ana_row.activities.len(), 1);
        assert_eq!(ana_row.activities[0].title, "Write tests");

        let bruno_row = &board.members[1];
        assert_eq!(bruno_row.member.id, bruno.id);
        assert!(bruno_row.on_vacation);
        assert!(bruno_row.activities.is_empty());

        assert_eq!(board.unassigned.len(), 1);
        assert_eq!(board.open_activity_count(), 2);
    }

    #[test]
    fn test_project_control_skips_closed_status() {
        let mut store = Store::open_in_memory().unwrap().with_today(d(7, 5));
        let b = store.create_project("PR20", &project("B", "005")).unwrap();
        store.create_project("PR10", &project("A", "005")).unwrap();
        store.create_project("PR30", &project("Gone", PROJECT_STATUS_CLOSED)).unwrap();

        let mut work = activity("Build", "004");
        work.project_id = Some(b.id);
        store.create_activity(&work).unwrap();

        let board = project_control(&mut store).unwrap();
        assert_eq!(board.columns.len(), 7);
        assert!(board.columns.iter().all(|c| c.code != PROJECT_STATUS_CLOSED));

        let in_progress = board
            .columns
            .iter()
            .find(|c| c.name == "IN_PROGRESS")
            .unwrap();
        let codes: Vec<&str> = in_progress
            .projects
            .iter()
            .map(|card| card.project.project_code.as_str())
            .collect();
        assert_eq!(codes, vec!["PR10", "PR20"]);
        assert_eq!(in_progress.projects[1].activities.len(), 1);
    }
}
