use chrono::NaiveDate;
use tempfile::tempdir;

use super::*;
use crate::entities::{
    ActivityFilter, ActivityInput, LinkInput, LinkOwner, MemberFilter, MemberInput, ProjectFilter,
    ProjectInput, ReleaseDates, ReleaseFilter,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn store() -> Store {
    Store::open_in_memory().unwrap().with_today(d(2024, 6, 15))
}

fn dates(start: NaiveDate, installation: NaiveDate) -> ReleaseDates {
    ReleaseDates {
        delivery_date: start,
        start_date: start,
        installation_date: installation,
    }
}

fn member_input(name: &str) -> MemberInput {
    MemberInput {
        name: name.to_string(),
        role_code: "003".to_string(),
        status_code: "001".to_string(),
        ..Default::default()
    }
}

fn project_input(title: &str) -> ProjectInput {
    ProjectInput {
        title: title.to_string(),
        pm_responsible: "Laura".to_string(),
        eba_responsible: "Pedro".to_string(),
        status_code: "001".to_string(),
        ..Default::default()
    }
}

fn activity_input(title: &str) -> ActivityInput {
    ActivityInput {
        type_code: "001".to_string(),
        subtype_code: "001".to_string(),
        status_code: "002".to_string(),
        title: title.to_string(),
        ..Default::default()
    }
}

// ===== Store lifecycle =====

#[test]
fn test_open_seeds_reference_tables() {
    let store = store();
    let statuses = store.index_options(IndexTable::ProjectStatus).unwrap();
    assert_eq!(statuses.len(), 8);
    assert_eq!(statuses[6], ("007".to_string(), "CLOSED".to_string()));
    assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
}

#[test]
fn test_reopen_file_database_keeps_data() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("nested").join("epm.db");

    {
        let mut store = Store::open(&path).unwrap();
        store.create_member(&member_input("Ana")).unwrap();
    }

    let store = Store::open(&path).unwrap();
    let members = store.list_members(&MemberFilter::default()).unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(store.index_options(IndexTable::Role).unwrap().len(), 3);
}

#[test]
fn test_newer_schema_is_rejected() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("epm.db");
    drop(Store::open(&path).unwrap());

    let conn = Connection::open(&path).unwrap();
    conn.execute("INSERT INTO schema_version (version) VALUES (99)", [])
        .unwrap();
    drop(conn);

    let err = Store::open(&path).err().unwrap();
    assert!(matches!(err, RepoError::SchemaTooNew { found: 99, .. }));
}

#[test]
fn test_like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern(" 50%_off "), "%50\\%\\_off%");
}

// ===== Members =====

#[test]
fn test_create_member_trims_and_resolves_names() {
    let mut store = store();
    let member = store.create_member(&member_input("  Ana  ")).unwrap();
    assert_eq!(member.name, "Ana");
    assert_eq!(member.role_name, "DEV");
    assert_eq!(member.status_name, "ACTIVE");
    assert_eq!(member.created_at, member.updated_at);
}

#[test]
fn test_create_member_requires_name_and_valid_codes() {
    let mut store = store();

    let err = store.create_member(&member_input("   ")).unwrap_err();
    assert_eq!(err.to_string(), "Name is required.");

    let mut input = member_input("Ana");
    input.role_code = "999".to_string();
    let err = store.create_member(&input).unwrap_err();
    assert!(err.is_invalid_input());
    assert!(err.to_string().contains("999"));
}

#[test]
fn test_active_member_drops_vacation_window() {
    let mut store = store();
    let mut input = member_input("Ana");
    input.vacation_start = Some(d(2024, 7, 1));
    input.vacation_end = Some(d(2024, 7, 10));
    let member = store.create_member(&input).unwrap();
    assert_eq!(member.vacation_start, None);
    assert_eq!(member.vacation_end, None);

    input.status_code = "002".to_string();
    let member = store.update_member(member.id, &input).unwrap();
    assert_eq!(member.vacation_start, Some(d(2024, 7, 1)));
    assert_eq!(member.status_name, "VACATION");
}

#[test]
fn test_vacation_end_before_start_is_rejected() {
    let mut store = store();
    let mut input = member_input("Ana");
    input.status_code = "002".to_string();
    input.vacation_start = Some(d(2024, 7, 10));
    input.vacation_end = Some(d(2024, 7, 1));
    assert!(store.create_member(&input).unwrap_err().is_invalid_input());
}

#[test]
fn test_list_members_filters_and_orders_by_name() {
    let mut store = store();
    store.create_member(&member_input("carlos")).unwrap();
    store.create_member(&member_input("Ana")).unwrap();
    let mut qa = member_input("Beatriz");
    qa.role_code = "002".to_string();
    store.create_member(&qa).unwrap();

    let names: Vec<String> = store
        .list_members(&MemberFilter::default())
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["Ana", "Beatriz", "carlos"]);

    let filter = MemberFilter {
        role_code: Some("002".to_string()),
        ..Default::default()
    };
    assert_eq!(store.list_members(&filter).unwrap().len(), 1);

    let filter = MemberFilter {
        name_like: Some("AR".to_string()),
        ..Default::default()
    };
    let found = store.list_members(&filter).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "carlos");
}

#[test]
fn test_update_and_delete_missing_member() {
    let mut store = store();
    assert!(store
        .update_member(42, &member_input("Ana"))
        .unwrap_err()
        .is_not_found());
    assert!(store.delete_member(42).unwrap_err().is_not_found());
}

#[test]
fn test_deleting_member_unassigns_activities() {
    let mut store = store();
    let member = store.create_member(&member_input("Ana")).unwrap();
    let mut input = activity_input("Fix login");
    input.assigned_member_id = Some(member.id);
    let activity = store.create_activity(&input).unwrap();
    assert_eq!(activity.assigned_member_name.as_deref(), Some("Ana"));

    store.delete_member(member.id).unwrap();
    let activity = store.get_activity(activity.id).unwrap();
    assert_eq!(activity.assigned_member_id, None);
    assert_eq!(activity.assigned_member_name, None);
}

// ===== Releases =====

#[test]
fn test_release_status_derived_on_create() {
    let mut store = store();
    let planned = store
        .create_release("R-PLAN", &dates(d(2024, 7, 1), d(2024, 7, 30)))
        .unwrap();
    let running = store
        .create_release("R-RUN", &dates(d(2024, 6, 1), d(2024, 6, 30)))
        .unwrap();
    let done = store
        .create_release("R-DONE", &dates(d(2024, 5, 1), d(2024, 6, 15)))
        .unwrap();

    assert_eq!(planned.status_name, "PLANNED");
    assert_eq!(running.status_name, "IN_PROGRESS");
    assert_eq!(done.status_name, "INSTALLED");
}

#[test]
fn test_release_code_is_unique_and_required() {
    let mut store = store();
    let window = dates(d(2024, 7, 1), d(2024, 7, 30));
    store.create_release("R1", &window).unwrap();

    let err = store.create_release(" R1 ", &window).unwrap_err();
    assert!(err.to_string().contains("already exists"));

    let err = store.create_release("  ", &window).unwrap_err();
    assert_eq!(err.to_string(), "Release code is required.");
}

#[test]
fn test_release_installation_before_start_is_rejected() {
    let mut store = store();
    let err = store
        .create_release("R1", &dates(d(2024, 7, 30), d(2024, 7, 1)))
        .unwrap_err();
    assert!(err.is_invalid_input());
}

#[test]
fn test_update_release_rederives_status() {
    let mut store = store();
    let release = store
        .create_release("R1", &dates(d(2024, 7, 1), d(2024, 7, 30)))
        .unwrap();
    let release = store
        .update_release(release.id, &dates(d(2024, 6, 1), d(2024, 7, 30)))
        .unwrap();
    assert_eq!(release.status_code, "002");
}

#[test]
fn test_installed_release_cannot_be_edited() {
    let mut store = store();
    let release = store
        .create_release("R1", &dates(d(2024, 5, 1), d(2024, 6, 1)))
        .unwrap();
    let err = store
        .update_release(release.id, &dates(d(2024, 7, 1), d(2024, 7, 30)))
        .unwrap_err();
    assert!(err.to_string().contains("INSTALLED"));
}

#[test]
fn test_refresh_release_statuses_moves_with_the_calendar() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("epm.db");

    let mut early = Store::open(&path).unwrap().with_today(d(2024, 6, 1));
    early
        .create_release("R1", &dates(d(2024, 6, 10), d(2024, 6, 20)))
        .unwrap();
    assert_eq!(early.refresh_release_statuses().unwrap(), 0);
    drop(early);

    let mut later = Store::open(&path).unwrap().with_today(d(2024, 6, 12));
    assert_eq!(later.refresh_release_statuses().unwrap(), 1);
    let release = later.find_release_by_code("R1").unwrap().unwrap();
    assert_eq!(release.status_code, "002");
    assert_eq!(later.refresh_release_statuses().unwrap(), 0);
}

#[test]
fn test_release_installed_by_date_is_frozen_before_refresh() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("epm.db");

    let mut early = Store::open(&path).unwrap().with_today(d(2024, 6, 1));
    let release = early
        .create_release("R1", &dates(d(2024, 6, 10), d(2024, 6, 20)))
        .unwrap();
    drop(early);

    // Stored status is still PLANNED; the installation date has passed
    let mut later = Store::open(&path).unwrap().with_today(d(2024, 7, 1));
    assert_eq!(later.get_release(release.id).unwrap().status_code, "001");

    let err = later
        .update_release(release.id, &dates(d(2024, 8, 1), d(2024, 8, 20)))
        .unwrap_err();
    assert!(err.is_invalid_input());
    assert!(err.to_string().contains("INSTALLED"));
    assert_eq!(
        later.get_release(release.id).unwrap().installation_date,
        d(2024, 6, 20)
    );

    let mut input = project_input("Payments");
    input.target_release_id = Some(release.id);
    let err = later.create_project("PR1", &input).unwrap_err();
    assert!(err.to_string().contains("INSTALLED"));

    let mut input = activity_input("Late task");
    input.target_release_id = Some(release.id);
    assert!(later.create_activity(&input).unwrap_err().is_invalid_input());

    assert!(later.release_options().unwrap().is_empty());
}

#[test]
fn test_release_options_exclude_installed() {
    let mut store = store();
    store
        .create_release("R-OLD", &dates(d(2024, 1, 1), d(2024, 2, 1)))
        .unwrap();
    let open = store
        .create_release("R-NEW", &dates(d(2024, 7, 1), d(2024, 8, 1)))
        .unwrap();
    assert_eq!(
        store.release_options().unwrap(),
        vec![(open.id, "R-NEW".to_string())]
    );

    let filter = ReleaseFilter {
        status_code: Some("003".to_string()),
        ..Default::default()
    };
    assert_eq!(store.list_releases(&filter).unwrap()[0].release_code, "R-OLD");
}

#[test]
fn test_deleting_release_detaches_projects_and_drops_links() {
    let mut store = store();
    let release = store
        .create_release("R1", &dates(d(2024, 7, 1), d(2024, 8, 1)))
        .unwrap();
    let mut input = project_input("Payments");
    input.target_release_id = Some(release.id);
    let project = store.create_project("PR100", &input).unwrap();
    assert_eq!(project.target_release_code.as_deref(), Some("R1"));

    store
        .add_link(
            LinkOwner::Release,
            release.id,
            &LinkInput {
                label: "Plan".to_string(),
                type_code: "003".to_string(),
                url: "https://wiki/plan".to_string(),
            },
        )
        .unwrap();

    store.delete_release(release.id).unwrap();
    assert_eq!(store.get_project(project.id).unwrap().target_release_id, None);
    let links: i64 = store
        .conn
        .query_row("SELECT COUNT(*) FROM release_links", [], |row| row.get(0))
        .unwrap();
    assert_eq!(links, 0);
}

// ===== Projects =====

#[test]
fn test_project_code_format() {
    let mut store = store();
    for bad in ["100", "PR", "PR12a", "pr100"] {
        let err = store.create_project(bad, &project_input("X")).unwrap_err();
        assert!(err.is_invalid_input(), "{} should be rejected", bad);
    }
    let project = store.create_project(" PR0042 ", &project_input("X")).unwrap();
    assert_eq!(project.project_code, "PR0042");

    let err = store.create_project("PR0042", &project_input("Y")).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn test_project_requires_responsibles() {
    let mut store = store();
    let mut input = project_input("Payments");
    input.eba_responsible = " ".to_string();
    let err = store.create_project("PR1", &input).unwrap_err();
    assert!(err.to_string().contains("required"));
}

#[test]
fn test_project_cannot_target_installed_release() {
    let mut store = store();
    let installed = store
        .create_release("R-OLD", &dates(d(2024, 1, 1), d(2024, 2, 1)))
        .unwrap();
    let mut input = project_input("Payments");
    input.target_release_id = Some(installed.id);
    let err = store.create_project("PR1", &input).unwrap_err();
    assert!(err.to_string().contains("INSTALLED"));

    input.target_release_id = Some(999);
    assert!(store.create_project("PR1", &input).unwrap_err().is_invalid_input());
}

#[test]
fn test_project_search_matches_code_or_title() {
    let mut store = store();
    store.create_project("PR200", &project_input("Billing")).unwrap();
    store.create_project("PR100", &project_input("Payments")).unwrap();

    let all = store.list_projects(&ProjectFilter::default()).unwrap();
    assert_eq!(all[0].project_code, "PR100");

    let filter = ProjectFilter {
        search: Some("bill".to_string()),
        ..Default::default()
    };
    assert_eq!(store.list_projects(&filter).unwrap()[0].project_code, "PR200");

    let filter = ProjectFilter {
        search: Some("PR1".to_string()),
        ..Default::default()
    };
    assert_eq!(store.list_projects(&filter).unwrap().len(), 1);
}

#[test]
fn test_closed_projects_leave_options_but_stay_editable() {
    let mut store = store();
    let project = store.create_project("PR1", &project_input("Payments")).unwrap();
    let mut input = ProjectInput::from(&project);
    input.status_code = "007".to_string();
    let project = store.update_project(project.id, &input).unwrap();
    assert!(project.is_closed());
    assert!(store.project_options().unwrap().is_empty());

    input.status_code = "005".to_string();
    assert!(!store.update_project(project.id, &input).unwrap().is_closed());
}

// ===== Activities =====

#[test]
fn test_activity_closing_sets_and_reopening_clears_end_date() {
    let mut store = store();
    let activity = store.create_activity(&activity_input("Fix login")).unwrap();
    assert_eq!(activity.end_date, None);

    let mut input = ActivityInput::from(&activity);
    input.status_code = ACTIVITY_CLOSED.to_string();
    let closed = store.update_activity(activity.id, &input).unwrap();
    let end = closed.end_date.expect("closing stamps an end date");

    input.title = "Fix login flow".to_string();
    let still_closed = store.update_activity(activity.id, &input).unwrap();
    assert_eq!(still_closed.end_date, Some(end));

    input.status_code = "004".to_string();
    let reopened = store.update_activity(activity.id, &input).unwrap();
    assert_eq!(reopened.end_date, None);
}

const ACTIVITY_CLOSED: &str = crate::core::index::ACTIVITY_STATUS_CLOSED;

#[test]
fn test_activity_created_closed_has_end_date() {
    let mut store = store();
    let mut input = activity_input("Done already");
    input.status_code = ACTIVITY_CLOSED.to_string();
    assert!(store.create_activity(&input).unwrap().end_date.is_some());
}

#[test]
fn test_activity_rejects_closed_project_and_unknown_member() {
    let mut store = store();
    let mut project_in = project_input("Payments");
    project_in.status_code = "007".to_string();
    let project = store.create_project("PR1", &project_in).unwrap();

    let mut input = activity_input("Task");
    input.project_id = Some(project.id);
    let err = store.create_activity(&input).unwrap_err();
    assert!(err.to_string().contains("CLOSED"));

    let mut input = activity_input("Task");
    input.assigned_member_id = Some(77);
    let err = store.create_activity(&input).unwrap_err();
    assert!(err.to_string().contains("77"));
}

#[test]
fn test_activity_cannot_target_installed_release() {
    let mut store = store();
    let installed = store
        .create_release("R-OLD", &dates(d(2024, 1, 1), d(2024, 2, 1)))
        .unwrap();
    let open = store
        .create_release("R-NEW", &dates(d(2024, 7, 1), d(2024, 8, 1)))
        .unwrap();

    let mut input = activity_input("Deploy");
    input.target_release_id = Some(installed.id);
    let err = store.create_activity(&input).unwrap_err();
    assert!(err.is_invalid_input());
    assert!(err.to_string().contains("INSTALLED"));

    input.target_release_id = Some(open.id);
    let activity = store.create_activity(&input).unwrap();
    assert_eq!(activity.target_release_code.as_deref(), Some("R-NEW"));

    input.target_release_id = Some(installed.id);
    let err = store.update_activity(activity.id, &input).unwrap_err();
    assert!(err.to_string().contains("INSTALLED"));
    assert_eq!(
        store.get_activity(activity.id).unwrap().target_release_id,
        Some(open.id)
    );
}

#[test]
fn test_activity_ticket_code_blank_becomes_none() {
    let mut store = store();
    let mut input = activity_input("Task");
    input.ticket_code = Some("   ".to_string());
    assert_eq!(store.create_activity(&input).unwrap().ticket_code, None);

    input.ticket_code = Some(" JIRA-12 ".to_string());
    assert_eq!(
        store.create_activity(&input).unwrap().ticket_code.as_deref(),
        Some("JIRA-12")
    );
}

#[test]
fn test_list_activities_newest_first_with_filters() {
    let mut store = store();
    let member = store.create_member(&member_input("Ana")).unwrap();
    let first = store.create_activity(&activity_input("First")).unwrap();
    let mut input = activity_input("Second");
    input.assigned_member_id = Some(member.id);
    let second = store.create_activity(&input).unwrap();
    let mut closed = activity_input("Third");
    closed.status_code = ACTIVITY_CLOSED.to_string();
    store.create_activity(&closed).unwrap();

    let ids: Vec<i64> = store
        .list_activities(&ActivityFilter {
            open_only: true,
            ..Default::default()
        })
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let mine = store
        .list_activities(&ActivityFilter {
            assigned_member_id: Some(member.id),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].title, "Second");
}

// ===== Links =====

#[test]
fn test_activity_links_lifecycle() {
    let mut store = store();
    let activity = store.create_activity(&activity_input("Task")).unwrap();

    let link = store
        .add_link(
            LinkOwner::Activity,
            activity.id,
            &LinkInput {
                label: " Ticket ".to_string(),
                type_code: "002".to_string(),
                url: "https://jira.example.com/browse/X-1".to_string(),
            },
        )
        .unwrap();
    assert_eq!(link.label, "Ticket");
    assert_eq!(link.type_name, "JIRA");
    assert_eq!(store.list_links(LinkOwner::Activity, activity.id).unwrap().len(), 1);

    // wrong owner
    assert!(store
        .delete_link(LinkOwner::Activity, activity.id + 1, link.id)
        .unwrap_err()
        .is_not_found());

    store
        .delete_link(LinkOwner::Activity, activity.id, link.id)
        .unwrap();
    assert!(store
        .list_links(LinkOwner::Activity, activity.id)
        .unwrap()
        .is_empty());
}

#[test]
fn test_link_validation() {
    let mut store = store();
    let activity = store.create_activity(&activity_input("Task")).unwrap();
    let mut input = LinkInput {
        label: "Doc".to_string(),
        type_code: "003".to_string(),
        url: "ftp://files/doc".to_string(),
    };
    assert!(store
        .add_link(LinkOwner::Activity, activity.id, &input)
        .unwrap_err()
        .is_invalid_input());

    input.url = "http://files/doc".to_string();
    input.type_code = "009".to_string();
    assert!(store
        .add_link(LinkOwner::Activity, activity.id, &input)
        .unwrap_err()
        .is_invalid_input());

    input.type_code = "003".to_string();
    assert!(store
        .add_link(LinkOwner::Release, 5, &input)
        .unwrap_err()
        .is_not_found());
}
