//! Integration tests for the epm CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd, each
//! against its own database file in a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct TestDb {
    dir: TempDir,
    path: PathBuf,
}

impl TestDb {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eagle_pm.db");
        epm_raw().arg("--db").arg(&path).arg("init").assert().success();
        Self { dir, path }
    }

    /// An epm command bound to this database
    fn epm(&self) -> Command {
        let mut cmd = epm_raw();
        cmd.arg("--db").arg(&self.path);
        cmd
    }

    /// Run a creating command with `-f id` and return the printed id
    fn create(&self, args: &[&str]) -> String {
        let output = self.epm().args(["-f", "id"]).args(args).output().unwrap();
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

/// Helper to get an epm command that ignores the caller's environment
fn epm_raw() -> Command {
    let mut cmd = Command::cargo_bin("epm").unwrap();
    cmd.env_remove("EPM_DB_PATH").env_remove("EPM_BIND").env_remove("RUST_LOG");
    cmd
}

fn add_member(db: &TestDb, name: &str) -> String {
    db.create(&["member", "new", "--name", name, "--role", "DEV"])
}

fn add_project(db: &TestDb, code: &str, title: &str) -> String {
    db.create(&[
        "project", "new", code, "--title", title, "--pm", "Ana", "--eba", "Luis",
    ])
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    epm_raw()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Eagle PM"))
        .stdout(predicate::str::contains("activity"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_version_displays() {
    epm_raw()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("epm"));
}

#[test]
fn test_init_creates_database() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("fresh.db");

    epm_raw()
        .arg("--db")
        .arg(&path)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created database"));
    assert!(path.exists());

    // Second run only checks
    epm_raw()
        .arg("--db")
        .arg(&path)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked database"));
}

#[test]
fn test_index_prints_reference_tables() {
    let db = TestDb::new();
    db.epm()
        .args(["index", "activity-status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("005"))
        .stdout(predicate::str::contains("CLOSED"));

    db.epm()
        .args(["index"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PENDING_HLE"))
        .stdout(predicate::str::contains("REQUIREMENT"));
}

// ============================================================================
// Member Tests
// ============================================================================

#[test]
fn test_member_new_and_list() {
    let db = TestDb::new();
    add_member(&db, "Marta Ruiz");
    add_member(&db, "Ben Ortiz");

    db.epm()
        .args(["member", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Marta Ruiz"))
        .stdout(predicate::str::contains("Ben Ortiz"))
        .stdout(predicate::str::contains("2 member(s) found"));

    db.epm()
        .args(["member", "list", "--search", "mar", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_member_list_csv() {
    let db = TestDb::new();
    add_member(&db, "Marta Ruiz");

    db.epm()
        .args(["-f", "csv", "member", "list"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,name,role,status"))
        .stdout(predicate::str::contains("Marta Ruiz,DEV,ACTIVE"));
}

#[test]
fn test_member_requires_known_role() {
    let db = TestDb::new();
    db.epm()
        .args(["member", "new", "--name", "Ana", "--role", "manager"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown role"));
}

#[test]
fn test_member_delete_unassigns_activities() {
    let db = TestDb::new();
    let member = add_member(&db, "Marta Ruiz");
    let activity = db.create(&["activity", "new", "--title", "Fix login", "--member", "Marta Ruiz"]);

    db.epm()
        .args(["member", "delete", &member, "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted member"));

    db.epm()
        .args(["member", "show", &member])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    db.epm()
        .args(["-f", "json", "activity", "show", &activity])
        .assert()
        .success()
        .stdout(predicate::str::contains("assigned_member_id").not());
}

// ============================================================================
// Release Tests
// ============================================================================

#[test]
fn test_release_status_follows_dates() {
    let db = TestDb::new();
    db.create(&[
        "release", "new", "R-OLD", "-d", "2000-01-01", "-s", "2000-01-02", "-i", "2000-01-03",
    ]);
    db.create(&[
        "release", "new", "R-NEXT", "-d", "2999-01-01", "-s", "2999-01-02", "-i", "2999-01-03",
    ]);

    db.epm()
        .args(["release", "list", "--status", "INSTALLED"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R-OLD"))
        .stdout(predicate::str::contains("R-NEXT").not());

    db.epm()
        .args(["release", "show", "R-NEXT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PLANNED"));
}

#[test]
fn test_release_duplicate_code_rejected() {
    let db = TestDb::new();
    let args = [
        "release", "new", "R1", "-d", "2999-01-01", "-s", "2999-01-01", "-i", "2999-02-01",
    ];
    db.create(&args);
    db.epm()
        .args(args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_release_installed_cannot_be_edited() {
    let db = TestDb::new();
    db.create(&[
        "release", "new", "R-OLD", "-d", "2000-01-01", "-s", "2000-01-02", "-i", "2000-01-03",
    ]);
    db.epm()
        .args(["release", "edit", "R-OLD", "-d", "2000-01-05"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("INSTALLED"));
}

#[test]
fn test_release_links() {
    let db = TestDb::new();
    db.create(&[
        "release", "new", "R1", "-d", "2999-01-01", "-s", "2999-01-01", "-i", "2999-02-01",
    ]);

    db.epm()
        .args(["release", "link", "add", "R1", "--label", "Notes", "--url", "ftp://x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http://"));

    let link = db.create(&[
        "release",
        "link",
        "add",
        "R1",
        "--label",
        "Notes",
        "--url",
        "https://wiki.example.com/r1",
        "--link-type",
        "REQUIREMENT",
    ]);

    db.epm()
        .args(["release", "link", "list", "R1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://wiki.example.com/r1"))
        .stdout(predicate::str::contains("REQUIREMENT"));

    db.epm()
        .args(["release", "link", "delete", "R1", &link, "-y"])
        .assert()
        .success();

    db.epm()
        .args(["release", "link", "list", "R1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 link(s) found"));
}

// ============================================================================
// Project Tests
// ============================================================================

#[test]
fn test_project_code_format() {
    let db = TestDb::new();
    db.epm()
        .args(["project", "new", "X42", "--title", "T", "--pm", "A", "--eba", "B"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid project code"));

    add_project(&db, "PR42", "Checkout");
    db.epm()
        .args(["project", "show", "PR42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checkout"))
        .stdout(predicate::str::contains("PENDING_HLE"));
}

#[test]
fn test_project_cannot_target_installed_release() {
    let db = TestDb::new();
    db.create(&[
        "release", "new", "R-OLD", "-d", "2000-01-01", "-s", "2000-01-02", "-i", "2000-01-03",
    ]);
    db.epm()
        .args([
            "project", "new", "PR1", "--title", "T", "--pm", "A", "--eba", "B", "--release",
            "R-OLD",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("INSTALLED releases cannot be targeted"));
}

#[test]
fn test_project_list_filters_by_release() {
    let db = TestDb::new();
    db.create(&[
        "release", "new", "R1", "-d", "2999-01-01", "-s", "2999-01-01", "-i", "2999-02-01",
    ]);
    db.create(&[
        "project", "new", "PR1", "--title", "Alpha", "--pm", "A", "--eba", "B", "-r", "R1",
    ]);
    add_project(&db, "PR2", "Beta");

    db.epm()
        .args(["project", "list", "--release", "R1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alpha"))
        .stdout(predicate::str::contains("Beta").not());
}

// ============================================================================
// Activity Tests
// ============================================================================

#[test]
fn test_activity_close_and_reopen() {
    let db = TestDb::new();
    let id = db.create(&["activity", "new", "--title", "Write docs"]);

    db.epm()
        .args(["activity", "edit", &id, "--status", "closed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CLOSED"));
    db.epm()
        .args(["-f", "json", "activity", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"end_date\""));

    db.epm()
        .args(["activity", "edit", &id, "--status", "OPEN"])
        .assert()
        .success();
    db.epm()
        .args(["-f", "json", "activity", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"end_date\"").not());
}

#[test]
fn test_activity_rejects_closed_project() {
    let db = TestDb::new();
    add_project(&db, "PR9", "Legacy");
    db.epm()
        .args(["project", "edit", "PR9", "--status", "CLOSED"])
        .assert()
        .success();

    db.epm()
        .args(["activity", "new", "--title", "Late work", "--project", "PR9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CLOSED projects cannot take activities"));
}

#[test]
fn test_activity_cannot_target_installed_release() {
    let db = TestDb::new();
    db.create(&[
        "release", "new", "R-OLD", "-d", "2000-01-01", "-s", "2000-01-02", "-i", "2000-01-03",
    ]);
    db.create(&[
        "release", "new", "R-NEXT", "-d", "2999-01-01", "-s", "2999-01-02", "-i", "2999-01-03",
    ]);

    db.epm()
        .args(["activity", "new", "--title", "Deploy", "--release", "R-OLD"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("INSTALLED releases cannot be targeted"));

    let id = db.create(&["activity", "new", "--title", "Deploy", "--release", "R-NEXT"]);
    db.epm()
        .args(["activity", "edit", &id, "--release", "R-OLD"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("INSTALLED releases cannot be targeted"));
}

#[test]
fn test_release_with_numeric_code_resolves_by_code() {
    let db = TestDb::new();
    db.create(&[
        "release", "new", "2407", "-d", "2999-01-01", "-s", "2999-01-02", "-i", "2999-01-03",
    ]);

    db.epm()
        .args(["release", "show", "2407"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2407"))
        .stdout(predicate::str::contains("PLANNED"));
    db.create(&[
        "project", "new", "PR1", "--title", "Alpha", "--pm", "A", "--eba", "B", "-r", "2407",
    ]);
}

#[test]
fn test_activity_list_open_only() {
    let db = TestDb::new();
    db.create(&["activity", "new", "--title", "Still going"]);
    db.create(&["activity", "new", "--title", "Done already", "--status", "CLOSED"]);

    db.epm()
        .args(["activity", "list", "--open"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Still going"))
        .stdout(predicate::str::contains("Done already").not());
}

// ============================================================================
// Dashboards, export and refresh
// ============================================================================

#[test]
fn test_dashboard_daily() {
    let db = TestDb::new();
    add_member(&db, "Marta Ruiz");
    db.create(&["activity", "new", "--title", "Fix login", "--member", "Marta Ruiz"]);
    db.create(&["activity", "new", "--title", "Nobody's job"]);

    db.epm()
        .args(["dashboard", "daily"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Marta Ruiz"))
        .stdout(predicate::str::contains("Fix login"))
        .stdout(predicate::str::contains("Unassigned"))
        .stdout(predicate::str::contains("Nobody's job"));
}

#[test]
fn test_dashboard_projects_html() {
    let db = TestDb::new();
    add_project(&db, "PR3", "Mobile app");

    db.epm()
        .args(["dashboard", "projects", "--html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<!doctype html>"))
        .stdout(predicate::str::contains("PR3"))
        .stdout(predicate::str::contains("PENDING_HLE"));
}

#[test]
fn test_export_activities_stdout() {
    let db = TestDb::new();
    db.create(&["activity", "new", "--title", "Export me", "--ticket", "JIRA-7"]);

    db.epm()
        .args(["export", "activities"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "title,type,subtype,status,project,assigned_member,target_release,ticket_code",
        ))
        .stdout(predicate::str::contains("Export me,JIRA,STORY,PLANNED"));
}

#[test]
fn test_export_to_directory_uses_timestamped_name() {
    let db = TestDb::new();
    add_member(&db, "Marta Ruiz");
    let out_dir = db.dir.path().join("exports");
    fs::create_dir(&out_dir).unwrap();

    db.epm()
        .args(["export", "members", "-o"])
        .arg(&out_dir)
        .assert()
        .success();

    let files: Vec<String> = fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("members_"));
    assert!(files[0].ends_with(".csv"));

    let content = fs::read_to_string(out_dir.join(&files[0])).unwrap();
    assert!(content.contains("Marta Ruiz"));
}

#[test]
fn test_refresh_reports_changes() {
    let db = TestDb::new();
    db.epm()
        .args(["-f", "json", "refresh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"changed\":0"));
}

#[test]
fn test_completions_bash() {
    epm_raw()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("epm"));
}
