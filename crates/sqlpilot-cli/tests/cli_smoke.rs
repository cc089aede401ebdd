use assert_cmd::Command;
use predicates::prelude::*;
use sqlpilot_core::db::SqliteExecutor;

fn write_config(dir: &std::path::Path, db: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("sqlpilot.yaml");
    std::fs::write(
        &path,
        format!(
            "version: 1\nprovider: fake\nmodel: offline\ndatabase: {}\n",
            db.display()
        ),
    )
    .unwrap();
    path
}

fn seed_db(path: &std::path::Path) {
    let ex = SqliteExecutor::open(path).unwrap();
    ex.batch(
        "CREATE TABLE employees (id INTEGER PRIMARY KEY, name TEXT);
         INSERT INTO employees (name) VALUES ('ada');",
    )
    .unwrap();
}

#[test]
fn init_writes_starter_config() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("sqlpilot.yaml");

    Command::cargo_bin("sqlpilot")
        .unwrap()
        .args(["init", "--config"])
        .arg(&cfg)
        .assert()
        .success()
        .stderr(predicate::str::contains("created"));
    assert!(cfg.exists());

    // Second run must not clobber.
    Command::cargo_bin("sqlpilot")
        .unwrap()
        .args(["init", "--config"])
        .arg(&cfg)
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn tools_lists_the_toolkit() {
    Command::cargo_bin("sqlpilot")
        .unwrap()
        .arg("tools")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("execute_query")
                .and(predicate::str::contains("list_tables"))
                .and(predicate::str::contains("check_query")),
        );
}

#[test]
fn schema_prints_create_statements() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("t.db");
    seed_db(&db);
    let cfg = write_config(dir.path(), &db);

    Command::cargo_bin("sqlpilot")
        .unwrap()
        .args(["schema", "--config"])
        .arg(&cfg)
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE TABLE employees"));
}

#[test]
fn ask_with_fake_provider_surfaces_errors_at_execution() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("t.db");
    seed_db(&db);
    let cfg = write_config(dir.path(), &db);

    // The echo client returns prompt text, not SQL, so the run must fail at
    // the database stage with exit 1 - the documented failure mode for
    // uncorrectable candidates.
    Command::cargo_bin("sqlpilot")
        .unwrap()
        .args(["ask", "--config"])
        .arg(&cfg)
        .arg("how many employees?")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("database error"));
}

#[test]
fn missing_config_exits_two() {
    Command::cargo_bin("sqlpilot")
        .unwrap()
        .args(["ask", "--config", "/nonexistent/sqlpilot.yaml", "hi"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config error"));
}
