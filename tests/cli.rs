use std::fs;
use std::path::Path;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Run the binary against `db`; stdout is a pipe, so output is JSON.
fn userbook(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("userbook").unwrap();
    cmd.arg("--db").arg(db).env_remove("USERBOOK_DB").env_remove("RUST_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn stderr_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn version_reports_package_version() {
    let temp_dir = TempDir::new().unwrap();
    let out = stdout_json(userbook(&temp_dir.path().join("u.db")).arg("version"));
    assert_eq!(out["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn add_get_update_delete_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("users.db");

    let added = stdout_json(userbook(&db).args(["add", "Alex", "Smith", "--age", "29"]));
    assert_eq!(added["id"], 1);
    assert_eq!(added["family_name"], "Smith");

    let updated = stdout_json(userbook(&db).args(["update", "1", "--last-name", "Jones"]));
    assert_eq!(updated["outcome"], "updated");
    assert_eq!(updated["user"]["family_name"], "Jones");
    assert_eq!(updated["user"]["age"], 29);

    let found = stdout_json(userbook(&db).args(["find", "Jones"]));
    assert_eq!(found["given_name"], "Alex");

    let nothing = stdout_json(userbook(&db).args(["update", "1"]));
    assert_eq!(nothing["outcome"], "nothing_to_update");

    let deleted = stdout_json(userbook(&db).args(["delete", "1"]));
    assert_eq!(deleted["deleted"], true);

    let output = userbook(&db).args(["get", "1"]).assert().code(3);
    let err = stderr_json(&output.get_output().stderr);
    assert_eq!(err["error"]["code"], "USER_NOT_FOUND");
}

#[test]
fn duplicate_last_name_exits_with_code_5() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("users.db");

    userbook(&db).args(["add", "Ann", "Lee"]).assert().success();
    let output = userbook(&db).args(["add", "Bo", "Lee"]).assert().code(5);

    let err = stderr_json(&output.get_output().stderr);
    assert_eq!(err["error"]["code"], "DUPLICATE_KEY");
    assert!(err["error"]["hint"].is_string());

    let list = stdout_json(userbook(&db).arg("list"));
    assert_eq!(list["count"], 1);
}

#[test]
fn read_commands_require_a_database() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("missing.db");

    let output = userbook(&db).arg("list").assert().code(2);
    let err = stderr_json(&output.get_output().stderr);
    assert_eq!(err["error"]["code"], "NOT_INITIALIZED");
    assert!(!db.exists());
}

#[test]
fn export_then_import_into_another_database() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("source.db");
    let target = temp_dir.path().join("target.db");
    let file = temp_dir.path().join("users.csv");

    userbook(&source)
        .args(["add", "Ann", "Lee", "--age", "30"])
        .assert()
        .success();
    userbook(&source)
        .args(["add", "Bo", "Park, Jr."])
        .assert()
        .success();

    let exported = stdout_json(
        userbook(&source)
            .args(["export", "--format", "csv", "--output"])
            .arg(&file),
    );
    assert_eq!(exported["format"], "csv");
    assert_eq!(exported["stats"]["records"], 2);

    let imported = stdout_json(
        userbook(&target)
            .args(["import", "--format", "csv", "--input"])
            .arg(&file),
    );
    assert_eq!(imported["stats"]["created"], 2);

    let again = stdout_json(
        userbook(&target)
            .args(["import", "--format", "csv", "--input"])
            .arg(&file),
    );
    assert_eq!(again["stats"]["created"], 0);
    assert_eq!(again["stats"]["skipped"], 2);

    let park = stdout_json(userbook(&target).args(["find", "Park, Jr."]));
    assert_eq!(park["given_name"], "Bo");
    assert_eq!(park["age"], Value::Null);
}

#[test]
fn import_missing_file_exits_with_code_3() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("users.db");

    userbook(&db)
        .args(["import", "--format", "json", "--input"])
        .arg(temp_dir.path().join("absent.json"))
        .assert()
        .code(3);
    assert!(!db.exists());
}

#[test]
fn malformed_json_exits_with_code_6() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("users.db");
    let file = temp_dir.path().join("broken.json");
    fs::write(&file, "{\"name\": ").unwrap();

    let output = userbook(&db)
        .args(["import", "--format", "json", "--input"])
        .arg(&file)
        .assert()
        .code(6);
    let err = stderr_json(&output.get_output().stderr);
    assert_eq!(err["error"]["code"], "MALFORMED_FILE");
}

#[test]
fn collect_from_stdin_then_import() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("users.db");
    let file = temp_dir.path().join("collected.json");

    let collected = stdout_json(
        userbook(&db)
            .args(["collect", "--output"])
            .arg(&file)
            .write_stdin("Алексей\nЛогвинов\n29\ny\nAnn\nLee\n\nn\n"),
    );
    assert_eq!(collected["records"], 2);

    let imported = stdout_json(
        userbook(&db)
            .args(["import", "--format", "json", "--input"])
            .arg(&file),
    );
    assert_eq!(imported["stats"]["created"], 2);

    let user = stdout_json(userbook(&db).args(["find", "Логвинов"]));
    assert_eq!(user["age"], 29);
}

#[test]
fn status_lists_export_files() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("users.db");
    let file = temp_dir.path().join("users.json");

    userbook(&db).args(["add", "Ann", "Lee"]).assert().success();
    userbook(&db)
        .args(["export", "--format", "json", "--output"])
        .arg(&file)
        .assert()
        .success();

    let status = stdout_json(userbook(&db).arg("status").arg(&file));
    assert_eq!(status["total_users"], 1);
    assert_eq!(status["export_files"][0]["format"], "json");
    assert_eq!(status["export_files"][0]["records"], 1);
}
