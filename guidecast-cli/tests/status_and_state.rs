use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn seeded_state() -> serde_json::Value {
    serde_json::json!({
        "synced_at": "2026-01-01T00:00:00Z",
        "items": {
            "boss::drake": {"remote_id": "424242", "stored_hash": "deadbeefcafebabe"},
            "general::faq": {"stored_hash": "0123456789abcdef"}
        },
        "fingerprints": {"general": "aaaa", "bosses": "bbbb"}
    })
}

#[test]
fn status_on_missing_state_reports_never_synced() {
    let tmp = TempDir::new().unwrap();
    Command::cargo_bin("guidecast")
        .unwrap()
        .arg("status")
        .arg("--state")
        .arg(tmp.path().join("state.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("0 items"))
        .stdout(predicate::str::contains("last sync never"))
        .stdout(predicate::str::contains("No synced items yet"));
}

#[test]
fn status_lists_items_with_remote_ids_and_hash_prefixes() {
    let tmp = TempDir::new().unwrap();
    let state_path = tmp.path().join("state.json");
    std::fs::write(&state_path, seeded_state().to_string()).unwrap();

    Command::cargo_bin("guidecast")
        .unwrap()
        .arg("status")
        .arg("--state")
        .arg(&state_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 items"))
        .stdout(predicate::str::contains("boss::drake"))
        .stdout(predicate::str::contains("424242"))
        .stdout(predicate::str::contains("deadbeefcafe"))
        .stdout(predicate::str::contains("no remote message yet"));
}

#[test]
fn status_json_round_trips_the_state() {
    let tmp = TempDir::new().unwrap();
    let state_path = tmp.path().join("state.json");
    std::fs::write(&state_path, seeded_state().to_string()).unwrap();

    let output = Command::cargo_bin("guidecast")
        .unwrap()
        .arg("status")
        .arg("--state")
        .arg(&state_path)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["synced"], true);
    assert_eq!(status["items"]["boss::drake"]["remote_id"], "424242");
    assert_eq!(status["fingerprints"]["general"], "aaaa");
}

#[test]
fn reset_fingerprint_clears_only_the_named_destination() {
    let tmp = TempDir::new().unwrap();
    let state_path = tmp.path().join("state.json");
    std::fs::write(&state_path, seeded_state().to_string()).unwrap();

    Command::cargo_bin("guidecast")
        .unwrap()
        .arg("state")
        .arg("reset-fingerprint")
        .arg("general")
        .arg("--state")
        .arg(&state_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("cleared"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state_path).unwrap()).unwrap();
    assert!(saved["fingerprints"].get("general").is_none());
    assert_eq!(saved["fingerprints"]["bosses"], "bbbb");
    assert_eq!(
        saved["items"]["boss::drake"]["remote_id"], "424242",
        "item records must be untouched"
    );
}

#[test]
fn reset_fingerprint_is_a_noop_for_unknown_destinations() {
    let tmp = TempDir::new().unwrap();
    let state_path = tmp.path().join("state.json");
    std::fs::write(&state_path, seeded_state().to_string()).unwrap();

    Command::cargo_bin("guidecast")
        .unwrap()
        .arg("state")
        .arg("reset-fingerprint")
        .arg("unknown")
        .arg("--state")
        .arg(&state_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to reset"));
}

#[test]
fn forget_drops_one_item_record() {
    let tmp = TempDir::new().unwrap();
    let state_path = tmp.path().join("state.json");
    std::fs::write(&state_path, seeded_state().to_string()).unwrap();

    Command::cargo_bin("guidecast")
        .unwrap()
        .arg("state")
        .arg("forget")
        .arg("boss::drake")
        .arg("--state")
        .arg(&state_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("forgot 'boss::drake'"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state_path).unwrap()).unwrap();
    assert!(saved["items"].get("boss::drake").is_none());
    assert!(saved["items"].get("general::faq").is_some());
}

#[test]
fn legacy_state_files_are_readable() {
    let tmp = TempDir::new().unwrap();
    let state_path = tmp.path().join("state.json");
    std::fs::write(
        &state_path,
        r#"{"messages":{"boss::drake":{"message_id":"99","hash":"h1"}}}"#,
    )
    .unwrap();

    Command::cargo_bin("guidecast")
        .unwrap()
        .arg("status")
        .arg("--state")
        .arg(&state_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("boss::drake"))
        .stdout(predicate::str::contains("99"));
}
