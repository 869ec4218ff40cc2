use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const WEBHOOK_URL: &str = "https://discord.com/api/webhooks/123456789/test-token-abc";

fn write_feed(dir: &std::path::Path) -> std::path::PathBuf {
    std::fs::create_dir_all(dir.join("shots")).unwrap();
    std::fs::write(dir.join("shots/drake.jpg"), b"jpeg-bytes").unwrap();

    let feed = serde_json::json!({
        "destinations": [
            {
                "key": "general",
                "webhook_env": "GUIDECAST_TEST_WEBHOOK_GENERAL",
                "items": [
                    {"key": "general::faq", "payload": {"content": "Questions fréquentes"}},
                    {
                        "key": "boss::drake",
                        "payload": {"embeds": [{"title": "Drake", "image": {"url": "attachment://drake.jpg"}}]},
                        "files": [{"name": "drake.jpg", "path": "shots/drake.jpg", "media_type": "image/jpeg"}]
                    }
                ]
            },
            {
                "key": "unconfigured",
                "webhook_env": "GUIDECAST_TEST_WEBHOOK_UNSET",
                "items": [{"key": "ghost", "payload": {"content": "x"}}]
            }
        ]
    });
    let path = dir.join("feed.json");
    std::fs::write(&path, serde_json::to_string_pretty(&feed).unwrap()).unwrap();
    path
}

#[test]
fn dry_run_reports_transitions_and_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let feed_path = write_feed(tmp.path());
    let state_path = tmp.path().join("state.json");

    Command::cargo_bin("guidecast")
        .unwrap()
        .arg("sync")
        .arg(&feed_path)
        .arg("--state")
        .arg(&state_path)
        .arg("--dry-run")
        .env("GUIDECAST_TEST_WEBHOOK_GENERAL", WEBHOOK_URL)
        .env_remove("GUIDECAST_TEST_WEBHOOK_UNSET")
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run]"))
        .stdout(predicate::str::contains("would create"))
        .stdout(predicate::str::contains("general::faq"))
        .stdout(predicate::str::contains("'unconfigured' skipped"));

    assert!(!state_path.exists(), "dry-run must not create a state file");
}

#[test]
fn dry_run_json_summary_is_machine_readable() {
    let tmp = TempDir::new().unwrap();
    let feed_path = write_feed(tmp.path());
    let state_path = tmp.path().join("state.json");

    let output = Command::cargo_bin("guidecast")
        .unwrap()
        .arg("sync")
        .arg(&feed_path)
        .arg("--state")
        .arg(&state_path)
        .arg("--dry-run")
        .arg("--json")
        .env("GUIDECAST_TEST_WEBHOOK_GENERAL", WEBHOOK_URL)
        .env_remove("GUIDECAST_TEST_WEBHOOK_UNSET")
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["created"], 2);
    assert_eq!(summary["outcomes"].as_array().unwrap().len(), 2);
}

#[test]
fn reconfigured_destination_fails_the_run_with_a_reset_hint() {
    let tmp = TempDir::new().unwrap();
    let feed_path = write_feed(tmp.path());
    let state_path = tmp.path().join("state.json");

    // Fingerprint recorded against a different webhook secret.
    let stale = serde_json::json!({
        "synced_at": "2026-01-01T00:00:00Z",
        "items": {},
        "fingerprints": {"general": "0000000000000000"}
    });
    std::fs::write(&state_path, stale.to_string()).unwrap();

    Command::cargo_bin("guidecast")
        .unwrap()
        .arg("sync")
        .arg(&feed_path)
        .arg("--state")
        .arg(&state_path)
        .arg("--dry-run")
        .env("GUIDECAST_TEST_WEBHOOK_GENERAL", WEBHOOK_URL)
        .env_remove("GUIDECAST_TEST_WEBHOOK_UNSET")
        .assert()
        .failure()
        .stdout(predicate::str::contains("halted"))
        .stdout(predicate::str::contains("state reset-fingerprint general"));
}

#[test]
fn missing_feed_is_a_readable_error() {
    let tmp = TempDir::new().unwrap();
    Command::cargo_bin("guidecast")
        .unwrap()
        .arg("sync")
        .arg(tmp.path().join("nope.json"))
        .arg("--state")
        .arg(tmp.path().join("state.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read feed"));
}

#[test]
fn invalid_webhook_url_is_rejected_without_leaking_it() {
    let tmp = TempDir::new().unwrap();
    let feed_path = write_feed(tmp.path());

    let assert = Command::cargo_bin("guidecast")
        .unwrap()
        .arg("sync")
        .arg(&feed_path)
        .arg("--state")
        .arg(tmp.path().join("state.json"))
        .arg("--dry-run")
        .env("GUIDECAST_TEST_WEBHOOK_GENERAL", "https://example.com/not-a-webhook")
        .env_remove("GUIDECAST_TEST_WEBHOOK_UNSET")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GUIDECAST_TEST_WEBHOOK_GENERAL"));

    let output = assert.get_output();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("example.com"),
        "the URL value must not be echoed"
    );
}
