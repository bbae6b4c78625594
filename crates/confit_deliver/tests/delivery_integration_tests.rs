//! Integration tests for the delivery state machine.

use std::fs;

use confit_deliver::{DeliverError, DeliveryManager, DeliveryOptions};
use tempfile::tempdir;

#[test]
fn test_deliver_to_new_destination() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");

    let result = DeliveryManager::new()
        .deliver(b"key=42\n", &dest, &DeliveryOptions::new())
        .unwrap();

    assert!(result.changed);
    assert!(result.backup_path.is_none());
    assert_eq!(fs::read(&dest).unwrap(), b"key=42\n");
}

#[test]
fn test_redelivery_is_idempotent() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");
    let manager = DeliveryManager::new();
    let options = DeliveryOptions::new();

    let first = manager.deliver(b"key=42\n", &dest, &options).unwrap();
    let second = manager.deliver(b"key=42\n", &dest, &options).unwrap();

    assert!(first.changed);
    assert!(!second.changed);
    assert_eq!(first.checksum, second.checksum);
}

#[test]
fn test_forced_write_skips_comparison() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");
    let manager = DeliveryManager::new();

    manager.deliver(b"key=42\n", &dest, &DeliveryOptions::new()).unwrap();
    let result = manager
        .deliver(b"key=42\n", &dest, &DeliveryOptions::new().checksum_compare(false))
        .unwrap();

    assert!(result.changed);
}

#[test]
fn test_backup_created_on_overwrite() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");
    fs::write(&dest, b"old content\n").unwrap();

    let result = DeliveryManager::new()
        .deliver(b"new content\n", &dest, &DeliveryOptions::new().backup(true))
        .unwrap();

    assert!(result.changed);
    let backup_path = result.backup_path.expect("backup should exist");
    assert_eq!(fs::read(&backup_path).unwrap(), b"old content\n");
    assert_eq!(fs::read(&dest).unwrap(), b"new content\n");
    assert!(backup_path.to_string_lossy().ends_with('~'));
}

#[test]
fn test_no_backup_for_new_file() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");

    let result = DeliveryManager::new()
        .deliver(b"content\n", &dest, &DeliveryOptions::new().backup(true))
        .unwrap();

    assert!(result.backup_path.is_none());
}

#[test]
fn test_failed_validation_leaves_destination_untouched() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");
    fs::write(&dest, b"old content\n").unwrap();

    let err = DeliveryManager::new()
        .deliver(
            b"new content\n",
            &dest,
            &DeliveryOptions::new().validate("false %s"),
        )
        .unwrap_err();

    assert!(matches!(err, DeliverError::ValidationFailed { .. }));
    assert_eq!(fs::read(&dest).unwrap(), b"old content\n");
}

#[test]
fn test_validation_runs_against_staged_content() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");

    // grep sees the staged file, which must already hold the new content.
    let result = DeliveryManager::new()
        .deliver(
            b"key=42\n",
            &dest,
            &DeliveryOptions::new().validate("grep -q key=42 %s"),
        )
        .unwrap();

    assert!(result.changed);
}

#[test]
fn test_validate_command_without_placeholder_is_rejected() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");

    let err = DeliveryManager::new()
        .deliver(b"x", &dest, &DeliveryOptions::new().validate("true"))
        .unwrap_err();

    assert!(matches!(err, DeliverError::ValidationFailed { .. }));
    assert!(!dest.exists());
}

#[test]
fn test_check_mode_never_mutates() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");
    fs::write(&dest, b"old content\n").unwrap();

    let result = DeliveryManager::new()
        .deliver(
            b"new content\n",
            &dest,
            &DeliveryOptions::new().check_mode(true).backup(true),
        )
        .unwrap();

    assert!(result.changed);
    assert!(result.backup_path.is_none());
    assert_eq!(fs::read(&dest).unwrap(), b"old content\n");
    // No staging or backup debris left behind.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_check_mode_on_absent_destination() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");

    let result = DeliveryManager::new()
        .deliver(b"content\n", &dest, &DeliveryOptions::new().check_mode(true))
        .unwrap();

    assert!(result.changed);
    assert!(!dest.exists());
}

#[test]
fn test_diff_reports_line_changes() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");
    fs::write(&dest, b"key=41\n").unwrap();

    let result = DeliveryManager::new()
        .deliver(b"key=42\n", &dest, &DeliveryOptions::new().diff_mode(true))
        .unwrap();

    let diff = result.diff.expect("diff requested");
    assert!(diff.contains("-key=41"));
    assert!(diff.contains("+key=42"));
}

#[test]
fn test_unchanged_delivery_has_no_diff() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");
    fs::write(&dest, b"key=42\n").unwrap();

    let result = DeliveryManager::new()
        .deliver(b"key=42\n", &dest, &DeliveryOptions::new().diff_mode(true))
        .unwrap();

    assert!(!result.changed);
    assert!(result.diff.is_none());
}

#[cfg(unix)]
#[test]
fn test_mode_applied_on_commit() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("secret.conf");

    DeliveryManager::new()
        .deliver(b"s3cret\n", &dest, &DeliveryOptions::new().mode(0o600))
        .unwrap();

    let mode = fs::metadata(&dest).unwrap().permissions().mode() & 0o7777;
    assert_eq!(mode, 0o600);
}

#[cfg(unix)]
#[test]
fn test_existing_mode_preserved_without_explicit_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");
    fs::write(&dest, b"old\n").unwrap();
    fs::set_permissions(&dest, fs::Permissions::from_mode(0o640)).unwrap();

    DeliveryManager::new()
        .deliver(b"new\n", &dest, &DeliveryOptions::new())
        .unwrap();

    let mode = fs::metadata(&dest).unwrap().permissions().mode() & 0o7777;
    assert_eq!(mode, 0o640);
}

#[test]
fn test_missing_destination_directory_fails_cleanly() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("does/not/exist/app.conf");

    let err = DeliveryManager::new()
        .deliver(b"content\n", &dest, &DeliveryOptions::new())
        .unwrap_err();

    assert!(matches!(err, DeliverError::Io(_)));
}
