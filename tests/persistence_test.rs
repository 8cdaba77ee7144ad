#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use common::{today, valid_payments, write_batch};
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_ledger_survives_restart() {
    let db_dir = tempdir().unwrap();
    let db_path = db_dir.path().join("test_db");
    let payments = valid_payments(10, today());

    // 1. First run: merge a fresh batch
    let first = tempdir().unwrap();
    write_batch(first.path(), &payments).unwrap();

    let mut cmd1 = Command::new(cargo_bin!("paymerge"));
    cmd1.arg(first.path()).arg("--db-path").arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("was created!"));

    // 2. Second run: the same documents in another directory, same DB
    let second = tempdir().unwrap();
    write_batch(second.path(), &payments).unwrap();

    let mut cmd2 = Command::new(cargo_bin!("paymerge"));
    cmd2.arg(second.path()).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(!output2.status.success());
    let stderr2 = String::from_utf8_lossy(&output2.stderr);

    // The ledger written by the first process flags the re-submission
    assert!(stderr2.contains("уже был загружен ранее"));
}
