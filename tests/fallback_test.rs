mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use common::write_lines;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let input = write_lines(&[r#"{"op": "add_user", "email": "alice@carrent.test"}"#]).unwrap();

    let mut cmd = Command::new(cargo_bin!("carrent"));
    cmd.arg(input.path()).arg("--db-path").arg("some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."))
        .stdout(predicate::str::contains(r#""status":201"#));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let input = write_lines(&[r#"{"op": "add_user", "email": "alice@carrent.test"}"#]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("carrent"));
    cmd.arg(input.path()).arg("--db-path").arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING").not());
}
