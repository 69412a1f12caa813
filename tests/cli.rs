use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_csv(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn cmd() -> Command {
    Command::cargo_bin("csv-rescue").unwrap()
}

#[test]
fn dump_prints_every_column() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "broken.csv", b"a,b,c\r\n1,\"two\r\nlines\"\r\n3");

    cmd()
        .arg("dump")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("rows=3, max_cols=3\n"))
        .stdout(predicate::str::contains("  col 1 = \"two\\nlines\"\n"))
        .stdout(predicate::str::contains("[row 2]\n  col 0 = \"3\"\n  col 1 = \"\"\n"));
}

#[test]
fn dump_json() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "t.csv", b"x,y\n1");

    let output = cmd()
        .args(["dump", "--format", "json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["row_count"], 2);
    assert_eq!(value["column_count"], 2);
    assert_eq!(value["rows"][1], serde_json::json!(["1"]));
}

#[test]
fn empty_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "empty.csv", b"");

    cmd()
        .arg("dump")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("input is empty"));
}

#[test]
fn missing_file_fails() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg("dump")
        .arg(dir.path().join("nope.csv"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to load"));
}

#[test]
fn memory_limit_fails_load() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "big.csv", b"a,b\nccccccccccccccccccccc\n");

    cmd()
        .args(["dump", "--memory-limit", "4"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("allocation failed"));
}

#[test]
fn lookup_finds_duplicate_keys() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "index.csv",
        b"id,date,value\n1,20240101,first\n2,20240101,other\n0001,20240101,second\n",
    );

    cmd()
        .arg("lookup")
        .arg(&path)
        .args(["--key", "0:digits:6,1:left:8:0", "--find", "1,20240101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("find_key=\"00000120240101\""))
        .stdout(predicate::str::contains("[FindRows] count=2"))
        .stdout(predicate::str::contains("\"first\""))
        .stdout(predicate::str::contains("\"second\""))
        .stdout(predicate::str::contains("other").not());
}

#[test]
fn lookup_miss_exits_one() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "index.csv", b"id,value\n1,a\n2,b\n");

    cmd()
        .arg("lookup")
        .arg(&path)
        .args(["--key", "0:digits:6", "--find", "3"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[Find] not found"))
        .stdout(predicate::str::contains("[FindRows] count=0"));
}

#[test]
fn lookup_rejects_bad_key_spec() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "index.csv", b"id\n1\n");

    cmd()
        .arg("lookup")
        .arg(&path)
        .args(["--key", "zero:digits:6", "--find", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid key spec"));
}
