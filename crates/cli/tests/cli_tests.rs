// Integration tests for the tabrecon binary: --json stdout contract and exit codes.
//
// Run with: cargo test -p tabrecon-cli --test cli_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn tabrecon() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tabrecon"));
    cmd.env_remove("TABRECON_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Assert stdout is a single, parseable JSON value with no extra lines.
fn assert_single_json(stdout: &[u8]) -> serde_json::Value {
    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");
    serde_json::from_str(trimmed)
        .unwrap_or_else(|e| panic!("stdout must be one JSON value.\nParse error: {e}\nstdout:\n{trimmed}"))
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    tabrecon().args(args).output().expect("run tabrecon")
}

fn s(p: &Path) -> &str {
    p.to_str().unwrap()
}

const LEFT: &str = r#"{"columns":[
  {"name":"id","dtype":"numeric","values":[1,2,3]},
  {"name":"name","dtype":"text","values":["ann","bob","cy"]}
]}"#;

const RIGHT: &str = r#"{"columns":[
  {"name":"id","dtype":"numeric","values":[2,3,4,4]},
  {"name":"name","dtype":"text","values":["bob","CY","dee","dee"]},
  {"name":"total","dtype":"numeric","values":[10.5,null,3,4]}
]}"#;

fn fixtures() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let left = write(&dir, "left.json", LEFT);
    let right = write(&dir, "right.json", RIGHT);
    (dir, left, right)
}

// ===========================================================================
// compare
// ===========================================================================

#[test]
fn compare_json_is_single_value() {
    let (_dir, left, right) = fixtures();
    let out = run(&["compare", s(&left), s(&right), "--key", "id", "--json"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let val = assert_single_json(&out.stdout);
    assert_eq!(val["structure"]["columns_only_right"][0], "total");
    assert_eq!(val["rows"]["total_only_left"], 1);
    assert_eq!(val["rows"]["total_only_right"], 1);
    assert_eq!(val["rows"]["total_differing"], 1);
    assert_eq!(val["cells"]["entries"][0]["kind"], "changed");
    assert!(val["narrative"]["bullet_points"].as_array().unwrap().len() >= 3);
}

#[test]
fn compare_without_key_omits_rows() {
    let (_dir, left, right) = fixtures();
    let out = run(&["compare", s(&left), s(&right), "--json"]);
    assert!(out.status.success());
    let val = assert_single_json(&out.stdout);
    assert!(val["rows"].is_null());
    assert!(val["cells"].is_null());
}

#[test]
fn compare_human_output_is_bullets() {
    let (_dir, left, right) = fixtures();
    let out = run(&["compare", s(&left), s(&right), "--key", "id"]);
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.starts_with("- Left has 3 rows, 2 columns; Right has 4 rows, 3 columns."));
}

#[test]
fn compare_fail_on_diff_exits_4() {
    let (_dir, left, right) = fixtures();
    let out = run(&["compare", s(&left), s(&right), "--key", "id", "--fail-on-diff"]);
    assert_eq!(out.status.code(), Some(4));

    let same = run(&["compare", s(&left), s(&left), "--key", "id", "--fail-on-diff"]);
    assert_eq!(same.status.code(), Some(0));
}

#[test]
fn compare_writes_report_file() {
    let (dir, left, right) = fixtures();
    let report = dir.path().join("report.json");
    let out = run(&["compare", s(&left), s(&right), "--key", "id", "--output", s(&report)]);
    assert!(out.status.success());
    let val: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(val["rows"]["total_in_both"], 2);
}

// ===========================================================================
// merge
// ===========================================================================

#[test]
fn merge_json_reports_summary_and_warnings() {
    let (_dir, left, right) = fixtures();
    let out = run(&["merge", s(&left), s(&right), "--on", "id", "--how", "outer", "--json"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let val = assert_single_json(&out.stdout);
    assert_eq!(val["success"], true);
    let summary = &val["summary"];
    assert_eq!(summary["merge_type"], "outer");
    assert_eq!(summary["matched_rows"], 2);
    assert_eq!(summary["unmatched_left"], 1);
    assert_eq!(summary["unmatched_right"], 2);
    assert_eq!(summary["rows_result"], 5);
    assert_eq!(summary["findings"][0]["kind"]["type"], "duplicate_keys");

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("WARNING: 2 duplicate key rows in right"));
}

#[test]
fn merge_writes_csv_output() {
    let (dir, left, right) = fixtures();
    let csv = dir.path().join("merged.csv");
    let out = run(&["merge", s(&left), s(&right), "--on", "id", "--no-indicator", "-o", s(&csv)]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());

    let text = std::fs::read_to_string(&csv).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("id,name_left,name_right,total"));
    assert_eq!(lines.next(), Some("2,bob,bob,10.5"));
    assert_eq!(lines.next(), Some("3,cy,CY,"));
    assert_eq!(lines.next(), None);
}

#[test]
fn merge_missing_key_exits_5() {
    let (_dir, left, right) = fixtures();
    let out = run(&["merge", s(&left), s(&right), "--on", "total", "--json"]);
    assert_eq!(out.status.code(), Some(5));
    let val = assert_single_json(&out.stdout);
    assert_eq!(val["success"], false);
    assert_eq!(val["summary"]["validation_passed"], false);
    assert_eq!(val["error"]["kind"], "validation");
}

#[test]
fn merge_without_keys_exits_7() {
    let (_dir, left, right) = fixtures();
    let out = run(&["merge", s(&left), s(&right), "--left-on", "id"]);
    assert_eq!(out.status.code(), Some(7));
    assert!(String::from_utf8_lossy(&out.stderr).contains("hint:"));
}

#[test]
fn merge_incompatible_keys_exits_6() {
    let dir = TempDir::new().unwrap();
    let left = write(&dir, "l.json", LEFT);
    let text_ids = write(
        &dir,
        "r.json",
        r#"{"columns":[{"name":"id","dtype":"text","values":["1"]}]}"#,
    );
    let out = run(&["merge", s(&left), s(&text_ids), "--on", "id"]);
    assert_eq!(out.status.code(), Some(6));
}

#[test]
fn merge_bad_config_exits_8() {
    let (dir, left, right) = fixtures();
    let config = write(&dir, "bad.toml", "[merge]\nleft_suffix = \"_x\"\nright_suffix = \"_x\"\n");
    let out = run(&["merge", s(&left), s(&right), "--on", "id", "--config", s(&config)]);
    assert_eq!(out.status.code(), Some(8));
}

#[test]
fn invalid_dataset_exits_3() {
    let dir = TempDir::new().unwrap();
    let bad = write(&dir, "bad.json", r#"{"columns":[{"name":"id","dtype":"numeric","values":["x"]}]}"#);
    let out = run(&["compare", s(&bad), s(&bad)]);
    assert_eq!(out.status.code(), Some(3));

    let missing = dir.path().join("nope.json");
    let out = run(&["compare", s(&missing), s(&bad)]);
    assert_eq!(out.status.code(), Some(3));
}

// ===========================================================================
// concat / suggest-keys
// ===========================================================================

#[test]
fn concat_json_counts_rows() {
    let (_dir, left, right) = fixtures();
    let out = run(&["concat", s(&left), s(&right), "--json"]);
    assert!(out.status.success());
    let val = assert_single_json(&out.stdout);
    assert_eq!(val["summary"]["merge_type"], "concat");
    assert_eq!(val["summary"]["rows_result"], 7);
    assert_eq!(val["summary"]["missing_values_introduced"]["total"], 3);
}

#[test]
fn suggest_keys_json_ranks_id_first() {
    let (_dir, left, right) = fixtures();
    let out = run(&["suggest-keys", s(&left), s(&right), "--json"]);
    assert!(out.status.success());
    let val = assert_single_json(&out.stdout);
    let arr = val.as_array().expect("array of suggestions");
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["column"], "id");
    assert_eq!(arr[0]["score"], 1.5);
    assert_eq!(arr[1]["column"], "name");
}
