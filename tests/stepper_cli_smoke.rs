//! Runs the stepper binary against a stand-in for the mermaid CLI
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

/// Writes `<svg id="ID">SOURCE</svg>` to the -o path, fails on "fail"
const FAKE_MMDC: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -i) input="$2"; shift ;;
    -o) output="$2"; shift ;;
    -I) id="$2"; shift ;;
  esac
  shift
done
if grep -q fail "$input"; then
  echo "Parse error on line 1" >&2
  exit 1
fi
printf '<svg id="%s">%s</svg>' "$id" "$(cat "$input")" > "$output"
"#;

const TUTORIAL: &str = r#"
title = "Flowcharts"

[states]
initial = "graph TD; A-->B"
other = "graph TD; X-->Y"
broken = "graph TD; fail"

[[steps]]
label = "Start"
state = "initial"

[[steps]]
label = "Other"
state = "other"

[[steps]]
label = "Broken"
state = "broken"
"#;

fn write_fixture(dir: &Path) {
    let mmdc = dir.join("mmdc");
    fs::write(&mmdc, FAKE_MMDC).expect("write fake mmdc");
    fs::set_permissions(&mmdc, fs::Permissions::from_mode(0o755)).expect("chmod fake mmdc");
    fs::write(dir.join("tutorial.toml"), TUTORIAL).expect("write tutorial");
}

fn run_stepper(dir: &Path, extra: &[&str]) -> std::process::Output {
    let bin_path = std::env::var("CARGO_BIN_EXE_stepper")
        .unwrap_or_else(|_| "target/debug/stepper".to_string());

    Command::new(bin_path)
        .current_dir(dir)
        .arg("tutorial.toml")
        .arg("--mmdc")
        .arg(dir.join("mmdc"))
        .arg("--work-dir")
        .arg(dir.join("work"))
        .args(extra)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run stepper")
}

#[test]
fn stepper_cli_smoke() {
    let dir = tempfile::tempdir().expect("create temp dir");
    write_fixture(dir.path());

    // page-ready only
    let output = run_stepper(dir.path(), &[]);
    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(">graph TD; A-->B</svg>"), "{stdout}");
    assert!(stdout.contains("<svg id=\"diagram-"), "{stdout}");

    // the last click wins
    let output = run_stepper(dir.path(), &["--click", "2", "--click", "1"]);
    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(">graph TD; X-->Y</svg>"), "{stdout}");
    assert!(!stdout.contains("A-->B"), "{stdout}");

    // renderer failures end up on the page, not in the exit status
    let output = run_stepper(dir.path(), &["--click", "2", "--page"]);
    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Error rendering diagram"), "{stdout}");
    assert!(stdout.contains("Parse error on line 1"), "{stdout}");
    assert!(
        stdout.contains("<li class=\"step active\" data-state=\"broken\">"),
        "{stdout}"
    );

    // scratch files are cleaned up, only the config stays
    let leftovers: Vec<_> = fs::read_dir(dir.path().join("work"))
        .expect("list work dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(leftovers, vec!["mermaid-config.json".to_string()]);
}

#[test]
fn stepper_missing_tutorial_fails() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let bin_path = std::env::var("CARGO_BIN_EXE_stepper")
        .unwrap_or_else(|_| "target/debug/stepper".to_string());

    let output = Command::new(bin_path)
        .current_dir(dir.path())
        .arg("missing.toml")
        .output()
        .expect("Failed to run stepper");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.toml"), "{stderr}");
}
