use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "castline-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_simulate_writes_json_report() {
    let exe = env!("CARGO_BIN_EXE_castline-tester");
    let output_path = temp_path("simulate");
    let status = Command::new(exe)
        .args([
            "--mode",
            "simulate",
            "--seeds",
            "1,2",
            "--casts",
            "120",
            "--sample-size",
            "200",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let runs = value.as_array().expect("array of runs");
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["casts"], 120);
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_loop_writes_ledgers_and_markdown() {
    let exe = env!("CARGO_BIN_EXE_castline-tester");
    let output_path = temp_path("loop-report");
    let ledger_dir = temp_path("loop-ledger");
    let output = Command::new(exe)
        .args([
            "--mode",
            "loop",
            "--ticks",
            "6",
            "--players",
            "3",
            "--sample-size",
            "150",
            "--report",
            "markdown",
            "--ledger-dir",
        ])
        .arg(&ledger_dir)
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Castline Catch Tester"));

    let report = std::fs::read_to_string(&output_path).expect("read output");
    assert!(report.starts_with("# Castline Catch Report"));
    let history = std::fs::read_to_string(ledger_dir.join("history.jsonl")).expect("history");
    let claims = std::fs::read_to_string(ledger_dir.join("claims.jsonl")).expect("claims");
    assert!(history.lines().count() > 0);
    assert_eq!(history.lines().count(), claims.lines().count());
    let _ = std::fs::remove_file(output_path);
    let _ = std::fs::remove_dir_all(ledger_dir);
}

#[test]
fn cli_rejects_unknown_seed_tokens() {
    let exe = env!("CARGO_BIN_EXE_castline-tester");
    let output = Command::new(exe)
        .args(["--seeds", "salmon", "--casts", "1"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unrecognized seed token"));
}

#[test]
fn cli_reports_a_broken_catalog() {
    let exe = env!("CARGO_BIN_EXE_castline-tester");
    let fish_path = temp_path("broken-fish");
    std::fs::write(&fish_path, "{\"fish\": 12}").expect("write catalog");
    let output = Command::new(exe)
        .args(["--casts", "1", "--fish"])
        .arg(&fish_path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("reading fish catalog"));
    let _ = std::fs::remove_file(fish_path);
}
