use std::process::Command;

fn expvar() -> Command {
    Command::new(env!("CARGO_BIN_EXE_expvar"))
}

#[test]
fn cli_stratified_prints_estimate_and_writes_chart() {
    let dir = tempfile::tempdir().unwrap();
    let output = expvar()
        .args(["stratified", "--seed", "42", "--out-dir"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Stratified sampling"));
    assert!(dir.path().join("stratified_histogram.svg").exists());
    assert!(!dir.path().join("control_histogram.svg").exists());
}

#[test]
fn cli_json_report_parses() {
    let dir = tempfile::tempdir().unwrap();
    let output = expvar()
        .args(["conditional", "--json", "--out-dir"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["seed"], 42);
    let p = report["conditional"]["result"]["estimate"].as_f64().unwrap();
    assert!(p > 0.0 && p < 1.0);
    assert!(report.get("stratified").is_none());
}

#[test]
fn cli_config_file_drives_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("experiment.yaml");
    std::fs::write(
        &config,
        format!(
            "seed: 3\nrate: 2.0\nstratified:\n  sample_count: 500\noutput:\n  dir: {}\n",
            dir.path().join("charts").display()
        ),
    )
    .unwrap();

    let output = expvar()
        .args(["stratified", "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["seed"], 3);
    assert!(dir.path().join("charts").join("stratified_histogram.svg").exists());
}

#[test]
fn cli_invalid_parameter_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.yaml");
    std::fs::write(&config, "stratified:\n  boundaries: [0.0, 2.0, 1.0, .inf]\n").unwrap();

    let output = expvar().args(["stratified", "--config"]).arg(&config).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("boundaries"));
}

#[test]
fn cli_unknown_command_exits_one() {
    let output = expvar().arg("bogus").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn cli_version() {
    let output = expvar().arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().starts_with("expvar "));
}
