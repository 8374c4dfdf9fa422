use std::process::Command;

#[derive(Debug)]
struct Summary {
    peak_kw: f64,
    battery_line: String,
    total_cost: f64,
    confidence: f64,
}

#[test]
fn scenario_files_run_via_cli_and_produce_distinct_quotes() {
    let resort = run_and_parse("scenarios/resort_resilience.toml", &[]);
    let cold = run_and_parse("scenarios/cold_storage_arbitrage.toml", &[]);

    assert!(
        (resort.peak_kw - cold.peak_kw).abs() > 1.0,
        "expected distinct peaks: resort={:.1}, cold={:.1}",
        resort.peak_kw,
        cold.peak_kw
    );
    assert!(resort.total_cost > 0.0 && cold.total_cost > 0.0);
    assert!((0.0..=0.95).contains(&resort.confidence));
    assert!(cold.battery_line.contains("(4.0 h)"), "{}", cold.battery_line);
}

#[test]
fn duration_flag_overrides_scenario() {
    let summary = run_and_parse(
        "scenarios/resort_resilience.toml",
        &["--duration", "2.5"],
    );
    assert!(summary.battery_line.contains("(2.5 h)"), "{}", summary.battery_line);
}

#[test]
fn default_preset_runs_without_arguments() {
    let output = Command::new(env!("CARGO_BIN_EXE_bess-quote"))
        .output()
        .expect("bess-quote process should run");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    assert!(stdout.starts_with("--- Quote: "), "{stdout}");
}

#[test]
fn invalid_override_exits_with_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_bess-quote"))
        .args(["--preset", "car_wash_tunnel", "--duration", "0"])
        .output()
        .expect("bess-quote process should run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sizing.duration_hours"), "{stderr}");
}

#[test]
fn unknown_preset_exits_with_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_bess-quote"))
        .args(["--preset", "bowling_alley"])
        .output()
        .expect("bess-quote process should run");
    assert!(!output.status.success());
}

fn run_and_parse(path: &str, extra: &[&str]) -> Summary {
    let output = Command::new(env!("CARGO_BIN_EXE_bess-quote"))
        .args(["--scenario", path])
        .args(extra)
        .output()
        .expect("bess-quote process should run");

    assert!(
        output.status.success(),
        "scenario run failed for {path}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    Summary {
        peak_kw: parse_metric(&stdout, "Peak demand:", "kW"),
        battery_line: find_line(&stdout, "Battery:").to_string(),
        total_cost: parse_metric(&stdout, "Total project cost:", ""),
        confidence: parse_metric(&stdout, "Confidence:", ""),
    }
}

fn find_line<'a>(stdout: &'a str, label: &str) -> &'a str {
    stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing line `{label}` in output: {stdout}"))
}

fn parse_metric(stdout: &str, label: &str, unit: &str) -> f64 {
    let line = find_line(stdout, label);
    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid format for line `{line}`"));

    let numeric = raw.strip_suffix(unit).unwrap_or(raw).trim();
    let numeric = numeric.trim_start_matches('$');
    numeric
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("failed parsing `{numeric}` from line `{line}`"))
}
