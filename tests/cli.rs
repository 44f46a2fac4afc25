use assert_cmd::Command;
use std::process::Output;

const FULL_ENV: &[(&str, &str)] = &[
    ("AWS_REGION", "us-east-1"),
    ("AWS_AVAILABILITY_ZONE", "us-east-1a"),
    ("AWS_SRC_TG_ARN", "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/src/1"),
    ("AWS_DEST_TG_ARN", "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/dst/2"),
];

fn run_command(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::cargo_bin("tgsync").unwrap();
    cmd.env_clear();
    cmd.env("TGSYNC_LOG", "info");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.args(args);

    cmd.output().expect("Failed to execute process")
}

fn assert_no_log_lines(output: &[u8]) {
    let output = std::str::from_utf8(output).expect("Output is not a valid utf8 string");

    // Assert there are no lines with keywords
    let keywords = ["ERROR", "WARN", "INFO", "DEBUG", "TRACE"];
    for line in output.lines() {
        let present = keywords.iter().any(|word| line.contains(word));
        assert!(!present, "Log detected in output line: {:?}", line);
    }
}

#[test]
fn version() {
    let output = run_command(&["--version"], &[]);

    assert!(output.status.success());
    assert_no_log_lines(&output.stdout);
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("tgsync "));
}

#[test]
fn help() {
    let output = run_command(&["--help"], &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--availability-zone"), "{stdout}");
    assert!(stdout.contains("--dry-run"), "{stdout}");
}

#[test]
fn missing_configuration() {
    for (index, (unset, _)) in FULL_ENV.iter().enumerate() {
        let envs = FULL_ENV
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, pair)| *pair)
            .collect::<Vec<_>>();

        let output = run_command(&[], &envs);

        assert_eq!(output.status.code(), Some(exitcode::CONFIG), "unset {unset}");
        assert_no_log_lines(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains(unset), "unset {unset}, stderr: {stderr}");
    }
}

#[test]
fn flags_satisfy_configuration() {
    // every required value comes from flags, the endpoints refuse connections
    let output = run_command(
        &[
            "--region",
            "us-east-1",
            "--availability-zone",
            "us-east-1a",
            "--source",
            "arn:src",
            "--destination",
            "arn:dst",
            "--elbv2-endpoint",
            "http://127.0.0.1:1",
            "--ec2-endpoint",
            "http://127.0.0.1:1",
            "--timeout",
            "5",
        ],
        &[],
    );

    assert_eq!(output.status.code(), Some(exitcode::UNAVAILABLE));
    assert_no_log_lines(&output.stdout);
}

#[test]
fn invalid_endpoint() {
    let mut envs = FULL_ENV.to_vec();
    envs.push(("AWS_ELBV2_ENDPOINT", "ftp://127.0.0.1"));

    let output = run_command(&[], &envs);

    assert_eq!(output.status.code(), Some(exitcode::CONFIG));
}

#[test]
fn missing_env_file() {
    let output = run_command(&["--env-file", "/definitely/not/here/.env"], FULL_ENV);

    assert_eq!(output.status.code(), Some(exitcode::CONFIG));
}

#[test]
fn unknown_flag() {
    let output = run_command(&["--something-not-exist"], FULL_ENV);

    assert!(!output.status.success());
}
