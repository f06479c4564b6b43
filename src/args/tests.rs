use std::time::Duration;

use super::parsers::{parse_bool_env, parse_duration_arg};
use super::test_support::parse_test_args;
use super::*;
use crate::error::ValidationError;

#[test]
fn parse_args_defaults() -> Result<(), String> {
    let args = parse_test_args(["vuload"]).map_err(|err| format!("parse failed: {}", err))?;

    let checks = [
        (args.url == DEFAULT_TARGET_URL, "Unexpected url"),
        (args.virtual_users.get() == 20, "Unexpected virtual_users"),
        (
            args.requests_per_user.get() == 10,
            "Unexpected requests_per_user",
        ),
        (
            args.request_timeout == Duration::from_secs(30),
            "Unexpected request_timeout",
        ),
        (
            args.connect_timeout == Duration::from_secs(10),
            "Unexpected connect_timeout",
        ),
        (args.log_dir == "logs", "Unexpected log_dir"),
        (
            args.queue_capacity.get() == 10_000,
            "Unexpected queue_capacity",
        ),
        (
            matches!(args.output_format, OutputFormat::Text),
            "Expected OutputFormat::Text",
        ),
        (args.config.is_none(), "Expected config to be None"),
        (!args.verbose, "Expected verbose to be false"),
    ];

    for (ok, message) in checks {
        if !ok {
            return Err(message.to_owned());
        }
    }
    Ok(())
}

#[test]
fn parse_args_core_options() -> Result<(), String> {
    let args = parse_test_args([
        "vuload",
        "-u",
        "http://localhost:8080/health",
        "-c",
        "3",
        "-r",
        "7",
        "--timeout",
        "250ms",
        "--log-dir",
        "/tmp/vuload-logs",
        "--queue-capacity",
        "64",
        "--output-format",
        "json",
    ])
    .map_err(|err| format!("parse failed: {}", err))?;

    if args.url != "http://localhost:8080/health" {
        return Err(format!("Unexpected url: {}", args.url));
    }
    if args.virtual_users.get() != 3 {
        return Err("Unexpected virtual_users".to_owned());
    }
    if args.requests_per_user.get() != 7 {
        return Err("Unexpected requests_per_user".to_owned());
    }
    if args.request_timeout != Duration::from_millis(250) {
        return Err("Unexpected request_timeout".to_owned());
    }
    if args.log_dir != "/tmp/vuload-logs" {
        return Err("Unexpected log_dir".to_owned());
    }
    if args.queue_capacity.get() != 64 {
        return Err("Unexpected queue_capacity".to_owned());
    }
    if args.output_format != OutputFormat::Json {
        return Err("Expected OutputFormat::Json".to_owned());
    }
    Ok(())
}

#[test]
fn parse_args_rejects_zero_users() -> Result<(), String> {
    match parse_test_args(["vuload", "--users", "0"]) {
        Ok(_) => Err("Expected zero users to be rejected".to_owned()),
        Err(_) => Ok(()),
    }
}

#[test]
fn parse_args_rejects_zero_requests() -> Result<(), String> {
    match parse_test_args(["vuload", "--requests", "0"]) {
        Ok(_) => Err("Expected zero requests to be rejected".to_owned()),
        Err(_) => Ok(()),
    }
}

#[test]
fn parse_duration_units() -> Result<(), String> {
    let cases = [
        ("15", Duration::from_secs(15)),
        ("500ms", Duration::from_millis(500)),
        ("2s", Duration::from_secs(2)),
        ("3m", Duration::from_secs(180)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed =
            parse_duration_arg(input).map_err(|err| format!("parse {} failed: {}", input, err))?;
        if parsed != expected {
            return Err(format!("Unexpected duration for {}: {:?}", input, parsed));
        }
    }
    Ok(())
}

#[test]
fn parse_duration_rejects_invalid() -> Result<(), String> {
    match parse_duration_arg("") {
        Err(ValidationError::DurationEmpty) => {}
        other => return Err(format!("Expected DurationEmpty, got {:?}", other)),
    }
    match parse_duration_arg("abc") {
        Err(ValidationError::InvalidDurationFormat { .. }) => {}
        other => return Err(format!("Expected InvalidDurationFormat, got {:?}", other)),
    }
    match parse_duration_arg("5d") {
        Err(ValidationError::InvalidDurationUnit { unit }) if unit == "d" => {}
        other => return Err(format!("Expected InvalidDurationUnit, got {:?}", other)),
    }
    match parse_duration_arg("0ms") {
        Err(ValidationError::DurationZero) => {}
        other => return Err(format!("Expected DurationZero, got {:?}", other)),
    }
    Ok(())
}

#[test]
fn parse_bool_env_accepts_common_spellings() -> Result<(), String> {
    for value in ["1", "true", "YES", "on"] {
        if !parse_bool_env(value).map_err(|err| err.to_string())? {
            return Err(format!("Expected {} to be true", value));
        }
    }
    for value in ["0", "false", "No", "off"] {
        if parse_bool_env(value).map_err(|err| err.to_string())? {
            return Err(format!("Expected {} to be false", value));
        }
    }
    if parse_bool_env("maybe").is_ok() {
        return Err("Expected 'maybe' to be rejected".to_owned());
    }
    Ok(())
}
