// tests/config_test.rs
use serial_test::serial;
use std::io::Write;
use tag_retention::config::{load_inputs, LogFormat, Settings};
use tag_retention::rules::ListInput;
use tag_retention::RetentionError;
use tempfile::NamedTempFile;
use tracing::Level;

const INPUT_VARS: &[&str] = &[
    "INPUT_REPOSITORY",
    "INPUT_USERNAME",
    "INPUT_PASSWORD",
    "INPUT_MATCH",
    "INPUT_RETENTION",
    "INPUT_MINIMUM",
    "INPUT_MULTIPLE",
    "INPUT_UNLESS",
    "INPUT_DRYRUN",
];

fn clear_env() {
    for var in INPUT_VARS {
        std::env::remove_var(var);
    }
}

fn config_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
#[serial]
fn test_load_fixture() {
    clear_env();
    let inputs = load_inputs(Some("tests/fixtures/retention.toml")).expect("fixture should load");

    assert_eq!(inputs.repository.as_deref(), Some("acme/app"));
    assert_eq!(inputs.dryrun.as_deref(), Some("true"));
    assert!(matches!(inputs.multiple, Some(ListInput::Structured(_))));
    assert!(matches!(inputs.unless, Some(ListInput::Serialized(_))));
    assert_eq!(inputs.log.level, Level::DEBUG);
    assert_eq!(inputs.log.format, LogFormat::Json);

    let settings = Settings::from_inputs(&inputs).unwrap();
    assert!(settings.dry_run);
    assert_eq!(settings.rules.retention.len(), 2);
    assert_eq!(settings.rules.retention[0].minimum, Some(3));
    assert_eq!(settings.rules.exceptions.len(), 1);
}

#[test]
#[serial]
fn test_single_rule_from_file() {
    clear_env();
    let file = config_file(
        r#"
repository = "acme/app"
match = "^nightly-"
retention = "30d"
minimum = 5
"#,
    );

    let inputs = load_inputs(Some(file.path().to_str().unwrap())).unwrap();
    assert_eq!(inputs.minimum.as_deref(), Some("5"));

    let settings = Settings::from_inputs(&inputs).unwrap();
    assert_eq!(settings.rules.retention.len(), 1);
    assert_eq!(
        settings.rules.retention[0].matcher.pattern(),
        Some("^nightly-")
    );
    assert!(!settings.dry_run);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let file = config_file(
        r#"
repository = "acme/app"
retention = "30d"
"#,
    );
    std::env::set_var("INPUT_REPOSITORY", "acme/other");
    std::env::set_var("INPUT_DRYRUN", "TRUE");
    std::env::set_var(
        "INPUT_MULTIPLE",
        r#"[{"match": "^v", "retention": "1y", "minimum": "2"}]"#,
    );
    std::env::set_var("INPUT_PASSWORD", "0123");

    let inputs = load_inputs(Some(file.path().to_str().unwrap()));
    clear_env();
    let inputs = inputs.unwrap();

    assert_eq!(inputs.repository.as_deref(), Some("acme/other"));
    // environment values stay verbatim text
    assert_eq!(inputs.password.as_deref(), Some("0123"));

    let settings = Settings::from_inputs(&inputs).unwrap();
    assert!(settings.dry_run);
    assert_eq!(settings.rules.retention[0].minimum, Some(2));
}

#[test]
#[serial]
fn test_environment_only() {
    clear_env();
    std::env::set_var("INPUT_REPOSITORY", "acme/app");
    std::env::set_var("INPUT_RETENTION", "6m");
    std::env::set_var("INPUT_UNLESS", "");

    let inputs = load_inputs(None);
    clear_env();
    let settings = Settings::from_inputs(&inputs.unwrap()).unwrap();

    assert_eq!(settings.repository, "acme/app");
    assert!(settings.rules.exceptions.is_empty());
}

#[test]
#[serial]
fn test_missing_retention_in_multiple_is_fatal() {
    clear_env();
    let file = config_file(
        r#"
repository = "acme/app"
multiple = '[{"match": "^v"}]'
"#,
    );

    let inputs = load_inputs(Some(file.path().to_str().unwrap())).unwrap();
    let err = Settings::from_inputs(&inputs).unwrap_err();
    assert!(matches!(err, RetentionError::ConfigMissingFields { .. }));
    assert!(err.is_configuration());
}

#[test]
#[serial]
fn test_malformed_file() {
    clear_env();
    let file = config_file("repository = ");
    let err = load_inputs(Some(file.path().to_str().unwrap())).unwrap_err();
    assert!(matches!(err, RetentionError::Config(_)));
}

#[test]
#[serial]
fn test_unknown_log_level() {
    clear_env();
    let file = config_file(
        r#"
repository = "acme/app"

[log]
level = "loud"
"#,
    );
    let err = load_inputs(Some(file.path().to_str().unwrap())).unwrap_err();
    assert!(err.to_string().contains("loud"));
}
