use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_local_backend() {
    let settings = Settings::default();
    assert_eq!(settings.backend_url, "http://localhost:8000");
    assert_eq!(settings.accepted_media_type, "application/pdf");
    assert_eq!(settings.external_reveal_delay(), Duration::from_secs(2));
    assert_eq!(settings.request_timeout(), None);
    assert!(settings.validate().is_ok());
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_settings(
        &mut settings,
        r#"
backend_url = "https://answers.example.com/api"
external_reveal_delay_ms = 500
request_timeout_secs = 30
"#,
    )
    .expect("parse");

    assert_eq!(settings.backend_url, "https://answers.example.com/api");
    assert_eq!(settings.external_reveal_delay(), Duration::from_millis(500));
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));
    assert_eq!(settings.accepted_media_type, "application/pdf");
}

#[test]
fn empty_welcome_disables_greeting() {
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, r#"welcome_message = "  ""#).expect("parse");
    assert_eq!(settings.welcome_message, None);
}

#[test]
fn malformed_file_is_an_error() {
    let mut settings = Settings::default();
    assert!(apply_file_settings(&mut settings, "external_reveal_delay_ms = \"soon\"").is_err());
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_short_name() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("PRODUCTPAL_BACKEND_URL", "http://short:1"),
            ("APP__BACKEND_URL", "http://prefixed:2"),
            ("APP__EXTERNAL_REVEAL_DELAY_MS", "0"),
        ]),
    );
    assert_eq!(settings.backend_url, "http://prefixed:2");
    assert_eq!(settings.external_reveal_delay_ms, 0);
}

#[test]
fn unparsable_numeric_env_is_ignored() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("APP__EXTERNAL_REVEAL_DELAY_MS", "fast"),
            ("APP__REQUEST_TIMEOUT_SECS", "-1"),
        ]),
    );
    assert_eq!(settings, Settings::default());
}

#[test]
fn zero_timeout_means_no_timeout() {
    let settings = Settings {
        request_timeout_secs: Some(0),
        ..Settings::default()
    };
    assert_eq!(settings.request_timeout(), None);
}

#[test]
fn validate_rejects_bad_backend_url() {
    for backend_url in ["not a url", "ftp://files.example.com"] {
        let settings = Settings {
            backend_url: backend_url.to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err(), "{backend_url} should fail");
    }
}

#[test]
fn explicit_config_path_must_exist() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let missing = env::temp_dir().join(format!("productpal_missing_{suffix}.toml"));
    assert!(load_settings(Some(missing.as_path())).is_err());
}

#[test]
fn explicit_config_path_is_loaded() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("productpal_config_test_{suffix}.toml"));
    fs::write(&path, "accepted_media_type = \"application/x-pdf\"\n").expect("write");

    let settings = load_settings(Some(path.as_path())).expect("load");
    assert_eq!(settings.accepted_media_type, "application/x-pdf");

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn cli_flags_override_env_and_file() {
    let mut settings = Settings::default();
    apply_file_settings(
        &mut settings,
        "backend_url = \"http://from-file:1\"\nexternal_reveal_delay_ms = 750\n",
    )
    .expect("parse");
    apply_env_overrides(&mut settings, env_from(&[("APP__BACKEND_URL", "http://from-env:2")]));

    CliOverrides {
        backend_url: Some("http://from-flag:3".to_string()),
        reveal_delay_ms: None,
        timeout_secs: Some(10),
    }
    .apply(&mut settings);

    assert_eq!(settings.backend_url, "http://from-flag:3");
    assert_eq!(settings.external_reveal_delay_ms, 750);
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(10)));
}

#[test]
fn absent_cli_flags_change_nothing() {
    let mut settings = Settings::default();
    CliOverrides::default().apply(&mut settings);
    assert_eq!(settings, Settings::default());
}
