use super::{apply_env, apply_file, load_settings, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_local_service() {
    let settings = Settings::default();
    assert_eq!(settings.api_url, "http://localhost:8000");
    assert_eq!(settings.exchange_timeout(), Some(Duration::from_secs(30)));
}

#[test]
fn zero_timeout_disables_it() {
    let settings = Settings {
        exchange_timeout_secs: 0,
        ..Settings::default()
    };
    assert_eq!(settings.exchange_timeout(), None);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        "api_url = \"https://support.example.com\"\nexchange_timeout_secs = 5\n",
    )
    .expect("valid toml");
    assert_eq!(settings.api_url, "https://support.example.com");
    assert_eq!(settings.exchange_timeout_secs, 5);
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "exchange_timeout_secs = 0").expect("valid toml");
    assert_eq!(settings.api_url, "http://localhost:8000");
    assert_eq!(settings.exchange_timeout(), None);
}

#[test]
fn invalid_file_is_an_error_and_leaves_settings_alone() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "exchange_timeout_secs = \"soon\"").is_err());
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        lookup_from(&[
            ("SUPPORT_API_URL", "http://plain:1"),
            ("APP__API_URL", "http://prefixed:2"),
            ("APP__EXCHANGE_TIMEOUT_SECS", " 12 "),
        ]),
    );
    assert_eq!(settings.api_url, "http://prefixed:2");
    assert_eq!(settings.exchange_timeout_secs, 12);
}

#[test]
fn non_numeric_timeout_env_is_ignored() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        lookup_from(&[("APP__EXCHANGE_TIMEOUT_SECS", "forever")]),
    );
    assert_eq!(settings.exchange_timeout_secs, 30);
}

#[test]
fn load_settings_reads_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("support_chat_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("support.toml");
    fs::write(&path, "exchange_timeout_secs = 7\n").expect("write config");

    let settings = load_settings(&path);
    assert_eq!(settings.exchange_timeout_secs, 7);

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let path = env::temp_dir().join("support_chat_config_test_does_not_exist.toml");
    let settings = load_settings(&path);
    assert_eq!(settings.exchange_timeout_secs, Settings::default().exchange_timeout_secs);
}
