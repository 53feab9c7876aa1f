use std::collections::HashMap;

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_match_canvas_limits() {
    let config = AppConfig::default();
    assert_eq!(config.engine_url, None);
    assert_eq!(config.min_zoom, 0.1);
    assert_eq!(config.max_zoom, 10_000.0);
    assert_eq!(config.log_filter, "info");
}

#[test]
fn toml_fields_are_optional() {
    let config = AppConfig::from_toml_str("engine_url = \"http://127.0.0.1:8765\"\n")
        .expect("parse");
    assert_eq!(config.engine_url.as_deref(), Some("http://127.0.0.1:8765"));
    assert_eq!(config.max_zoom, AppConfig::default().max_zoom);
}

#[test]
fn unknown_toml_keys_are_rejected() {
    assert!(AppConfig::from_toml_str("engine = \"x\"\n").is_err());
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let mut config = AppConfig::from_toml_str("engine_url = \"http://file\"\nmin_zoom = 0.5\n")
        .expect("parse");
    config.apply_env(env(&[
        ("LWV_ENGINE_URL", "http://legacy"),
        ("APP__ENGINE_URL", "http://app"),
        ("APP__MAX_ZOOM", "500"),
        ("APP__MIN_ZOOM", "not-a-number"),
        ("APP__LOG_FILTER", "  "),
    ]));

    assert_eq!(config.engine_url.as_deref(), Some("http://app"));
    assert_eq!(config.max_zoom, 500.0);
    assert_eq!(config.min_zoom, 0.5);
    assert_eq!(config.log_filter, "info");
}

#[test]
fn cli_overrides_everything() {
    let mut config = AppConfig::default();
    config.apply_env(env(&[("APP__ENGINE_URL", "http://app"), ("APP__MAX_ZOOM", "500")]));
    config.apply_overrides(&ConfigOverrides {
        engine_url: Some("http://cli".to_string()),
        max_zoom: Some(50.0),
        log_filter: Some("debug".to_string()),
        ..ConfigOverrides::default()
    });

    assert_eq!(config.engine_url.as_deref(), Some("http://cli"));
    assert_eq!(config.max_zoom, 50.0);
    assert_eq!(config.log_filter, "debug");
}

#[test]
fn explicit_missing_file_is_an_error() {
    let missing = std::env::temp_dir().join("lwv-config-does-not-exist.toml");
    assert!(load_config(Some(&missing), &ConfigOverrides::default()).is_err());
}

#[test]
fn explicit_file_is_loaded() {
    let path = std::env::temp_dir().join(format!("lwv-config-{}.toml", std::process::id()));
    fs::write(&path, "pick_radius_px = 9.0\n").expect("write config");
    let config = AppConfig::from_file(&path).expect("load");
    let _ = fs::remove_file(&path);
    assert_eq!(config.pick_radius_px, 9.0);
}

#[test]
fn non_finite_zoom_from_env_falls_back_to_defaults() {
    let mut config = AppConfig::default();
    config.apply_env(env(&[("APP__MIN_ZOOM", "nan"), ("APP__MAX_ZOOM", "inf")]));
    assert!(config.min_zoom.is_nan());

    assert_eq!(config.validate_zoom_limits(), ["min_zoom", "max_zoom"]);
    assert_eq!(config.min_zoom, DEFAULT_MIN_ZOOM);
    assert_eq!(config.max_zoom, DEFAULT_MAX_ZOOM);
}

#[test]
fn non_positive_zoom_override_falls_back_to_default() {
    let mut config = AppConfig::default();
    config.apply_overrides(&ConfigOverrides {
        min_zoom: Some(0.0),
        max_zoom: Some(25.0),
        ..ConfigOverrides::default()
    });

    assert_eq!(config.validate_zoom_limits(), ["min_zoom"]);
    assert_eq!(config.min_zoom, DEFAULT_MIN_ZOOM);
    assert_eq!(config.max_zoom, 25.0);
}

#[test]
fn valid_zoom_limits_are_kept() {
    let mut config = AppConfig::from_toml_str("min_zoom = 0.5\nmax_zoom = 40.0\n").expect("parse");
    assert!(config.validate_zoom_limits().is_empty());
    assert_eq!((config.min_zoom, config.max_zoom), (0.5, 40.0));
}
