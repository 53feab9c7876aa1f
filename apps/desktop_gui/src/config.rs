//! Layered desktop configuration: defaults, then a TOML file, then
//! environment variables, then command-line flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use lwv_scene::view::{valid_zoom_limit, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "lwv.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Base URL of the analysis engine; `None` leaves the viewer without one.
    pub engine_url: Option<String>,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub log_filter: String,
    /// Click tolerance on the canvas, in screen pixels.
    pub pick_radius_px: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine_url: None,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            log_filter: "info".to_string(),
            pick_radius_px: 6.0,
        }
    }
}

/// Values given on the command line; `None` keeps the layered value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub engine_url: Option<String>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub log_filter: Option<String>,
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("invalid configuration")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in '{}'", path.display()))
    }

    /// Applies `LWV_ENGINE_URL` and the `APP__*` variables. Unparsable
    /// numbers are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("LWV_ENGINE_URL") {
            self.engine_url = Some(v);
        }
        if let Some(v) = non_empty("APP__ENGINE_URL") {
            self.engine_url = Some(v);
        }
        if let Some(v) = non_empty("APP__MIN_ZOOM").and_then(|v| v.trim().parse().ok()) {
            self.min_zoom = v;
        }
        if let Some(v) = non_empty("APP__MAX_ZOOM").and_then(|v| v.trim().parse().ok()) {
            self.max_zoom = v;
        }
        if let Some(v) = non_empty("APP__LOG_FILTER") {
            self.log_filter = v;
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(v) = &overrides.engine_url {
            self.engine_url = Some(v.clone());
        }
        if let Some(v) = overrides.min_zoom {
            self.min_zoom = v;
        }
        if let Some(v) = overrides.max_zoom {
            self.max_zoom = v;
        }
        if let Some(v) = &overrides.log_filter {
            self.log_filter = v.clone();
        }
    }

    /// Resets any zoom limit that is not finite and positive to its default.
    /// Returns the names of the fields that were reset.
    pub fn validate_zoom_limits(&mut self) -> Vec<&'static str> {
        let mut reset = Vec::new();
        if !valid_zoom_limit(self.min_zoom) {
            tracing::warn!(
                min_zoom = self.min_zoom,
                fallback = DEFAULT_MIN_ZOOM,
                "config: invalid min_zoom"
            );
            self.min_zoom = DEFAULT_MIN_ZOOM;
            reset.push("min_zoom");
        }
        if !valid_zoom_limit(self.max_zoom) {
            tracing::warn!(
                max_zoom = self.max_zoom,
                fallback = DEFAULT_MAX_ZOOM,
                "config: invalid max_zoom"
            );
            self.max_zoom = DEFAULT_MAX_ZOOM;
            reset.push("max_zoom");
        }
        reset
    }
}

/// Config file to read when none is given: `./lwv.toml`, else the per-user
/// config directory.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("lwv").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

/// An explicitly named file must exist; the default locations are optional.
/// Zoom limits are left as layered; callers run
/// [`AppConfig::validate_zoom_limits`] once logging is up.
pub fn load_config(
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> anyhow::Result<AppConfig> {
    let mut config = match explicit {
        Some(path) => AppConfig::from_file(path)?,
        None => match default_config_path() {
            Some(path) => AppConfig::from_file(&path)?,
            None => AppConfig::default(),
        },
    };
    config.apply_env(|key| std::env::var(key).ok());
    config.apply_overrides(overrides);
    Ok(config)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
