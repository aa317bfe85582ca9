use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub creation_user_id: String,
    pub default_visible_columns: usize,
    pub seed_demo_data: bool,
    pub log_filter: String,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            creation_user_id: "u1".into(),
            default_visible_columns: 6,
            seed_demo_data: true,
            log_filter: "info".into(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Defaults, then `server.toml` when present, then environment overrides.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    match read_settings_file(Path::new(SETTINGS_FILE)) {
        Ok(Some(file_cfg)) => apply_file(&mut settings, &file_cfg),
        Ok(None) => {}
        Err(error) => warn!(%error, "ignoring unreadable settings file"),
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn read_settings_file(path: &Path) -> anyhow::Result<Option<HashMap<String, toml::Value>>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let parsed = toml::from_str::<HashMap<String, toml::Value>>(&raw)
        .with_context(|| format!("failed to parse '{}'", path.display()))?;
    Ok(Some(parsed))
}

pub fn apply_file(settings: &mut Settings, file_cfg: &HashMap<String, toml::Value>) {
    if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
        settings.server_bind = v.to_string();
    }
    if let Some(v) = file_cfg.get("creation_user_id").and_then(toml::Value::as_str) {
        settings.creation_user_id = v.to_string();
    }
    if let Some(v) = file_cfg
        .get("default_visible_columns")
        .and_then(toml::Value::as_integer)
        .and_then(|v| usize::try_from(v).ok())
    {
        settings.default_visible_columns = v;
    }
    if let Some(v) = file_cfg.get("seed_demo_data").and_then(toml::Value::as_bool) {
        settings.seed_demo_data = v;
    }
    if let Some(v) = file_cfg.get("log_filter").and_then(toml::Value::as_str) {
        settings.log_filter = v.to_string();
    }
    if let Some(v) = file_cfg
        .get("max_body_bytes")
        .and_then(toml::Value::as_integer)
        .and_then(|v| usize::try_from(v).ok())
    {
        settings.max_body_bytes = v;
    }
}

/// Environment overrides. `APP__*` names win over the bare ones.
pub fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = var("APP__CREATION_USER_ID") {
        settings.creation_user_id = v;
    }

    if let Some(v) = var("APP__DEFAULT_VISIBLE_COLUMNS") {
        match v.parse::<usize>() {
            Ok(parsed) => settings.default_visible_columns = parsed,
            Err(_) => warn!(value = %v, "APP__DEFAULT_VISIBLE_COLUMNS is not a number"),
        }
    }

    if let Some(v) = var("APP__SEED_DEMO_DATA") {
        match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => settings.seed_demo_data = true,
            "0" | "false" | "no" => settings.seed_demo_data = false,
            _ => warn!(value = %v, "APP__SEED_DEMO_DATA is not a boolean"),
        }
    }

    if let Some(v) = var("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = var("APP__MAX_BODY_BYTES") {
        match v.parse::<usize>() {
            Ok(parsed) => settings.max_body_bytes = parsed,
            Err(_) => warn!(value = %v, "APP__MAX_BODY_BYTES is not a number"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
