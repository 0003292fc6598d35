use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use clap::Args;
use client_core::session::DEFAULT_WELCOME_MESSAGE;
use serde::Deserialize;
use shared::domain::ACCEPTED_MEDIA_TYPE;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "productpal.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend_url: String,
    pub accepted_media_type: String,
    pub external_reveal_delay_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub welcome_message: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".into(),
            accepted_media_type: ACCEPTED_MEDIA_TYPE.into(),
            external_reveal_delay_ms: 2000,
            request_timeout_secs: None,
            welcome_message: Some(DEFAULT_WELCOME_MESSAGE.into()),
        }
    }
}

impl Settings {
    pub fn external_reveal_delay(&self) -> Duration {
        Duration::from_millis(self.external_reveal_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(self.backend_url.trim())
            .with_context(|| format!("invalid backend_url {:?}", self.backend_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("backend_url must use http or https, got {}", url.scheme());
        }
        if self.accepted_media_type.trim().is_empty() {
            bail!("accepted_media_type must not be empty");
        }
        Ok(())
    }
}

/// Command-line flags; applied last, over the file and the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct CliOverrides {
    #[arg(long)]
    pub backend_url: Option<String>,
    #[arg(long)]
    pub reveal_delay_ms: Option<u64>,
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl CliOverrides {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(v) = &self.backend_url {
            settings.backend_url = v.clone();
        }
        if let Some(v) = self.reveal_delay_ms {
            settings.external_reveal_delay_ms = v;
        }
        if let Some(v) = self.timeout_secs {
            settings.request_timeout_secs = Some(v);
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    backend_url: Option<String>,
    accepted_media_type: Option<String>,
    external_reveal_delay_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    welcome_message: Option<String>,
}

/// Defaults, then the config file, then environment overrides.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    if required || path.exists() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        apply_file_settings(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub(crate) fn apply_file_settings(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.backend_url {
        settings.backend_url = v;
    }
    if let Some(v) = file_cfg.accepted_media_type {
        settings.accepted_media_type = v;
    }
    if let Some(v) = file_cfg.external_reveal_delay_ms {
        settings.external_reveal_delay_ms = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = Some(v);
    }
    if let Some(v) = file_cfg.welcome_message {
        settings.welcome_message = normalize_welcome(v);
    }
    Ok(())
}

pub(crate) fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("PRODUCTPAL_BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = var("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Some(v) = var("APP__EXTERNAL_REVEAL_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.external_reveal_delay_ms = parsed;
        }
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }

    if let Some(v) = var("APP__WELCOME_MESSAGE") {
        settings.welcome_message = normalize_welcome(v);
    }
}

// An empty welcome turns the greeting off.
fn normalize_welcome(raw: String) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
