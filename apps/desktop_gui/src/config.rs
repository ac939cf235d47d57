use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use clap::Parser;
use client_core::{parse_base_url, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "gpa_client.toml";

#[derive(Parser, Debug, Default)]
#[command(name = "gpa_desktop", about = "Course grade form backed by a GPA grading service")]
pub struct LaunchArgs {
    /// Grading service address, e.g. http://localhost:5001
    #[arg(long)]
    pub api_base_url: Option<String>,
    /// Settings file; defaults to ./gpa_client.toml when present.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub error_banner_duration: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            error_banner_duration: client_core::session::ERROR_BANNER_DURATION,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    error_banner_secs: Option<u64>,
}

/// Defaults, then the settings file, then environment, then launch flags.
pub fn load_settings(args: &LaunchArgs) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match &args.config {
        Some(path) => apply_file(&mut settings, path)?,
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                apply_file(&mut settings, path)?;
            }
        }
    }

    apply_env(&mut settings, |name| std::env::var(name).ok());

    if let Some(url) = &args.api_base_url {
        settings.api_base_url = url.clone();
    }

    validate(&settings)?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, path: &Path) -> anyhow::Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let file_cfg: FileSettings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;

    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout = Duration::from_secs(v);
    }
    if let Some(v) = file_cfg.error_banner_secs {
        settings.error_banner_duration = Duration::from_secs(v);
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("GPA_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(secs) => settings.request_timeout = Duration::from_secs(secs),
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__REQUEST_TIMEOUT_SECS"),
        }
    }

    if let Some(v) = lookup("APP__ERROR_BANNER_SECS") {
        match v.trim().parse::<u64>() {
            Ok(secs) => settings.error_banner_duration = Duration::from_secs(secs),
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__ERROR_BANNER_SECS"),
        }
    }
}

fn validate(settings: &Settings) -> anyhow::Result<()> {
    parse_base_url(&settings.api_base_url)
        .with_context(|| format!("unusable grading service address '{}'", settings.api_base_url))?;
    if settings.request_timeout.is_zero() {
        bail!("request timeout must be at least one second");
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
