// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use intellioptics_app::{DetailKind, LayoutKind};
use intellioptics_tui::{DEFAULT_APP_NAME, ViewConfig};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const APP_DIR: &str = "intellioptics";

pub const CONFIG_PATH_ENV: &str = "INTELLIOPTICS_CONFIG_PATH";
pub const BACKEND_URL_ENV: &str = "INTELLIOPTICS_BACKEND_URL";
pub const SOCKET_URL_ENV: &str = "INTELLIOPTICS_SOCKET_URL";
pub const APP_NAME_ENV: &str = "INTELLIOPTICS_APP_NAME";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const DEFAULT_SOCKET_URL: &str = "http://localhost:8000/socket.io";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_CONNECT_TIMEOUT: &str = "5s";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub push: Push,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            backend: Backend::default(),
            push: Push::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Backend {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Push {
    pub enabled: Option<bool>,
    pub socket_url: Option<String>,
    pub connect_timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ui {
    pub app_name: Option<String>,
    pub layout: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

/// Push channel settings; absent when `push.enabled = false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSettings {
    pub socket_url: String,
    pub connect_timeout: Duration,
}

/// Fully resolved configuration handed to the runtime and the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub backend_url: String,
    pub timeout: Duration,
    pub push: Option<PushSettings>,
    pub view: ViewConfig,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_DIR).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [backend], [push], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run with --print-example-config for a template",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.backend.base_url {
            validate_http_url("backend.base_url", base_url)
                .with_context(|| format!("invalid config {}", path.display()))?;
        }
        if let Some(socket_url) = &self.push.socket_url {
            validate_http_url("push.socket_url", socket_url)
                .with_context(|| format!("invalid config {}", path.display()))?;
        }

        for (key, value) in [
            ("backend.timeout", &self.backend.timeout),
            ("push.connect_timeout", &self.push.connect_timeout),
        ] {
            if let Some(raw) = value {
                positive_duration(key, raw)
                    .with_context(|| format!("invalid config {}", path.display()))?;
            }
        }

        if let Some(layout) = &self.ui.layout
            && LayoutKind::parse(layout).is_none()
        {
            bail!(
                "ui.layout in {} must be \"cards\" or \"table\", got {layout:?}",
                path.display()
            );
        }
        if let Some(detail) = &self.ui.detail
            && DetailKind::parse(detail).is_none()
        {
            bail!(
                "ui.detail in {} must be \"bars\" or \"gauges\", got {detail:?}",
                path.display()
            );
        }

        if let Some(file) = &self.log.file
            && !Path::new(file).is_absolute()
        {
            bail!(
                "log.file in {} must be an absolute path, got {file:?}",
                path.display()
            );
        }

        Ok(())
    }

    /// Applies environment fallbacks and defaults. A value from the config
    /// file wins over the environment.
    pub fn resolve(&self) -> Result<DashboardConfig> {
        let backend_url = pick(self.backend.base_url.as_deref(), BACKEND_URL_ENV)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_owned());
        validate_http_url("backend url", &backend_url)?;
        let backend_url = backend_url.trim_end_matches('/').to_owned();

        let timeout = positive_duration(
            "backend.timeout",
            self.backend.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT),
        )?;

        let push = if self.push.enabled.unwrap_or(true) {
            let socket_url = pick(self.push.socket_url.as_deref(), SOCKET_URL_ENV)
                .unwrap_or_else(|| DEFAULT_SOCKET_URL.to_owned());
            validate_http_url("push socket url", &socket_url)?;
            let connect_timeout = positive_duration(
                "push.connect_timeout",
                self.push
                    .connect_timeout
                    .as_deref()
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            )?;
            Some(PushSettings {
                socket_url,
                connect_timeout,
            })
        } else {
            None
        };

        let app_name = pick(self.ui.app_name.as_deref(), APP_NAME_ENV)
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_owned());
        let view = ViewConfig {
            app_name,
            layout: self
                .ui
                .layout
                .as_deref()
                .and_then(LayoutKind::parse)
                .unwrap_or_default(),
            detail: self
                .ui
                .detail
                .as_deref()
                .and_then(DetailKind::parse)
                .unwrap_or_default(),
        };

        Ok(DashboardConfig {
            backend_url,
            timeout,
            push,
            view,
            log_level: self
                .log
                .level
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned()),
            log_file: self.log.file.as_ref().map(PathBuf::from),
        })
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# IntelliOptics dashboard config\n# Place this file at: {}\n\nversion = 1\n\n[backend]\n# Falls back to ${BACKEND_URL_ENV}, then {DEFAULT_BACKEND_URL}\nbase_url = \"{DEFAULT_BACKEND_URL}\"\ntimeout = \"{DEFAULT_TIMEOUT}\"\n\n[push]\nenabled = true\n# Falls back to ${SOCKET_URL_ENV}, then {DEFAULT_SOCKET_URL}\nsocket_url = \"{DEFAULT_SOCKET_URL}\"\nconnect_timeout = \"{DEFAULT_CONNECT_TIMEOUT}\"\n\n[ui]\napp_name = \"{DEFAULT_APP_NAME}\"\nlayout = \"cards\"     # cards | table\ndetail = \"bars\"      # bars | gauges\n\n[log]\nlevel = \"{DEFAULT_LOG_LEVEL}\"\n# Default is the platform state dir (for example ~/.local/state/intellioptics/dashboard.log)\n# file = \"/absolute/path/dashboard.log\"\n",
            path.display(),
        )
    }
}

fn pick(configured: Option<&str>, env_key: &str) -> Option<String> {
    configured
        .map(str::to_owned)
        .or_else(|| env::var(env_key).ok())
        .filter(|value| !value.trim().is_empty())
}

fn validate_http_url(key: &str, raw: &str) -> Result<()> {
    let url = Url::parse(raw).with_context(|| format!("{key} {raw:?} is not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!(
            "{key} {raw:?} must use http or https, got {}",
            url.scheme()
        );
    }
    if url.host_str().is_none() {
        bail!("{key} {raw:?} has no host");
    }
    Ok(())
}

fn positive_duration(key: &str, raw: &str) -> Result<Duration> {
    let parsed = parse_duration(raw)?;
    if parsed.is_zero() {
        bail!("{key} must be positive, got {raw}");
    }
    Ok(parsed)
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let digits = raw.bytes().take_while(u8::is_ascii_digit).count();
    let (value, unit) = raw.split_at(digits);
    if value.is_empty() || !matches!(unit, "ms" | "s" | "m") {
        bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)");
    }
    let amount: u64 = value
        .parse()
        .with_context(|| format!("duration {raw:?} is out of range"))?;

    match unit {
        "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        _ => amount
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| anyhow!("duration {raw:?} is out of range")),
    }
}
