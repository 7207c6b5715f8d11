// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::config::APP_DIR;

pub const LOG_ENV: &str = "INTELLIOPTICS_LOG";

pub fn default_log_path() -> Result<PathBuf> {
    let root = dirs::state_dir()
        .or_else(dirs::cache_dir)
        .ok_or_else(|| anyhow!("cannot resolve state directory; set [log].file in the config"))?;
    Ok(root.join(APP_DIR).join("dashboard.log"))
}

/// Sends `log` output to `path`. The terminal belongs to the dashboard, so
/// nothing is written to stderr once this returns.
pub fn init(level: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    builder(level)
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("install logger")
}

fn builder(level: &str) -> Builder {
    let mut builder = Builder::from_env(Env::default().filter_or(LOG_ENV, level));
    builder.format_timestamp_millis();
    builder
}
