// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use appdash_table::{DEFAULT_PAGE_SIZE, RefreshPolicy, ResizeMode, ViewOptions};
use appdash_tui::{UiSettings, default_flags};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "appdash";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";
const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub table: Table,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data: Data::default(),
            table: Table::default(),
            log: Log::default(),
            flags: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Table {
    pub page_size: Option<usize>,
    pub resize_mode: Option<ResizeMode>,
    pub refresh: Option<RefreshPolicy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("APPDASH_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set APPDASH_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    /// A missing file yields the defaults.
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
                    "config file {} has no version; add `version = {CONFIG_VERSION}` at the top",
                    path.display()
                )
            })?;
        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {version} in {}; expected version = {CONFIG_VERSION}. Run `appdash --print-example-config` for a template",
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
        if let Some(size) = self.table.page_size
            && !(1..=MAX_PAGE_SIZE).contains(&size)
        {
            bail!(
                "table.page_size in {} must be between 1 and {MAX_PAGE_SIZE}, got {size}",
                path.display()
            );
        }
        if let Some(data_path) = &self.data.path
            && data_path.trim().is_empty()
        {
            bail!("data.path in {} must not be empty", path.display());
        }
        Ok(())
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.data.path {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [data].path in the config")
        })?;
        Ok(data_root.join(APP_NAME).join("data.json"))
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.file {
            return Ok(PathBuf::from(path));
        }
        let state_root = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .ok_or_else(|| anyhow!("cannot resolve log directory; set [log].file in the config"))?;
        Ok(state_root.join(APP_NAME).join("appdash.log"))
    }

    pub fn view_options(&self) -> ViewOptions {
        let defaults = ViewOptions::default();
        ViewOptions {
            page_size: self.table.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            resize_mode: self.table.resize_mode.unwrap_or(defaults.resize_mode),
            refresh_policy: self.table.refresh.unwrap_or(defaults.refresh_policy),
        }
    }

    /// Built-in flags overlaid with `[flags]`; unknown names are kept.
    pub fn ui_settings(&self) -> UiSettings {
        let mut flags: BTreeMap<String, bool> = default_flags().into_iter().collect();
        flags.extend(self.flags.iter().map(|(name, value)| (name.clone(), *value)));
        UiSettings {
            view_options: self.view_options(),
            flags: flags.into_iter().collect(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# appdash config\n# Place this file at: {}\n\nversion = {CONFIG_VERSION}\n\n[data]\n# Optional. Default is the platform data dir (for example ~/.local/share/appdash/data.json)\n# path = \"/absolute/path/to/data.json\"\n\n[table]\npage_size = {DEFAULT_PAGE_SIZE}\n# on_change applies widths while dragging, on_end only on release\nresize_mode = \"on_change\"\n# reset or preserve filter/sort/page/selection when rows reload\nrefresh = \"reset\"\n\n[log]\n# Overridden by APPDASH_LOG\nlevel = \"{DEFAULT_LOG_LEVEL}\"\n# file = \"/absolute/path/to/appdash.log\"\n\n[flags]\nselection_column = true\nrow_numbers = false\n",
            path.display(),
        )
    }
}
