//! Configuration DTO.
//!
//! TOML → data mapping only. Clamping and policy live in `pf-app`.

use std::path::PathBuf;

use anyhow::Context;

use crate::settings::LoginSettings;

/// Application configuration DTO.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// `[login]` table.
    pub login: LoginSettings,

    /// `[logging] dir`. `None` disables the file log.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Create AppConfig from a TOML value.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let login = match toml_value.get("login") {
            Some(table) => table
                .clone()
                .try_into::<LoginSettings>()
                .context("invalid [login] table")?,
            None => LoginSettings::default(),
        };

        let log_dir = toml_value
            .get("logging")
            .and_then(|l| l.get("dir"))
            .and_then(|v| v.as_str())
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);

        Ok(Self { login, log_dir })
    }

    /// All defaults, no file log.
    pub fn empty() -> Self {
        Self::default()
    }
}
