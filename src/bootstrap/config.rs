//! # Configuration Loader / 配置加载器
//!
//! Reads the TOML file and maps it to the `AppConfig` DTO.
//! Clamping of login timings happens in `LoginConfig::from_settings`, not here.
//! 这里只做纯数据加载。

use anyhow::Context;
use std::path::{Path, PathBuf};
use pf_core::config::AppConfig;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "PIXIVFLOW_LOGIN_CONFIG";

const CONFIG_DIR_NAME: &str = "pixivflow";
const CONFIG_FILE_NAME: &str = "login.toml";

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read, is not valid TOML, or the
/// `[login]` table has values of the wrong type.
pub fn load_config(config_path: PathBuf) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

/// Like [`load_config`], but a missing file yields the defaults.
///
/// A file that exists but is malformed is still an error.
pub fn load_config_or_default(config_path: &Path) -> anyhow::Result<AppConfig> {
    if !config_path.exists() {
        tracing::info!(
            path = %config_path.display(),
            "Config file not found, using defaults"
        );
        return Ok(AppConfig::empty());
    }
    load_config(config_path.to_path_buf())
}

/// Resolve the config file location.
///
/// `PIXIVFLOW_LOGIN_CONFIG` wins; otherwise `<config_dir>/pixivflow/login.toml`.
/// Returns `None` when the platform has no config directory.
pub fn default_config_path() -> Option<PathBuf> {
    resolve_config_path(std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from), dirs::config_dir())
}

fn resolve_config_path(env_override: Option<PathBuf>, config_dir: Option<PathBuf>) -> Option<PathBuf> {
    match env_override {
        Some(path) if !path.as_os_str().is_empty() => Some(path),
        _ => config_dir.map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_reads_valid_toml() {
        let toml_content = r#"
            [login]
            poll_interval_ms = 500
            max_wait_secs = 120
            verify_after_confirm = false

            [logging]
            dir = "/var/log/pixivflow"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(temp_file.path().to_path_buf()).unwrap();
        assert_eq!(config.login.poll_interval_ms, 500);
        assert_eq!(config.login.max_wait_secs, 120);
        assert!(!config.login.verify_after_confirm);
        // untouched keys keep their defaults
        assert_eq!(config.login.login_request_timeout_ms, 30_000);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/pixivflow")));
    }

    #[test]
    fn test_load_config_returns_error_on_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[login\npoll_interval_ms = ").unwrap();

        let result = load_config(temp_file.path().to_path_buf());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse config as TOML"));
    }

    #[test]
    fn test_load_config_returns_error_on_missing_file() {
        let result = load_config(PathBuf::from("/nonexistent/pixivflow/login.toml"));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_rejects_wrong_value_type() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[login]\nmax_wait_secs = \"ten minutes\"\n")
            .unwrap();

        assert!(load_config(temp_file.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_load_config_or_default_falls_back_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_or_default(&dir.path().join("login.toml")).unwrap();
        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn test_load_config_or_default_still_reports_broken_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"not = [valid").unwrap();

        assert!(load_config_or_default(temp_file.path()).is_err());
    }

    #[test]
    fn test_resolve_config_path_prefers_override() {
        let path = resolve_config_path(
            Some(PathBuf::from("/etc/pf/login.toml")),
            Some(PathBuf::from("/home/u/.config")),
        );
        assert_eq!(path, Some(PathBuf::from("/etc/pf/login.toml")));
    }

    #[test]
    fn test_resolve_config_path_uses_config_dir() {
        let path = resolve_config_path(None, Some(PathBuf::from("/home/u/.config")));
        assert_eq!(
            path,
            Some(PathBuf::from("/home/u/.config/pixivflow/login.toml"))
        );

        let empty_override = resolve_config_path(
            Some(PathBuf::new()),
            Some(PathBuf::from("/home/u/.config")),
        );
        assert_eq!(empty_override, path);
    }

    #[test]
    fn test_resolve_config_path_without_any_source() {
        assert_eq!(resolve_config_path(None, None), None);
    }
}
