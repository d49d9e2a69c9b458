use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use devinfo_adb::DEFAULT_ADB_TIMEOUT;
use devinfo_core::DEFAULT_ASYNC_TIMEOUT;
use serde::{Deserialize, Serialize};
use tracing::warn;

const CONFIG_FILE: &str = "devinfo-config.json";

/// Settings shared by the subcommands. Precedence is flag, then
/// `DEVINFO_*` environment variable, then the JSON config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    pub(crate) serial: String,
    pub(crate) package: String,
    pub(crate) async_timeout_ms: u64,
    pub(crate) adb_timeout_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            serial: String::new(),
            package: String::new(),
            async_timeout_ms: DEFAULT_ASYNC_TIMEOUT.as_millis() as u64,
            adb_timeout_ms: DEFAULT_ADB_TIMEOUT.as_millis() as u64,
        }
    }
}

impl CliConfig {
    pub(crate) fn load() -> Self {
        Self::load_with(&config_path(), devinfo_util::env_string)
    }

    fn load_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = CliConfig::default();
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<CliConfig>(&data) {
                Ok(file_cfg) => cfg = file_cfg,
                Err(err) => warn!("failed to parse {}: {err}", path.display()),
            },
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!("failed to read {}: {err}", path.display());
                }
            }
        }

        if let Some(serial) = env("DEVINFO_SERIAL") {
            cfg.serial = serial;
        }
        if let Some(package) = env("DEVINFO_PACKAGE") {
            cfg.package = package;
        }
        if let Some(ms) = env("DEVINFO_TIMEOUT_MS").and_then(|value| value.parse().ok()) {
            cfg.async_timeout_ms = ms;
        }
        if let Some(ms) = env("DEVINFO_ADB_TIMEOUT_MS").and_then(|value| value.parse().ok()) {
            cfg.adb_timeout_ms = ms;
        }
        cfg
    }

    /// `0` disables the bound on App Set ID and advertising ID lookups.
    pub(crate) fn async_timeout(&self) -> Option<Duration> {
        match self.async_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub(crate) fn adb_timeout(&self) -> Duration {
        match self.adb_timeout_ms {
            0 => DEFAULT_ADB_TIMEOUT,
            ms => Duration::from_millis(ms),
        }
    }
}

fn config_path() -> PathBuf {
    devinfo_util::state_file_path(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CliConfig::load_with(&dir.path().join(CONFIG_FILE), no_env);
        assert_eq!(cfg, CliConfig::default());
        assert_eq!(cfg.async_timeout(), Some(DEFAULT_ASYNC_TIMEOUT));
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"{"serial":"emulator-5554","package":"com.example.demo","async_timeout_ms":0}"#,
        )
        .unwrap();

        let cfg = CliConfig::load_with(&path, |key| match key {
            "DEVINFO_PACKAGE" => Some("com.example.other".into()),
            "DEVINFO_ADB_TIMEOUT_MS" => Some("750".into()),
            _ => None,
        });

        assert_eq!(cfg.serial, "emulator-5554");
        assert_eq!(cfg.package, "com.example.other");
        assert_eq!(cfg.async_timeout(), None);
        assert_eq!(cfg.adb_timeout(), Duration::from_millis(750));
    }

    #[test]
    fn unparsable_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(CliConfig::load_with(&path, no_env), CliConfig::default());
    }
}
