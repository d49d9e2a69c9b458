use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Non-empty, trimmed value of `key`.
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".local/share/devinfo")
    } else {
        PathBuf::from("/tmp/devinfo")
    }
}

pub fn state_dir() -> PathBuf {
    data_dir().join("state")
}

pub fn state_file_path(file_name: &str) -> PathBuf {
    state_dir().join(file_name)
}

pub fn expand_user(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        if let Ok(home) = std::env::var("HOME") {
            let rest = path.strip_prefix("~/").unwrap_or("");
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// `info` unless `RUST_LOG` says otherwise. Invalid directives are skipped.
fn env_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

/// Logs go to stderr so that stdout stays machine-readable.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(env_filter(&directives))
        .try_init()
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn write_json_atomic_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        let sample = Sample {
            name: "pixel".into(),
            count: 3,
        };

        write_json_atomic(&path, &sample).unwrap();

        let data = fs::read_to_string(&path).unwrap();
        assert_eq!(serde_json::from_str::<Sample>(&data).unwrap(), sample);
        assert!(!path.with_extension("json.tmp").exists());
    }

    fn enabled_levels(directives: &str) -> (bool, bool) {
        use tracing_subscriber::prelude::*;

        let subscriber = tracing_subscriber::registry().with(env_filter(directives));
        tracing::subscriber::with_default(subscriber, || {
            (
                tracing::enabled!(tracing::Level::INFO),
                tracing::enabled!(tracing::Level::DEBUG),
            )
        })
    }

    #[test]
    fn env_filter_defaults_to_info() {
        assert_eq!(enabled_levels(""), (true, false));
    }

    #[test]
    fn env_filter_honours_level_directives() {
        assert_eq!(enabled_levels("debug"), (true, true));
        assert_eq!(enabled_levels("warn"), (false, false));
    }

    #[test]
    fn expand_user_leaves_plain_paths() {
        assert_eq!(expand_user("/tmp/x.json"), PathBuf::from("/tmp/x.json"));
        assert_eq!(expand_user("rel/x.json"), PathBuf::from("rel/x.json"));
    }

    #[test]
    fn state_paths_live_under_data_dir() {
        let path = state_file_path("devinfo-config.json");
        assert!(path.starts_with(data_dir()));
        assert!(path.ends_with("state/devinfo-config.json"));
    }
}
