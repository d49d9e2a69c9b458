//! Accessor backed by a static JSON device profile.
//!
//! Useful offline and as a test double: any attribute left out of the
//! profile behaves like an unavailable platform accessor, and the two
//! asynchronous identifiers can be slowed down to mimic real devices.

use std::{
    fs, io,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{from_callback, AccessorResult, AccessorUnavailable, PlatformAccessor};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceProfile {
    pub package_name: Option<String>,
    pub app_version: Option<String>,
    pub os_version: Option<String>,
    pub locale: Option<String>,
    pub device_model: Option<String>,
    pub device_make: Option<String>,
    pub build_id: Option<String>,
    pub android_id: Option<String>,
    pub app_set_id: Option<String>,
    pub gaid: Option<String>,
    pub limit_ad_tracking: Option<bool>,
    pub gaid_delay_ms: u64,
    pub app_set_id_delay_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("failed to read profile {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse profile {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub struct ProfileAccessor {
    profile: DeviceProfile,
}

impl ProfileAccessor {
    pub fn new(profile: DeviceProfile) -> Self {
        Self { profile }
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let data = fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let profile = serde_json::from_str(&data).map_err(|source| ProfileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(profile))
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }
}

fn field(value: &Option<String>, name: &str) -> AccessorResult<String> {
    value
        .clone()
        .ok_or_else(|| AccessorUnavailable::new(format!("{name} is not set in the profile")))
}

impl PlatformAccessor for ProfileAccessor {
    async fn package_name(&self) -> AccessorResult<String> {
        field(&self.profile.package_name, "packageName")
    }

    async fn app_version(&self) -> AccessorResult<String> {
        field(&self.profile.app_version, "appVersion")
    }

    async fn os_version(&self) -> AccessorResult<String> {
        field(&self.profile.os_version, "osVersion")
    }

    async fn locale(&self) -> AccessorResult<String> {
        field(&self.profile.locale, "locale")
    }

    async fn device_model(&self) -> AccessorResult<String> {
        field(&self.profile.device_model, "deviceModel")
    }

    async fn device_make(&self) -> AccessorResult<String> {
        field(&self.profile.device_make, "deviceMake")
    }

    async fn build_id(&self) -> AccessorResult<String> {
        field(&self.profile.build_id, "buildId")
    }

    async fn android_id(&self) -> AccessorResult<String> {
        field(&self.profile.android_id, "androidId")
    }

    async fn limit_ad_tracking(&self) -> AccessorResult<bool> {
        self.profile
            .limit_ad_tracking
            .ok_or_else(|| AccessorUnavailable::new("limitAdTracking is not set in the profile"))
    }

    async fn app_set_id(&self) -> AccessorResult<String> {
        let value = self.profile.app_set_id.clone();
        let delay = Duration::from_millis(self.profile.app_set_id_delay_ms);
        from_callback(move |completion| {
            thread::spawn(move || {
                thread::sleep(delay);
                match value {
                    Some(id) => completion.succeed(id),
                    None => completion.fail("appSetId is not set in the profile"),
                }
            });
        })
        .await
    }

    fn advertising_id(&self) -> AccessorResult<String> {
        thread::sleep(Duration::from_millis(self.profile.gaid_delay_ms));
        field(&self.profile.gaid, "gaid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_reads_camel_case_profile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"packageName":"com.example.demo","limitAdTracking":true,"gaidDelayMs":5}}"#
        )
        .unwrap();

        let accessor = ProfileAccessor::load(file.path()).unwrap();
        let profile = accessor.profile();
        assert_eq!(profile.package_name.as_deref(), Some("com.example.demo"));
        assert_eq!(profile.limit_ad_tracking, Some(true));
        assert_eq!(profile.gaid_delay_ms, 5);
        assert!(profile.gaid.is_none());
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            ProfileAccessor::load(file.path()),
            Err(ProfileError::Parse { .. })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ProfileAccessor::load(&dir.path().join("missing.json")),
            Err(ProfileError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn missing_fields_are_unavailable() {
        let accessor = ProfileAccessor::new(DeviceProfile::default());
        assert!(accessor.android_id().await.is_err());
        assert!(accessor.app_set_id().await.is_err());
        assert!(accessor.limit_ad_tracking().await.is_err());
        assert!(accessor.advertising_id().is_err());
    }
}
