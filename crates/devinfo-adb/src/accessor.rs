use std::time::Duration;

use devinfo_core::{AccessorResult, AccessorUnavailable, PlatformAccessor};
use tokio::runtime::Handle;
use tracing::debug;

use crate::{
    adb::{adb_get_prop, adb_get_state, adb_shell, AdbFailure, DEFAULT_ADB_TIMEOUT},
    devices::canonical_serial,
    parse::{bcp47_to_locale, parse_dumpsys_version_name, parse_settings_value, SharedPrefs},
};

/// Google Play services stores the advertising ID and the limit flag here.
/// Reading it requires a rooted device or a userdebug emulator image.
const ADID_PREFS_PATH: &str = "/data/data/com.google.android.gms/shared_prefs/adid_settings.xml";

/// [`PlatformAccessor`] for one device reached through adb, collecting on
/// behalf of the installed application `package`.
///
/// Android ID is read through the shell user, so on Android 8+ it is the
/// shell's per-app value rather than the one `package` would observe.
#[derive(Clone, Debug)]
pub struct AdbAccessor {
    serial: String,
    package: String,
    timeout: Duration,
}

impl AdbAccessor {
    pub fn new(serial: &str, package: impl Into<String>) -> Self {
        Self {
            serial: canonical_serial(serial),
            package: package.into(),
            timeout: DEFAULT_ADB_TIMEOUT,
        }
    }

    /// Fails unless adb reports the device in the `device` state. Attribute
    /// reads against an offline device would all fall back.
    pub async fn ensure_online(&self) -> Result<(), AdbFailure> {
        let state = adb_get_state(&self.serial, self.timeout).await?;
        if state != "device" {
            return Err(AdbFailure::Io(format!("device {} is {state}", self.serial)));
        }
        Ok(())
    }

    /// Per-command bound applied to every adb invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    async fn shell(&self, command: &[&str]) -> AccessorResult<String> {
        Ok(adb_shell(&self.serial, command, self.timeout).await?)
    }

    async fn prop(&self, name: &str) -> AccessorResult<String> {
        let value = adb_get_prop(&self.serial, name, self.timeout).await?;
        if value.is_empty() {
            return Err(AccessorUnavailable::new(format!("{name} is not set")));
        }
        Ok(value)
    }

    async fn read_adid_prefs(&self) -> AccessorResult<SharedPrefs> {
        let mut last_err = None;
        for command in ROOT_CAT_ADID_PREFS {
            match adb_shell(&self.serial, &[command], self.timeout).await {
                Ok(xml) => {
                    if let Some(prefs) = SharedPrefs::parse(&xml) {
                        return Ok(prefs);
                    }
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(adid_prefs_unavailable(last_err))
    }
}

/// `su` syntax differs between AOSP debug images and rooted retail devices.
const ROOT_CAT_ADID_PREFS: [&str; 2] = [
    "su 0 cat /data/data/com.google.android.gms/shared_prefs/adid_settings.xml",
    "su -c 'cat /data/data/com.google.android.gms/shared_prefs/adid_settings.xml'",
];

fn adid_prefs_unavailable(err: Option<AdbFailure>) -> AccessorUnavailable {
    match err {
        Some(err) => {
            debug!("reading {ADID_PREFS_PATH} failed: {err}");
            AccessorUnavailable::new(format!("advertising id settings unreadable: {err}"))
        }
        None => AccessorUnavailable::new("advertising id settings unreadable without root"),
    }
}

impl PlatformAccessor for AdbAccessor {
    async fn package_name(&self) -> AccessorResult<String> {
        let output = self.shell(&["pm", "path", self.package.as_str()]).await?;
        if output.lines().any(|line| line.starts_with("package:")) {
            Ok(self.package.clone())
        } else {
            Err(AccessorUnavailable::new(format!(
                "{} is not installed",
                self.package
            )))
        }
    }

    async fn app_version(&self) -> AccessorResult<String> {
        let output = self.shell(&["dumpsys", "package", self.package.as_str()]).await?;
        parse_dumpsys_version_name(&output).ok_or_else(|| {
            AccessorUnavailable::new(format!("no versionName for {}", self.package))
        })
    }

    async fn os_version(&self) -> AccessorResult<String> {
        self.prop("ro.build.version.release").await
    }

    async fn locale(&self) -> AccessorResult<String> {
        let tag = match self.prop("persist.sys.locale").await {
            Ok(tag) => tag,
            Err(_) => self.prop("ro.product.locale").await?,
        };
        bcp47_to_locale(&tag)
            .ok_or_else(|| AccessorUnavailable::new(format!("unrecognized locale tag {tag:?}")))
    }

    async fn device_model(&self) -> AccessorResult<String> {
        self.prop("ro.product.model").await
    }

    async fn device_make(&self) -> AccessorResult<String> {
        self.prop("ro.product.manufacturer").await
    }

    async fn build_id(&self) -> AccessorResult<String> {
        self.prop("ro.build.id").await
    }

    async fn android_id(&self) -> AccessorResult<String> {
        let output = self
            .shell(&["settings", "get", "secure", "android_id"])
            .await?;
        parse_settings_value(&output)
            .ok_or_else(|| AccessorUnavailable::new("android_id is unset"))
    }

    async fn limit_ad_tracking(&self) -> AccessorResult<bool> {
        let prefs = self.read_adid_prefs().await?;
        // Play services omits the flag until the user first toggles it.
        Ok(prefs.boolean("enable_limit_ad_tracking").unwrap_or(false))
    }

    async fn app_set_id(&self) -> AccessorResult<String> {
        Err(AccessorUnavailable::not_supported("App Set ID over adb"))
    }

    /// Runs on the blocking pool, so it drives the async adb path through the
    /// ambient runtime handle.
    fn advertising_id(&self) -> AccessorResult<String> {
        let handle = Handle::try_current()
            .map_err(|_| AccessorUnavailable::new("advertising id lookup needs a tokio runtime"))?;
        let prefs = handle.block_on(self.read_adid_prefs())?;
        prefs
            .string("adid_key")
            .map(str::to_string)
            .ok_or_else(|| AccessorUnavailable::new("no advertising id has been generated"))
    }
}
