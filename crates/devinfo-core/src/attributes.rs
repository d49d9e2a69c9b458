use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Closed set of attribute names, serialized as their camelCase wire strings.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum AttributeKey {
    PackageName,
    AppVersion,
    AdTrackingStatus,
    AppSetId,
    Gaid,
    AndroidId,
    Locale,
    DeviceMake,
    DeviceModel,
    BuildVersion,
    OsVersion,
}

impl AttributeKey {
    pub const ALL: [AttributeKey; 11] = [
        AttributeKey::PackageName,
        AttributeKey::AppVersion,
        AttributeKey::AdTrackingStatus,
        AttributeKey::AppSetId,
        AttributeKey::Gaid,
        AttributeKey::AndroidId,
        AttributeKey::Locale,
        AttributeKey::DeviceMake,
        AttributeKey::DeviceModel,
        AttributeKey::BuildVersion,
        AttributeKey::OsVersion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKey::PackageName => "packageName",
            AttributeKey::AppVersion => "appVersion",
            AttributeKey::AdTrackingStatus => "adTrackingStatus",
            AttributeKey::AppSetId => "appSetId",
            AttributeKey::Gaid => "gaid",
            AttributeKey::AndroidId => "androidId",
            AttributeKey::Locale => "locale",
            AttributeKey::DeviceMake => "deviceMake",
            AttributeKey::DeviceModel => "deviceModel",
            AttributeKey::BuildVersion => "buildVersion",
            AttributeKey::OsVersion => "osVersion",
        }
    }

    /// Human-readable label used when rendering a snapshot line by line.
    pub fn label(self) -> &'static str {
        match self {
            AttributeKey::PackageName => "Package Name",
            AttributeKey::AppVersion => "App Version",
            AttributeKey::AdTrackingStatus => "Ad Tracking Status",
            AttributeKey::AppSetId => "App Set ID",
            AttributeKey::Gaid => "GAID",
            AttributeKey::AndroidId => "Android ID",
            AttributeKey::Locale => "Locale",
            AttributeKey::DeviceMake => "Device Make",
            AttributeKey::DeviceModel => "Device Model",
            AttributeKey::BuildVersion => "Build Version",
            AttributeKey::OsVersion => "OS Version",
        }
    }

    /// Value recorded when the attribute's accessor is unavailable.
    pub fn fallback(self) -> &'static str {
        match self {
            AttributeKey::AppVersion => "unknown",
            AttributeKey::AdTrackingStatus => AdTrackingStatus::Undetermined.as_str(),
            _ => "",
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AttributeKey::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| format!("unknown attribute key: {value}"))
    }
}

/// Opt-in state derived from the platform's limited-ad-tracking flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdTrackingStatus {
    Undetermined,
    Limited,
    Authorized,
}

impl AdTrackingStatus {
    pub fn from_limit_flag(limited: bool) -> Self {
        if limited {
            AdTrackingStatus::Limited
        } else {
            AdTrackingStatus::Authorized
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdTrackingStatus::Undetermined => "0",
            AdTrackingStatus::Limited => "2",
            AdTrackingStatus::Authorized => "3",
        }
    }
}
