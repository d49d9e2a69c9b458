//! Device attribute access over `adb`.
//!
//! [`AdbAccessor`] implements [`devinfo_core::PlatformAccessor`] for a device
//! or emulator reachable through the Android Debug Bridge.

mod accessor;
mod adb;
mod devices;
mod parse;

pub use accessor::AdbAccessor;
pub use adb::{adb_path, AdbFailure, DEFAULT_ADB_TIMEOUT};
pub use devices::{
    canonical_serial, first_online_serial, health_from_state, list_devices, AdbDevice, DeviceKind,
};
