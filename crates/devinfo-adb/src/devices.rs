use std::time::Duration;

use serde::Serialize;

use crate::adb::{adb_output, AdbFailure};

const LOOPBACK_HOSTS: [&str; 5] = ["localhost", "127.0.0.1", "0.0.0.0", "[::1]", "[::]"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Device,
    Emulator,
    Remote,
}

impl DeviceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceKind::Device => "device",
            DeviceKind::Emulator => "emulator",
            DeviceKind::Remote => "remote",
        }
    }

    fn classify(serial: &str) -> Self {
        if serial.starts_with("emulator-") {
            DeviceKind::Emulator
        } else if serial.contains(':') {
            DeviceKind::Remote
        } else {
            DeviceKind::Device
        }
    }
}

/// One line of `adb devices -l`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AdbDevice {
    pub serial: String,
    pub state: String,
    pub kind: DeviceKind,
    pub model: Option<String>,
    pub product: Option<String>,
    pub device: Option<String>,
    pub transport_id: Option<String>,
}

impl AdbDevice {
    pub fn is_online(&self) -> bool {
        self.state == "device"
    }

    pub fn display_name(&self) -> &str {
        self.model.as_deref().unwrap_or(&self.serial)
    }
}

/// Rewrites loopback host aliases to `127.0.0.1:<port>` so the same
/// emulator or network device is always addressed by one serial.
pub fn canonical_serial(serial: &str) -> String {
    let serial = serial.trim();
    if let Some((host, port)) = serial.rsplit_once(':') {
        if LOOPBACK_HOSTS
            .iter()
            .any(|loopback| loopback.eq_ignore_ascii_case(host))
        {
            return format!("127.0.0.1:{port}");
        }
    }
    serial.to_string()
}

pub fn health_from_state(state: &str) -> &'static str {
    match state {
        "device" => "online",
        "unauthorized" => "unauthorized",
        "offline" => "offline",
        "recovery" => "recovery",
        "bootloader" => "bootloader",
        _ => "unknown",
    }
}

pub(crate) fn parse_adb_devices(output: &str, include_offline: bool) -> Vec<AdbDevice> {
    let mut devices = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("List of devices attached") || line.starts_with('*')
        {
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(serial), Some(state)) = (parts.next(), parts.next()) else {
            continue;
        };
        if !include_offline && state != "device" {
            continue;
        }

        let mut device = AdbDevice {
            serial: canonical_serial(serial),
            state: state.to_string(),
            kind: DeviceKind::classify(serial),
            model: None,
            product: None,
            device: None,
            transport_id: None,
        };
        for part in parts {
            let Some((key, value)) = part.split_once(':') else {
                continue;
            };
            let value = Some(value.to_string());
            match key {
                "model" => device.model = value,
                "product" => device.product = value,
                "device" => device.device = value,
                "transport_id" => device.transport_id = value,
                _ => {}
            }
        }
        devices.push(device);
    }

    devices
}

pub async fn list_devices(
    include_offline: bool,
    timeout: Duration,
) -> Result<Vec<AdbDevice>, AdbFailure> {
    let output = adb_output(&["devices", "-l"], timeout).await?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_adb_devices(&stdout, include_offline))
}

pub async fn first_online_serial(timeout: Duration) -> Result<Option<String>, AdbFailure> {
    let devices = list_devices(false, timeout).await?;
    Ok(devices.into_iter().next().map(|device| device.serial))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICES: &str = "* daemon started successfully\nList of devices attached\n\
emulator-5554          device product:sdk_gphone64_x86_64 model:sdk_gphone64_x86_64 device:emu64xa transport_id:1\n\
localhost:6520         device product:aosp_cf_x86_64_phone model:Cuttlefish_x86_64 device:vsoc_x86_64 transport_id:3\n\
R58M123ABC             unauthorized usb:1-1 transport_id:2\n\n";

    #[test]
    fn parses_online_devices() {
        let devices = parse_adb_devices(DEVICES, false);
        assert_eq!(devices.len(), 2);

        assert_eq!(devices[0].serial, "emulator-5554");
        assert_eq!(devices[0].kind, DeviceKind::Emulator);
        assert_eq!(devices[0].model.as_deref(), Some("sdk_gphone64_x86_64"));
        assert_eq!(devices[0].transport_id.as_deref(), Some("1"));

        assert_eq!(devices[1].serial, "127.0.0.1:6520");
        assert_eq!(devices[1].kind, DeviceKind::Remote);
        assert_eq!(devices[1].display_name(), "Cuttlefish_x86_64");
    }

    #[test]
    fn include_offline_keeps_unauthorized() {
        let devices = parse_adb_devices(DEVICES, true);
        assert_eq!(devices.len(), 3);
        let usb = &devices[2];
        assert_eq!(usb.kind, DeviceKind::Device);
        assert!(!usb.is_online());
        assert_eq!(usb.display_name(), "R58M123ABC");
        assert_eq!(health_from_state(&usb.state), "unauthorized");
    }

    #[test]
    fn loopback_serials_are_canonical() {
        assert_eq!(canonical_serial(" localhost:5555 "), "127.0.0.1:5555");
        assert_eq!(canonical_serial("[::1]:6520"), "127.0.0.1:6520");
        assert_eq!(canonical_serial("0.0.0.0:5037"), "127.0.0.1:5037");
        assert_eq!(canonical_serial("192.168.1.20:5555"), "192.168.1.20:5555");
        assert_eq!(canonical_serial("emulator-5554"), "emulator-5554");
    }
}
