//! Physical device detection
//!
//! Parses the listings produced by `xcrun devicectl`, `xcrun xctrace` and
//! `adb devices -l`. Detection never fails: a missing tool, a failing
//! command or unparseable output all mean "no device".

use crate::models::{DetectedDevices, DeviceInfo};
use crate::tools::DeviceLister;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, info};

fn udid_regex() -> &'static Regex {
    static UDID: OnceLock<Regex> = OnceLock::new();
    UDID.get_or_init(|| Regex::new(r"\(([a-f0-9]{40})\)").expect("valid UDID regex"))
}

/// Top-level string field, or the nested field newer Xcode versions emit
fn device_field<'a>(device: &'a Value, key: &str, nested: &str) -> Option<&'a str> {
    device
        .get(key)
        .and_then(Value::as_str)
        .or_else(|| device.pointer(nested).and_then(Value::as_str))
}

/// First connected physical iOS device in `devicectl` JSON output.
///
/// # Examples
///
/// ```
/// use rndr_core::detector::parse_devicectl_json;
///
/// let json = r#"{"result":{"devices":[{
///     "identifier": "00008110-000A1B2C3D4E5F60",
///     "name": "Jo's iPhone",
///     "platform": "iOS",
///     "connectionState": "connected",
///     "deviceType": "physical"
/// }]}}"#;
///
/// let device = parse_devicectl_json(json).unwrap();
/// assert_eq!(device.id, "00008110-000A1B2C3D4E5F60");
/// ```
pub fn parse_devicectl_json(json: &str) -> Option<DeviceInfo> {
    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "unparseable devicectl output");
            return None;
        }
    };

    let devices = value.pointer("/result/devices")?.as_array()?;

    devices.iter().find_map(|device| {
        let platform = device_field(device, "platform", "/hardwareProperties/platform")?;
        let state = device_field(device, "connectionState", "/connectionProperties/tunnelState")?;
        let kind = device_field(device, "deviceType", "/hardwareProperties/reality")?;

        if platform != "iOS"
            || state != "connected"
            || !kind.to_lowercase().contains("physical")
        {
            return None;
        }

        let identifier = device.get("identifier").and_then(Value::as_str)?;
        if identifier.is_empty() {
            return None;
        }

        let name = device_field(device, "name", "/deviceProperties/name").map(String::from);
        Some(DeviceInfo::ios(identifier, name))
    })
}

/// First line of `xctrace list devices` carrying a 40-hex UDID in parentheses
pub fn parse_xctrace_devices(output: &str) -> Option<DeviceInfo> {
    output.lines().find_map(|line| {
        let captures = udid_regex().captures(line)?;
        let name = line
            .split('(')
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);

        Some(DeviceInfo::ios(&captures[1], name))
    })
}

/// First non-emulator entry in state `device` from `adb devices -l`.
///
/// # Examples
///
/// ```
/// use rndr_core::detector::parse_adb_devices;
///
/// let output = "List of devices attached\n\
///               emulator-5554  device product:sdk_gphone64 model:sdk_gphone64\n\
///               R58M123ABC     device usb:1-1 product:a52q model:SM_A525F\n";
///
/// let device = parse_adb_devices(output).unwrap();
/// assert_eq!(device.id, "R58M123ABC");
/// assert_eq!(device.name.as_deref(), Some("SM A525F"));
/// ```
pub fn parse_adb_devices(output: &str) -> Option<DeviceInfo> {
    output.lines().skip(1).find_map(|line| {
        let mut parts = line.split_whitespace();
        let serial = parts.next()?;
        let state = parts.next()?;

        if state != "device" || serial.starts_with("emulator-") {
            return None;
        }

        let name = parts
            .find_map(|token| token.strip_prefix("model:"))
            .filter(|model| !model.is_empty())
            .map(|model| model.replace('_', " "));

        Some(DeviceInfo::android(serial, name))
    })
}

/// Finds the first physical device on each platform
#[derive(Debug)]
pub struct DeviceDetector<'a, L: DeviceLister + ?Sized> {
    lister: &'a L,
}

impl<'a, L: DeviceLister + ?Sized> DeviceDetector<'a, L> {
    pub fn new(lister: &'a L) -> Self {
        Self { lister }
    }

    /// Prefer devicectl JSON, fall back to xctrace
    pub fn find_ios(&self) -> Option<DeviceInfo> {
        if let Some(json) = self.lister.devicectl_json() {
            if let Some(device) = parse_devicectl_json(&json) {
                return Some(device);
            }
            debug!("no connected iOS device in devicectl output, trying xctrace");
        }

        self.lister
            .xctrace_devices()
            .and_then(|output| parse_xctrace_devices(&output))
    }

    pub fn find_android(&self) -> Option<DeviceInfo> {
        self.lister
            .adb_devices()
            .and_then(|output| parse_adb_devices(&output))
    }

    pub fn find_devices(&self) -> DetectedDevices {
        let devices = DetectedDevices {
            ios: self.find_ios(),
            android: self.find_android(),
        };

        info!(
            ios = devices.ios.as_ref().map(|d| d.id.as_str()),
            android = devices.android.as_ref().map(|d| d.id.as_str()),
            "device detection finished"
        );

        devices
    }
}
