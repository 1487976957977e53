//! Data models for rndr

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

/// Target mobile platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    #[default]
    Ios,
    Android,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Ios => write!(f, "ios"),
            Platform::Android => write!(f, "android"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            _ => Err(ConfigError::InvalidPlatform(s.to_string())),
        }
    }
}

/// How the JavaScript project drives its native builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    /// Expo project without checked-in native folders
    ExpoManaged,
    /// Expo project with `ios/` or `android/` folders
    ExpoBare,
    /// Plain React Native CLI project
    ReactNativeCli,
}

impl ProjectType {
    /// Whether `expo run:*` is the primary toolchain
    pub fn is_expo(&self) -> bool {
        matches!(self, ProjectType::ExpoManaged | ProjectType::ExpoBare)
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectType::ExpoManaged => write!(f, "Expo (managed)"),
            ProjectType::ExpoBare => write!(f, "Expo (bare)"),
            ProjectType::ReactNativeCli => write!(f, "React Native CLI"),
        }
    }
}

impl std::str::FromStr for ProjectType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "expo" | "expo-managed" | "managed" => Ok(ProjectType::ExpoManaged),
            "expo-bare" | "bare" => Ok(ProjectType::ExpoBare),
            "react-native" | "react-native-cli" | "rn" | "rn-cli" | "cli" => {
                Ok(ProjectType::ReactNativeCli)
            }
            _ => Err(ConfigError::UnknownProjectType(s.to_string())),
        }
    }
}

/// Build settings for both platforms, merged from env, `.env` and project files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceConfig {
    pub ios_scheme: Option<String>,
    pub ios_configuration: Option<String>,
    pub ios_workspace: Option<String>,
    pub ios_derived_data: Option<String>,
    pub ios_bundle_id: Option<String>,
    pub android_app_id: Option<String>,
    pub android_module: Option<String>,
    pub android_variant: Option<String>,
}

/// Default iOS build configuration
pub const DEFAULT_IOS_CONFIGURATION: &str = "Debug";
/// Default derived data directory
pub const DEFAULT_IOS_DERIVED_DATA: &str = ".build/ios";
/// Default Gradle module
pub const DEFAULT_ANDROID_MODULE: &str = "app";
/// Default Gradle variant
pub const DEFAULT_ANDROID_VARIANT: &str = "debug";

/// A physical device found by the detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub platform: Platform,
    /// UDID on iOS, serial on Android
    pub id: String,
    pub name: Option<String>,
}

impl DeviceInfo {
    pub fn ios(udid: impl Into<String>, name: Option<String>) -> Self {
        Self {
            platform: Platform::Ios,
            id: udid.into(),
            name,
        }
    }

    pub fn android(serial: impl Into<String>, name: Option<String>) -> Self {
        Self {
            platform: Platform::Android,
            id: serial.into(),
            name,
        }
    }

    /// Label used in status lines: `UDID` or `Serial`
    pub fn id_label(&self) -> &'static str {
        match self.platform {
            Platform::Ios => "UDID",
            Platform::Android => "Serial",
        }
    }
}

/// At most one device per platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectedDevices {
    pub ios: Option<DeviceInfo>,
    pub android: Option<DeviceInfo>,
}

impl DetectedDevices {
    /// Pick the device to run on.
    ///
    /// When both platforms are connected `prefer` decides; a single device
    /// is always chosen regardless of preference.
    pub fn choose(&self, prefer: Platform) -> Option<&DeviceInfo> {
        match (&self.ios, &self.android) {
            (Some(ios), Some(android)) => match prefer {
                Platform::Ios => Some(ios),
                Platform::Android => Some(android),
            },
            (Some(ios), None) => Some(ios),
            (None, Some(android)) => Some(android),
            (None, None) => None,
        }
    }

    pub fn both(&self) -> bool {
        self.ios.is_some() && self.android.is_some()
    }
}

/// The subset of Expo's app config that rndr reads
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExpoConfig {
    pub ios: Option<ExpoIosConfig>,
    pub android: Option<ExpoAndroidConfig>,
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpoIosConfig {
    pub bundle_identifier: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExpoAndroidConfig {
    pub package: Option<String>,
}

impl ExpoConfig {
    /// String value of an `extra` key, ignoring non-string and empty values
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra
            .get(key)
            .and_then(serde_json::Value::as_str)
            .filter(|v| !v.is_empty())
    }
}
