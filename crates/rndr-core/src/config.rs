//! Configuration loading for rndr
//!
//! Merges, highest precedence first: the process environment, the project's
//! `.env` file, project configuration (`app.json`, `npx expo config`,
//! `package.json`) and built-in defaults. Loading never fails; unreadable
//! sources are logged and skipped.

use crate::env_file::parse_env_file;
use crate::models::{
    DeviceConfig, ExpoConfig, ProjectType, DEFAULT_ANDROID_MODULE, DEFAULT_ANDROID_VARIANT,
    DEFAULT_IOS_CONFIGURATION, DEFAULT_IOS_DERIVED_DATA,
};
use crate::project::{read_json, APP_JSON, PACKAGE_JSON};
use crate::tools::ProjectInspector;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Dotenv file name, relative to the project root
pub const ENV_FILE: &str = ".env";

pub const IOS_SCHEME: &str = "IOS_SCHEME";
pub const IOS_CONFIGURATION: &str = "IOS_CONFIGURATION";
pub const IOS_WORKSPACE: &str = "IOS_WORKSPACE";
pub const IOS_DERIVED_DATA: &str = "IOS_DERIVED_DATA";
pub const IOS_BUNDLE_ID: &str = "IOS_BUNDLE_ID";
pub const AOS_APP_ID: &str = "AOS_APP_ID";
pub const AOS_MODULE: &str = "AOS_MODULE";
pub const AOS_VARIANT: &str = "AOS_VARIANT";

/// Where project-level values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    AppJson,
    ExpoCli,
    PackageJson,
    None,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::AppJson => write!(f, "app.json"),
            ConfigSource::ExpoCli => write!(f, "expo config"),
            ConfigSource::PackageJson => write!(f, "package.json"),
            ConfigSource::None => write!(f, "defaults"),
        }
    }
}

/// A merged configuration plus where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: DeviceConfig,
    pub source: ConfigSource,
}

/// Builds a [`DeviceConfig`] for one run
#[derive(Debug)]
pub struct ConfigLoader<'a, I: ProjectInspector + ?Sized> {
    inspector: &'a I,
    env: HashMap<String, String>,
    env_file_loaded: bool,
}

impl<'a, I: ProjectInspector + ?Sized> ConfigLoader<'a, I> {
    /// Create a loader over an explicit environment.
    ///
    /// `.env` values are merged in for keys the environment does not set.
    /// Taking the environment as a map keeps tests free of global state.
    pub fn new(inspector: &'a I, mut env: HashMap<String, String>) -> Self {
        let env_file_loaded = match inspector.read_file(ENV_FILE) {
            Some(contents) => {
                for (key, value) in parse_env_file(&contents) {
                    env.entry(key).or_insert(value);
                }
                debug!("loaded {}", ENV_FILE);
                true
            }
            None => false,
        };

        Self {
            inspector,
            env,
            env_file_loaded,
        }
    }

    /// Create a loader over the current process environment
    pub fn from_process_env(inspector: &'a I) -> Self {
        let env = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();

        Self::new(inspector, env)
    }

    /// Whether a `.env` file was found and merged
    pub fn env_file_loaded(&self) -> bool {
        self.env_file_loaded
    }

    /// A non-empty variable from the merged environment
    pub fn var(&self, key: &str) -> Option<&str> {
        self.env
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Merge every source into the final configuration
    pub fn load(&self, project_type: ProjectType) -> LoadedConfig {
        let from_env = |key: &str| self.var(key).map(String::from);

        let mut config = DeviceConfig {
            ios_scheme: from_env(IOS_SCHEME),
            ios_configuration: from_env(IOS_CONFIGURATION),
            ios_workspace: from_env(IOS_WORKSPACE),
            ios_derived_data: from_env(IOS_DERIVED_DATA),
            ios_bundle_id: from_env(IOS_BUNDLE_ID),
            android_app_id: from_env(AOS_APP_ID),
            android_module: from_env(AOS_MODULE),
            android_variant: from_env(AOS_VARIANT),
        };

        let source = if project_type.is_expo() {
            self.apply_expo_config(&mut config)
        } else {
            self.apply_package_json(&mut config)
        };

        apply_defaults(&mut config);
        info!(%source, "configuration loaded");

        LoadedConfig { config, source }
    }

    fn apply_expo_config(&self, config: &mut DeviceConfig) -> ConfigSource {
        match read_json(self.inspector, APP_JSON) {
            Ok(Some(app_json)) => {
                if let Some(expo) = app_json.get("expo") {
                    match serde_json::from_value::<ExpoConfig>(expo.clone()) {
                        Ok(expo) => {
                            apply_expo(config, &expo);
                            return ConfigSource::AppJson;
                        }
                        Err(e) => warn!(error = %e, "unexpected expo section in app.json"),
                    }
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to parse app.json, trying expo config"),
        }

        match self.inspector.expo_config_json() {
            Some(json) => match serde_json::from_str::<ExpoConfig>(&json) {
                Ok(expo) => {
                    apply_expo(config, &expo);
                    return ConfigSource::ExpoCli;
                }
                Err(e) => warn!(error = %e, "unparseable expo config output, trying package.json"),
            },
            None => warn!("failed to run expo config, trying package.json"),
        }

        self.apply_package_json(config)
    }

    fn apply_package_json(&self, config: &mut DeviceConfig) -> ConfigSource {
        match read_json(self.inspector, PACKAGE_JSON) {
            Ok(Some(package_json)) => {
                fill(
                    &mut config.ios_scheme,
                    package_json.get("name").and_then(|n| n.as_str()),
                );
                ConfigSource::PackageJson
            }
            Ok(None) => ConfigSource::None,
            Err(e) => {
                warn!(error = %e, "failed to load configuration from package.json");
                ConfigSource::None
            }
        }
    }
}

/// Set `slot` from `value` unless a higher-precedence source already did
fn fill(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none() {
        *slot = value.filter(|v| !v.is_empty()).map(String::from);
    }
}

fn apply_expo(config: &mut DeviceConfig, expo: &ExpoConfig) {
    fill(&mut config.ios_scheme, expo.extra_str(IOS_SCHEME));
    fill(&mut config.ios_configuration, expo.extra_str(IOS_CONFIGURATION));
    fill(&mut config.ios_workspace, expo.extra_str(IOS_WORKSPACE));
    fill(&mut config.ios_derived_data, expo.extra_str(IOS_DERIVED_DATA));
    fill(&mut config.android_app_id, expo.extra_str(AOS_APP_ID));
    fill(&mut config.android_module, expo.extra_str(AOS_MODULE));
    fill(&mut config.android_variant, expo.extra_str(AOS_VARIANT));

    fill(
        &mut config.ios_bundle_id,
        expo.ios.as_ref().and_then(|ios| ios.bundle_identifier.as_deref()),
    );
    fill(
        &mut config.android_app_id,
        expo.android.as_ref().and_then(|android| android.package.as_deref()),
    );
}

fn apply_defaults(config: &mut DeviceConfig) {
    fill(&mut config.ios_configuration, Some(DEFAULT_IOS_CONFIGURATION));
    fill(&mut config.ios_derived_data, Some(DEFAULT_IOS_DERIVED_DATA));
    fill(&mut config.android_module, Some(DEFAULT_ANDROID_MODULE));
    fill(&mut config.android_variant, Some(DEFAULT_ANDROID_VARIANT));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::FORCE_PROJECT_TYPE;
    use crate::testing::FakeProject;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const APP_JSON_WITH_EXTRA: &str = r#"{
        "expo": {
            "name": "demo",
            "ios": { "bundleIdentifier": "com.example.demo" },
            "android": { "package": "com.example.demo.android" },
            "extra": {
                "IOS_SCHEME": "FromAppJson",
                "IOS_CONFIGURATION": "Release",
                "AOS_VARIANT": "release"
            }
        }
    }"#;

    #[test]
    fn test_env_overrides_project_config() {
        let project = FakeProject::new().file(APP_JSON, APP_JSON_WITH_EXTRA);
        let loader = ConfigLoader::new(
            &project,
            env(&[(IOS_SCHEME, "FromEnv"), (AOS_VARIANT, "staging")]),
        );

        let loaded = loader.load(ProjectType::ExpoManaged);
        assert_eq!(loaded.source, ConfigSource::AppJson);
        assert_eq!(loaded.config.ios_scheme.as_deref(), Some("FromEnv"));
        assert_eq!(loaded.config.android_variant.as_deref(), Some("staging"));
        assert_eq!(loaded.config.ios_configuration.as_deref(), Some("Release"));
        assert_eq!(
            loaded.config.ios_bundle_id.as_deref(),
            Some("com.example.demo")
        );
        assert_eq!(
            loaded.config.android_app_id.as_deref(),
            Some("com.example.demo.android")
        );
    }

    #[test]
    fn test_env_file_fills_gaps_but_process_env_wins() {
        let project = FakeProject::new().file(
            ENV_FILE,
            "IOS_SCHEME=FromDotenv\nAOS_MODULE=mobile\nFORCE_PROJECT_TYPE=expo-bare\n",
        );
        let loader = ConfigLoader::new(&project, env(&[(IOS_SCHEME, "FromEnv")]));

        assert!(loader.env_file_loaded());
        assert_eq!(loader.var(FORCE_PROJECT_TYPE), Some("expo-bare"));

        let config = loader.load(ProjectType::ReactNativeCli).config;
        assert_eq!(config.ios_scheme.as_deref(), Some("FromEnv"));
        assert_eq!(config.android_module.as_deref(), Some("mobile"));
    }

    #[test]
    fn test_empty_env_values_count_as_unset() {
        let project = FakeProject::new().file(PACKAGE_JSON, r#"{"name":"demo-app"}"#);
        let loader = ConfigLoader::new(&project, env(&[(IOS_SCHEME, ""), (AOS_VARIANT, "")]));

        let config = loader.load(ProjectType::ReactNativeCli).config;
        assert_eq!(config.ios_scheme.as_deref(), Some("demo-app"));
        assert_eq!(config.android_variant.as_deref(), Some(DEFAULT_ANDROID_VARIANT));
    }

    #[test]
    fn test_defaults() {
        let project = FakeProject::new();
        let loaded = ConfigLoader::new(&project, HashMap::new()).load(ProjectType::ReactNativeCli);

        assert_eq!(loaded.source, ConfigSource::None);
        assert_eq!(
            loaded.config,
            DeviceConfig {
                ios_configuration: Some("Debug".to_string()),
                ios_derived_data: Some(".build/ios".to_string()),
                android_module: Some("app".to_string()),
                android_variant: Some("debug".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_expo_falls_back_to_expo_cli() {
        let project = FakeProject::new()
            .file(APP_JSON, r#"{"name":"not-expo"}"#)
            .with_expo_config(r#"{"name":"demo","extra":{"AOS_APP_ID":"com.example.extra"},"android":{"package":"com.example.pkg"}}"#);

        let loaded = ConfigLoader::new(&project, HashMap::new()).load(ProjectType::ExpoManaged);
        assert_eq!(loaded.source, ConfigSource::ExpoCli);
        assert_eq!(
            loaded.config.android_app_id.as_deref(),
            Some("com.example.extra")
        );
        assert_eq!(project.expo_config_calls.get(), 1);
    }

    #[test]
    fn test_expo_falls_back_to_package_json() {
        let project = FakeProject::new()
            .file(APP_JSON, "{ broken")
            .file(PACKAGE_JSON, r#"{"name":"demo-app"}"#);

        let loaded = ConfigLoader::new(&project, HashMap::new()).load(ProjectType::ExpoBare);
        assert_eq!(loaded.source, ConfigSource::PackageJson);
        assert_eq!(loaded.config.ios_scheme.as_deref(), Some("demo-app"));
    }

    #[test]
    fn test_react_native_never_runs_expo_config() {
        let project = FakeProject::new()
            .file(APP_JSON, APP_JSON_WITH_EXTRA)
            .file(PACKAGE_JSON, r#"{"name":"demo-app"}"#)
            .with_expo_config("{}");

        let loaded = ConfigLoader::new(&project, HashMap::new()).load(ProjectType::ReactNativeCli);
        assert_eq!(loaded.source, ConfigSource::PackageJson);
        assert_eq!(loaded.config.ios_scheme.as_deref(), Some("demo-app"));
        assert_eq!(project.expo_config_calls.get(), 0);
    }
}
