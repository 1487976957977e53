//! Project type detection
//!
//! Decides whether the current project is driven by the Expo CLI or the
//! React Native CLI, and for Expo whether native folders are checked in.
//! This is a best-effort heuristic; when nothing matches the project is
//! treated as React Native CLI.

use crate::error::ConfigError;
use crate::models::ProjectType;
use crate::tools::ProjectInspector;
use serde_json::Value;
use std::cell::OnceCell;
use tracing::{debug, info, warn};

/// Environment variable that bypasses detection
pub const FORCE_PROJECT_TYPE: &str = "FORCE_PROJECT_TYPE";

pub const PACKAGE_JSON: &str = "package.json";
pub const APP_JSON: &str = "app.json";
const APP_CONFIG_FILES: [&str; 2] = ["app.config.js", "app.config.ts"];
const NATIVE_DIRS: [&str; 2] = ["ios", "android"];

/// Why a project type was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionReason {
    /// `FORCE_PROJECT_TYPE` was set
    Forced,
    /// `expo` is a dependency in package.json
    ExpoDependency,
    /// app.json has an `expo` section
    AppJson,
    /// An app.json / app.config.* file exists and the Expo CLI works
    AppConfigFile,
    /// Only `ios/` or `android/` folders were found
    NativeFolders,
    /// Nothing matched
    Fallback,
}

impl std::fmt::Display for DetectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionReason::Forced => write!(f, "forced by {}", FORCE_PROJECT_TYPE),
            DetectionReason::ExpoDependency => write!(f, "expo dependency in package.json"),
            DetectionReason::AppJson => write!(f, "expo section in app.json"),
            DetectionReason::AppConfigFile => write!(f, "Expo app config file"),
            DetectionReason::NativeFolders => write!(f, "native ios/android folders"),
            DetectionReason::Fallback => write!(f, "could not determine, defaulting"),
        }
    }
}

/// Result of project type detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectDetection {
    pub project_type: ProjectType,
    pub reason: DetectionReason,
}

/// Read and parse a JSON file from the project.
///
/// Returns `Ok(None)` when the file does not exist or cannot be read.
pub(crate) fn read_json<I: ProjectInspector + ?Sized>(
    inspector: &I,
    name: &str,
) -> Result<Option<Value>, ConfigError> {
    let Some(contents) = inspector.read_file(name) else {
        return Ok(None);
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            file: name.to_string(),
            source,
        })
}

fn depends_on_expo(package_json: &Value) -> bool {
    ["dependencies", "devDependencies"]
        .iter()
        .any(|section| package_json.get(section).and_then(|deps| deps.get("expo")).is_some())
}

/// Classifies a project as Expo managed, Expo bare or React Native CLI
#[derive(Debug)]
pub struct ProjectDetector<'a, I: ProjectInspector + ?Sized> {
    inspector: &'a I,
    force: Option<String>,
    expo_cli: OnceCell<bool>,
}

impl<'a, I: ProjectInspector + ?Sized> ProjectDetector<'a, I> {
    pub fn new(inspector: &'a I) -> Self {
        Self {
            inspector,
            force: None,
            expo_cli: OnceCell::new(),
        }
    }

    /// Value of `FORCE_PROJECT_TYPE`, if set
    pub fn with_override(mut self, force: Option<String>) -> Self {
        self.force = force.filter(|v| !v.trim().is_empty());
        self
    }

    fn expo_cli_works(&self) -> bool {
        *self
            .expo_cli
            .get_or_init(|| self.inspector.expo_cli_works())
    }

    fn has_native_folders(&self) -> bool {
        NATIVE_DIRS.iter().any(|dir| self.inspector.exists(dir))
    }

    fn expo(&self, reason: DetectionReason) -> ProjectDetection {
        let project_type = if self.has_native_folders() {
            ProjectType::ExpoBare
        } else {
            ProjectType::ExpoManaged
        };

        ProjectDetection {
            project_type,
            reason,
        }
    }

    pub fn detect(&self) -> ProjectDetection {
        let detection = self.detect_inner();
        info!(
            project_type = %detection.project_type,
            reason = %detection.reason,
            "project type detected"
        );
        detection
    }

    fn detect_inner(&self) -> ProjectDetection {
        if let Some(raw) = &self.force {
            match raw.parse::<ProjectType>() {
                Ok(project_type) => {
                    return ProjectDetection {
                        project_type,
                        reason: DetectionReason::Forced,
                    }
                }
                Err(e) => warn!(error = %e, "ignoring {}", FORCE_PROJECT_TYPE),
            }
        }

        match read_json(self.inspector, PACKAGE_JSON) {
            Ok(Some(package_json)) if depends_on_expo(&package_json) => {
                if self.expo_cli_works() {
                    return self.expo(DetectionReason::ExpoDependency);
                }
                warn!("expo package found but the expo CLI is not working");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "failed to read package.json"),
        }

        let has_app_json = self.inspector.exists(APP_JSON);
        if has_app_json {
            match read_json(self.inspector, APP_JSON) {
                Ok(Some(app_json)) if app_json.get("expo").is_some() => {
                    return self.expo(DetectionReason::AppJson);
                }
                Ok(_) => {}
                Err(e) => debug!(error = %e, "failed to read app.json"),
            }
        }

        let has_app_config =
            has_app_json || APP_CONFIG_FILES.iter().any(|f| self.inspector.exists(f));
        if has_app_config {
            if self.expo_cli_works() {
                return self.expo(DetectionReason::AppConfigFile);
            }
            warn!("Expo config files found but the expo CLI is not working");
        }

        if self.has_native_folders() {
            return ProjectDetection {
                project_type: ProjectType::ReactNativeCli,
                reason: DetectionReason::NativeFolders,
            };
        }

        warn!("could not determine project type with certainty, defaulting to React Native CLI");
        ProjectDetection {
            project_type: ProjectType::ReactNativeCli,
            reason: DetectionReason::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProject;

    const EXPO_PACKAGE: &str = r#"{"name":"demo","dependencies":{"expo":"~51.0.0","react-native":"0.74.0"}}"#;
    const RN_PACKAGE: &str = r#"{"name":"demo","dependencies":{"react-native":"0.74.0"}}"#;

    #[test]
    fn test_forced_bare_ignores_files() {
        let project = FakeProject::new()
            .file(PACKAGE_JSON, RN_PACKAGE)
            .with_expo_cli();

        let detection = ProjectDetector::new(&project)
            .with_override(Some("expo-bare".to_string()))
            .detect();

        assert_eq!(detection.project_type, ProjectType::ExpoBare);
        assert_eq!(detection.reason, DetectionReason::Forced);
        assert_eq!(project.expo_cli_calls.get(), 0);
    }

    #[test]
    fn test_invalid_override_falls_back_to_detection() {
        let project = FakeProject::new().dir("android");

        let detection = ProjectDetector::new(&project)
            .with_override(Some("flutter".to_string()))
            .detect();

        assert_eq!(detection.project_type, ProjectType::ReactNativeCli);
        assert_eq!(detection.reason, DetectionReason::NativeFolders);
    }

    #[test]
    fn test_expo_dependency_managed_and_bare() {
        let managed = FakeProject::new()
            .file(PACKAGE_JSON, EXPO_PACKAGE)
            .with_expo_cli();
        let detection = ProjectDetector::new(&managed).detect();
        assert_eq!(detection.project_type, ProjectType::ExpoManaged);
        assert_eq!(detection.reason, DetectionReason::ExpoDependency);

        let bare = FakeProject::new()
            .file(PACKAGE_JSON, EXPO_PACKAGE)
            .dir("ios")
            .with_expo_cli();
        assert_eq!(
            ProjectDetector::new(&bare).detect().project_type,
            ProjectType::ExpoBare
        );
    }

    #[test]
    fn test_expo_dev_dependency_counts() {
        let project = FakeProject::new()
            .file(PACKAGE_JSON, r#"{"devDependencies":{"expo":"^51"}}"#)
            .with_expo_cli();

        assert!(ProjectDetector::new(&project).detect().project_type.is_expo());
    }

    #[test]
    fn test_expo_dependency_with_broken_cli_is_react_native() {
        let project = FakeProject::new()
            .file(PACKAGE_JSON, EXPO_PACKAGE)
            .dir("android");

        let detection = ProjectDetector::new(&project).detect();
        assert_eq!(detection.project_type, ProjectType::ReactNativeCli);
    }

    #[test]
    fn test_app_json_expo_key_does_not_need_cli() {
        let project = FakeProject::new()
            .file(PACKAGE_JSON, RN_PACKAGE)
            .file(APP_JSON, r#"{"expo":{"name":"demo"}}"#);

        let detection = ProjectDetector::new(&project).detect();
        assert_eq!(detection.project_type, ProjectType::ExpoManaged);
        assert_eq!(detection.reason, DetectionReason::AppJson);
        assert_eq!(project.expo_cli_calls.get(), 0);
    }

    #[test]
    fn test_app_config_file_needs_working_cli() {
        let working = FakeProject::new().file("app.config.ts", "export default {}").with_expo_cli();
        let detection = ProjectDetector::new(&working).detect();
        assert_eq!(detection.reason, DetectionReason::AppConfigFile);

        let broken = FakeProject::new().file("app.config.js", "module.exports = {}");
        let detection = ProjectDetector::new(&broken).detect();
        assert_eq!(detection.project_type, ProjectType::ReactNativeCli);
        assert_eq!(detection.reason, DetectionReason::Fallback);
    }

    #[test]
    fn test_expo_cli_checked_once() {
        let project = FakeProject::new()
            .file(PACKAGE_JSON, EXPO_PACKAGE)
            .file(APP_JSON, r#"{"name":"bare-rn"}"#);

        ProjectDetector::new(&project).detect();
        assert_eq!(project.expo_cli_calls.get(), 1);
    }

    #[test]
    fn test_malformed_package_json_is_not_fatal() {
        let project = FakeProject::new().file(PACKAGE_JSON, "{ nope").dir("ios");

        let detection = ProjectDetector::new(&project).detect();
        assert_eq!(detection.project_type, ProjectType::ReactNativeCli);
        assert_eq!(detection.reason, DetectionReason::NativeFolders);
    }

    #[test]
    fn test_empty_project_defaults_to_react_native() {
        let project = FakeProject::new();
        let detection = ProjectDetector::new(&project).detect();

        assert_eq!(detection.project_type, ProjectType::ReactNativeCli);
        assert_eq!(detection.reason, DetectionReason::Fallback);
    }
}
