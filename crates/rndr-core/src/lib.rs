//! rndr Core Library
//!
//! This crate provides the core functionality for rndr, a runner that
//! launches a React Native or Expo app on the connected physical device:
//! device detection, project type detection, configuration merging and
//! toolchain invocation.
//!
//! All contact with external tools goes through the traits in [`tools`],
//! implemented for the local machine by [`SystemTools`].
//!
//! # Example
//!
//! ```no_run
//! use rndr_core::{AppRunner, ConfigLoader, DeviceDetector, Platform, ProjectDetector, SystemTools};
//!
//! let tools = SystemTools::current_dir().unwrap();
//!
//! let loader = ConfigLoader::from_process_env(&tools);
//! let detection = ProjectDetector::new(&tools)
//!     .with_override(loader.var("FORCE_PROJECT_TYPE").map(String::from))
//!     .detect();
//! let loaded = loader.load(detection.project_type);
//!
//! let devices = DeviceDetector::new(&tools).find_devices();
//! if let Some(device) = devices.choose(Platform::Ios) {
//!     let runner = AppRunner::new(&tools, &loaded.config, detection.project_type);
//!     let outcome = runner.run(device, |_| {}).unwrap();
//!     std::process::exit(outcome.exit_code);
//! }
//! ```

pub mod config;
pub mod detector;
pub mod env_file;
pub mod error;
pub mod models;
pub mod project;
pub mod runner;
pub mod system;
pub mod tools;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigSource, LoadedConfig};
pub use detector::DeviceDetector;
pub use error::{ConfigError, RndrError, Result};
pub use models::{DetectedDevices, DeviceConfig, DeviceInfo, ExpoConfig, Platform, ProjectType};
pub use project::{DetectionReason, ProjectDetection, ProjectDetector, FORCE_PROJECT_TYPE};
pub use runner::{AppRunner, Invocation, RunEvent, RunOutcome};
pub use system::SystemTools;
pub use tools::{DeviceLister, ProcessLauncher, ProjectInspector};
