//! Error types for rndr

use crate::models::Platform;
use thiserror::Error;

/// Main error type for rndr-core operations
#[derive(Error, Debug)]
pub enum RndrError {
    /// A required command-line tool is not on PATH
    #[error("{tool} is required to run on {platform}")]
    MissingTool {
        tool: &'static str,
        platform: Platform,
    },

    /// The toolchain process could not be spawned at all
    #[error("Failed to launch `{command}`")]
    LaunchFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse a JSON project file
    #[error("Failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// Unrecognised FORCE_PROJECT_TYPE value
    #[error("Unknown project type: {0}")]
    UnknownProjectType(String),

    /// Unrecognised platform name
    #[error("Invalid platform: {0} (expected ios or android)")]
    InvalidPlatform(String),
}

/// Result type alias for rndr-core operations
pub type Result<T> = std::result::Result<T, RndrError>;
