//! Interfaces to the external tools rndr depends on
//!
//! Detection, config loading and the runner only talk to the outside world
//! through these traits. [`crate::system::SystemTools`] is the real
//! implementation; tests provide fakes.

use crate::error::Result;
use crate::runner::Invocation;

/// Raw device listings from Apple's and Google's command-line tools.
///
/// Every method returns `None` when the tool is missing or fails.
pub trait DeviceLister {
    /// JSON written by `xcrun devicectl list devices`
    fn devicectl_json(&self) -> Option<String>;

    /// Text from `xcrun xctrace list devices`
    fn xctrace_devices(&self) -> Option<String>;

    /// Text from `adb devices -l`
    fn adb_devices(&self) -> Option<String>;
}

/// Read-only access to the JavaScript project being run.
///
/// Paths are relative to the project root.
pub trait ProjectInspector {
    /// Contents of a project file, or `None` if it cannot be read
    fn read_file(&self, name: &str) -> Option<String>;

    /// Whether a file or directory exists
    fn exists(&self, name: &str) -> bool;

    /// Whether `npx expo --help` succeeds
    fn expo_cli_works(&self) -> bool;

    /// Output of `npx expo config --json`
    fn expo_config_json(&self) -> Option<String>;
}

/// Spawns the long-running toolchain process.
pub trait ProcessLauncher {
    /// Whether `program` is on PATH
    fn has_command(&self, program: &str) -> bool;

    /// Run to completion with inherited stdio.
    ///
    /// Returns the exit code, or `None` when the child was killed by a signal.
    fn launch(&self, invocation: &Invocation) -> Result<Option<i32>>;
}
