//! Toolchain invocation for rndr
//!
//! Builds the `npx expo run:*` or `npx react-native run-*` command for a
//! device and runs it with the terminal attached. A failed Expo run is
//! retried once with the equivalent React Native CLI command.

use crate::error::{RndrError, Result};
use crate::models::{DeviceConfig, DeviceInfo, Platform, ProjectType};
use crate::tools::ProcessLauncher;
use std::borrow::Cow;
use tracing::{info, warn};

/// Package runner every toolchain command goes through
pub const NPX: &str = "npx";

/// A program plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The toolchain command for `device` in a project of `project_type`
    pub fn for_device(
        project_type: ProjectType,
        device: &DeviceInfo,
        config: &DeviceConfig,
    ) -> Self {
        let mut args: Vec<String> = Vec::new();

        match (device.platform, project_type.is_expo()) {
            (Platform::Ios, true) => {
                args.extend(["expo", "run:ios", "--device"].map(String::from));
            }
            (Platform::Ios, false) => {
                args.extend(["react-native", "run-ios", "--udid"].map(String::from));
            }
            (Platform::Android, true) => {
                args.extend(["expo", "run:android", "--device"].map(String::from));
            }
            (Platform::Android, false) => {
                args.extend(["react-native", "run-android", "--deviceId"].map(String::from));
            }
        }
        args.push(device.id.clone());

        let mut flag = |name: &str, value: &Option<String>| {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                args.push(name.to_string());
                args.push(value.to_string());
            }
        };

        match device.platform {
            Platform::Ios => {
                flag("--scheme", &config.ios_scheme);
                flag("--configuration", &config.ios_configuration);
            }
            Platform::Android => {
                flag("--variant", &config.android_variant);
            }
        }

        Self::new(NPX, args)
    }

    /// Whether this is an `expo run:*` command
    pub fn is_expo_run(&self) -> bool {
        self.args.first().map(String::as_str) == Some("expo")
            && self.args.get(1).is_some_and(|a| a.starts_with("run:"))
    }

    /// The `react-native run-*` equivalent of an `expo run:*` command.
    ///
    /// `--device` becomes `--udid` on iOS and `--deviceId` on Android; other
    /// flags are carried over as-is. Returns `None` for anything else.
    pub fn react_native_fallback(&self) -> Option<Self> {
        if !self.is_expo_run() {
            return None;
        }

        let (subcommand, device_flag) = match self.args[1].as_str() {
            "run:ios" => ("run-ios", "--udid"),
            "run:android" => ("run-android", "--deviceId"),
            _ => return None,
        };

        let mut args = vec!["react-native".to_string(), subcommand.to_string()];
        args.extend(self.args[2..].iter().map(|arg| {
            if arg == "--device" {
                device_flag.to_string()
            } else {
                arg.clone()
            }
        }));

        Some(Self::new(self.program.clone(), args))
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

// `run:ios` and `@scope/pkg` are shell-safe; leave them readable
fn quote(arg: &str) -> Cow<'_, str> {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=/,.+:@%".contains(c));

    if plain {
        Cow::Borrowed(arg)
    } else {
        shell_escape::escape(Cow::Borrowed(arg))
    }
}

/// Progress notifications emitted while running
#[derive(Debug, Clone, Copy)]
pub enum RunEvent<'a> {
    /// About to start a (possibly long-running) child
    Launching(&'a Invocation),
    /// The first attempt failed and its fallback is next
    Retrying {
        failed: &'a Invocation,
        exit_code: i32,
    },
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// The last command that ran
    pub invocation: Invocation,
    pub exit_code: i32,
    pub retried: bool,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs the app on a device with the project's toolchain
#[derive(Debug)]
pub struct AppRunner<'a, L: ProcessLauncher + ?Sized> {
    launcher: &'a L,
    config: &'a DeviceConfig,
    project_type: ProjectType,
}

impl<'a, L: ProcessLauncher + ?Sized> AppRunner<'a, L> {
    pub fn new(launcher: &'a L, config: &'a DeviceConfig, project_type: ProjectType) -> Self {
        Self {
            launcher,
            config,
            project_type,
        }
    }

    /// Run on `device`, reporting progress through `on_event`.
    ///
    /// Fails only when `npx` is missing or the child cannot be spawned;
    /// a non-zero toolchain exit is reported through [`RunOutcome`].
    pub fn run<F>(&self, device: &DeviceInfo, mut on_event: F) -> Result<RunOutcome>
    where
        F: FnMut(RunEvent<'_>),
    {
        if !self.launcher.has_command(NPX) {
            return Err(RndrError::MissingTool {
                tool: NPX,
                platform: device.platform,
            });
        }

        let invocation = Invocation::for_device(self.project_type, device, self.config);
        let exit_code = self.launch(&invocation, &mut on_event)?;

        if exit_code != 0 {
            if let Some(fallback) = invocation.react_native_fallback() {
                warn!(%invocation, exit_code, "expo run failed, retrying with react-native");
                on_event(RunEvent::Retrying {
                    failed: &invocation,
                    exit_code,
                });

                let exit_code = self.launch(&fallback, &mut on_event)?;
                return Ok(RunOutcome {
                    invocation: fallback,
                    exit_code,
                    retried: true,
                });
            }
        }

        Ok(RunOutcome {
            invocation,
            exit_code,
            retried: false,
        })
    }

    fn launch<F>(&self, invocation: &Invocation, on_event: &mut F) -> Result<i32>
    where
        F: FnMut(RunEvent<'_>),
    {
        on_event(RunEvent::Launching(invocation));
        info!(command = %invocation, "launching toolchain");

        // Killed by a signal counts as a generic failure
        let code = self.launcher.launch(invocation)?.unwrap_or(1);
        info!(command = %invocation, exit_code = code, "toolchain exited");

        Ok(code)
    }
}
