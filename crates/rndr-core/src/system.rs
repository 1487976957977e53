//! Real implementations of the tool interfaces
//!
//! Everything here shells out: `xcrun` and `adb` for device listings, `npx`
//! for the Expo helpers and the final toolchain run. Commands are resolved on
//! PATH with `which` so Windows shims like `npx.cmd` are found too.

use crate::error::{RndrError, Result};
use crate::runner::Invocation;
use crate::tools::{DeviceLister, ProcessLauncher, ProjectInspector};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long `npx expo config --json` may run before it is killed
pub const EXPO_CONFIG_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Tool adapters backed by the local machine, rooted at a project directory
#[derive(Debug, Clone)]
pub struct SystemTools {
    project_root: PathBuf,
}

impl SystemTools {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Use the current working directory as the project root
    pub fn current_dir() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Check if a program is on PATH
    pub fn is_available(program: &str) -> bool {
        which::which(program).is_ok()
    }
}

fn resolve(program: &str) -> PathBuf {
    which::which(program).unwrap_or_else(|_| PathBuf::from(program))
}

/// Run a command to completion and return its stdout if it succeeded.
fn capture(program: &str, args: &[&str], cwd: Option<&Path>) -> Option<String> {
    let mut cmd = Command::new(resolve(program));
    cmd.args(args).stdin(Stdio::null());

    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }

    let output = match cmd.output() {
        Ok(output) => output,
        Err(e) => {
            debug!(program, ?args, error = %e, "failed to execute");
            return None;
        }
    };

    if !output.status.success() {
        debug!(
            program,
            ?args,
            status = %output.status,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "command failed"
        );
        return None;
    }

    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Kill `child` and, on Unix, every process in its group.
///
/// `npx` runs the real work in a `node` grandchild that would otherwise
/// outlive it and hold the stdout pipe open.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        let _ = Command::new("kill")
            .args(["-KILL", "--", &format!("-{}", child.id())])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }

    let _ = child.kill();
    let _ = child.wait();
}

/// Like [`capture`], but kill the child once `timeout` elapses.
///
/// Stdout is drained on a helper thread so a full pipe cannot stall the child.
/// On timeout the reader is not joined; it ends once the pipe closes.
fn capture_with_timeout(mut cmd: Command, timeout: Duration) -> Option<String> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            debug!(error = %e, "failed to spawn");
            return None;
        }
    };

    let mut stdout = child.stdout.take()?;
    let reader = std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stdout.read_to_end(&mut buf);
        buf
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                warn!(timeout_secs = timeout.as_secs_f32(), "command timed out, killing it");
                kill_tree(&mut child);
                return None;
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                debug!(error = %e, "failed to wait for child");
                return None;
            }
        }
    };

    let stdout = reader.join().ok()?;
    if !status.success() {
        debug!(%status, "command failed");
        return None;
    }

    Some(String::from_utf8_lossy(&stdout).into_owned())
}

impl DeviceLister for SystemTools {
    fn devicectl_json(&self) -> Option<String> {
        if !Self::is_available("xcrun") {
            return None;
        }

        // devicectl only writes JSON to a file
        let path = std::env::temp_dir().join(format!("rndr_devicectl_{}.json", uuid::Uuid::new_v4()));
        let path_str = path.to_str()?;

        let listed = capture(
            "xcrun",
            &["devicectl", "list", "devices", "--json-output", path_str],
            None,
        )
        .is_some();

        let json = if listed {
            std::fs::read_to_string(&path).ok()
        } else {
            None
        };
        let _ = std::fs::remove_file(&path);

        json
    }

    fn xctrace_devices(&self) -> Option<String> {
        if !Self::is_available("xcrun") {
            return None;
        }

        capture("xcrun", &["xctrace", "list", "devices"], None)
    }

    fn adb_devices(&self) -> Option<String> {
        if !Self::is_available("adb") {
            return None;
        }

        let _ = Command::new(resolve("adb"))
            .arg("start-server")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        capture("adb", &["devices", "-l"], None)
    }
}

impl ProjectInspector for SystemTools {
    fn read_file(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.project_root.join(name)).ok()
    }

    fn exists(&self, name: &str) -> bool {
        self.project_root.join(name).exists()
    }

    fn expo_cli_works(&self) -> bool {
        if !Self::is_available("npx") {
            return false;
        }

        Command::new(resolve("npx"))
            .args(["expo", "--help"])
            .current_dir(&self.project_root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn expo_config_json(&self) -> Option<String> {
        if !Self::is_available("npx") {
            return None;
        }

        let mut cmd = Command::new(resolve("npx"));
        cmd.args(["expo", "config", "--json"])
            .current_dir(&self.project_root);

        capture_with_timeout(cmd, EXPO_CONFIG_TIMEOUT)
    }
}

impl ProcessLauncher for SystemTools {
    fn has_command(&self, program: &str) -> bool {
        Self::is_available(program)
    }

    fn launch(&self, invocation: &Invocation) -> Result<Option<i32>> {
        let status = Command::new(resolve(&invocation.program))
            .args(&invocation.args)
            .current_dir(&self.project_root)
            .status()
            .map_err(|source| RndrError::LaunchFailed {
                command: invocation.to_string(),
                source,
            })?;

        Ok(status.code())
    }
}
