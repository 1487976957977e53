//! Detect, configure and run

use anyhow::{Context, Result};
use rndr_core::{
    AppRunner, ConfigLoader, DeviceDetector, DeviceInfo, Platform, ProjectDetector, RunEvent,
    SystemTools, FORCE_PROJECT_TYPE,
};
use tracing::debug;

use crate::output::OutputContext;
use crate::ExitCode;

fn platform_label(platform: Platform) -> &'static str {
    match platform {
        Platform::Ios => "iOS",
        Platform::Android => "Android",
    }
}

fn report_device(ctx: &OutputContext, platform: Platform, device: Option<&DeviceInfo>) {
    let label = platform_label(platform);

    match device {
        Some(device) => match &device.name {
            Some(name) => ctx.success(&format!("{} device found: {} ({})", label, device.id, name)),
            None => ctx.success(&format!("{} device found: {}", label, device.id)),
        },
        None => ctx.info(&format!("No {} device detected", label)),
    }
}

pub fn run(prefer: Platform, ctx: &OutputContext) -> Result<ExitCode> {
    ctx.header();

    let tools = SystemTools::current_dir().context("Failed to read current directory")?;
    debug!(root = %tools.project_root().display(), prefer = %prefer, "starting");

    ctx.step("Initializing environment variables...");
    let loader = ConfigLoader::from_process_env(&tools);
    if loader.env_file_loaded() {
        ctx.success(".env file loaded");
    }

    let detection = ProjectDetector::new(&tools)
        .with_override(loader.var(FORCE_PROJECT_TYPE).map(String::from))
        .detect();
    ctx.info(&format!(
        "Detected as a {} project ({})",
        detection.project_type, detection.reason
    ));

    ctx.step("Reading project configuration...");
    let loaded = loader.load(detection.project_type);
    ctx.success(&format!("Configuration loaded from {}", loaded.source));

    ctx.step("Searching for connected devices...");
    let devices = DeviceDetector::new(&tools).find_devices();
    report_device(ctx, Platform::Ios, devices.ios.as_ref());
    report_device(ctx, Platform::Android, devices.android.as_ref());
    ctx.separator();

    let Some(device) = devices.choose(prefer) else {
        ctx.error("No physical devices connected.");
        ctx.info("iOS: Check device trust settings in Xcode");
        ctx.info("Android: Make sure USB debugging is enabled");
        return Ok(ExitCode::NoDevice);
    };

    let label = platform_label(device.platform);
    if devices.both() {
        ctx.info(&format!("Both devices connected. Running {} first.", label));
    }

    ctx.success(&format!("{} device found! Preparing to run...", label));
    ctx.device(&format!("Device {}: {}", device.id_label(), device.id));

    let config = &loaded.config;
    match device.platform {
        Platform::Ios => {
            if let Some(scheme) = &config.ios_scheme {
                ctx.device(&format!("Scheme: {}", scheme));
            }
            if let Some(configuration) = &config.ios_configuration {
                ctx.device(&format!("Configuration: {}", configuration));
            }
        }
        Platform::Android => {
            if let Some(variant) = &config.android_variant {
                ctx.device(&format!("Variant: {}", variant));
            }
        }
    }

    let runner = AppRunner::new(&tools, config, detection.project_type);
    let outcome = runner.run(device, |event| match event {
        RunEvent::Launching(invocation) => ctx.step(&format!("Running {}", invocation)),
        RunEvent::Retrying { failed, exit_code } => ctx.warn(&format!(
            "`{}` failed (exit code: {}), retrying with the React Native CLI",
            failed, exit_code
        )),
    })?;
    debug!(
        command = %outcome.invocation,
        exit_code = outcome.exit_code,
        retried = outcome.retried,
        "run finished"
    );

    if outcome.success() {
        Ok(ExitCode::Success)
    } else {
        ctx.error(&format!(
            "Command execution failed (exit code: {})",
            outcome.exit_code
        ));
        Ok(ExitCode::Toolchain(outcome.exit_code))
    }
}
