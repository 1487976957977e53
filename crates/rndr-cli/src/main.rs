//! rndr CLI - run a React Native or Expo app on the connected device

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};
use rndr_core::{Platform, RndrError};

mod output;
mod run;

/// Exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    GeneralError,
    NoDevice,
    NpxMissingIos,
    NpxMissingAndroid,
    /// The toolchain's own non-zero exit code
    Toolchain(i32),
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => 0,
            ExitCode::GeneralError => 1,
            ExitCode::NoDevice => 2,
            ExitCode::NpxMissingIos => 10,
            ExitCode::NpxMissingAndroid => 11,
            ExitCode::Toolchain(code) => code,
        }
    }
}

impl ExitCode {
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<RndrError>() {
            Some(RndrError::MissingTool {
                platform: Platform::Ios,
                ..
            }) => ExitCode::NpxMissingIos,
            Some(RndrError::MissingTool {
                platform: Platform::Android,
                ..
            }) => ExitCode::NpxMissingAndroid,
            _ => ExitCode::GeneralError,
        }
    }
}

/// rndr - detect the connected iOS or Android device and run your
/// React Native or Expo app on it
#[derive(Parser)]
#[command(name = "rndr", version, about, long_about = None)]
struct Cli {
    /// Platform to run when both an iOS and an Android device are connected (ios | android)
    #[arg(long, value_name = "PLATFORM", default_value = "ios")]
    prefer: Platform,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    no_color: bool,
}

fn setup_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let ctx = output::OutputContext::new(cli.no_color, cli.quiet);

    match run::run(cli.prefer, &ctx) {
        Ok(code) => std::process::exit(code.into()),
        Err(e) => {
            ctx.error(&format!("{:#}", e));
            std::process::exit(ExitCode::for_error(&e).into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::NoDevice), 2);
        assert_eq!(i32::from(ExitCode::NpxMissingAndroid), 11);
        assert_eq!(i32::from(ExitCode::Toolchain(65)), 65);
    }

    #[test]
    fn test_missing_npx_maps_to_platform_code() {
        let err = anyhow::Error::new(RndrError::MissingTool {
            tool: "npx",
            platform: Platform::Ios,
        });
        assert_eq!(ExitCode::for_error(&err), ExitCode::NpxMissingIos);

        let err = anyhow::anyhow!("something else");
        assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    }

    #[test]
    fn test_cli_parses_prefer() {
        let cli = Cli::try_parse_from(["rndr", "--prefer", "android"]).unwrap();
        assert_eq!(cli.prefer, Platform::Android);

        let cli = Cli::try_parse_from(["rndr"]).unwrap();
        assert_eq!(cli.prefer, Platform::Ios);

        assert!(Cli::try_parse_from(["rndr", "--prefer", "web"]).is_err());
    }

    #[test]
    fn test_no_color_flag() {
        let cli = Cli::try_parse_from(["rndr", "--no-color"]).unwrap();
        assert!(cli.no_color);
    }
}
