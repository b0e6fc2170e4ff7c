// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

mod error;
mod run;

use clap::{error::ErrorKind, CommandFactory, Parser};
use error::result_to_exit_code;
use std::process::ExitCode;

/// UVC Gadget - stream a camera, capture device, image or slideshow to a USB
/// webcam function
#[derive(Parser, Debug)]
#[command(name = "uvc-gadget")]
#[command(version)]
#[command(long_about = None)]
#[command(after_long_help = run::FUNCTION_HELP)]
struct Cli {
    /// Enable verbose logging (use RUST_LOG=debug for more)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the --dry-run report in JSON format
    #[arg(long, requires = "dry_run")]
    json: bool,

    #[command(flatten)]
    args: run::Args,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and succeed, every parse error
            // exits with 1.
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_logging(cli.verbose, cli.quiet);

    let result = run::execute(cli.args, cli.json);
    result_to_exit_code(result, || Cli::command().render_long_help().to_string())
}

/// Initialize env_logger based on verbosity flags
fn init_logging(verbose: bool, quiet: bool) {
    let env = env_logger::Env::default();

    let env = if quiet {
        env.default_filter_or("error")
    } else if verbose {
        env.default_filter_or("debug")
    } else {
        env.default_filter_or("info")
    };

    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .init();

    log::debug!("Logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_awbgains_alias() {
        let cli = Cli::try_parse_from(["uvc-gadget", "-c", "0", "--awbgains", "1.0,2.0"]).unwrap();
        assert!(!cli.json);
        assert!(format!("{:?}", cli.args).contains("1.0,2.0"));
    }

    #[test]
    fn test_controls_require_camera() {
        let err = Cli::try_parse_from(["uvc-gadget", "--awb", "daylight"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
