//! vdiff: parse diffs of C preprocessor annotated files into variation diffs.
//!
//! This is the main entry point for the `vdiff` CLI. It parses arguments,
//! dispatches to the appropriate command handler, and handles errors with
//! proper exit codes.

use std::process::ExitCode;
use vdiff::cli::Cli;
use vdiff::{commands, exit_codes};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
