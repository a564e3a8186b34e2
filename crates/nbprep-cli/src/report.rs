//! Deferred error reporting and exit status.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::colors;

/// Print the per-file failures and the run banner, returning the exit code.
pub fn summarize(errors: &BTreeMap<PathBuf, String>) -> ExitCode {
    for (path, error) in errors {
        println!("{} did not execute cleanly.", path.display());
        println!("Error message:");
        println!("{error}");
    }

    if errors.is_empty() {
        println!(
            "{}{}========== Success =========={}",
            colors::BOLD,
            colors::GREEN,
            colors::RESET
        );
        ExitCode::SUCCESS
    } else {
        println!(
            "{}{}========== Failure =========={}",
            colors::BOLD,
            colors::RED,
            colors::RESET
        );
        ExitCode::FAILURE
    }
}
