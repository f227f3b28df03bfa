//! # notecli CLI
//!
//! The binary is thin: the CLI lives in `cli/`, and this file only invokes
//! `cli::run()` and turns errors into messages and an exit status.
//!
//! - `cli/setup.rs`: clap argument definitions
//! - `cli/commands.rs`: context wiring, logging setup and dispatch
//! - `cli/render.rs`: terminal output for `CmdResult` values
//! - `cli/styles.rs`: shared terminal styles
//!
//! Errors from an edit that left a recovery checkpoint come with a hint to
//! rerun with `--recover`.

use colored::Colorize;

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if e.recovery_available() {
            eprintln!(
                "{}",
                "Your edit was kept. Run `notecli note edit --recover` to try again.".yellow()
            );
        }
        std::process::exit(1);
    }
}
