//! # CLI Layer
//!
//! One possible client of the notecli library. It is the only place that
//! parses arguments, touches stdout/stderr or reads from the terminal.
//!
//! - `setup.rs`: clap definitions
//! - `commands.rs`: logging setup, context wiring and dispatch to the API
//! - `render.rs`: turns `CmdResult` values into terminal output
//! - `styles.rs`: shared styles
//!
//! Business rules stay in the command layer; tests here only check parsing
//! and formatting.

mod commands;
mod render;
mod setup;
mod styles;

pub use commands::run;
