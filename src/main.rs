//! # Sheetdict Application Entry Point
//!
//! ```text
//! main()
//!   │
//!   ├─> Parse CLI arguments (clap)
//!   ├─> Initialize logging
//!   │
//!   ├─> If command provided:
//!   │   └─> Execute CLI command
//!   │
//!   └─> Otherwise:
//!       └─> Launch the desktop form
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // Allow println! in main binary

mod cli;
mod gui;

use anyhow::Result;
use clap::Parser as _;

/// Main entry point for the sheetdict application.
///
/// # Errors
///
/// Returns error if logging cannot be set up, the CLI command fails, or the
/// desktop window cannot be created.
fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    sheetdict::logging::init(&cli.log_options())?;

    if let Some(command) = cli.command {
        return cli::run_command(command);
    }

    gui::run()
}
