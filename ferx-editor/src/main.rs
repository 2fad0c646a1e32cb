//! Ferx editor: opens a window, renders the scene off-screen and shows it
//! in an egui panel.

mod cli;
mod editor;
mod gui;
mod logging;

use clap::Parser;
use color_eyre::eyre::{Context, Result};

use crate::{
    cli::Cli,
    logging::{LoggingConfig, init_logging},
};

fn main() -> Result<()> {
    // panic hook
    color_eyre::install()?;

    // parse command line arguments
    let cli = Cli::parse();
    cli.validate()?;

    // Initialize structured logging
    let logging_config = LoggingConfig::from_env().with_console_level(cli.log_level);
    let _guard = init_logging(&logging_config).wrap_err("Failed to initialize logging")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ferx-editor starting up");

    let config = cli.editor_config();
    tracing::debug!(?config, "editor configuration");

    editor::run(config)
}
