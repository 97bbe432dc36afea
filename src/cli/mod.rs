//! Command Line Interface module
//!
//! This module contains the CLI argument parsing, command implementations,
//! and the Terminal User Interface (TUI) components.

pub mod args;
pub mod commands;
pub mod tui;

pub use args::*;

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::{AppConfig, load_options_or_default};
use crate::models::PackageOptions;

/// Everything a command needs, resolved once from flags and files
#[derive(Debug, Clone)]
pub struct ForgeContext {
    pub config: AppConfig,
    pub options: PackageOptions,
    /// File the options were read from, if any
    pub options_path: Option<PathBuf>,
}

impl ForgeContext {
    /// Options file, then command line overrides, then the configured default interpreter
    pub fn load(cli: &Cli, config: AppConfig) -> Result<Self> {
        let (mut options, options_path) = load_options_or_default(cli.options.as_deref())
            .context("Failed to load packaging options")?;
        if let Some(path) = &options_path {
            log::debug!("Loaded options from {}", path.display());
        }

        cli.overrides.apply(&mut options);

        if options.python.trim().is_empty() {
            if let Some(python) = &config.default_python {
                log::debug!("Using configured default interpreter {}", python);
                options.python = python.clone();
            }
        }

        Ok(Self {
            config,
            options: options.normalized(),
            options_path,
        })
    }
}

/// True when no subcommand was given and the interactive UI is enabled
pub fn wants_tui(cli: &Cli, config: &AppConfig) -> bool {
    cli.command.is_none() && !cli.cli && config.ui.enable_tui
}

/// Main CLI application runner
pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let tui_mode = wants_tui(&cli, &config);
    let ctx = ForgeContext::load(&cli, config)?;

    match cli.command {
        Some(command) => commands::execute_command(command, &ctx).await,
        None if tui_mode => tui::run_tui(ctx).await,
        // Without the TUI the most useful default is showing the command
        None => commands::preview::execute_preview_command(&ctx, false),
    }
}
