//! nuitka-forge - Nuitka packaging front end
//!
//! Binary entry point. Argument parsing, command dispatch and the TUI live in
//! the library so they can be tested.

use anyhow::{Context, Result};
use nuitka_forge::cli::{self, Cli};
use nuitka_forge::config::AppConfig;
use nuitka_forge::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load application config")?;

    let level = logging::resolve_level(cli.quiet, cli.verbose, &config.ui.log_level);
    logging::init_cli_logging(level, cli::wants_tui(&cli, &config), cli.log_json)?;

    cli::run(cli, config).await
}
