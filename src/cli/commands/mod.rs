//! CLI command implementations

pub mod check;
pub mod init;
pub mod preview;
pub mod run;

use crate::cli::ForgeContext;
use crate::cli::args::Commands;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute_command(command: Commands, ctx: &ForgeContext) -> Result<()> {
    match command {
        Commands::Preview { json } => preview::execute_preview_command(ctx, json),
        Commands::Run => run::execute_run_command(ctx).await,
        Commands::Check => check::execute_check_command(ctx).await,
        Commands::Init { path, force } => init::execute_init_command(ctx, path, force),
    }
}
