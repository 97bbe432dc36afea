//! Terminal User Interface components

pub mod app;
pub mod event_loop;
pub mod ui;


use crate::cli::ForgeContext;
use anyhow::Result;

/// Run the Terminal User Interface
pub async fn run_tui(ctx: ForgeContext) -> Result<()> {
    let app = app::App::new(ctx);
    event_loop::run_tui_event_loop(app).await
}
