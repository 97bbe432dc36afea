//! Preview command implementation

use crate::builder::{self, PLACEHOLDER_TEXT};
use crate::cli::ForgeContext;
use anyhow::Result;

pub fn execute_preview_command(ctx: &ForgeContext, json: bool) -> Result<()> {
    let command = match builder::build(&ctx.options) {
        Ok(command) => command,
        Err(e) => {
            log::warn!("⚠️  {}", e);
            if json {
                println!("null");
            } else {
                println!("{}", PLACEHOLDER_TEXT);
            }
            return Ok(());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&command)?);
    } else {
        println!("{}", command);
    }
    Ok(())
}
