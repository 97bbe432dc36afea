//! Check command implementation

use crate::cli::ForgeContext;
use crate::errors::{ForgeError, RequiredField};
use crate::services::{probe_nuitka, tool_check};
use anyhow::Result;

pub async fn execute_check_command(ctx: &ForgeContext) -> Result<()> {
    let python = ctx.options.python.trim();
    if python.is_empty() {
        return Err(ForgeError::MissingRequiredField(RequiredField::Interpreter).into());
    }

    let interpreter = tool_check::resolve_interpreter(python);
    println!("🐍 Interpreter: {}", interpreter.display());

    let status = probe_nuitka(python).await;
    println!("{}", status.describe());

    if status.is_found() {
        Ok(())
    } else {
        Err(ForgeError::Tool(format!("Nuitka not detected for {}", python)).into())
    }
}
