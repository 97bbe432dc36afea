//! Run command implementation

use crate::builder;
use crate::cli::ForgeContext;
use crate::models::{RunEvent, RunOutcome};
use crate::services::{ExecutionController, probe_nuitka};
use crate::utils::logging::timestamped;
use anyhow::Result;
use tokio::sync::mpsc;

pub async fn execute_run_command(ctx: &ForgeContext) -> Result<()> {
    ctx.options.ready_to_run()?;

    if ctx.config.execution.probe_before_run {
        let status = probe_nuitka(&ctx.options.python).await;
        if status.is_found() {
            log::info!("{}", status.describe());
        } else {
            // Advisory only; the run itself reports a missing module
            log::warn!("{}", status.describe());
        }
    }

    let command = builder::build(&ctx.options)?;
    println!("{}", timestamped("▶ Starting packaging process..."));
    println!("{}", timestamped(&format!("Command: {}", command)));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut controller = ExecutionController::new(ctx.config.execution.grace_period());
    controller.start(command, tx)?;

    let mut stop_requested = false;
    let outcome = loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(RunEvent::Line(_, line)) => println!("{}", timestamped(&line)),
                Some(RunEvent::Finished(_, outcome)) => break outcome,
                None => {
                    return Err(anyhow::anyhow!(
                        "packaging worker ended without reporting an outcome"
                    ));
                }
            },
            signal = tokio::signal::ctrl_c(), if !stop_requested => {
                signal?;
                println!("{}", timestamped("🛑 Stopping packaging process..."));
                if let Err(e) = controller.cancel() {
                    log::debug!("Stop request ignored: {}", e);
                }
                stop_requested = true;
            }
        }
    };
    controller.discard_finished();

    println!("{}", timestamped(&outcome.to_string()));
    match outcome {
        RunOutcome::Succeeded => {
            println!(
                "{}",
                timestamped(&format!("Output directory: {}", ctx.options.output_dir))
            );
            Ok(())
        }
        other => Err(anyhow::anyhow!("packaging did not succeed: {}", other)),
    }
}
