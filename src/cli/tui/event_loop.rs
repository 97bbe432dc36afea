//! TUI event loop and handling

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{io, time::Duration};
use tokio::sync::mpsc;

use crate::cli::tui::app::App;
use crate::cli::tui::ui::ui;
use crate::models::{AppEvent, RunEvent};
use crate::services::probe_nuitka;

/// Run the main TUI event loop
pub async fn run_tui_event_loop(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let (run_tx, mut run_rx) = mpsc::unbounded_channel::<RunEvent>();

    // Spawn tick generator
    let tx_tick = tx.clone();
    let tick_rate = app.tick_rate;
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_rate);
        loop {
            interval.tick().await;
            if tx_tick.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    // Probe for Nuitka in the background
    if app.options.python.trim().is_empty() {
        let _ = tx.send(AppEvent::Warning(
            "No Python interpreter selected (use --python or the options file)".to_string(),
        ));
    } else {
        let python = app.options.python.clone();
        let tx_probe = tx.clone();
        tokio::spawn(async move {
            let status = probe_nuitka(&python).await;
            let _ = tx_probe.send(AppEvent::ToolChecked(status));
        });
    }

    // Main loop
    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|f| ui(f, &app)) {
            break Err(e.into());
        }

        tokio::select! {
            polled = tokio::task::spawn_blocking(|| event::poll(Duration::from_millis(50))) => {
                match polled {
                    Ok(Ok(true)) => match event::read() {
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            app.handle_key(key, &run_tx);
                        }
                        Ok(_) => {}
                        Err(e) => break Err(e.into()),
                    },
                    Ok(Ok(false)) => {}
                    Ok(Err(e)) => break Err(e.into()),
                    Err(e) => break Err(e.into()),
                }
            }
            Some(event) = run_rx.recv() => app.handle_run_event(event),
            Some(event) = rx.recv() => app.handle_app_event(event),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    ticker.abort();
    // Make sure no child outlives the interface
    app.controller.shutdown().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
