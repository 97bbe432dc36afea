//! TUI application state

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::builder;
use crate::cli::ForgeContext;
use crate::errors::ForgeError;
use crate::models::{AppEvent, PackageOptions, RunEvent, RunOutcome, SessionId, SessionState};
use crate::services::{ExecutionController, ToolStatus};
use crate::utils::logging::timestamped;

/// Oldest lines are dropped past this many
pub const MAX_LOG_LINES: usize = 5000;

/// Progress never reaches 100 before the process actually finishes
const PROGRESS_CEILING: u16 = 90;
const PROGRESS_PER_SECOND: u16 = 5;

pub struct App {
    pub options: PackageOptions,
    pub options_path: Option<PathBuf>,
    pub command_preview: String,
    pub controller: ExecutionController,
    pub log_lines: Vec<String>,
    /// Lines scrolled up from the bottom; 0 follows new output
    pub log_scroll_offset: usize,
    pub progress: u16,
    pub status_message: String,
    pub tool_status: Option<ToolStatus>,
    pub confirm_quit: bool,
    pub should_quit: bool,
    pub tick_rate: Duration,
    active_session: Option<SessionId>,
    run_started: Option<Instant>,
}

impl App {
    pub fn new(ctx: ForgeContext) -> Self {
        let command_preview = builder::preview(&ctx.options);
        let tick_rate = Duration::from_millis(ctx.config.ui.tick_ms.max(50));
        let mut app = Self {
            options: ctx.options,
            options_path: ctx.options_path,
            command_preview,
            controller: ExecutionController::new(ctx.config.execution.grace_period()),
            log_lines: Vec::new(),
            log_scroll_offset: 0,
            progress: 0,
            status_message: "Ready".to_string(),
            tool_status: None,
            confirm_quit: false,
            should_quit: false,
            tick_rate,
            active_session: None,
            run_started: None,
        };

        let greeting = match &app.options_path {
            Some(path) => format!("Loaded options from {}", path.display()),
            None => "No options file loaded; using command line options".to_string(),
        };
        app.log_message(&greeting);
        app
    }

    pub fn session_state(&self) -> SessionState {
        self.controller.state()
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    /// Appends a timestamped line and mirrors it into the status bar
    pub fn log_message(&mut self, message: &str) {
        self.status_message = message.to_string();
        self.push_line(timestamped(message));
    }

    fn push_line(&mut self, line: String) {
        self.log_lines.push(line);
        if self.log_lines.len() > MAX_LOG_LINES {
            let excess = self.log_lines.len() - MAX_LOG_LINES;
            self.log_lines.drain(..excess);
        }
        if self.log_scroll_offset > 0 {
            // Keep a scrolled-up view anchored on the same lines
            self.log_scroll_offset = (self.log_scroll_offset + 1).min(self.log_lines.len());
        }
    }

    pub fn start_packaging(&mut self, run_tx: &mpsc::UnboundedSender<RunEvent>) {
        if self.is_running() {
            self.log_message("⚠️ Packaging already in progress");
            return;
        }
        if let Err(e) = self.options.ready_to_run() {
            self.log_message(&format!("⚠️ {}", e));
            return;
        }
        if let Some(status) = &self.tool_status {
            if !status.is_found() {
                self.log_message("⚠️ Nuitka was not detected; trying anyway");
            }
        }

        let command = match builder::build(&self.options) {
            Ok(command) => command,
            Err(e) => {
                self.log_message(&format!("❌ {}", e));
                return;
            }
        };
        self.command_preview = command.to_string();

        match self.controller.start(command, run_tx.clone()) {
            Ok(id) => {
                self.active_session = Some(id);
                self.run_started = Some(Instant::now());
                self.progress = 0;
                self.log_scroll_offset = 0;
                self.log_message("▶ Starting packaging process...");
            }
            Err(ForgeError::AlreadyRunning(_)) => {
                self.log_message("⚠️ Packaging already in progress");
            }
            Err(e) => self.log_message(&format!("❌ {}", e)),
        }
    }

    pub fn stop_packaging(&mut self) {
        match self.controller.cancel() {
            Ok(()) => self.log_message("🛑 Stopping packaging process..."),
            Err(_) => self.status_message = "No packaging process running".to_string(),
        }
    }

    pub fn clear_log(&mut self) {
        self.log_lines.clear();
        self.log_scroll_offset = 0;
        if !self.is_running() {
            self.progress = 0;
        }
        self.log_message("Log cleared");
    }

    /// First press while running asks for confirmation; the second stops and quits
    pub fn request_quit(&mut self) {
        if self.is_running() && !self.confirm_quit {
            self.confirm_quit = true;
            self.log_message("Packaging is still running. Press q again to stop it and exit");
            return;
        }
        if self.is_running() {
            self.stop_packaging();
        }
        self.should_quit = true;
    }

    pub fn handle_run_event(&mut self, event: RunEvent) {
        if self.active_session != Some(event.session()) {
            log::debug!("Ignoring event from stale session {}", event.session());
            return;
        }

        match event {
            RunEvent::Line(_, line) => self.push_line(timestamped(&line)),
            RunEvent::Finished(_, outcome) => self.finish(outcome),
        }
    }

    fn finish(&mut self, outcome: RunOutcome) {
        self.run_started = None;
        self.confirm_quit = false;
        self.progress = if outcome.is_success() { 100 } else { 0 };
        self.log_message(&outcome.to_string());
        if outcome.is_success() {
            let output_dir = self.options.output_dir.clone();
            self.log_message(&format!("Output directory: {}", output_dir));
        }
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => self.advance_progress(),
            AppEvent::ToolChecked(status) => {
                let description = status.describe();
                self.tool_status = Some(status);
                self.log_message(&description);
            }
            AppEvent::Warning(message) => self.log_message(&format!("⚠️ {}", message)),
            AppEvent::Info(message) => self.log_message(&message),
        }
    }

    fn advance_progress(&mut self) {
        if let Some(started) = self.run_started {
            self.progress = progress_after(started.elapsed());
        }
    }

    pub fn scroll_log_up(&mut self, lines: usize) {
        self.log_scroll_offset =
            (self.log_scroll_offset + lines).min(self.log_lines.len().saturating_sub(1));
    }

    pub fn scroll_log_down(&mut self, lines: usize) {
        self.log_scroll_offset = self.log_scroll_offset.saturating_sub(lines);
    }

    pub fn handle_key(&mut self, key: KeyEvent, run_tx: &mpsc::UnboundedSender<RunEvent>) {
        if key.code != KeyCode::Char('q') {
            self.confirm_quit = false;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.is_running() {
                    self.stop_packaging();
                }
                self.should_quit = true;
            }
            KeyCode::Char('q') => self.request_quit(),
            KeyCode::Char('r') | KeyCode::Enter => self.start_packaging(run_tx),
            KeyCode::Char('s') | KeyCode::Esc => self.stop_packaging(),
            KeyCode::Char('c') => self.clear_log(),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_log_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_log_down(1),
            KeyCode::PageUp => self.scroll_log_up(10),
            KeyCode::PageDown => self.scroll_log_down(10),
            KeyCode::End => self.log_scroll_offset = 0,
            _ => {}
        }
    }
}

/// Time-based progress estimate while the process is running
pub fn progress_after(elapsed: Duration) -> u16 {
    let steps = elapsed.as_secs().min(u64::from(PROGRESS_CEILING));
    (steps as u16 * PROGRESS_PER_SECOND).min(PROGRESS_CEILING)
}
