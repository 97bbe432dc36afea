//! TUI rendering logic

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use crate::cli::tui::app::App;
use crate::models::SessionState;

/// Main UI rendering function
pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_command_preview(f, app, chunks[1]);
    render_progress(f, app, chunks[2]);
    render_log(f, app, chunks[3]);
    render_help_bar(f, app, chunks[4]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let state = app.session_state();
    let tool = match &app.tool_status {
        Some(status) if status.is_found() => {
            Span::styled("Nuitka ✓", Style::default().fg(Color::Green))
        }
        Some(_) => Span::styled("Nuitka not detected", Style::default().fg(Color::Yellow)),
        None => Span::styled("Checking Nuitka...", Style::default().fg(Color::Gray)),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "🐍 nuitka-forge ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} {} ", state.symbol(), state),
            Style::default().fg(state.color()),
        ),
        Span::raw("| "),
        tool,
    ]))
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_command_preview(f: &mut Frame, app: &App, area: Rect) {
    let preview = Paragraph::new(app.command_preview.as_str())
        .block(
            Block::default()
                .title("Command Preview")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(preview, area);
}

/// Gauge color: yellow while idle or running, the outcome color afterwards
pub(super) fn progress_color(state: SessionState) -> Color {
    if state.is_terminal() {
        state.color()
    } else {
        Color::Yellow
    }
}

fn render_progress(f: &mut Frame, app: &App, area: Rect) {
    let color = progress_color(app.session_state());
    let gauge = Gauge::default()
        .block(Block::default().title("Progress").borders(Borders::ALL))
        .gauge_style(Style::default().fg(color))
        .percent(app.progress.min(100));

    f.render_widget(gauge, area);
}

fn render_log(f: &mut Frame, app: &App, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let total = app.log_lines.len();
    let end = total.saturating_sub(app.log_scroll_offset);
    let start = end.saturating_sub(visible);

    let lines: Vec<Line> = app.log_lines[start..end]
        .iter()
        .map(|line| colorize_log_line(line))
        .collect();

    let title = if app.log_scroll_offset > 0 {
        format!("Log ({} lines, scrolled {}) 📌", total, app.log_scroll_offset)
    } else {
        format!("Log ({} lines)", total)
    };

    let log = Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(log, area);
}

/// Colorize log lines based on content
fn colorize_log_line(line: &str) -> Line<'_> {
    let line_lower = line.to_lowercase();

    if line_lower.contains("error") || line_lower.contains("failed") || line_lower.contains("❌") {
        Line::from(Span::styled(line, Style::default().fg(Color::Red)))
    } else if line_lower.contains("warning") || line_lower.contains("⚠️") {
        Line::from(Span::styled(line, Style::default().fg(Color::Yellow)))
    } else if line_lower.contains("✅") || line_lower.contains("completed") {
        Line::from(Span::styled(line, Style::default().fg(Color::Green)))
    } else if line_lower.contains("nuitka-options:") || line_lower.contains("nuitka:info") {
        Line::from(Span::styled(line, Style::default().fg(Color::Cyan)))
    } else {
        Line::from(line)
    }
}

/// Render the help bar at the bottom
fn render_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut help_text = if app.is_running() {
        vec![
            Span::styled(
                "⚙️  Packaging... ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("[S/Esc]Stop ", Style::default().fg(Color::LightRed)),
        ]
    } else {
        vec![Span::styled(
            "[R/Enter]Run ",
            Style::default().fg(Color::LightYellow),
        )]
    };

    help_text.extend(vec![
        Span::styled("[C]Clear Log ", Style::default().fg(Color::Magenta)),
        Span::styled("[↑↓/PgUp/PgDn]Scroll ", Style::default().fg(Color::Cyan)),
        Span::styled("[Q]Quit ", Style::default().fg(Color::Red)),
        Span::styled(" | ", Style::default().fg(Color::White)),
        Span::styled(
            app.status_message.as_str(),
            Style::default().fg(Color::White),
        ),
    ]);

    let help_bar = Paragraph::new(Line::from(help_text))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().bg(Color::DarkGray));

    f.render_widget(help_bar, area);
}
