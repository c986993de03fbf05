//! Ratatui rendering: header, directory pane, message pane, footer.

use musdeck_core::Entry;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, AppState};

/// Draw the whole UI for one frame.
pub fn draw(f: &mut Frame, app: &App) {
    if let AppState::FatalError(message) = &app.state {
        draw_fatal(f, message);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Directory listing
            Constraint::Length(8), // Messages
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);
    draw_listing(f, chunks[1], app);
    draw_messages(f, chunks[2], app);
    draw_footer(f, chunks[3]);
}

/// Now-playing line with status and progress.
fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let path = app.session.path();
    let track = path.rsplit('/').next().unwrap_or(&path);

    let (status, title) = if !app.is_playing() || track.is_empty() {
        ("  ", "nothing playing".to_string())
    } else if app.paused {
        ("⏸ ", track.to_string())
    } else {
        ("▶ ", track.to_string())
    };
    let progress = app
        .session
        .format_progress()
        .unwrap_or_else(|| "--:--:--".to_string());

    let line = Line::from(vec![
        Span::raw(" "),
        Span::raw(status),
        Span::styled(title, Style::default().fg(Color::Cyan).bold()),
        Span::raw("  "),
        Span::styled(progress, Style::default().fg(Color::Yellow)),
    ]);

    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" musdeck "),
    );
    f.render_widget(header, area);
}

/// Windowed directory listing with the cursor marked.
fn draw_listing(f: &mut Frame, area: Rect, app: &App) {
    let cursor = app.browser.cursor();
    let lines: Vec<Line> = app
        .browser
        .visible_rows()
        .into_iter()
        .map(|(index, entry)| {
            let marker = if index == cursor { "> " } else { "  " };
            let (text, style) = match entry {
                Entry::Parent => ("../".to_string(), Style::default().fg(Color::Cyan)),
                Entry::Dir(name) => (format!("{name}/"), Style::default().fg(Color::Cyan)),
                Entry::File(name) => (name.to_string(), Style::default()),
            };
            let style = if index == cursor { style.bold() } else { style };
            Line::from(vec![Span::raw(marker), Span::styled(text, style)])
        })
        .collect();

    let title = format!(" {} ", app.browser.cwd().display());
    let listing =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(listing, area);
}

/// Most recent feedback lines, watchdog output included.
fn draw_messages(f: &mut Frame, area: Rect, app: &App) {
    let rows = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .messages
        .tail(rows)
        .into_iter()
        .map(Line::from)
        .collect();

    let messages =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" messages "));
    f.render_widget(messages, area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled(" Enter", Style::default().fg(Color::Green)),
        Span::raw(" play  "),
        Span::styled("[x3/]x3", Style::default().fg(Color::Green)),
        Span::raw(" prev/next  "),
        Span::styled("[+]", Style::default().fg(Color::Green)),
        Span::raw(" pause  "),
        Span::styled("[+Left", Style::default().fg(Color::Green)),
        Span::raw(" help  "),
        Span::styled("q", Style::default().fg(Color::Green)),
        Span::raw(" quit"),
    ]);
    let footer = Paragraph::new(hints).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

/// Terminal failure screen; only the exit key works from here.
fn draw_fatal(f: &mut Frame, message: &str) {
    let area = f.area();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(""),
        Line::from("Press q to quit."),
    ];
    let screen = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" musdeck "));
    f.render_widget(screen, area);
}
