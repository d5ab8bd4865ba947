use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState};

use super::{cards, styles};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub const EMPTY_MESSAGE: &str = "No users found. Press r to load users.";

const CARD_MIN_HEIGHT: u16 = cards::CARD_HEIGHT;

pub fn render(frame: &mut Frame, app: &App) {
    let banner_height = if app.directory.error.is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Title bar
            Constraint::Length(1),             // Count + refresh hint
            Constraint::Length(banner_height), // Error banner
            Constraint::Min(CARD_MIN_HEIGHT),  // Main content
            Constraint::Length(1),             // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_summary(frame, app, chunks[1]);
    if let Some(ref error) = app.directory.error {
        render_error_banner(frame, error, chunks[2]);
    }
    render_main_content(frame, app, chunks[3]);
    render_status_bar(frame, app, chunks[4]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  User Directory";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let count = format!("  Total Users: {}", app.directory.users.len());
    let refresh = "[r] Refresh  ";
    // Disabled while a refresh is in flight
    let refresh_style = if app.directory.loading {
        styles::muted_style()
    } else {
        styles::help_key_style()
    };

    let padding = (area.width as usize).saturating_sub(count.len() + refresh.len());
    let line = Line::from(vec![
        Span::styled(count, styles::success_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(refresh, refresh_style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_error_banner(frame: &mut Frame, error: &str, area: Rect) {
    let line = Line::from(vec![
        Span::styled(format!(" {} ", error), styles::error_banner_style()),
        Span::styled("  [Esc] dismiss", styles::muted_style()),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::error_style());
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    if app.directory.loading {
        render_centered(
            frame,
            area,
            Line::from(vec![
                Span::styled(
                    SPINNER_FRAMES[app.tick % SPINNER_FRAMES.len()],
                    styles::highlight_style(),
                ),
                Span::styled(" Loading users...", styles::muted_style()),
            ]),
        );
    } else if app.directory.is_empty() {
        render_centered(
            frame,
            area,
            Line::from(Span::styled(EMPTY_MESSAGE, styles::muted_style())),
        );
    } else {
        cards::render_grid(frame, app, area);
    }
}

fn render_centered(frame: &mut Frame, area: Rect, line: Line) {
    let y = area.y + area.height / 2;
    let row = Rect::new(area.x, y.min(area.bottom().saturating_sub(1)), area.width, 1);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), row);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = format!(" {} ", app.status_text());
    let right_text = " [r]efresh | [d]elete | [q]uit ";

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(key, styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 19, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  User Directory", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("  ←/→ h/l   ", "Previous/next card"),
        help_line("  ↑/↓ k/j   ", "Card above/below"),
        help_line("  PgUp/PgDn ", "Jump several rows"),
        help_line("  Home/End  ", "First/last card"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("  r / F5    ", "Replace users with a fresh batch"),
        help_line("  d / Del   ", "Delete selected user"),
        help_line("  Esc       ", "Dismiss error"),
        help_line("  q         ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 6, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
