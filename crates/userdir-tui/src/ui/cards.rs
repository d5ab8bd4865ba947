//! The user card grid.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use userdir_core::utils::{format_phone, truncate_string};
use userdir_core::UserRecord;

use crate::app::App;

use super::styles;

/// Rows per card, borders included
pub const CARD_HEIGHT: u16 = 6;

/// Cards per row for a given grid width
pub fn columns_for_width(width: u16) -> usize {
    match width {
        w if w >= 160 => 4,
        w if w >= 120 => 3,
        w if w >= 80 => 2,
        _ => 1,
    }
}

/// Whole card rows that fit in the given height (at least one)
pub fn visible_rows(height: u16) -> usize {
    ((height / CARD_HEIGHT) as usize).max(1)
}

/// First card row to draw so the selected row stays on screen
pub fn first_visible_row(selected_row: usize, visible_rows: usize) -> usize {
    if selected_row >= visible_rows {
        selected_row + 1 - visible_rows
    } else {
        0
    }
}

pub fn render_grid(frame: &mut Frame, app: &App, area: Rect) {
    let users = &app.directory.users;
    let columns = columns_for_width(area.width);
    let rows = visible_rows(area.height);
    let first_row = first_visible_row(app.selection / columns, rows);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); rows])
        .split(area);

    for (offset, row_area) in row_areas.iter().enumerate() {
        let start = (first_row + offset) * columns;
        if start >= users.len() {
            break;
        }

        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);

        for (col, cell) in cells.iter().enumerate() {
            let index = start + col;
            if let Some(user) = users.get(index) {
                render_card(frame, user, *cell, index == app.selection);
            }
        }
    }
}

fn render_card(frame: &mut Frame, user: &UserRecord, area: Rect, selected: bool) {
    // Borders plus one column of padding either side
    let inner_width = area.width.saturating_sub(4) as usize;

    let mut lines = vec![
        Line::from(Span::styled(
            truncate_string(&user.email, inner_width),
            styles::list_item_style(),
        )),
        Line::from(Span::styled(
            truncate_string(&format_phone(&user.phone), inner_width),
            styles::list_item_style(),
        )),
        Line::from(Span::styled(
            truncate_string(&user.image, inner_width),
            styles::muted_style(),
        )),
    ];
    if selected {
        lines.push(Line::from(vec![
            Span::styled("[d]", styles::help_key_style()),
            Span::styled(" delete", styles::muted_style()),
        ]));
    }

    let title = truncate_string(&user.full_name(), inner_width);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(selected))
        .title(Span::styled(format!(" {} ", title), styles::card_title_style(selected)))
        .style(styles::card_style(selected));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
