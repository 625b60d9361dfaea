use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, AppState};
use crate::utils::truncate;

use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Search box
            Constraint::Min(5),    // User list
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_search_box(frame, app, chunks[1]);
    render_user_list(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  Profilecache";
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

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_search_box(frame: &mut Frame, app: &App, area: Rect) {
    let searching = matches!(app.state, AppState::Searching);

    let mut spans = vec![Span::styled(" / ", styles::muted_style())];
    if app.search_query.is_empty() && !searching {
        spans.push(Span::styled("Search by name...", styles::muted_style()));
    } else {
        spans.push(Span::styled(app.search_query.clone(), styles::search_style()));
    }
    if searching {
        spans.push(Span::styled("_", styles::search_style()));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(searching))
        .title(" Search ");

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_user_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(!matches!(app.state, AppState::Searching)))
        .title(" Users ");

    if app.is_initial_loading() {
        let loading = Paragraph::new(Line::from(Span::styled(
            "Loading...",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(loading, area);
        return;
    }

    if let Some(reason) = app.fetch_error() {
        let message = Paragraph::new(Line::from(Span::styled(
            format!("Error: {}", truncate(reason, area.width.saturating_sub(10) as usize)),
            styles::error_style(),
        )))
        .block(block);
        frame.render_widget(message, area);
        return;
    }

    let users = app.visible_users();
    if users.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No users found",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let name_width = area.width.saturating_sub(6) as usize / 2;
    let items: Vec<ListItem> = users
        .iter()
        .map(|u| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {:<width$}", truncate(&u.name, name_width), width = name_width),
                    styles::list_item_style(),
                ),
                Span::styled(u.email.clone(), styles::muted_style()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selected_style());

    let mut list_state = ListState::default();
    list_state.select(Some(app.selection.min(users.len().saturating_sub(1))));

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left = if let Some(ref msg) = app.status_message {
        msg.clone()
    } else if app.query.state().is_loading() && !app.visible_users().is_empty() {
        "Refreshing...".to_string()
    } else if app.query.term().is_empty() {
        format!("{} users", app.visible_users().len())
    } else {
        format!(
            "{} users matching \"{}\"",
            app.visible_users().len(),
            app.query.term()
        )
    };

    let right = match app.snapshot_age {
        Some(ref age) => format!("snapshot: {} ", age),
        None => "snapshot: never ".to_string(),
    };

    let padding = (area.width as usize).saturating_sub(left.len() + right.len() + 2);
    let line = Line::from(vec![
        Span::raw(format!(" {}", left)),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, styles::muted_style()),
    ]);

    frame.render_widget(Paragraph::new(line).style(styles::status_bar_style()), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(44, 12, frame.area());
    frame.render_widget(Clear, area);

    let keys = [
        ("/", "Search by name"),
        ("Esc", "Clear search"),
        ("Enter", "Keep filter, leave search"),
        ("j/k, arrows", "Move selection"),
        ("PgUp/PgDn", "Page selection"),
        ("g/G", "First / last row"),
        ("r", "Refresh"),
        ("q", "Quit"),
    ];

    let lines: Vec<Line> = keys
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!(" {:<12}", key), styles::help_key_style()),
                Span::styled(*desc, styles::help_desc_style()),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(" Help ");

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Center a fixed-size rect inside `area`, clamped to its bounds.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
