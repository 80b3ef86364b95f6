use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::app::{App, InputMode, LoginField};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Help / status
        ])
        .split(f.area());

    let header = Paragraph::new(app.header_title())
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    if app.is_logged_in() {
        render_tasks(f, app, chunks[1]);
    } else {
        render_login(f, app, chunks[1]);
    }

    let help_text = if !app.is_logged_in() {
        "Tab: Switch Field | Enter: Log In | Esc: Quit"
    } else {
        match app.input_mode {
            InputMode::Normal => "q: Quit | a: Add | Space: Check | d: Del | c: Hide/Show Completed | o: Log Out",
            InputMode::Adding => "Enter: Save | Esc: Cancel",
        }
    };
    let footer = match &app.status {
        Some(status) => Paragraph::new(status.as_str()).style(Style::default().fg(Color::Red)),
        None => Paragraph::new(help_text).style(Style::default().fg(Color::Gray)),
    };
    f.render_widget(footer.block(Block::default().borders(Borders::ALL)), chunks[2]);

    if app.input_mode == InputMode::Adding && app.is_logged_in() {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title("Type to add new tasks"));
        f.render_widget(input, area);
    }
}

fn render_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let user = app.session.user.as_ref().map(|u| u.display_name()).unwrap_or_default();
    let bar = Line::from(vec![
        Span::styled(format!("{user} 🚪"), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(format!("[{}]", app.filter_label()), Style::default().fg(Color::Cyan)),
    ]);
    f.render_widget(Paragraph::new(bar), chunks[0]);

    if app.view.is_loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title("Tasks"));
        f.render_widget(loading, chunks[1]);
        return;
    }

    let rows: Vec<Row> = app
        .rows
        .iter()
        .map(|r| {
            let style = if r.is_checked {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            Row::new(vec![Cell::from(r.checkbox), Cell::from(r.text.clone())]).style(style)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(4), Constraint::Min(20)])
        .block(Block::default().borders(Borders::ALL).title("Tasks"))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[1], &mut app.state);
}

fn render_login(f: &mut Frame, app: &App, area: Rect) {
    let label = |field: LoginField| {
        if app.login.field == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Username: ", label(LoginField::Username)),
            Span::raw(app.login.username.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Password: ", label(LoginField::Password)),
            Span::raw("*".repeat(app.login.password.chars().count())),
        ]),
    ];
    if let Some(err) = &app.login.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(err.as_str(), Style::default().fg(Color::Red))));
    }

    let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Log In"));
    f.render_widget(form, centered_rect(60, 7, area));
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(margin), Constraint::Length(height), Constraint::Length(margin)])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
