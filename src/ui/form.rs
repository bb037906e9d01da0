use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, LoginField};

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

fn message_line(text: &str, color: Color) -> Paragraph<'_> {
    Paragraph::new(Line::from(Span::styled(text, Style::default().fg(color))))
        .wrap(Wrap { trim: true })
}

pub fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.login;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    let username = Paragraph::new(form.username.as_str()).block(field_block(
        "Username",
        form.focus == LoginField::Username,
    ));
    frame.render_widget(username, chunks[0]);

    let masked = "*".repeat(form.password.chars().count());
    let password = Paragraph::new(masked).block(field_block(
        "Password",
        form.focus == LoginField::Password,
    ));
    frame.render_widget(password, chunks[1]);

    let status = if form.submitting {
        message_line("Logging in...", Color::Yellow)
    } else if let Some(err) = &form.error {
        message_line(err, Color::Red)
    } else {
        message_line("Enter your board credentials", Color::Gray)
    };
    frame.render_widget(status, chunks[2]);
}

pub fn render_create(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.create;

    if form.checking_user {
        let p = Paragraph::new("Loading...")
            .block(Block::default().borders(Borders::ALL).title("Create Message"))
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(p, area);
        return;
    }

    let error_lines: Vec<Line> = form
        .errors
        .iter()
        .flat_map(|(field, msgs)| {
            msgs.iter().map(move |m| {
                Line::from(vec![
                    Span::styled(
                        format!("{}: ", field),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(m.as_str(), Style::default().fg(Color::Red)),
                ])
            })
        })
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(error_lines.len() as u16 + 1),
        ])
        .split(area);

    let input = Paragraph::new(form.text.as_str())
        .wrap(Wrap { trim: false })
        .block(field_block("Message", !form.submitting));
    frame.render_widget(input, chunks[0]);

    if form.submitting {
        frame.render_widget(message_line("Submitting...", Color::Yellow), chunks[1]);
    } else {
        frame.render_widget(Paragraph::new(error_lines), chunks[1]);
    }
}
