use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::types::Message;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(message) = &app.current_message else {
        let block = Block::default().borders(Borders::ALL).title("Message");
        let text = if app.loading {
            "Loading..."
        } else {
            "No message loaded"
        };
        let empty = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    render_header(frame, message, chunks[0]);
    render_body(frame, app, message, chunks[1]);
}

fn render_header(frame: &mut Frame, message: &Message, area: Rect) {
    let lines = vec![
        Line::from(vec![Span::styled(
            format!("Message {}", message.id),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![
            Span::styled("Created: ", Style::default().fg(Color::Gray)),
            Span::raw(message.creation_date.format("%Y-%m-%d %H:%M").to_string()),
        ]),
    ];

    let header =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Details"));

    frame.render_widget(header, area);
}

fn render_body(frame: &mut Frame, app: &App, message: &Message, area: Rect) {
    let lines: Vec<Line> = message
        .text
        .lines()
        .map(|l| Line::from(l.replace('\t', "    ")))
        .collect();

    // Account for borders
    let inner_height = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(inner_height);
    let scroll_offset = app.scroll_offset.min(max_scroll);

    let visible_lines: Vec<Line> = lines
        .into_iter()
        .skip(scroll_offset)
        .take(inner_height)
        .collect();

    frame.render_widget(Clear, area);

    let body = Paragraph::new(Text::from(visible_lines))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Message"));

    frame.render_widget(body, area);
}
