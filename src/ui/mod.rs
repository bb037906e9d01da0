mod form;
mod message_detail;
mod message_list;
mod popup;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, Screen};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.screen {
        Screen::List => message_list::render(frame, app, chunks[1]),
        Screen::Detail => message_detail::render(frame, app, chunks[1]),
        Screen::Create => form::render_create(frame, app, chunks[1]),
        Screen::Login => form::render_login(frame, app, chunks[1]),
        Screen::Logout => {
            message_list::render(frame, app, chunks[1]);
            popup::render_confirm(frame, "Logout", "Log out and forget the stored token?");
        }
    }

    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.screen {
        Screen::List => match app.list.search_term() {
            Some(term) => format!("msgboard - Messages matching \"{}\"", term),
            None => "msgboard - Messages".to_string(),
        },
        Screen::Detail => match &app.current_message {
            Some(m) => format!("msgboard - Message {}", m.id),
            None => "msgboard - Message".to_string(),
        },
        Screen::Create => "msgboard - Create Message".to_string(),
        Screen::Login => "msgboard - Login".to_string(),
        Screen::Logout => "msgboard - Logout".to_string(),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} {}", app.board_name(), app.current_route().path()),
            Style::default().fg(Color::Gray),
        ),
    ]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if app.search_mode {
        Line::from(vec![
            Span::styled("/", Style::default().fg(Color::Yellow)),
            Span::raw(app.search_input.as_str()),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ])
    } else if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if app.loading {
        Line::from(vec![Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        )])
    } else {
        let help = match app.screen {
            Screen::List => {
                "j/k/g/G: nav | Enter: open | /: search | m: more | r: refresh | c: create | l: login | o: logout | q: quit"
            }
            Screen::Detail => "j/k/g: scroll | r: reload | c: create | q: back",
            Screen::Create => "type message | Enter: submit | Esc: back",
            Screen::Login => "Tab: next field | Enter: login | Esc: back",
            Screen::Logout => "y: logout | n: cancel",
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

/// Cut `text` to at most `width` characters, marking the cut with "..."
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tokio::sync::mpsc;

    use super::*;
    use crate::graphql::GraphQlBoard;
    use crate::credentials::MemoryCredentials;
    use crate::route::Route;
    use crate::types::{Page, PageInfo};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn truncate_short_and_long() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let board = GraphQlBoard::new(
            "http://localhost:8000/gql".into(),
            "http://localhost:8000/api-token-auth/".into(),
            Duration::from_secs(1),
            Arc::new(MemoryCredentials::default()),
        )
        .unwrap();
        App::new(
            Arc::new(board),
            tx,
            Route::List { search: None },
            2,
            Duration::from_secs(1),
        )
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 10)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        buffer_text(&terminal)
    }

    #[test]
    fn idle_list_screen_renders_header_and_help() {
        let text = draw(&test_app());
        assert!(text.contains("msgboard - Messages"));
        assert!(text.contains("No messages"));
        assert!(text.contains("/: search"));
    }

    #[test]
    fn empty_page_with_more_keeps_load_more_row() {
        let mut app = test_app();
        let request = app.list.initialize(None);
        let page = Page {
            edges: Vec::new(),
            page_info: PageInfo {
                has_next_page: true,
                has_previous_page: false,
                start_cursor: None,
                end_cursor: Some("c1".into()),
            },
        };
        app.list.apply(&request, Ok(page)).unwrap();

        let text = draw(&app);
        assert!(text.contains("Load more"));
        assert!(!text.contains("No messages"));
    }
}
