use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::search_list::ListStatus;

use super::truncate;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.list.search_term() {
        Some(term) => format!("Messages matching \"{}\" ({})", term, app.list.edges().len()),
        None => format!("Messages ({})", app.list.edges().len()),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    // The first page replaces the whole list with a placeholder while pending.
    let placeholder = match app.list.status() {
        ListStatus::Loading => Some(("Loading...".to_string(), Color::Yellow)),
        ListStatus::Errored(msg) => Some((
            format!("Could not load messages: {} (r: retry)", msg),
            Color::Red,
        )),
        _ if app.list.edges().is_empty() && !app.has_load_more_row() => {
            Some(("No messages".to_string(), Color::Gray))
        }
        _ => None,
    };
    if let Some((text, color)) = placeholder {
        let p = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(color));
        frame.render_widget(p, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let id_width = 12;
    let flex = w.saturating_sub(id_width + 1).max(10);

    let mut items: Vec<ListItem> = app
        .list
        .edges()
        .iter()
        .enumerate()
        .map(|(i, message)| {
            let style = if i == app.list_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let text = message.text.lines().next().unwrap_or("");
            let line = Line::from(vec![
                Span::styled(
                    format!("{:<id_width$}", truncate(&message.id, id_width)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(truncate(text, flex), style),
            ]);

            ListItem::new(line)
        })
        .collect();

    if app.has_load_more_row() {
        let selected = app.list_index == app.list.edges().len();
        let (label, color) = match app.list.status() {
            ListStatus::LoadingMore => ("Loading more...".to_string(), Color::Yellow),
            ListStatus::LoadMoreFailed(msg) => {
                (format!("Load more failed: {} (Enter: retry)", msg), Color::Red)
            }
            _ => ("Load more".to_string(), Color::Cyan),
        };
        let mut style = Style::default().fg(color);
        if selected {
            style = style.add_modifier(Modifier::BOLD);
        }
        items.push(ListItem::new(Line::from(Span::styled(label, style))));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.list_index));

    frame.render_stateful_widget(list, area, &mut state);
}
