//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a two-row split: a scrollable article list on top and a
//!   one-line status bar at the bottom.
//! * Colours and styles are defined inline.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{article_count, App};
use crate::source::Article;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_article_list(app, frame, main_area);
    draw_status_bar(app, frame, status_area);
}

/// Display form of an article's publish time.
///
/// Falls back to the raw date part when the timestamp isn't RFC 3339.
fn date_label(article: &Article) -> String {
    article
        .published()
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| article.published_day().to_string())
}

fn article_line(article: &Article) -> Line<'_> {
    let mut spans = vec![
        Span::styled(
            format!("{:<18}", date_label(article)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        Span::styled(article.title.as_str(), Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", article.category),
            Style::default().fg(Color::Cyan),
        ),
    ];
    if !article.attribution.is_empty() {
        spans.push(Span::styled(
            format!("  by {}", article.attribution),
            Style::default().fg(Color::Magenta),
        ));
    }
    Line::from(spans)
}

/// Render the scrollable article list.
fn draw_article_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .articles
        .iter()
        .map(|article| ListItem::new(article_line(article)))
        .collect();

    let title = if app.loading { " News (loading…) " } else { " News " };

    let list = List::new(list_items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            article_count(app.articles.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  r: refresh  c: cancel  ⏎: link"),
    ]));
    frame.render_widget(status, area);
}
