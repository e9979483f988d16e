use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use mzu_chat::{Entry, Role};

use crate::app::App;

const OPENER_WIDTH: u16 = 14;
const OPENER_HEIGHT: u16 = 3;
const SEND_WIDTH: u16 = 8;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();

    // Even-indexed pieces sit outside ** pairs, odd-indexed inside
    let pieces: Vec<&str> = text.split("**").collect();
    let closed = pieces.len() % 2 == 1;

    for (i, piece) in pieces.iter().enumerate() {
        let unterminated = !closed && i == pieces.len() - 1;
        if i % 2 == 1 && !unterminated {
            if !piece.is_empty() {
                spans.push(Span::styled(
                    piece.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            }
        } else if unterminated {
            // No closing **, treat as literal
            spans.push(Span::raw(format!("**{piece}")));
        } else if !piece.is_empty() {
            spans.push(Span::raw(piece.to_string()));
        }
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    app.screen = area;
    app.areas.clear();

    // Host page: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_page(frame, body_area);
    render_footer(app, frame, footer_area);

    if app.widget.window.is_open() {
        render_panel(app, frame, area);
    } else {
        render_opener(app, frame, body_area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Mizoram University ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.api_url.clone(), Style::default().fg(Color::Black)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Black),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_page(frame: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            "  Welcome to Mizoram University",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "  Have a question about admissions, departments or campus life?",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "  Open the assistant in the corner to ask.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(Paragraph::new(text), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = if app.widget.window.is_open() {
        " Enter: send  ↑/↓: suggestions  PgUp/PgDn: scroll  Esc: close  Drag title to move "
    } else {
        " Enter/o: open assistant  q: quit "
    };
    let footer = Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray)));
    frame.render_widget(footer, area);
}

fn render_opener(app: &mut App, frame: &mut Frame, area: Rect) {
    let width = OPENER_WIDTH.min(area.width);
    let height = OPENER_HEIGHT.min(area.height);
    let opener = Rect::new(
        area.right().saturating_sub(width + 2).max(area.x),
        area.bottom().saturating_sub(height),
        width,
        height,
    );
    app.areas.opener = Some(opener);

    let button = Paragraph::new(Span::styled(
        " 💬 Ask MZU",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(Clear, opener);
    frame.render_widget(button, opener);
}

fn render_panel(app: &mut App, frame: &mut Frame, screen: Rect) {
    let panel = app.widget.window.rect(screen);
    let border_color = if app.widget.window.is_dragging() {
        Color::Yellow
    } else {
        Color::Cyan
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title_top(Line::from(" MZU Assistant ").bold())
        .title_top(Line::from("[x]").right_aligned());

    let inner = block.inner(panel);
    frame.render_widget(Clear, panel);
    frame.render_widget(block, panel);

    // The top border doubles as the drag handle; [x] sits at its right end
    app.areas.title_bar = Some(Rect::new(panel.x, panel.y, panel.width, 1));
    app.areas.close = Some(Rect::new(panel.right().saturating_sub(4), panel.y, 3, 1));

    let suggestion_rows = app.widget.suggestions.visible().len() as u16;
    let [log_area, suggestions_area, input_row] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(suggestion_rows),
        Constraint::Length(3),
    ])
    .areas(inner);

    render_log(app, frame, log_area);
    render_suggestions(app, frame, suggestions_area);
    render_input(app, frame, input_row);
}

fn render_log(app: &mut App, frame: &mut Frame, area: Rect) {
    app.areas.log = Some(area);
    app.log_height = area.height;

    let transcript = &app.widget.transcript;
    let mut lines: Vec<Line> = Vec::new();

    for entry in transcript.entries() {
        match entry {
            Entry::Message(msg) => {
                let label_style = match msg.role {
                    Role::User => Style::default().fg(Color::Cyan),
                    Role::Bot => Style::default().fg(Color::Yellow),
                    Role::Error => Style::default().fg(Color::Red),
                };
                lines.push(Line::from(Span::styled(
                    msg.role.label(),
                    label_style.add_modifier(Modifier::BOLD),
                )));
                for line in msg.text.split('\n') {
                    match msg.role {
                        Role::Bot => lines.push(parse_markdown_line(line)),
                        Role::Error => lines.push(Line::from(Span::styled(
                            line.to_string(),
                            Style::default().fg(Color::Red),
                        ))),
                        Role::User => lines.push(Line::from(line.to_string())),
                    }
                }
                lines.push(Line::default());
            }
            Entry::Typing(_) => {
                lines.push(Line::from(Span::styled(
                    Role::Bot.label(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                // Animated ellipsis: cycles through ".", "..", "..."
                let dots = ".".repeat((app.animation_frame as usize) + 1);
                lines.push(Line::from(Span::styled(
                    format!("typing{dots}"),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
        }
    }

    let text = if lines.is_empty() {
        Text::from(Span::styled(
            "Ask a question about Mizoram University...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(lines)
    };

    // Count lines with the same word wrap the paragraph renders with
    let log = Paragraph::new(text).wrap(Wrap { trim: false });
    let total = log.line_count(area.width);
    let scroll = app.widget.transcript.scroll_offset(total, area.height);
    frame.render_widget(log.scroll((scroll, 0)), area);
}

fn render_suggestions(app: &mut App, frame: &mut Frame, area: Rect) {
    let selected = app.widget.suggestions.selected();

    for (i, text) in app.widget.suggestions.visible().iter().enumerate() {
        let row = Rect::new(area.x, area.y + i as u16, area.width, 1);
        if row.y >= area.bottom() {
            break;
        }
        let style = if selected == Some(i) {
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Magenta)
        };
        frame.render_widget(Paragraph::new(format!(" › {text}")).style(style), row);
        app.areas.suggestions.push(row);
    }
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, send_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SEND_WIDTH),
    ])
    .areas(area);
    app.areas.send = Some(send_area);

    let focused = app.widget.window.input_focused;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Yellow } else { Color::DarkGray }))
        .title(" Ask ");

    // Horizontal scrolling keeps the cursor visible
    // Inner width = total width - 2 (for borders)
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.widget.input.cursor();
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .widget
        .input
        .text()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    let send = Paragraph::new(Span::styled("Send", Style::default().fg(Color::Green).bold()))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Green)));
    frame.render_widget(send, send_area);

    if focused && inner_width > 0 {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::BoxFuture;
    use mzu_chat::{AnswerService, ChatWidget, Config, MemorySession, QueryError};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct Silent;

    impl AnswerService for Silent {
        fn ask(&self, _query: String) -> BoxFuture<'static, Result<Option<String>, QueryError>> {
            Box::pin(async { Ok(None) })
        }
    }

    fn open_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let widget = ChatWidget::new(
            Arc::new(Silent),
            Box::new(MemorySession::new()),
            &Config::new(),
            tx,
        );
        let mut app = App::new(widget, "http://localhost/chat".into());
        app.widget.open();
        app
    }

    fn screen_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_markdown_bold() {
        let line = parse_markdown_line("Rank **95** overall");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "95");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_markdown_unclosed_is_literal() {
        let line = parse_markdown_line("a **b");
        assert_eq!(plain(&line), "a **b");
    }

    #[test]
    fn test_markdown_plain_and_empty() {
        assert_eq!(plain(&parse_markdown_line("no markup")), "no markup");
        assert!(parse_markdown_line("").spans.is_empty());
    }

    #[test]
    fn test_newest_message_visible_after_word_wrap() {
        let mut app = open_app();
        // Three words that each nearly fill a row wrap to three rows under
        // word wrap, more than a character count predicts
        let long = format!("{} {} {}", "a".repeat(28), "b".repeat(28), "c".repeat(28));
        for _ in 0..6 {
            app.widget.transcript.add_message(long.clone(), Role::Bot);
        }
        app.widget.transcript.add_message("LASTLINE", Role::Bot);

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let rows = screen_rows(&terminal);
        assert!(
            rows.iter().any(|row| row.contains("LASTLINE")),
            "newest message scrolled out of view:\n{}",
            rows.join("\n")
        );
    }

    #[test]
    fn test_empty_log_shows_placeholder() {
        let mut app = open_app();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let rows = screen_rows(&terminal);
        assert!(rows.iter().any(|row| row.contains("Ask a question about Mizoram")));
    }
}
