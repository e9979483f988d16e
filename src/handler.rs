use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use mzu_chat::window::contains;
use mzu_chat::Pointer;

use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Answer(completion) => app.widget.complete(completion),
        AppEvent::Greet => {
            app.widget.greet();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.widget.window.is_open() {
        handle_panel_key(app, key);
    } else {
        handle_closed_key(app, key);
    }
}

fn handle_closed_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Enter | KeyCode::Char('o') => app.widget.open(),
        _ => {}
    }
}

fn handle_panel_key(app: &mut App, key: KeyEvent) {
    let widget = &mut app.widget;
    match key.code {
        KeyCode::Esc => widget.close(),
        KeyCode::Enter => {
            widget.submit();
        }

        // Suggestion highlight
        KeyCode::Down => widget.suggestions.select_next(),
        KeyCode::Up => widget.suggestions.select_prev(),

        // Log scrolling
        KeyCode::PageUp => app.scroll_half_page_up(),
        KeyCode::PageDown => app.scroll_half_page_down(),

        // Line editing
        KeyCode::Backspace => widget.edit_input(|i| i.backspace()),
        KeyCode::Delete => widget.edit_input(|i| i.delete()),
        KeyCode::Left => widget.input.left(),
        KeyCode::Right => widget.input.right(),
        KeyCode::Home => widget.input.home(),
        KeyCode::End => widget.input.end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            widget.edit_input(|i| i.insert(c));
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = i32::from(mouse.column);
    let y = i32::from(mouse.row);
    let hit = |area: Option<ratatui::layout::Rect>| area.is_some_and(|r| contains(r, x, y));

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if !app.widget.window.is_open() {
                if hit(app.areas.opener) {
                    app.widget.open();
                }
                return;
            }

            // Controls sit on top of the drag handle, so test them first
            if hit(app.areas.close) {
                app.widget.close();
            } else if hit(app.areas.send) {
                app.widget.submit();
            } else if let Some(idx) = app.areas.suggestions.iter().position(|r| contains(*r, x, y)) {
                app.widget.activate_suggestion(idx);
            } else {
                app.widget
                    .pointer(Pointer::Down { x, y }, app.areas.title_bar, app.screen);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.widget
                .pointer(Pointer::Move { x, y }, app.areas.title_bar, app.screen);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.widget.pointer(Pointer::Up, app.areas.title_bar, app.screen);
        }
        MouseEventKind::ScrollUp if hit(app.areas.log) => {
            app.widget.transcript.scroll_up(3);
        }
        MouseEventKind::ScrollDown if hit(app.areas.log) => {
            app.widget.transcript.scroll_down(3);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use futures_util::future::BoxFuture;
    use mzu_chat::{AnswerService, ChatWidget, Config, MemorySession, Position, QueryError, Role};
    use ratatui::layout::Rect;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct Echo;

    impl AnswerService for Echo {
        fn ask(&self, query: String) -> BoxFuture<'static, Result<Option<String>, QueryError>> {
            Box::pin(async move { Ok(Some(query)) })
        }
    }

    fn app() -> (App, mpsc::UnboundedReceiver<mzu_chat::Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let widget = ChatWidget::new(
            Arc::new(Echo),
            Box::new(MemorySession::new()),
            &Config::new(),
            tx,
        );
        let mut app = App::new(widget, "http://localhost/chat".into());
        app.screen = Rect::new(0, 0, 120, 40);
        (app, rx)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c))).unwrap();
        }
    }

    #[tokio::test]
    async fn test_enter_opens_then_sends() {
        let (mut app, mut rx) = app();
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(app.widget.window.is_open());

        type_text(&mut app, "library");
        assert_eq!(app.widget.suggestions.visible(), ["Library information"]);

        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        let completion = rx.recv().await.unwrap();
        handle_event(&mut app, AppEvent::Answer(completion)).unwrap();

        let roles: Vec<Role> = app.widget.transcript.messages().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Bot]);
    }

    #[tokio::test]
    async fn test_q_only_quits_when_closed() {
        let (mut app, _rx) = app();
        app.widget.open();
        type_text(&mut app, "q");
        assert!(!app.should_quit);
        assert_eq!(app.widget.input.text(), "q");

        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        handle_event(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_click_opener_and_close() {
        let (mut app, _rx) = app();
        app.areas.opener = Some(Rect::new(100, 37, 12, 3));
        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 105, 38)).unwrap();
        assert!(app.widget.window.is_open());

        app.areas.close = Some(Rect::new(110, 10, 3, 1));
        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 111, 10)).unwrap();
        assert!(!app.widget.window.is_open());
    }

    #[tokio::test]
    async fn test_mouse_drag_moves_panel() {
        let (mut app, _rx) = app();
        app.widget.open();
        let panel = app.widget.window.rect(app.screen);
        app.areas.title_bar = Some(Rect::new(panel.x, panel.y, panel.width, 1));

        let (px, py) = (panel.x + 4, panel.y);
        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), px, py)).unwrap();
        handle_event(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), px - 7, py - 2)).unwrap();
        handle_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), px - 7, py - 2)).unwrap();

        assert_eq!(
            app.widget.window.position(),
            Position::Placed {
                x: i32::from(panel.x) - 7,
                y: i32::from(panel.y) - 2
            }
        );
        assert!(!app.widget.window.is_dragging());
    }

    #[tokio::test]
    async fn test_click_suggestion_sends_it() {
        let (mut app, _rx) = app();
        app.widget.open();
        type_text(&mut app, "hostel");
        app.areas.suggestions = vec![Rect::new(70, 30, 40, 1)];

        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 75, 30)).unwrap();
        let first = app.widget.transcript.messages().next().map(|m| m.text.clone());
        assert_eq!(first.as_deref(), Some("Hostel details"));
    }

    #[tokio::test]
    async fn test_greet_event_opens_panel() {
        let (mut app, _rx) = app();
        handle_event(&mut app, AppEvent::Greet).unwrap();
        assert!(app.widget.window.is_open());
        assert_eq!(app.widget.transcript.messages().count(), 1);
    }

    #[test]
    fn test_resize_leaves_widget_state_alone() {
        let (mut app, _rx) = app();
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        type_text(&mut app, "hostel");

        handle_event(&mut app, AppEvent::Resize).unwrap();
        assert!(app.widget.window.is_open());
        assert_eq!(app.widget.input.text(), "hostel");
        assert!(!app.should_quit);
    }
}
