//! The chat widget: one object owning the log, input, suggestions, window
//! and greeter, built once with the collaborators it talks to.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::client::AnswerService;
use crate::config::Config;
use crate::dispatch::{Completion, Dispatcher};
use crate::input::InputLine;
use crate::session::{Greeter, SessionStore, GREETING};
use crate::state::Role;
use crate::suggest::Suggestions;
use crate::transcript::{Transcript, TypingHandle};
use crate::window::{Pointer, Window};

use ratatui::layout::Rect;

pub struct ChatWidget {
    pub transcript: Transcript,
    pub input: InputLine,
    pub suggestions: Suggestions,
    pub window: Window,
    dispatcher: Dispatcher,
    greeter: Greeter,
}

impl ChatWidget {
    /// Completions for queries sent through this widget arrive on `tx`; feed
    /// them back through [`ChatWidget::complete`].
    pub fn new(
        service: Arc<dyn AnswerService>,
        store: Box<dyn SessionStore>,
        config: &Config,
        tx: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        Self {
            transcript: Transcript::new(),
            input: InputLine::new(),
            suggestions: Suggestions::new(config.suggestions()),
            window: Window::default(),
            dispatcher: Dispatcher::new(service, config.timeout(), tx),
            greeter: Greeter::new(store, config.greeting_delay()),
        }
    }

    pub fn greeter(&self) -> &Greeter {
        &self.greeter
    }

    pub fn open(&mut self) {
        self.window.open();
    }

    pub fn close(&mut self) {
        self.window.close();
    }

    /// Apply an edit to the input line and refresh the suggestions.
    pub fn edit_input(&mut self, edit: impl FnOnce(&mut InputLine)) {
        edit(&mut self.input);
        self.suggestions.update(self.input.text());
    }

    /// Send the highlighted suggestion if there is one, else the input text.
    pub fn submit(&mut self) -> Option<TypingHandle> {
        if let Some(text) = self.suggestions.selected_text().map(str::to_string) {
            return self.send_query(&text);
        }
        let text = self.input.text().to_string();
        self.send_query(&text)
    }

    pub fn activate_suggestion(&mut self, idx: usize) -> Option<TypingHandle> {
        let text = self.suggestions.get(idx)?.to_string();
        self.send_query(&text)
    }

    /// Echo `text`, show a typing placeholder and fire the request.
    ///
    /// Blank input is ignored. Must be called from within a tokio runtime.
    pub fn send_query(&mut self, text: &str) -> Option<TypingHandle> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.transcript.add_message(text, Role::User);
        self.input.clear();
        self.suggestions.clear();

        let handle = self.transcript.add_typing();
        tracing::info!(?handle, "sending query");
        self.dispatcher.dispatch(handle, text.to_string());
        Some(handle)
    }

    /// Replace a query's placeholder with its answer or error.
    pub fn complete(&mut self, completion: Completion) {
        let Completion { handle, outcome } = completion;
        if !self.transcript.remove_typing(handle) {
            tracing::debug!(?handle, "placeholder already gone");
        }
        let message = outcome.into_message();
        tracing::info!(?handle, role = ?message.role, "query resolved");
        self.transcript.add_message(message.text, message.role);
    }

    /// Show the welcome message if this session hasn't seen it yet.
    /// Returns whether it fired.
    pub fn greet(&mut self) -> bool {
        if !self.greeter.is_pending() {
            return false;
        }
        self.window.open();
        self.transcript.add_message(GREETING, Role::Bot);
        self.greeter.mark_greeted();
        tracing::info!("greeted new session");
        true
    }

    pub fn pointer(&mut self, event: Pointer, handle: Option<Rect>, screen: Rect) -> bool {
        self.window.pointer(event, handle, screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::tests::FakeService;
    use crate::dispatch::{FALLBACK_ANSWER, UNREACHABLE_MESSAGE};
    use crate::error::QueryError;
    use crate::session::MemorySession;
    use crate::state::Message;
    use std::time::Duration;

    fn widget(
        service: Arc<dyn AnswerService>,
        config: &Config,
    ) -> (ChatWidget, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let widget = ChatWidget::new(service, Box::new(MemorySession::new()), config, tx);
        (widget, rx)
    }

    async fn roundtrip(service: Arc<dyn AnswerService>) -> Vec<Message> {
        let (mut w, mut rx) = widget(service, &Config::new());

        w.send_query("  Hostel details  ").unwrap();
        assert_eq!(w.transcript.messages().count(), 1);
        assert!(w.transcript.has_typing());

        w.complete(rx.recv().await.unwrap());
        assert!(!w.transcript.has_typing());
        w.transcript.messages().cloned().collect()
    }

    #[tokio::test]
    async fn test_success_renders_answer() {
        let messages = roundtrip(FakeService::answering("X")).await;
        assert_eq!(
            messages,
            vec![Message::user("Hostel details"), Message::bot("X")]
        );
    }

    #[tokio::test]
    async fn test_missing_answer_renders_fallback() {
        let service = Arc::new(FakeService {
            result: Ok(None),
            delay: Duration::ZERO,
        });
        let messages = roundtrip(service).await;
        assert_eq!(messages[1], Message::bot(FALLBACK_ANSWER));
    }

    #[tokio::test]
    async fn test_http_error_renders_status() {
        let messages = roundtrip(FakeService::failing(QueryError::Status(500))).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Error);
        assert!(messages[1].text.contains("500"));
    }

    #[tokio::test]
    async fn test_unreachable_renders_retry() {
        let service = FakeService::failing(QueryError::Unreachable("refused".into()));
        let messages = roundtrip(service).await;
        assert_eq!(messages[1], Message::error(UNREACHABLE_MESSAGE));
    }

    #[tokio::test]
    async fn test_timeout_renders_retry_and_clears_placeholder() {
        let slow = Arc::new(FakeService {
            result: Ok(Some("late".into())),
            delay: Duration::from_secs(30),
        });
        let config = Config {
            timeout_secs: Some(0),
            ..Config::new()
        };
        let (mut w, mut rx) = widget(slow, &config);

        w.send_query("anything").unwrap();
        w.complete(rx.recv().await.unwrap());

        assert!(!w.transcript.has_typing());
        let last = w.transcript.messages().last().cloned();
        assert_eq!(last, Some(Message::error(UNREACHABLE_MESSAGE)));
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let (mut w, _rx) = widget(FakeService::answering("X"), &Config::new());
        assert!(w.send_query("   ").is_none());
        assert!(w.transcript.is_empty());
    }

    #[tokio::test]
    async fn test_send_clears_input_and_suggestions() {
        let (mut w, _rx) = widget(FakeService::answering("X"), &Config::new());
        w.edit_input(|i| "latest".chars().for_each(|c| i.insert(c)));
        assert_eq!(w.suggestions.visible().len(), 2);

        w.submit().unwrap();
        assert!(w.input.is_empty());
        assert!(w.suggestions.is_empty());
        assert_eq!(w.transcript.messages().next(), Some(&Message::user("latest")));
    }

    #[tokio::test]
    async fn test_highlighted_suggestion_wins_over_input() {
        let (mut w, _rx) = widget(FakeService::answering("X"), &Config::new());
        w.edit_input(|i| "latest".chars().for_each(|c| i.insert(c)));
        w.suggestions.select_next();
        w.suggestions.select_next();

        w.submit().unwrap();
        assert_eq!(
            w.transcript.messages().next(),
            Some(&Message::user("Latest recruitments"))
        );
    }

    #[tokio::test]
    async fn test_activate_suggestion_sends_full_text() {
        let (mut w, _rx) = widget(FakeService::answering("X"), &Config::new());
        w.edit_input(|i| "hostel".chars().for_each(|c| i.insert(c)));
        w.activate_suggestion(0).unwrap();
        assert_eq!(
            w.transcript.messages().next(),
            Some(&Message::user("Hostel details"))
        );
        assert!(w.activate_suggestion(0).is_none());
    }

    #[tokio::test]
    async fn test_overlapping_queries_resolve_independently() {
        let (mut w, _rx) = widget(FakeService::answering("unused"), &Config::new());
        let first = w.send_query("one").unwrap();
        let second = w.send_query("two").unwrap();

        // Second finishes first
        w.complete(Completion {
            handle: second,
            outcome: crate::dispatch::Outcome::Answer(Some("answer two".into())),
        });
        assert!(w.transcript.has_typing());

        w.complete(Completion {
            handle: first,
            outcome: crate::dispatch::Outcome::Failed(QueryError::Status(502)),
        });
        assert!(!w.transcript.has_typing());

        let texts: Vec<String> = w.transcript.messages().map(|m| m.text.clone()).collect();
        assert_eq!(texts, vec!["one", "two", "answer two", "⚠ Server error (502)"]);
    }

    #[tokio::test]
    async fn test_greeting_fires_once_per_session() {
        let (mut w, _rx) = widget(FakeService::answering("X"), &Config::new());
        assert!(w.greet());
        assert!(w.window.is_open());
        assert_eq!(w.transcript.messages().next(), Some(&Message::bot(GREETING)));

        for _ in 0..3 {
            w.close();
            w.open();
            assert!(!w.greet());
        }
        let greetings = w
            .transcript
            .messages()
            .filter(|m| m.text == GREETING)
            .count();
        assert_eq!(greetings, 1);
    }

    #[tokio::test]
    async fn test_greeting_skipped_when_store_already_flagged() {
        let mut store = MemorySession::new();
        store.set(crate::session::GREETED_KEY, "1").unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut w = ChatWidget::new(FakeService::answering("X"), Box::new(store), &Config::new(), tx);

        assert!(!w.greeter().is_pending());
        assert!(!w.greet());
        assert!(!w.window.is_open());
        assert!(w.transcript.is_empty());
    }
}
