//! Sends one query per call and reports back over a channel.
//!
//! The dispatcher never touches the transcript. Each spawned request owns the
//! [`TypingHandle`] it was given and hands it back inside its [`Completion`],
//! so overlapping requests resolve independently in whatever order they
//! finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::AnswerService;
use crate::error::QueryError;
use crate::state::Message;
use crate::transcript::TypingHandle;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(70);

pub const FALLBACK_ANSWER: &str = "I don't know the answer to that.";
pub const UNREACHABLE_MESSAGE: &str = "⚠ Server is waking up... please try again in a few seconds.";

/// How a single query ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Answer(Option<String>),
    Failed(QueryError),
}

impl Outcome {
    /// The one terminal message this outcome renders as.
    pub fn into_message(self) -> Message {
        match self {
            Outcome::Answer(Some(text)) if !text.is_empty() => Message::bot(text),
            Outcome::Answer(_) => Message::bot(FALLBACK_ANSWER),
            Outcome::Failed(QueryError::Status(code)) => {
                Message::error(format!("⚠ Server error ({code})"))
            }
            Outcome::Failed(
                QueryError::Unreachable(_) | QueryError::Malformed(_) | QueryError::Timeout(_),
            ) => Message::error(UNREACHABLE_MESSAGE),
        }
    }
}

/// A finished query, addressed to the placeholder it should replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub handle: TypingHandle,
    pub outcome: Outcome,
}

pub struct Dispatcher {
    service: Arc<dyn AnswerService>,
    timeout: Duration,
    tx: mpsc::UnboundedSender<Completion>,
}

impl Dispatcher {
    pub fn new(
        service: Arc<dyn AnswerService>,
        timeout: Duration,
        tx: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        Self {
            service,
            timeout,
            tx,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Spawn the request for `query`. Must be called from within a tokio
    /// runtime.
    pub fn dispatch(&self, handle: TypingHandle, query: String) -> JoinHandle<()> {
        let request = self.service.ask(query);
        let timeout = self.timeout;
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, request).await {
                Ok(Ok(answer)) => Outcome::Answer(answer),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "query failed");
                    Outcome::Failed(e)
                }
                Err(_) => {
                    tracing::warn!(?timeout, "query timed out");
                    Outcome::Failed(QueryError::Timeout(timeout))
                }
            };

            if tx.send(Completion { handle, outcome }).is_err() {
                tracing::debug!("widget dropped before query completed");
            }
        })
    }
}
