use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientError, QueryError};

pub const DEFAULT_API_URL: &str = "https://mzu-rag-api-bmm8.onrender.com/chat";
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Something that can answer a single question.
///
/// `Ok(None)` means the service responded successfully but had no answer
/// text to give.
pub trait AnswerService: Send + Sync {
    fn ask(&self, query: String) -> BoxFuture<'static, Result<Option<String>, QueryError>>;
}

#[derive(Serialize)]
struct AskRequest<'a> {
    query: &'a str,
}

/// HTTP client for the question-answering endpoint.
#[derive(Clone)]
pub struct AnswerClient {
    client: Client,
    url: String,
}

impl AnswerClient {
    pub fn new(url: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn query(&self, query: &str) -> Result<Option<String>, QueryError> {
        tracing::debug!(url = %self.url, chars = query.chars().count(), "posting query");

        let response = self
            .client
            .post(&self.url)
            .json(&AskRequest { query })
            .send()
            .await
            .map_err(|e| QueryError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "answer service returned an error status");
            return Err(QueryError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| QueryError::Unreachable(e.to_string()))?;

        parse_answer(&body)
    }
}

impl AnswerService for AnswerClient {
    fn ask(&self, query: String) -> BoxFuture<'static, Result<Option<String>, QueryError>> {
        let client = self.clone();
        Box::pin(async move { client.query(&query).await })
    }
}

/// Pull the `answer` field out of a success body.
///
/// A body that isn't JSON at all is an error. A JSON body without a usable
/// answer (missing, null, `false`, `0`, or not an object) yields `None` so
/// the caller falls back to its stock phrase. Other non-string answers are
/// rendered as their JSON text.
pub fn parse_answer(body: &str) -> Result<Option<String>, QueryError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "answer body was not JSON");
        QueryError::Malformed(e.to_string())
    })?;

    Ok(match value.get("answer") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(other) => Some(other.to_string()),
    })
}
