// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use agent_relay_core::domain::chat::ChatRequest;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use parking_lot::Mutex;
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::chat_view::ChatView;
use crate::events::AgentEvent;
use crate::stream_parser::EventStreamParser;
use crate::types::Message;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The relay answered with a non-success status
    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request cancelled")]
    Cancelled,
}

/// Client for a relay's chat endpoint.
#[derive(Clone)]
pub struct RelayClient {
    base_url: String,
    client: Client,
}

impl RelayClient {
    /// `base_url` is where the SPA is served from, e.g.
    /// `https://abc.execute-api.ap-northeast-1.amazonaws.com/prod`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    /// Submit one message. Resolves once the relay has answered with headers;
    /// the events follow through the returned stream. Cancelling `cancel`
    /// aborts the request or drops the open stream, closing the connection.
    pub async fn chat(
        &self,
        message: &str,
        session_id: &str,
        cancel: CancellationToken,
    ) -> Result<ChatResponseStream, ClientError> {
        let request = self
            .client
            .post(self.chat_url())
            .json(&ChatRequest::new(message, session_id))
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            response = request => response?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http(status.as_u16()));
        }

        Ok(ChatResponseStream {
            body: response.bytes_stream().boxed(),
            parser: EventStreamParser::new(),
            pending: VecDeque::new(),
            cancel,
            finished: false,
        })
    }
}

/// Decoded events of one chat response, in arrival order.
pub struct ChatResponseStream {
    body: BoxStream<'static, Result<Bytes, reqwest::Error>>,
    parser: EventStreamParser,
    pending: VecDeque<AgentEvent>,
    cancel: CancellationToken,
    finished: bool,
}

impl ChatResponseStream {
    /// Next event, `None` at end of body. Malformed lines are skipped.
    /// Once an error is returned the stream is finished.
    pub async fn next_event(&mut self) -> Option<Result<AgentEvent, ClientError>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.finished {
                return None;
            }

            let next = tokio::select! {
                _ = self.cancel.cancelled() => None,
                chunk = self.body.next() => Some(chunk),
            };
            let Some(chunk) = next else {
                self.finished = true;
                return Some(Err(ClientError::Cancelled));
            };

            match chunk {
                Some(Ok(bytes)) => {
                    for line in self.parser.push(&bytes) {
                        self.queue(line.event(), &line.data);
                    }
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.finished = true;
                    if let Some(line) = self.parser.finish() {
                        self.queue(line.event(), &line.data);
                    }
                }
            }
        }
    }

    fn queue(&mut self, event: Option<AgentEvent>, raw: &str) {
        match event {
            Some(event) => self.pending.push_back(event),
            None => debug!(line = raw, "Skipping undecodable stream line"),
        }
    }
}

/// How an exchange ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// A `complete` event was received
    Completed,
    /// The body ended or broke before `complete`
    Truncated,
    /// Superseded by a newer message or cancelled explicitly
    Cancelled,
    /// No stream was opened; the message holds the error text
    Failed(String),
}

struct InFlight {
    cancel: CancellationToken,
    task: JoinHandle<ExchangeOutcome>,
}

/// One conversation: a session id, its messages, and at most one response
/// being streamed at a time.
pub struct ChatSession {
    client: RelayClient,
    session_id: String,
    view: Arc<Mutex<ChatView>>,
    in_flight: Option<InFlight>,
}

impl ChatSession {
    pub fn new(client: RelayClient) -> Self {
        Self::with_session_id(client, uuid::Uuid::new_v4().to_string())
    }

    pub fn with_session_id(client: RelayClient, session_id: impl Into<String>) -> Self {
        Self {
            client,
            session_id: session_id.into(),
            view: Arc::new(Mutex::new(ChatView::new())),
            in_flight: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Snapshot of every message so far
    pub fn messages(&self) -> Vec<Message> {
        self.view.lock().messages().to_vec()
    }

    pub fn message(&self, id: &str) -> Option<Message> {
        self.view.lock().message(id).cloned()
    }

    /// Start a new exchange and return the assistant message id. Whitespace-
    /// only input is ignored. A response still streaming is cancelled and
    /// fully torn down before the new request goes out.
    pub async fn send(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(previous) = self.cancel().await {
            debug!(outcome = ?previous, "Superseded previous exchange");
        }

        let reply_id = self.view.lock().begin_exchange(text);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_exchange(
            self.client.clone(),
            self.session_id.clone(),
            text.to_string(),
            reply_id.clone(),
            self.view.clone(),
            cancel.clone(),
        ));
        self.in_flight = Some(InFlight { cancel, task });
        Some(reply_id)
    }

    /// Wait for the current exchange, if any, to finish on its own.
    pub async fn wait(&mut self) -> Option<ExchangeOutcome> {
        let in_flight = self.in_flight.take()?;
        Some(join(in_flight.task).await)
    }

    /// Cancel the current exchange, if any, and wait for its teardown.
    pub async fn cancel(&mut self) -> Option<ExchangeOutcome> {
        let in_flight = self.in_flight.take()?;
        in_flight.cancel.cancel();
        Some(join(in_flight.task).await)
    }

    pub fn is_streaming(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|f| !f.task.is_finished())
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
        }
    }
}

async fn join(task: JoinHandle<ExchangeOutcome>) -> ExchangeOutcome {
    task.await.unwrap_or_else(|e| {
        warn!(error = %e, "Exchange task failed");
        ExchangeOutcome::Failed(e.to_string())
    })
}

/// One change an exchange makes to its assistant message
#[derive(Debug, Clone, Copy)]
pub enum ExchangeUpdate<'a> {
    Event(&'a AgentEvent),
    /// Failure text to record on the message
    Error(&'a str),
}

/// Send `message` and hand every resulting change to `update`, in order.
///
/// A failure after the `complete` event is only logged: the reply is already
/// final and keeps its content. A failure before it is recorded and the
/// exchange counts as truncated.
pub async fn drive_exchange<F>(
    client: &RelayClient,
    session_id: &str,
    message: &str,
    cancel: CancellationToken,
    mut update: F,
) -> ExchangeOutcome
where
    F: FnMut(ExchangeUpdate<'_>),
{
    let mut stream = match client.chat(message, session_id, cancel).await {
        Ok(stream) => stream,
        Err(ClientError::Cancelled) => return ExchangeOutcome::Cancelled,
        Err(e) => {
            warn!(session_id, error = %e, "Chat request failed");
            let error = e.to_string();
            update(ExchangeUpdate::Error(&error));
            return ExchangeOutcome::Failed(error);
        }
    };

    let mut completed = false;
    while let Some(item) = stream.next_event().await {
        match item {
            Ok(event) => {
                completed |= event.is_complete();
                update(ExchangeUpdate::Event(&event));
            }
            Err(ClientError::Cancelled) => return ExchangeOutcome::Cancelled,
            Err(e) if completed => {
                debug!(session_id, error = %e, "Chat stream broke after complete");
                break;
            }
            Err(e) => {
                warn!(session_id, error = %e, "Chat stream broke");
                update(ExchangeUpdate::Error(&e.to_string()));
                break;
            }
        }
    }

    if completed {
        ExchangeOutcome::Completed
    } else {
        warn!(session_id, "Chat stream ended without a complete event");
        ExchangeOutcome::Truncated
    }
}

async fn run_exchange(
    client: RelayClient,
    session_id: String,
    message: String,
    reply_id: String,
    view: Arc<Mutex<ChatView>>,
    cancel: CancellationToken,
) -> ExchangeOutcome {
    drive_exchange(&client, &session_id, &message, cancel, |update| {
        let mut view = view.lock();
        match update {
            ExchangeUpdate::Event(event) => view.apply(&reply_id, event),
            ExchangeUpdate::Error(error) => view.record_error(&reply_id, error),
        }
    })
    .await
}
