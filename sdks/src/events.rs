// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Agent Events
//
// Payloads carried on `data: ` lines of the chat stream. The graph agent
// emits one of four tagged events; older agents emit a bare `{content}`.

use serde::Deserialize;
use serde_json::Value;

/// One decoded stream payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// A graph node started (or restarted) work
    NodeStart { node_id: String },
    /// Incremental text from a running node
    NodeStream { node_id: String, text: String },
    /// A node finished; `content` is its full output
    NodeStop { node_id: String, content: String },
    /// The whole graph finished
    Complete { status: Option<String> },
    /// Untagged payload with the final answer text
    Legacy { content: String },
}

impl AgentEvent {
    pub fn is_complete(&self) -> bool {
        matches!(self, AgentEvent::Complete { .. })
    }

    pub fn node_id(&self) -> Option<&str> {
        match self {
            AgentEvent::NodeStart { node_id }
            | AgentEvent::NodeStream { node_id, .. }
            | AgentEvent::NodeStop { node_id, .. } => Some(node_id),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct RawEvent {
    event: Option<String>,
    node_id: Option<String>,
    text: Option<String>,
    content: Option<String>,
    status: Option<Value>,
}

impl RawEvent {
    fn into_event(self) -> Option<AgentEvent> {
        match self.event.as_deref() {
            Some("node_start") => Some(AgentEvent::NodeStart {
                node_id: self.node_id?,
            }),
            Some("node_stream") => Some(AgentEvent::NodeStream {
                node_id: self.node_id?,
                text: self.text.unwrap_or_default(),
            }),
            Some("node_stop") => Some(AgentEvent::NodeStop {
                node_id: self.node_id?,
                content: self.content.unwrap_or_default(),
            }),
            Some("complete") => Some(AgentEvent::Complete {
                status: self.status.as_ref().and_then(Value::as_str).map(str::to_string),
            }),
            // Anything else only counts if it carries text to show
            _ => self
                .content
                .filter(|c| !c.is_empty())
                .map(|content| AgentEvent::Legacy { content }),
        }
    }
}

/// Decode the text after `data: `.
///
/// The agent runtime sometimes JSON-encodes an already encoded event, so a
/// payload that decodes to a string is decoded once more. Never more than
/// twice. Anything that is not an object with a known shape yields `None`.
pub fn decode_payload(data: &str) -> Option<AgentEvent> {
    let value = match serde_json::from_str::<Value>(data).ok()? {
        Value::String(inner) => serde_json::from_str::<Value>(&inner).ok()?,
        other => other,
    };

    if !value.is_object() {
        return None;
    }
    serde_json::from_value::<RawEvent>(value)
        .ok()
        .and_then(RawEvent::into_event)
}
