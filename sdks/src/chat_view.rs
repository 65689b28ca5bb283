// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Chat View
//!
//! Folds agent events into the message list of one chat session. Each
//! assistant message owns its nodes in first-seen order; nodes are created
//! by the first event that names them and are never removed.

use tracing::debug;

use crate::events::AgentEvent;
use crate::types::{agent_profile, AgentLayer, AgentNode, Message, NodeStatus};

/// Name of the node whose output becomes the message text on `complete`
pub const FINAL_NODE_ID: &str = "writer";

#[derive(Debug, Default, Clone)]
pub struct ChatView {
    messages: Vec<Message>,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Append the user's message and an empty assistant reply.
    /// Returns the id of the assistant message that events apply to.
    pub fn begin_exchange(&mut self, user_text: &str) -> String {
        let reply = Message::assistant();
        let reply_id = reply.id.clone();
        self.messages.push(Message::user(user_text.trim()));
        self.messages.push(reply);
        reply_id
    }

    /// Apply one event to the assistant message `msg_id`.
    pub fn apply(&mut self, msg_id: &str, event: &AgentEvent) {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == msg_id) else {
            debug!(message_id = msg_id, "Event for unknown message dropped");
            return;
        };

        match event {
            AgentEvent::NodeStart { node_id } => {
                node_entry(message, node_id, NodeStatus::Running).status = NodeStatus::Running;
            }
            AgentEvent::NodeStream { node_id, text } => {
                node_entry(message, node_id, NodeStatus::Running)
                    .content
                    .push_str(text);
            }
            AgentEvent::NodeStop { node_id, content } => {
                let node = node_entry(message, node_id, NodeStatus::Completed);
                node.status = NodeStatus::Completed;
                node.content = content.clone();
            }
            AgentEvent::Complete { .. } => {
                let final_text = message
                    .agent(FINAL_NODE_ID)
                    .map(|writer| writer.content.clone())
                    .filter(|text| !text.is_empty());
                if let Some(text) = final_text {
                    message.content = text;
                }
                message.complete = true;
            }
            AgentEvent::Legacy { content } => {
                message.content = content.clone();
            }
        }
    }

    /// Replace the reply text with a failure notice
    pub fn record_error(&mut self, msg_id: &str, error: &str) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == msg_id) {
            message.content = format!("Error: {}", error);
        }
    }
}

fn node_entry<'a>(message: &'a mut Message, node_id: &str, initial: NodeStatus) -> &'a mut AgentNode {
    let index = match message.agents.iter().position(|a| a.node_id == node_id) {
        Some(index) => index,
        None => {
            message.agents.push(AgentNode::new(node_id, initial));
            message.agents.len() - 1
        }
    };
    &mut message.agents[index]
}

/// Nodes split by presentation layer, each in first-seen order
#[derive(Debug, PartialEq, Eq)]
pub struct Layers<'a> {
    pub parallel: Vec<&'a AgentNode>,
    pub final_layer: Vec<&'a AgentNode>,
}

pub fn categorize(agents: &[AgentNode]) -> Layers<'_> {
    let (final_layer, parallel): (Vec<_>, Vec<_>) = agents
        .iter()
        .partition(|a| agent_profile(&a.node_id).layer == AgentLayer::Final);
    Layers {
        parallel,
        final_layer,
    }
}
