// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Pending,
    Running,
    Completed,
}

/// Progress of one graph node within an assistant message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentNode {
    pub node_id: String,
    pub status: NodeStatus,
    pub content: String,
}

impl AgentNode {
    pub fn new(node_id: impl Into<String>, status: NodeStatus) -> Self {
        Self {
            node_id: node_id.into(),
            status,
            content: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Nodes in first-seen order; always empty for user messages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<AgentNode>,
    /// Set once the `complete` event arrived
    #[serde(default)]
    pub complete: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into())
    }

    pub fn assistant() -> Self {
        Self::new(Role::Assistant, String::new())
    }

    fn new(role: Role, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            agents: Vec::new(),
            complete: false,
        }
    }

    pub fn agent(&self, node_id: &str) -> Option<&AgentNode> {
        self.agents.iter().find(|a| a.node_id == node_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentLayer {
    /// Perspectives that run side by side
    Parallel,
    /// The node that merges them
    Final,
}

/// How a node is presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub name: Cow<'static, str>,
    pub icon: &'static str,
    pub color: &'static str,
    pub layer: AgentLayer,
}

const KNOWN_AGENTS: [(&str, &str, &str, &str, AgentLayer); 4] = [
    ("tech", "技術観点", "⚙️", "#3b82f6", AgentLayer::Parallel),
    ("social", "社会観点", "🌍", "#8b5cf6", AgentLayer::Parallel),
    ("ethics", "倫理観点", "⚖️", "#f59e0b", AgentLayer::Parallel),
    ("writer", "執筆担当", "✍️", "#10b981", AgentLayer::Final),
];

/// Display metadata for a node id. Unknown ids are shown under their own
/// name in the parallel layer.
pub fn agent_profile(node_id: &str) -> AgentProfile {
    KNOWN_AGENTS
        .iter()
        .find(|(id, ..)| *id == node_id)
        .map(|&(_, name, icon, color, layer)| AgentProfile {
            name: Cow::Borrowed(name),
            icon,
            color,
            layer,
        })
        .unwrap_or_else(|| AgentProfile {
            name: Cow::Owned(node_id.to_string()),
            icon: "🤖",
            color: "#6b7280",
            layer: AgentLayer::Parallel,
        })
}
