// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
/// Agent Relay Rust SDK
///
/// Talk to a relay's `/api/chat` endpoint and fold the streamed agent
/// events into per-message state, the same way the browser UI does.
pub mod chat_view;
pub mod client;
pub mod events;
pub mod stream_parser;
pub mod types;

pub use chat_view::{categorize, ChatView, Layers};
pub use client::{
    drive_exchange, ChatResponseStream, ChatSession, ClientError, ExchangeOutcome, ExchangeUpdate,
    RelayClient,
};
pub use events::{decode_payload, AgentEvent};
pub use stream_parser::{EventStreamParser, StreamLine};
pub use types::*;
