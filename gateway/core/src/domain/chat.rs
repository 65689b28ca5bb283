// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Chat
//!
//! Inbound chat submission and the payload forwarded to the agent runtime.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements chat request validation

use serde::{Deserialize, Serialize};

use super::errors::GatewayError;

pub const MISSING_FIELDS_MESSAGE: &str = "message and sessionId are required";

/// One user submission. Lives for a single HTTP request.
///
/// Both fields default to empty so that a body missing either key reaches
/// [`ChatRequest::validate`] instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,

    /// Opaque conversation identifier, forwarded as the runtime session id
    #[serde(default)]
    pub session_id: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.into(),
        }
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.message.is_empty() || self.session_id.is_empty() {
            return Err(GatewayError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        }
        Ok(())
    }
}

/// Body of the runtime invocation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationPayload {
    pub prompt: String,
}
