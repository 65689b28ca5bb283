// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Gateway Errors
//!
//! Failure taxonomy for the chat relay. Every variant is surfaced to the
//! immediate caller; nothing is retried automatically.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Maps relay failures onto client-visible HTTP statuses

/// Errors that can occur while serving a chat request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// A required request field is missing or empty
    #[error("{0}")]
    Validation(String),

    /// A required setting is missing from the process configuration
    #[error("{0}")]
    Configuration(String),

    #[error("Failed to resolve AWS credentials: {0}")]
    Credentials(String),

    #[error("Failed to sign request: {0}")]
    Signing(String),

    /// A dependent service answered with a non-success status
    #[error("{service} API error: {status} - {body}")]
    Upstream {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    /// A dependent service answered 2xx with an unusable body
    #[error("{0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// HTTP status returned to the browser for this failure.
    ///
    /// Upstream 4xx/5xx are never forwarded verbatim; they collapse into 500
    /// with the upstream status embedded in the message.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Validation(_) => 400,
            _ => 500,
        }
    }

    pub fn upstream(service: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        GatewayError::Upstream {
            service: service.into(),
            status,
            body: body.into(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_embeds_status_and_body() {
        let err = GatewayError::upstream("AgentCore", 403, "Forbidden");
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("Forbidden"));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_only_validation_maps_to_400() {
        assert_eq!(GatewayError::Validation("x".into()).status_code(), 400);
        assert_eq!(GatewayError::Configuration("x".into()).status_code(), 500);
        assert_eq!(GatewayError::Network("x".into()).status_code(), 500);
    }
}
