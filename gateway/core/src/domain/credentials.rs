// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Credential Provider Domain Interface (Anti-Corruption Layer)
//
// Isolates request signing from the way credentials are obtained
// (static keys, environment, the AWS default provider chain).
//
// Implementations in infrastructure/aws/credentials.rs.

use async_trait::async_trait;
use std::fmt;

use super::errors::GatewayError;

/// Domain interface for ambient cloud credentials
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Resolve the credentials used for the next signing operation
    async fn resolve(&self) -> Result<AwsCredentials, GatewayError>;
}

/// Access key pair plus optional session token
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl AwsCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }
}

// Secrets never reach logs.
impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}
