// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Credential Provider Adapters
//
// - StaticCredentialProvider: fixed keys (tests, local experiments)
// - EnvCredentialProvider: AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY / AWS_SESSION_TOKEN
// - DefaultChainCredentialProvider: the AWS SDK default chain (env, profile,
//   container and instance metadata, SSO). Used when deployed.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};

use crate::domain::credentials::{AwsCredentials, CredentialProvider};
use crate::domain::errors::GatewayError;

pub struct StaticCredentialProvider {
    credentials: AwsCredentials,
}

impl StaticCredentialProvider {
    pub fn new(credentials: AwsCredentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn resolve(&self) -> Result<AwsCredentials, GatewayError> {
        Ok(self.credentials.clone())
    }
}

/// Reads credentials from environment variables on every resolve
pub struct EnvCredentialProvider {
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    fn required(&self, key: &str) -> Result<String, GatewayError> {
        (self.lookup)(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| GatewayError::Credentials(format!("{} is not set", key)))
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn resolve(&self) -> Result<AwsCredentials, GatewayError> {
        let access_key_id = self.required("AWS_ACCESS_KEY_ID")?;
        let secret_access_key = self.required("AWS_SECRET_ACCESS_KEY")?;
        let session_token = (self.lookup)("AWS_SESSION_TOKEN").filter(|v| !v.is_empty());
        Ok(AwsCredentials::new(access_key_id, secret_access_key, session_token))
    }
}

/// AWS SDK default provider chain. The chain caches and refreshes
/// credentials internally, so resolving per request is cheap.
pub struct DefaultChainCredentialProvider {
    provider: SharedCredentialsProvider,
}

impl DefaultChainCredentialProvider {
    pub async fn load(region: &str) -> Result<Self, GatewayError> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        let provider = sdk_config.credentials_provider().ok_or_else(|| {
            GatewayError::Credentials("no credentials provider in the default chain".to_string())
        })?;

        Ok(Self { provider })
    }
}

#[async_trait]
impl CredentialProvider for DefaultChainCredentialProvider {
    async fn resolve(&self) -> Result<AwsCredentials, GatewayError> {
        let creds = self
            .provider
            .provide_credentials()
            .await
            .map_err(|e| GatewayError::Credentials(e.to_string()))?;

        Ok(AwsCredentials::new(
            creds.access_key_id(),
            creds.secret_access_key(),
            creds.session_token().map(str::to_string),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> EnvCredentialProvider {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvCredentialProvider::with_lookup(move |key| map.get(key).cloned())
    }

    #[tokio::test]
    async fn test_env_provider_resolves_keys() {
        let provider = env(&[
            ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_SESSION_TOKEN", "session"),
        ]);
        let creds = provider.resolve().await.unwrap();
        assert_eq!(creds.access_key_id, "AKIDEXAMPLE");
        assert_eq!(creds.secret_access_key, "secret");
        assert_eq!(creds.session_token.as_deref(), Some("session"));
    }

    #[tokio::test]
    async fn test_env_provider_fails_without_secret() {
        let provider = env(&[("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE")]);
        let err = provider.resolve().await.unwrap_err();
        assert!(matches!(err, GatewayError::Credentials(_)));
        assert!(err.to_string().contains("AWS_SECRET_ACCESS_KEY"));
    }

    #[tokio::test]
    async fn test_static_provider() {
        let creds = AwsCredentials::new("a", "b", None);
        let provider = StaticCredentialProvider::new(creds.clone());
        assert_eq!(provider.resolve().await.unwrap(), creds);
    }
}
