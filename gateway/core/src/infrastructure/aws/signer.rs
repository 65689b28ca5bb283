// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! SigV4 Request Signer
//!
//! Turns a draft request into one carrying `authorization`, `x-amz-date`,
//! `x-amz-content-sha256` and (for temporary credentials)
//! `x-amz-security-token` headers for a given region/service pair. The
//! canonicalisation and HMAC chain are delegated to `aws-sigv4`; this module
//! only assembles inputs and merges the resulting headers.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Signed Request Builder

use aws_sigv4::http_request::{
    sign, SignableBody, SignableRequest, SigningParams, SigningSettings,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::SystemTime;

use crate::domain::credentials::CredentialProvider;
use crate::domain::errors::GatewayError;

pub const CONTENT_SHA256_HEADER: &str = "x-amz-content-sha256";

/// Unsigned request as assembled by a client adapter.
/// Header names are stored lowercase so the map is already in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRequest {
    pub method: String,
    /// "https" or "http"
    pub protocol: String,
    /// Host, optionally with ":port"
    pub hostname: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl DraftRequest {
    pub fn new(method: &str, protocol: &str, hostname: &str, path: &str) -> Self {
        Self {
            method: method.to_uppercase(),
            protocol: protocol.trim_end_matches(':').to_string(),
            hostname: hostname.to_string(),
            path: path.to_string(),
            headers: BTreeMap::new(),
            body: Bytes::new(),
        }
    }

    /// Build a draft from a base URL such as `https://ssm.us-east-1.amazonaws.com`
    pub fn for_endpoint(method: &str, base_url: &str, path: &str) -> Result<Self, GatewayError> {
        let (protocol, rest) = base_url.split_once("://").ok_or_else(|| {
            GatewayError::Configuration(format!("endpoint '{}' has no scheme", base_url))
        })?;
        let hostname = rest.trim_end_matches('/');
        if hostname.is_empty() || hostname.contains('/') {
            return Err(GatewayError::Configuration(format!(
                "endpoint '{}' must be scheme://host[:port]",
                base_url
            )));
        }
        Ok(Self::new(method, protocol, hostname, path))
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn url(&self) -> String {
        format!("{}://{}{}", self.protocol, self.hostname, self.path)
    }
}

/// Draft plus the computed signing headers
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl SignedRequest {
    /// Attach method, headers and body to a reqwest builder.
    pub fn into_reqwest(self, client: &reqwest::Client) -> Result<reqwest::RequestBuilder, GatewayError> {
        let method = reqwest::Method::from_bytes(self.method.as_bytes())
            .map_err(|e| GatewayError::Signing(format!("invalid method '{}': {}", self.method, e)))?;

        let mut builder = client.request(method, &self.url);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        Ok(builder.body(self.body))
    }
}

/// Signs requests for one region/service pair
#[derive(Clone)]
pub struct SigV4Signer {
    credentials: Arc<dyn CredentialProvider>,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub async fn sign(&self, draft: &DraftRequest) -> Result<SignedRequest, GatewayError> {
        self.sign_at(draft, SystemTime::now()).await
    }

    /// Sign as of `time`. The upstream accepts a skew of about five minutes.
    pub async fn sign_at(
        &self,
        draft: &DraftRequest,
        time: SystemTime,
    ) -> Result<SignedRequest, GatewayError> {
        let creds = self.credentials.resolve().await?;

        let mut headers = draft.headers.clone();
        headers
            .entry("host".to_string())
            .or_insert_with(|| draft.hostname.clone());
        headers.insert(
            CONTENT_SHA256_HEADER.to_string(),
            hex::encode(Sha256::digest(&draft.body)),
        );

        let identity: Identity = aws_credential_types::Credentials::new(
            creds.access_key_id,
            creds.secret_access_key,
            creds.session_token,
            None,
            "agent-relay",
        )
        .into();

        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(&self.service)
            .time(time)
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| GatewayError::Signing(e.to_string()))?
            .into();

        let url = draft.url();
        let signable = SignableRequest::new(
            &draft.method,
            url.as_str(),
            headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            SignableBody::Bytes(&draft.body[..]),
        )
        .map_err(|e| GatewayError::Signing(e.to_string()))?;

        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| GatewayError::Signing(e.to_string()))?
            .into_parts();

        let mut signed_headers = headers.clone();
        for (name, value) in instructions.headers() {
            signed_headers.insert(name.to_ascii_lowercase(), value.to_string());
        }

        Ok(SignedRequest {
            method: draft.method.clone(),
            url,
            headers: signed_headers,
            body: draft.body.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credentials::AwsCredentials;
    use crate::infrastructure::aws::credentials::{EnvCredentialProvider, StaticCredentialProvider};
    use std::time::{Duration, UNIX_EPOCH};

    fn signer(token: Option<&str>) -> SigV4Signer {
        let creds = AwsCredentials::new(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            token.map(str::to_string),
        );
        SigV4Signer::new(
            Arc::new(StaticCredentialProvider::new(creds)),
            "ap-northeast-1",
            "ssm",
        )
    }

    fn draft() -> DraftRequest {
        DraftRequest::new("post", "https:", "ssm.ap-northeast-1.amazonaws.com", "/")
            .header("Content-Type", "application/x-amz-json-1.1")
            .header("X-Amz-Target", "AmazonSSM.GetParameter")
            .body(r#"{"Name":"/dev/x"}"#)
    }

    fn fixed_time() -> SystemTime {
        // 2015-08-30T12:36:00Z
        UNIX_EPOCH + Duration::from_secs(1_440_938_160)
    }

    #[tokio::test]
    async fn test_sign_adds_host_hash_and_authorization() {
        let signed = signer(None).sign_at(&draft(), fixed_time()).await.unwrap();

        assert_eq!(signed.method, "POST");
        assert_eq!(signed.url, "https://ssm.ap-northeast-1.amazonaws.com/");
        assert_eq!(
            signed.headers.get("host").map(String::as_str),
            Some("ssm.ap-northeast-1.amazonaws.com")
        );
        assert_eq!(
            signed.headers.get(CONTENT_SHA256_HEADER).cloned(),
            Some(hex::encode(Sha256::digest(br#"{"Name":"/dev/x"}"#)))
        );
        assert_eq!(
            signed.headers.get("x-amz-date").map(String::as_str),
            Some("20150830T123600Z")
        );

        let auth = signed.headers.get("authorization").unwrap();
        assert!(auth.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/ap-northeast-1/ssm/aws4_request"
        ));
        assert!(auth.contains("SignedHeaders="));
        assert!(auth.contains("host"));
        assert!(auth.contains("x-amz-target"));
        assert!(auth.contains("Signature="));
        assert!(!signed.headers.contains_key("x-amz-security-token"));
    }

    #[tokio::test]
    async fn test_signature_is_deterministic_and_covers_body() {
        let s = signer(None);
        let a = s.sign_at(&draft(), fixed_time()).await.unwrap();
        let b = s.sign_at(&draft(), fixed_time()).await.unwrap();
        assert_eq!(a.headers.get("authorization"), b.headers.get("authorization"));

        let other = draft().body(r#"{"Name":"/prd/x"}"#);
        let c = s.sign_at(&other, fixed_time()).await.unwrap();
        assert_ne!(a.headers.get("authorization"), c.headers.get("authorization"));
    }

    #[tokio::test]
    async fn test_session_token_is_forwarded() {
        let signed = signer(Some("session-token"))
            .sign_at(&draft(), fixed_time())
            .await
            .unwrap();
        assert_eq!(
            signed.headers.get("x-amz-security-token").map(String::as_str),
            Some("session-token")
        );
    }

    #[tokio::test]
    async fn test_sign_fails_without_credentials() {
        let signer = SigV4Signer::new(
            Arc::new(EnvCredentialProvider::with_lookup(|_| None)),
            "ap-northeast-1",
            "ssm",
        );
        let err = signer.sign(&draft()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Credentials(_)));
    }

    #[tokio::test]
    async fn test_sign_does_not_mutate_draft() {
        let d = draft();
        let before = d.clone();
        signer(None).sign_at(&d, fixed_time()).await.unwrap();
        assert_eq!(d, before);
        assert!(!d.headers.contains_key("host"));
    }

    #[test]
    fn test_for_endpoint_parses_base_url() {
        let d = DraftRequest::for_endpoint("POST", "http://127.0.0.1:4566/", "/").unwrap();
        assert_eq!(d.protocol, "http");
        assert_eq!(d.hostname, "127.0.0.1:4566");
        assert_eq!(d.url(), "http://127.0.0.1:4566/");

        assert!(DraftRequest::for_endpoint("POST", "127.0.0.1", "/").is_err());
        assert!(DraftRequest::for_endpoint("POST", "http://host/prefix", "/").is_err());
    }
}
