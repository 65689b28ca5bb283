// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// AWS Adapters
//
// Everything that talks to AWS goes through a SigV4-signed reqwest call:
// - parameter_store: SSM GetParameter (runtime ARN lookup)
// - agent_runtime: streaming runtime invocation

pub mod agent_runtime;
pub mod credentials;
pub mod parameter_store;
pub mod signer;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub use agent_runtime::{AgentCoreRuntimeClient, AgentRuntime, UpstreamStream};
pub use credentials::{DefaultChainCredentialProvider, EnvCredentialProvider, StaticCredentialProvider};
pub use parameter_store::{ParameterStore, SsmParameterStore};
pub use signer::{DraftRequest, SigV4Signer, SignedRequest};

/// Characters left untouched by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single path segment (e.g. an ARN) the way browsers do
pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_runtime_arn() {
        let arn = "arn:aws:bedrock-agentcore:ap-northeast-1:123456789012:runtime/myAgent-abc123";
        assert_eq!(
            encode_uri_component(arn),
            "arn%3Aaws%3Abedrock-agentcore%3Aap-northeast-1%3A123456789012%3Aruntime%2FmyAgent-abc123"
        );
    }

    #[test]
    fn test_encode_keeps_unreserved_marks() {
        assert_eq!(encode_uri_component("a-b_c.d!e~f*g'h(i)j"), "a-b_c.d!e~f*g'h(i)j");
        assert_eq!(encode_uri_component("a b/c?d"), "a%20b%2Fc%3Fd");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }
}
