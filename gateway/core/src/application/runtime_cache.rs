// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Runtime Identifier Cache
//!
//! Resolves the agent runtime ARN from the parameter store once and reuses it
//! for the rest of the process lifetime. Failures are not cached, so the next
//! request retries. No lock is held across the fetch: callers arriving during
//! the cold window may each fetch, and the last successful write wins. The
//! fetch is idempotent, so duplicates are harmless.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Get-or-fetch memoization of the runtime identifier

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::errors::GatewayError;
use crate::infrastructure::aws::ParameterStore;

pub const MISSING_PARAM_MESSAGE: &str = "AGENT_RUNTIME_ARN_SSM_PARAM is not configured";

pub struct RuntimeIdentifierCache {
    store: Arc<dyn ParameterStore>,
    param_name: Option<String>,
    cached: RwLock<Option<String>>,
}

impl RuntimeIdentifierCache {
    pub fn new(store: Arc<dyn ParameterStore>, param_name: Option<String>) -> Self {
        Self {
            store,
            param_name: param_name.filter(|p| !p.is_empty()),
            cached: RwLock::new(None),
        }
    }

    /// Currently cached identifier, if any
    pub fn cached(&self) -> Option<String> {
        self.cached.read().clone()
    }

    pub async fn get_or_fetch(&self) -> Result<String, GatewayError> {
        if let Some(arn) = self.cached() {
            return Ok(arn);
        }

        let param_name = self
            .param_name
            .as_deref()
            .ok_or_else(|| GatewayError::Configuration(MISSING_PARAM_MESSAGE.to_string()))?;

        debug!(parameter = param_name, "Runtime identifier not cached, fetching");
        match self.store.get_parameter(param_name).await {
            Ok(arn) => {
                info!(parameter = param_name, "Cached agent runtime identifier");
                *self.cached.write() = Some(arn.clone());
                Ok(arn)
            }
            Err(e) => {
                warn!(parameter = param_name, error = %e, "Failed to resolve runtime identifier");
                Err(e)
            }
        }
    }
}
