// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod chat_proxy;
pub mod runtime_cache;

pub use chat_proxy::ChatProxyService;
pub use runtime_cache::RuntimeIdentifierCache;
