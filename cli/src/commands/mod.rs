// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Agent Relay CLI

pub mod chat;
pub mod config;
pub mod infra;
pub mod serve;

pub use self::chat::ChatArgs;
pub use self::config::ConfigCommand;
pub use self::infra::InfraCommand;
pub use self::serve::ServeArgs;
