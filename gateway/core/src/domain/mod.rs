// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Request, credential, configuration and error types shared by the
//! infrastructure adapters and the HTTP surface.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Core types with no I/O

pub mod chat;
pub mod credentials;
pub mod errors;
pub mod gateway_config;
