// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Agent Relay Core
//!
//! Streams chat turns from a browser to a hosted agent runtime through
//! SigV4-signed requests, and serves the chat SPA.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain types, AWS adapters, proxy service, HTTP router

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
