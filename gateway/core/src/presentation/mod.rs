// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`agent-relay-core`)
//!
//! HTTP surface that translates browser requests into application service
//! calls. **No business logic lives here**: validation, runtime resolution
//! and signing are delegated to `crate::application`.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `POST /api/chat` | Signed invocation of the agent runtime, relayed as `text/event-stream` |
//! | `GET /health` | Liveness and uptime |
//! | `GET /*` | SPA assets with `index.html` fallback |

pub mod api;
