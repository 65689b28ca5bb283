// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod aws;
pub mod deployment;
pub mod static_assets;

pub use static_assets::{StaticAsset, StaticAssetServer};
