// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deploy execution against the managed clusters.

pub mod executor;
pub mod namespace;

pub use executor::{execute, DeployExecutor, DeployWorker};
pub use namespace::NamespaceExecutor;
