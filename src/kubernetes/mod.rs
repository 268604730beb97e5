// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for cluster clients and namespace management.

pub mod client;
pub mod namespaces;

pub use client::ClusterClients;
pub use namespaces::{apply_namespace, delete_namespace, get_namespace, namespace_manifest};
