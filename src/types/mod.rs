// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain records and message contracts.

pub mod cluster;
pub mod messages;
pub mod namespace;

pub use cluster::ClusterResource;
pub use messages::{
    DeployCommand, DeployFailure, DeployMessage, DomainEvent, SyncFailed, SyncMessage,
};
pub use namespace::{DeployType, NamespaceResource, Status};
