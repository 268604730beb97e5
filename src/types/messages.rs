// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Messages exchanged between the bridge, the orchestrator and the deploy executor.

use crate::types::namespace::{DeployType, NamespaceResource, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A deploy intent for one resource snapshot
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeployMessage {
    pub deploy_type: DeployType,
    pub resource: NamespaceResource,
    pub timestamp: DateTime<Utc>,
}

impl DeployMessage {
    pub fn new(deploy_type: DeployType, resource: NamespaceResource) -> Self {
        Self {
            deploy_type,
            resource,
            timestamp: Utc::now(),
        }
    }

    /// Same deploy intent, stamped now
    pub fn restamped(&self) -> Self {
        Self::new(self.deploy_type, self.resource.clone())
    }

    /// Attach a failure status, stamped now
    pub fn failed(&self, status: Status) -> DeployFailure {
        DeployFailure {
            deploy_type: self.deploy_type,
            resource: self.resource.clone(),
            status,
            timestamp: Utc::now(),
        }
    }
}

/// A deploy intent together with the reason it failed
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeployFailure {
    pub deploy_type: DeployType,
    pub resource: NamespaceResource,
    pub status: Status,
    pub timestamp: DateTime<Utc>,
}

impl DeployFailure {
    /// Same failure, stamped now
    pub fn restamped(&self) -> Self {
        Self {
            timestamp: Utc::now(),
            ..self.clone()
        }
    }
}

/// Command sent to the deploy executor
pub type DeployCommand = DeployMessage;

/// Terminal failure notification broadcast to observers
pub type SyncFailed = DeployFailure;

/// Messages consumed by the sync orchestrator
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", content = "message")]
pub enum SyncMessage {
    /// Fresh request from the change bridge, or a debounced re-publication
    SyncRequest(DeployMessage),
    /// Internally scheduled retry after a failed attempt
    SyncRetry(DeployMessage),
    DeployCompleted(DeployMessage),
    DeployFailed(DeployFailure),
    /// Scheduled when a deploy is issued, fires when no outcome arrived in time
    DeployTimeout(DeployMessage),
}

impl SyncMessage {
    pub fn resource(&self) -> &NamespaceResource {
        match self {
            SyncMessage::SyncRequest(m)
            | SyncMessage::SyncRetry(m)
            | SyncMessage::DeployCompleted(m)
            | SyncMessage::DeployTimeout(m) => &m.resource,
            SyncMessage::DeployFailed(f) => &f.resource,
        }
    }

    /// Key routing the message to its sync instance
    pub fn correlation_id(&self) -> Uuid {
        self.resource().id
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SyncMessage::SyncRequest(_) => "SyncRequest",
            SyncMessage::SyncRetry(_) => "SyncRetry",
            SyncMessage::DeployCompleted(_) => "DeployCompleted",
            SyncMessage::DeployFailed(_) => "DeployFailed",
            SyncMessage::DeployTimeout(_) => "DeployTimeout",
        }
    }
}

/// Changes to namespace records published by the control plane
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainEvent {
    NamespaceCreated(NamespaceResource),
    NamespaceUpdated(NamespaceResource),
    NamespaceDeleted(NamespaceResource),
}
