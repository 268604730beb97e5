// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Translates namespace domain events into sync requests.

use crate::error::Result;
use crate::sync::OrchestratorHandle;
use crate::types::{DeployMessage, DeployType, DomainEvent, SyncMessage};
use tracing::{debug, instrument};

/// Map a domain event to the sync request it triggers
pub fn translate(event: DomainEvent) -> SyncMessage {
    let (deploy_type, resource) = match event {
        DomainEvent::NamespaceCreated(resource) | DomainEvent::NamespaceUpdated(resource) => {
            (DeployType::Apply, resource)
        }
        DomainEvent::NamespaceDeleted(resource) => (DeployType::Delete, resource),
    };
    SyncMessage::SyncRequest(DeployMessage::new(deploy_type, resource))
}

#[derive(Clone)]
pub struct ChangeBridge {
    orchestrator: OrchestratorHandle,
}

impl ChangeBridge {
    pub fn new(orchestrator: OrchestratorHandle) -> Self {
        Self { orchestrator }
    }

    #[instrument(skip(self, event))]
    pub async fn publish(&self, event: DomainEvent) -> Result<()> {
        let message = translate(event);
        debug!(
            "Requesting sync of namespace {} at version {}",
            message.resource().name,
            message.resource().version
        );
        self.orchestrator.send(message).await
    }
}
