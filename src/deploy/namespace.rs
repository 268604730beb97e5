// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::deploy::DeployExecutor;
use crate::kubernetes::{apply_namespace, delete_namespace, ClusterClients};
use crate::types::{DeployCommand, DeployType, Status};

/// Deploys namespaces onto the cluster named by the resource
#[derive(Clone)]
pub struct NamespaceExecutor {
    clients: ClusterClients,
}

impl NamespaceExecutor {
    pub fn new(clients: ClusterClients) -> Self {
        Self { clients }
    }
}

impl DeployExecutor for NamespaceExecutor {
    async fn deploy(&self, command: &DeployCommand) -> Result<(), Status> {
        let resource = &command.resource;
        let client = self
            .clients
            .get(resource.cluster_id)
            .await
            .map_err(|e| e.status())?;

        let result = match command.deploy_type {
            DeployType::Apply => apply_namespace(&client, resource).await,
            DeployType::Delete => delete_namespace(&client, resource).await,
        };
        result.map_err(|e| e.status())
    }
}
