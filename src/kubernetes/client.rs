// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Clients for the managed clusters, built from their stored credentials

use crate::error::{K8CloudError, Result};
use crate::types::ClusterResource;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Registry of API clients keyed by cluster id
#[derive(Clone)]
pub struct ClusterClients {
    clients: Arc<RwLock<HashMap<Uuid, Client>>>,
    testing_mode: bool,
}

impl ClusterClients {
    pub fn new(testing_mode: bool) -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            testing_mode,
        }
    }

    /// Build a client for the cluster and register it, replacing any previous one
    #[instrument(skip(self, cluster), fields(cluster = %cluster.server_name, id = %cluster.id))]
    pub async fn register(&self, cluster: &ClusterResource) -> Result<()> {
        let client = if self.testing_mode {
            create_testing_client().await?
        } else {
            create_client_from_kubeconfig(cluster.kubeconfig()).await?
        };

        self.insert(cluster.id, client).await;
        info!("Registered client for cluster {}", cluster.server_name);
        Ok(())
    }

    pub async fn insert(&self, cluster_id: Uuid, client: Client) {
        self.clients.write().await.insert(cluster_id, client);
    }

    pub async fn remove(&self, cluster_id: Uuid) {
        if self.clients.write().await.remove(&cluster_id).is_some() {
            debug!("Removed client for cluster {}", cluster_id);
        }
    }

    pub async fn get(&self, cluster_id: Uuid) -> Result<Client> {
        self.clients
            .read()
            .await
            .get(&cluster_id)
            .cloned()
            .ok_or(K8CloudError::ClusterNotFound(cluster_id))
    }
}

/// Create a client for testing mode, every cluster maps to the local kubeconfig
async fn create_testing_client() -> Result<Client> {
    let config = KConfig::infer()
        .await
        .map_err(|e| K8CloudError::KubeconfigError(format!("Failed to infer config: {}", e)))?;

    Client::try_from(config)
        .map_err(|e| K8CloudError::KubeconfigError(format!("Failed to create client: {}", e)))
}

/// Create a Kubernetes client from a kubeconfig document
async fn create_client_from_kubeconfig(kubeconfig: serde_json::Value) -> Result<Client> {
    let kubeconfig_parsed: Kubeconfig = serde_json::from_value(kubeconfig)
        .map_err(|e| K8CloudError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    let client_config =
        KConfig::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| K8CloudError::KubeconfigError(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| K8CloudError::KubeconfigError(format!("Failed to create client: {}", e)))
}
