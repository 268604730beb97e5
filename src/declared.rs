// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Declared clusters and namespaces, loaded from a YAML file.
//!
//! The watcher reloads the file periodically and turns the difference
//! between two loads into namespace domain events for the change bridge.

use crate::bridge::ChangeBridge;
use crate::error::{K8CloudError, Result};
use crate::kubernetes::ClusterClients;
use crate::types::{ClusterResource, DomainEvent, NamespaceResource};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredState {
    #[serde(default)]
    pub clusters: Vec<ClusterResource>,
    #[serde(default)]
    pub namespaces: Vec<NamespaceResource>,
}

impl DeclaredState {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let state: DeclaredState = serde_yaml::from_str(yaml)
            .map_err(|e| K8CloudError::DeclaredState(format!("Failed to parse: {}", e)))?;
        state.validate()?;
        Ok(state)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            K8CloudError::DeclaredState(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        let mut cluster_ids = HashSet::new();
        for cluster in &self.clusters {
            if !cluster_ids.insert(cluster.id) {
                return Err(K8CloudError::DeclaredState(format!(
                    "cluster {} is declared twice",
                    cluster.id
                )));
            }
        }

        let mut namespace_ids = HashSet::new();
        let mut names = HashSet::new();
        for namespace in &self.namespaces {
            if !namespace.has_valid_name() {
                return Err(K8CloudError::DeclaredState(format!(
                    "'{}' is not a valid namespace name",
                    namespace.name
                )));
            }
            if !cluster_ids.contains(&namespace.cluster_id) {
                return Err(K8CloudError::DeclaredState(format!(
                    "namespace {} references unknown cluster {}",
                    namespace.name, namespace.cluster_id
                )));
            }
            if !namespace_ids.insert(namespace.id) {
                return Err(K8CloudError::DeclaredState(format!(
                    "namespace {} is declared twice",
                    namespace.id
                )));
            }
            if !names.insert((namespace.cluster_id, namespace.name.as_str())) {
                return Err(K8CloudError::DeclaredState(format!(
                    "namespace name {} is used twice on cluster {}",
                    namespace.name, namespace.cluster_id
                )));
            }
        }

        Ok(())
    }

    /// Events turning `previous` into `self`, deletions stamped at `now`
    pub fn namespace_events(&self, previous: &DeclaredState, now: DateTime<Utc>) -> Vec<DomainEvent> {
        let before: HashMap<Uuid, &NamespaceResource> =
            previous.namespaces.iter().map(|ns| (ns.id, ns)).collect();
        let after: HashSet<Uuid> = self.namespaces.iter().map(|ns| ns.id).collect();

        let mut events = Vec::new();
        for namespace in &self.namespaces {
            match before.get(&namespace.id) {
                None => events.push(DomainEvent::NamespaceCreated(namespace.clone())),
                Some(old) if *old != namespace => {
                    events.push(DomainEvent::NamespaceUpdated(namespace.clone()))
                }
                Some(_) => {}
            }
        }
        for namespace in &previous.namespaces {
            if !after.contains(&namespace.id) {
                events.push(DomainEvent::NamespaceDeleted(tombstone(namespace, now)));
            }
        }
        events
    }
}

/// Removal is a mutation: it must order after every earlier snapshot
fn tombstone(resource: &NamespaceResource, now: DateTime<Utc>) -> NamespaceResource {
    NamespaceResource {
        updated_at: now.max(resource.updated_at + ChronoDuration::milliseconds(1)),
        version: format!("{}-deleted", resource.version),
        ..resource.clone()
    }
}

/// Polls the declared state file and publishes the changes
pub struct DeclaredStateWatcher {
    path: PathBuf,
    interval: Duration,
    bridge: ChangeBridge,
    clients: ClusterClients,
    current: DeclaredState,
}

impl DeclaredStateWatcher {
    pub fn new(path: PathBuf, interval: Duration, bridge: ChangeBridge, clients: ClusterClients) -> Self {
        Self {
            path,
            interval,
            bridge,
            clients,
            current: DeclaredState::default(),
        }
    }

    /// Reload the file once; returns the number of published events
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn sync_once(&mut self) -> Result<usize> {
        let next = DeclaredState::load(&self.path)?;

        self.register_clusters(&next).await;

        let events = next.namespace_events(&self.current, Utc::now());
        let published = events.len();
        // publish only fails once the orchestrator is gone, which stops the watcher
        for event in events {
            self.bridge.publish(event).await?;
        }

        self.current = next;
        if published > 0 {
            info!("Published {} namespace changes", published);
        }
        Ok(published)
    }

    async fn register_clusters(&self, next: &DeclaredState) {
        for cluster in &next.clusters {
            let unchanged = self.current.clusters.iter().any(|c| c == cluster);
            if unchanged && self.clients.get(cluster.id).await.is_ok() {
                continue;
            }
            // a failed registration is attempted again on the next poll
            if let Err(e) = self.clients.register(cluster).await {
                warn!("Failed to register cluster {}: {}", cluster.server_name, e);
            }
        }

        let retained: HashSet<Uuid> = next.clusters.iter().map(|c| c.id).collect();
        for cluster in &self.current.clusters {
            // keep the client while namespaces on the cluster may still be deleted
            let in_use = self
                .current
                .namespaces
                .iter()
                .any(|ns| ns.cluster_id == cluster.id);
            if !retained.contains(&cluster.id) && !in_use {
                debug!("Cluster {} no longer declared", cluster.server_name);
                self.clients.remove(cluster.id).await;
            }
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!(
            "Watching declared state {} every {:?}",
            self.path.display(),
            self.interval
        );

        loop {
            match self.sync_once().await {
                Ok(_) => {}
                Err(K8CloudError::ChannelClosed(channel)) => {
                    anyhow::bail!("{} closed, stopping declared state watcher", channel)
                }
                Err(e) => warn!("Keeping previous declared state: {}", e),
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}
