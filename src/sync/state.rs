// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Persisted state of a namespace synchronization.

use crate::scheduler::TimerToken;
use crate::types::{NamespaceResource, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// A deploy is in flight
    Syncing,
    /// The live namespace matches the last known desired snapshot
    Synced,
    /// The last attempt failed, a retry is scheduled or the budget is exhausted
    SyncError,
    /// The namespace was removed, the instance accepts nothing further
    Deleted,
}

/// Marks one snapshot of the desired resource
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&NamespaceResource> for Snapshot {
    fn from(resource: &NamespaceResource) -> Self {
        Self {
            version: resource.version.clone(),
            updated_at: resource.updated_at,
        }
    }
}

/// One row per synchronized namespace
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncInstance {
    pub correlation_id: Uuid,
    pub state: SyncState,
    /// Snapshot currently being deployed
    pub in_sync: Option<Snapshot>,
    /// Last snapshot confirmed on the live cluster
    pub synced: Option<Snapshot>,
    /// Snapshot of the last failed attempt, retried by `SyncRetry` only
    #[serde(default)]
    pub failed: Option<Snapshot>,
    pub retry_count: u32,
    pub error_status: Option<Status>,
    pub pending_timeout: Option<TimerToken>,
}

impl SyncInstance {
    pub fn new(correlation_id: Uuid) -> Self {
        Self {
            correlation_id,
            state: SyncState::Syncing,
            in_sync: None,
            synced: None,
            failed: None,
            retry_count: 0,
            error_status: None,
            pending_timeout: None,
        }
    }

    /// Admission gate for sync requests and retries.
    ///
    /// A resource is newer only if it was updated strictly after both the
    /// synced snapshot and the one in flight.
    pub fn is_newer(&self, resource: &NamespaceResource) -> bool {
        let after = |snapshot: &Option<Snapshot>| {
            snapshot
                .as_ref()
                .map_or(true, |s| s.updated_at < resource.updated_at)
        };
        after(&self.synced) && after(&self.in_sync)
    }

    /// Fresh requests must also be newer than the last failed snapshot, so a
    /// duplicate of it cannot reset the retry budget
    pub fn is_past_failure(&self, resource: &NamespaceResource) -> bool {
        self.failed
            .as_ref()
            .map_or(true, |s| s.updated_at < resource.updated_at)
    }

    /// Whether the resource is the one currently being deployed
    pub fn is_in_flight(&self, resource: &NamespaceResource) -> bool {
        self.in_sync
            .as_ref()
            .is_some_and(|s| s.version == resource.version)
    }

    pub fn synced_version(&self) -> Option<&str> {
        self.synced.as_ref().map(|s| s.version.as_str())
    }

    pub fn info(&self) -> SyncInfo {
        SyncInfo {
            status: self.state,
            error_status: self.error_status.clone(),
        }
    }
}

/// Sync summary exposed to observers
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncInfo {
    pub status: SyncState,
    pub error_status: Option<Status>,
}
