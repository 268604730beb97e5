// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Labels written on namespaces managed by k8cloud
pub mod labels {
    /// Identity of the owning cluster record
    pub const CLUSTER_ID: &str = "k8cloud/clusterId";
    /// Identity of the namespace record, used for the ownership check
    pub const NAMESPACE_ID: &str = "k8cloud/namespaceId";
}

/// Annotations written on namespaces managed by k8cloud
pub mod annotations {
    pub const CREATED_AT: &str = "k8cloud/createdAt";
    pub const UPDATED_AT: &str = "k8cloud/updatedAt";
    pub const VERSION: &str = "k8cloud/version";
}

/// The field manager used for server-side apply
pub const FIELD_MANAGER: &str = "k8cloud-namespace-field-manager";

/// Capacity of the channels between the orchestrator, scheduler and executor
pub const CHANNEL_CAPACITY: usize = 256;

/// Synchronization policy defaults
pub mod sync {
    /// Time a deploy attempt may take before it is considered failed
    pub const DEPLOY_TIMEOUT_SECS: u64 = 300;
    /// Base delay of the exponential retry backoff
    pub const RETRY_BASE_SECS: u64 = 10;
    /// Delay before a request that arrived while syncing is re-evaluated
    pub const REDELIVER_DELAY_SECS: u64 = 10;
    /// Failures tolerated before a sync is reported as failed
    pub const MAX_RETRIES: u32 = 10;
    /// Lower bound of the backoff jitter band
    pub const JITTER_LOW: f64 = 0.8;
    /// Upper bound of the backoff jitter band
    pub const JITTER_HIGH: f64 = 1.2;
}

/// Declared state polling configuration
pub mod declared {
    pub const POLL_INTERVAL_SECS: u64 = 30;
}
