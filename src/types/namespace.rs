// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of an RFC 1123 label
const MAX_LABEL_LENGTH: usize = 63;

/// Desired state of a namespace as recorded in the control plane.
///
/// `updated_at` and `version` are assigned by the persistence layer on every
/// mutation and are what the orchestrator uses to order snapshots.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceResource {
    pub id: Uuid,
    pub cluster_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: String,
}

impl NamespaceResource {
    /// Check the name is a valid RFC 1123 label, as Kubernetes requires for namespaces
    pub fn has_valid_name(&self) -> bool {
        is_rfc1123_label(&self.name)
    }
}

/// Whether a deploy creates/updates the resource or removes it
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeployType {
    Apply,
    Delete,
}

/// Normalized outcome of a failed remote operation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Status {
    /// HTTP status code
    pub code: u16,
    pub message: String,
}

impl Status {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Status substituted when no deploy outcome arrived in time
    pub fn request_timeout() -> Self {
        Self::new(StatusCode::REQUEST_TIMEOUT.as_u16(), "request timeout")
    }
}

fn is_rfc1123_label(name: &str) -> bool {
    let bytes = name.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };

    bytes.len() <= MAX_LABEL_LENGTH
        && first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}
