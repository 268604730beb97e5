// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::Status;
use http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum K8CloudError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to build kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("No client registered for cluster {0}")]
    ClusterNotFound(Uuid),

    #[error("Namespace conflict: {0}")]
    NamespaceConflict(String),

    #[error("Invalid declared state: {0}")]
    DeclaredState(String),

    #[error("Channel closed: {0}")]
    ChannelClosed(&'static str),
}

impl K8CloudError {
    /// Normalize the error into the status stored on a sync instance
    pub fn status(&self) -> Status {
        match self {
            K8CloudError::KubeError(kube::Error::Api(response)) => {
                let code = if response.code > 0 {
                    response.code
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR.as_u16()
                };
                Status::new(code, response.message.clone())
            }
            K8CloudError::NamespaceConflict(_) => {
                Status::new(StatusCode::CONFLICT.as_u16(), "Namespace already exists")
            }
            K8CloudError::ClusterNotFound(_) => {
                Status::new(StatusCode::NOT_FOUND.as_u16(), self.to_string())
            }
            _ => Status::new(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), self.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, K8CloudError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn api_error(code: u16, message: &str) -> K8CloudError {
        K8CloudError::KubeError(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.to_string(),
            reason: "ServiceUnavailable".to_string(),
            code,
        }))
    }

    #[test]
    fn test_status_keeps_api_code_and_message() {
        let status = api_error(503, "etcd unavailable").status();
        assert_eq!(status.code, 503);
        assert_eq!(status.message, "etcd unavailable");
    }

    #[test]
    fn test_status_defaults_missing_api_code_to_500() {
        assert_eq!(api_error(0, "boom").status().code, 500);
    }

    #[test]
    fn test_status_for_conflict() {
        let status = K8CloudError::NamespaceConflict("team-a".to_string()).status();
        assert_eq!(status.code, 409);
        assert_eq!(status.message, "Namespace already exists");
    }

    #[test]
    fn test_status_for_unknown_cluster() {
        let status = K8CloudError::ClusterNotFound(Uuid::nil()).status();
        assert_eq!(status.code, 404);
    }

    #[test]
    fn test_status_for_other_errors() {
        let status = K8CloudError::KubeconfigError("bad".to_string()).status();
        assert_eq!(status.code, 500);
        assert!(status.message.contains("bad"));
    }
}
