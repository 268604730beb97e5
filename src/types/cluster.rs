// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A managed cluster and the credentials used to reach it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResource {
    pub id: Uuid,
    pub server_name: String,
    pub server_address: String,
    /// Base64 encoded CA bundle of the API server
    pub server_certificate_authority_data: String,
    pub user_name: String,
    /// Base64 encoded client certificate
    pub user_credentials_certificate_data: String,
    /// Base64 encoded client key
    pub user_credentials_key_data: String,
    /// Default namespace of the generated kubeconfig context
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    "default".to_string()
}

impl ClusterResource {
    /// Render the stored credentials as a kubeconfig document
    pub fn kubeconfig(&self) -> serde_json::Value {
        serde_json::json!({
            "apiVersion": "v1",
            "kind": "Config",
            "clusters": [{
                "name": self.server_name,
                "cluster": {
                    "server": self.server_address,
                    "certificate-authority-data": self.server_certificate_authority_data,
                }
            }],
            "users": [{
                "name": self.user_name,
                "user": {
                    "client-certificate-data": self.user_credentials_certificate_data,
                    "client-key-data": self.user_credentials_key_data,
                }
            }],
            "contexts": [{
                "name": self.server_name,
                "context": {
                    "cluster": self.server_name,
                    "user": self.user_name,
                    "namespace": self.namespace,
                }
            }],
            "current-context": self.server_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cluster() -> ClusterResource {
        ClusterResource {
            id: Uuid::new_v4(),
            server_name: "prod-eu".to_string(),
            server_address: "https://10.0.0.1:6443".to_string(),
            server_certificate_authority_data: "Y2E=".to_string(),
            user_name: "admin".to_string(),
            user_credentials_certificate_data: "Y2VydA==".to_string(),
            user_credentials_key_data: "a2V5".to_string(),
            namespace: "default".to_string(),
        }
    }

    #[test]
    fn test_kubeconfig_points_at_cluster() {
        let kubeconfig = make_cluster().kubeconfig();

        assert_eq!(kubeconfig["current-context"], "prod-eu");
        assert_eq!(
            kubeconfig["clusters"][0]["cluster"]["server"],
            "https://10.0.0.1:6443"
        );
        assert_eq!(kubeconfig["contexts"][0]["context"]["user"], "admin");
    }

    #[test]
    fn test_kubeconfig_carries_credentials() {
        let kubeconfig = make_cluster().kubeconfig();

        assert_eq!(kubeconfig["users"][0]["user"]["client-key-data"], "a2V5");
        assert_eq!(
            kubeconfig["clusters"][0]["cluster"]["certificate-authority-data"],
            "Y2E="
        );
    }

    #[test]
    fn test_namespace_defaults_when_missing() {
        let yaml = r#"
id: 6f1c2a8e-3b7d-4c1e-9a2f-0d5e8b7c6a41
serverName: prod-eu
serverAddress: https://10.0.0.1:6443
serverCertificateAuthorityData: Y2E=
userName: admin
userCredentialsCertificateData: Y2VydA==
userCredentialsKeyData: a2V5
"#;
        let cluster: ClusterResource = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cluster.namespace, "default");
    }
}
