// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management on a managed cluster

use crate::constants::{annotations, labels, FIELD_MANAGER};
use crate::error::{K8CloudError, Result};
use crate::types::NamespaceResource;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{DeleteParams, ObjectMeta, Patch, PatchParams},
    Api, Client,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Namespace manifest carrying the identity labels and tracking annotations
pub fn namespace_manifest(resource: &NamespaceResource) -> Namespace {
    let identity = BTreeMap::from([
        (labels::CLUSTER_ID.to_string(), resource.cluster_id.to_string()),
        (labels::NAMESPACE_ID.to_string(), resource.id.to_string()),
    ]);
    let tracking = BTreeMap::from([
        (
            annotations::CREATED_AT.to_string(),
            resource.created_at.to_rfc3339(),
        ),
        (
            annotations::UPDATED_AT.to_string(),
            resource.updated_at.to_rfc3339(),
        ),
        (annotations::VERSION.to_string(), resource.version.clone()),
    ]);

    Namespace {
        metadata: ObjectMeta {
            name: Some(resource.name.clone()),
            labels: Some(identity),
            annotations: Some(tracking),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Fetch a namespace, `None` when it does not exist
pub async fn get_namespace(client: &Client, name: &str) -> Result<Option<Namespace>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.get(name).await {
        Ok(namespace) => Ok(Some(namespace)),
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// A live namespace may only be changed by the record whose id it carries
fn check_ownership(existing: &Namespace, resource: &NamespaceResource) -> Result<()> {
    let owner = existing
        .metadata
        .labels
        .as_ref()
        .and_then(|map| map.get(labels::NAMESPACE_ID));

    if owner.map(String::as_str) == Some(resource.id.to_string().as_str()) {
        Ok(())
    } else {
        Err(K8CloudError::NamespaceConflict(format!(
            "namespace {} is owned by {}",
            resource.name,
            owner.map_or("another party", String::as_str)
        )))
    }
}

/// Create or update the namespace with server-side apply
#[instrument(skip(client, resource), fields(namespace = %resource.name, version = %resource.version))]
pub async fn apply_namespace(client: &Client, resource: &NamespaceResource) -> Result<()> {
    if let Some(existing) = get_namespace(client, &resource.name).await? {
        check_ownership(&existing, resource)?;
        debug!("Namespace {} exists, updating", resource.name);
    }

    let namespaces: Api<Namespace> = Api::all(client.clone());
    let params = PatchParams::apply(FIELD_MANAGER).force();
    namespaces
        .patch(
            &resource.name,
            &params,
            &Patch::Apply(&namespace_manifest(resource)),
        )
        .await?;

    info!("Applied namespace {}", resource.name);
    Ok(())
}

/// Delete the namespace; a namespace that is already gone counts as deleted
#[instrument(skip(client, resource), fields(namespace = %resource.name))]
pub async fn delete_namespace(client: &Client, resource: &NamespaceResource) -> Result<()> {
    let Some(existing) = get_namespace(client, &resource.name).await? else {
        debug!("Namespace {} already absent", resource.name);
        return Ok(());
    };
    check_ownership(&existing, resource)?;

    let namespaces: Api<Namespace> = Api::all(client.clone());
    match namespaces
        .delete(&resource.name, &DeleteParams::default())
        .await
    {
        Ok(_) => {
            info!("Deleted namespace {}", resource.name);
            Ok(())
        }
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(()),
        Err(e) => Err(e.into()),
    }
}
