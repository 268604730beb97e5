// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use k8cloud_sync::bridge::ChangeBridge;
use k8cloud_sync::config::Config;
use k8cloud_sync::constants::CHANNEL_CAPACITY;
use k8cloud_sync::declared::{DeclaredState, DeclaredStateWatcher};
use k8cloud_sync::deploy::{DeployWorker, NamespaceExecutor};
use k8cloud_sync::kubernetes::ClusterClients;
use k8cloud_sync::scheduler::DelayQueue;
use k8cloud_sync::sync::SyncOrchestrator;
use k8cloud_sync::types::SyncFailed;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting k8cloud namespace sync");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: declared_state_file={}, testing_mode={}",
        config.declared_state_file.display(),
        config.testing_mode
    );

    // Fail fast on a broken file; later reloads keep the last good state
    let declared = DeclaredState::load(&config.declared_state_file)
        .context("Failed to load the declared state")?;
    info!(
        "Declared state: {} clusters, {} namespaces",
        declared.clusters.len(),
        declared.namespaces.len()
    );

    // Scheduled messages and deploy outcomes share the orchestrator inbox
    let (inbox_tx, inbox_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (deploy_tx, deploy_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let (delay_queue, scheduler) = DelayQueue::new(inbox_tx.clone());
    let (orchestrator, handle) = SyncOrchestrator::new(
        config.sync_policy.clone(),
        scheduler,
        inbox_tx.clone(),
        inbox_rx,
        deploy_tx,
    );

    let clients = ClusterClients::new(config.testing_mode);
    let worker = DeployWorker::new(NamespaceExecutor::new(clients.clone()), deploy_rx, inbox_tx);

    let watcher = DeclaredStateWatcher::new(
        config.declared_state_file.clone(),
        config.declared_state_poll_interval,
        ChangeBridge::new(handle.clone()),
        clients,
    );

    info!("Starting sync components...");

    tokio::try_join!(
        delay_queue.run(),
        orchestrator.run(),
        worker.run(),
        watcher.run(),
        log_failures(handle.subscribe_failures()),
    )?;

    warn!("All sync components stopped unexpectedly");
    Ok(())
}

async fn log_failures(mut failures: broadcast::Receiver<SyncFailed>) -> Result<()> {
    loop {
        match failures.recv().await {
            Ok(failure) => error!(
                namespace = %failure.resource.name,
                id = %failure.resource.id,
                deploy = ?failure.deploy_type,
                "Namespace sync gave up: {} {}",
                failure.status.code,
                failure.status.message
            ),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Missed {} sync failure notifications", skipped)
            }
            Err(broadcast::error::RecvError::Closed) => return Ok(()),
        }
    }
}
