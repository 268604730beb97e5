// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Turns deploy commands into deploy outcomes.

use crate::types::{DeployCommand, Status, SyncMessage};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

/// Carries out a deploy against the target environment
pub trait DeployExecutor: Send + Sync + 'static {
    fn deploy(&self, command: &DeployCommand) -> impl Future<Output = Result<(), Status>> + Send;
}

/// Consumes deploy commands and reports exactly one outcome per command
pub struct DeployWorker<E: DeployExecutor> {
    executor: Arc<E>,
    commands: mpsc::Receiver<DeployCommand>,
    outcomes: mpsc::Sender<SyncMessage>,
}

impl<E: DeployExecutor> DeployWorker<E> {
    pub fn new(
        executor: E,
        commands: mpsc::Receiver<DeployCommand>,
        outcomes: mpsc::Sender<SyncMessage>,
    ) -> Self {
        Self {
            executor: Arc::new(executor),
            commands,
            outcomes,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("DeployWorker started, waiting for deploy commands...");

        while let Some(command) = self.commands.recv().await {
            let executor = Arc::clone(&self.executor);
            let outcomes = self.outcomes.clone();

            tokio::spawn(async move {
                let outcome = execute(executor.as_ref(), command).await;
                if outcomes.send(outcome).await.is_err() {
                    warn!("Orchestrator inbox closed, dropping deploy outcome");
                }
            });
        }

        warn!("Deploy command channel closed");
        Ok(())
    }
}

/// Run one deploy and translate its result into the outcome message
#[instrument(
    skip(executor, command),
    fields(namespace = %command.resource.name, deploy = ?command.deploy_type, version = %command.resource.version)
)]
pub async fn execute<E: DeployExecutor + ?Sized>(executor: &E, command: DeployCommand) -> SyncMessage {
    match executor.deploy(&command).await {
        Ok(()) => {
            info!("Deploy completed");
            SyncMessage::DeployCompleted(command.restamped())
        }
        Err(status) => {
            warn!("Deploy failed: {} {}", status.code, status.message);
            SyncMessage::DeployFailed(command.failed(status))
        }
    }
}
