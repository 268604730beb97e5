// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Runtime of the namespace sync state machine.
//!
//! Each inbox message is handled on its own task: the task locks the row of
//! the message's correlation id, runs the transition, stores the new row and
//! carries out the commands before releasing the lock.

use crate::error::{K8CloudError, Result};
use crate::scheduler::Scheduler;
use crate::sync::machine::{self, Command, SyncPolicy, Transition};
use crate::sync::state::{SyncInfo, SyncInstance};
use crate::sync::store::SagaStore;
use crate::types::{DeployCommand, SyncFailed, SyncMessage};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

const FAILURE_BROADCAST_CAPACITY: usize = 64;

/// Consumes sync messages and drives every sync instance
pub struct SyncOrchestrator<S: Scheduler> {
    core: Arc<OrchestratorCore<S>>,
    inbox: mpsc::Receiver<SyncMessage>,
}

struct OrchestratorCore<S: Scheduler> {
    store: Arc<SagaStore>,
    scheduler: S,
    policy: SyncPolicy,
    deploy_tx: mpsc::Sender<DeployCommand>,
    failed_tx: broadcast::Sender<SyncFailed>,
}

/// Handle to send messages to the orchestrator and observe its instances
#[derive(Clone)]
pub struct OrchestratorHandle {
    inbox_tx: mpsc::Sender<SyncMessage>,
    store: Arc<SagaStore>,
    failed_tx: broadcast::Sender<SyncFailed>,
}

impl OrchestratorHandle {
    pub async fn send(&self, message: SyncMessage) -> Result<()> {
        self.inbox_tx
            .send(message)
            .await
            .map_err(|_| K8CloudError::ChannelClosed("orchestrator inbox"))
    }

    /// Terminal sync failures, one per exhausted retry budget
    pub fn subscribe_failures(&self) -> broadcast::Receiver<SyncFailed> {
        self.failed_tx.subscribe()
    }

    pub async fn instance(&self, id: Uuid) -> Option<SyncInstance> {
        self.store.get(id).await
    }

    pub async fn sync_info(&self, id: Uuid) -> Option<SyncInfo> {
        self.store.get(id).await.map(|instance| instance.info())
    }
}

impl<S: Scheduler> SyncOrchestrator<S> {
    /// `inbox_tx` must be the sending side of `inbox`; the scheduler and the
    /// deploy worker deliver into the same channel.
    pub fn new(
        policy: SyncPolicy,
        scheduler: S,
        inbox_tx: mpsc::Sender<SyncMessage>,
        inbox: mpsc::Receiver<SyncMessage>,
        deploy_tx: mpsc::Sender<DeployCommand>,
    ) -> (Self, OrchestratorHandle) {
        let store = Arc::new(SagaStore::new());
        let (failed_tx, _) = broadcast::channel(FAILURE_BROADCAST_CAPACITY);

        let core = OrchestratorCore {
            store: Arc::clone(&store),
            scheduler,
            policy,
            deploy_tx,
            failed_tx: failed_tx.clone(),
        };

        let orchestrator = Self {
            core: Arc::new(core),
            inbox,
        };
        let handle = OrchestratorHandle {
            inbox_tx,
            store,
            failed_tx,
        };
        (orchestrator, handle)
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("SyncOrchestrator started, listening for messages...");

        while let Some(message) = self.inbox.recv().await {
            let core = Arc::clone(&self.core);
            tokio::spawn(async move { core.handle(message).await });
        }

        warn!("Orchestrator inbox closed");
        Ok(())
    }

    /// Handle one message to completion
    pub async fn handle(&self, message: SyncMessage) {
        self.core.handle(message).await;
    }
}

impl<S: Scheduler> OrchestratorCore<S> {
    #[instrument(
        skip(self, message),
        fields(id = %message.correlation_id(), namespace = %message.resource().name, message = message.kind())
    )]
    async fn handle(&self, message: SyncMessage) {
        let mut row = self.store.lock(message.correlation_id()).await;
        let previous = row.as_ref().map(|instance| instance.state);

        let transition = {
            let mut rng = rand::thread_rng();
            machine::transition(row.as_ref(), &message, &self.policy, &mut rng)
        };

        let Some(Transition { instance, commands }) = transition else {
            debug!(
                "Ignoring {} for version {} in state {:?}",
                message.kind(),
                message.resource().version,
                previous
            );
            return;
        };

        if previous != Some(instance.state) {
            debug!(
                "Namespace sync {:?} -> {:?} (retry count {})",
                previous, instance.state, instance.retry_count
            );
        }

        *row = Some(instance);

        for command in commands {
            self.dispatch(command).await;
        }
    }

    async fn dispatch(&self, command: Command) {
        match command {
            Command::Deploy(deploy) => {
                debug!(
                    "Issuing {:?} deploy for version {}",
                    deploy.deploy_type, deploy.resource.version
                );
                // a lost command is recovered by the deploy timeout
                if let Err(e) = self.deploy_tx.send(deploy).await {
                    warn!("Deploy executor unavailable: {}", e);
                }
            }
            Command::ScheduleTimeout {
                token,
                delay,
                message,
            } => {
                self.scheduler.schedule_with_token(token, delay, message);
            }
            Command::CancelTimeout(token) => {
                self.scheduler.cancel(&token);
            }
            Command::Schedule { delay, message } => {
                debug!("Re-publishing {} in {:?}", message.kind(), delay);
                self.scheduler.schedule(delay, message);
            }
            Command::PublishFailed(failure) => {
                error!(
                    "Sync of namespace {} failed permanently: {} {}",
                    failure.resource.name, failure.status.code, failure.status.message
                );
                if self.failed_tx.send(failure).is_err() {
                    debug!("No observers for sync failures");
                }
            }
        }
    }
}
