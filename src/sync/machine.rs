// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Transition table of the namespace sync state machine.
//!
//! `transition` is a pure function of the current row and an incoming
//! message. It returns the next row together with the commands the runtime
//! must carry out, or `None` when the message is ignored.

use crate::constants;
use crate::scheduler::TimerToken;
use crate::sync::backoff;
use crate::sync::state::{Snapshot, SyncInstance, SyncState};
use crate::types::{
    DeployCommand, DeployFailure, DeployMessage, DeployType, Status, SyncFailed, SyncMessage,
};
use rand::Rng;
use std::time::Duration;

/// Timeouts and retry budget applied to every sync instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Time a deploy may take before it is treated as failed
    pub deploy_timeout: Duration,
    /// Base delay of the exponential retry backoff
    pub retry_base: Duration,
    /// Delay before a request received while syncing is re-evaluated
    pub redeliver_delay: Duration,
    /// Failures tolerated before the sync is reported as failed
    pub max_retries: u32,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            deploy_timeout: Duration::from_secs(constants::sync::DEPLOY_TIMEOUT_SECS),
            retry_base: Duration::from_secs(constants::sync::RETRY_BASE_SECS),
            redeliver_delay: Duration::from_secs(constants::sync::REDELIVER_DELAY_SECS),
            max_retries: constants::sync::MAX_RETRIES,
        }
    }
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Hand the snapshot to the deploy executor
    Deploy(DeployCommand),
    /// Schedule the deploy timeout under the token stored on the instance
    ScheduleTimeout {
        token: TimerToken,
        delay: Duration,
        message: SyncMessage,
    },
    CancelTimeout(TimerToken),
    /// Deliver a message back to the orchestrator later
    Schedule { delay: Duration, message: SyncMessage },
    /// Report a sync that ran out of retries
    PublishFailed(SyncFailed),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub instance: SyncInstance,
    pub commands: Vec<Command>,
}

pub fn transition<R: Rng + ?Sized>(
    current: Option<&SyncInstance>,
    message: &SyncMessage,
    policy: &SyncPolicy,
    rng: &mut R,
) -> Option<Transition> {
    let Some(instance) = current else {
        return match message {
            SyncMessage::SyncRequest(request) => Some(start_deploy(
                SyncInstance::new(request.resource.id),
                request,
                policy,
                Vec::new(),
            )),
            _ => None,
        };
    };

    match instance.state {
        SyncState::Deleted => None,
        SyncState::Synced | SyncState::SyncError => on_idle(instance, message, policy),
        SyncState::Syncing => on_syncing(instance, message, policy, rng),
    }
}

fn on_idle(
    instance: &SyncInstance,
    message: &SyncMessage,
    policy: &SyncPolicy,
) -> Option<Transition> {
    let (request, fresh) = match message {
        SyncMessage::SyncRequest(request) => (request, true),
        SyncMessage::SyncRetry(request) => (request, false),
        _ => return None,
    };

    if !instance.is_newer(&request.resource) {
        return None;
    }
    if fresh && !instance.is_past_failure(&request.resource) {
        return None;
    }

    let mut next = instance.clone();
    let mut commands = Vec::new();

    // a retry keeps counting towards the budget of the attempt it belongs to
    if fresh {
        next.retry_count = 0;
        next.error_status = None;
        next.failed = None;
    }

    if let Some(token) = next.pending_timeout.take() {
        commands.push(Command::CancelTimeout(token));
    }

    Some(start_deploy(next, request, policy, commands))
}

fn on_syncing<R: Rng + ?Sized>(
    instance: &SyncInstance,
    message: &SyncMessage,
    policy: &SyncPolicy,
    rng: &mut R,
) -> Option<Transition> {
    match message {
        SyncMessage::SyncRequest(request) | SyncMessage::SyncRetry(request) => {
            if !instance.is_newer(&request.resource) {
                return None;
            }

            // the deploy in flight cannot be cancelled, look again once it settles
            Some(Transition {
                instance: instance.clone(),
                commands: vec![Command::Schedule {
                    delay: policy.redeliver_delay,
                    message: message.clone(),
                }],
            })
        }
        SyncMessage::DeployCompleted(completed) if instance.is_in_flight(&completed.resource) => {
            Some(complete(instance, completed))
        }
        SyncMessage::DeployFailed(failure) if instance.is_in_flight(&failure.resource) => {
            Some(fail(instance, failure, policy, rng))
        }
        SyncMessage::DeployTimeout(timeout) if instance.is_in_flight(&timeout.resource) => {
            Some(fail(
                instance,
                &timeout.failed(Status::request_timeout()),
                policy,
                rng,
            ))
        }
        _ => None,
    }
}

fn start_deploy(
    mut instance: SyncInstance,
    request: &DeployMessage,
    policy: &SyncPolicy,
    mut commands: Vec<Command>,
) -> Transition {
    let token = TimerToken::new();

    instance.state = SyncState::Syncing;
    instance.in_sync = Some(Snapshot::from(&request.resource));
    instance.pending_timeout = Some(token.clone());

    commands.push(Command::Deploy(request.restamped()));
    commands.push(Command::ScheduleTimeout {
        token,
        delay: policy.deploy_timeout,
        message: SyncMessage::DeployTimeout(request.restamped()),
    });

    Transition { instance, commands }
}

fn complete(instance: &SyncInstance, completed: &DeployMessage) -> Transition {
    let mut next = instance.clone();
    let mut commands = Vec::new();

    if let Some(token) = next.pending_timeout.take() {
        commands.push(Command::CancelTimeout(token));
    }

    next.synced = Some(Snapshot::from(&completed.resource));
    next.in_sync = None;
    next.failed = None;
    next.retry_count = 0;
    next.error_status = None;
    next.state = match completed.deploy_type {
        DeployType::Apply => SyncState::Synced,
        DeployType::Delete => SyncState::Deleted,
    };

    Transition {
        instance: next,
        commands,
    }
}

fn fail<R: Rng + ?Sized>(
    instance: &SyncInstance,
    failure: &DeployFailure,
    policy: &SyncPolicy,
    rng: &mut R,
) -> Transition {
    let mut next = instance.clone();
    let mut commands = Vec::new();

    // also on the timeout path: the token that fired may not be the pending one
    if let Some(token) = next.pending_timeout.take() {
        commands.push(Command::CancelTimeout(token));
    }

    next.retry_count = next.retry_count.saturating_add(1);
    next.error_status = Some(failure.status.clone());
    next.failed = next.in_sync.take();
    next.state = SyncState::SyncError;

    if next.retry_count > policy.max_retries {
        commands.push(Command::PublishFailed(failure.restamped()));

        // an unconfirmed delete has no safer end state than absence
        if failure.deploy_type == DeployType::Delete {
            next.state = SyncState::Deleted;
        }
    } else {
        commands.push(Command::Schedule {
            delay: backoff::retry_delay(policy.retry_base, next.retry_count, rng),
            message: SyncMessage::SyncRetry(DeployMessage::new(
                failure.deploy_type,
                failure.resource.clone(),
            )),
        });
    }

    Transition {
        instance: next,
        commands,
    }
}
