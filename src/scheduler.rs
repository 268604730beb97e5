// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Delayed delivery of sync messages with cancellation.
//!
//! The `DelayQueue` keeps a timer heap keyed by token and delivers due
//! messages into the orchestrator inbox. Delivery is at-least-once from the
//! orchestrator's point of view: a cancel racing a due timer may lose, and
//! the orchestrator guards against late or duplicate messages itself.

use crate::types::SyncMessage;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identifies one scheduled message
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(Uuid);

impl TimerToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimerToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TimerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Delayed delivery of messages back to the orchestrator
pub trait Scheduler: Send + Sync + 'static {
    /// Schedule under a caller-chosen token, replacing any entry with the same token
    fn schedule_with_token(&self, token: TimerToken, delay: Duration, message: SyncMessage);

    /// Cancel a scheduled message; unknown or already fired tokens are ignored
    fn cancel(&self, token: &TimerToken);

    fn schedule(&self, delay: Duration, message: SyncMessage) -> TimerToken {
        let token = TimerToken::new();
        self.schedule_with_token(token.clone(), delay, message);
        token
    }
}

enum Control {
    Schedule {
        token: TimerToken,
        due: Instant,
        message: SyncMessage,
    },
    Cancel(TimerToken),
}

/// Timer heap delivering due messages to a channel
pub struct DelayQueue {
    control_rx: mpsc::UnboundedReceiver<Control>,
    target: mpsc::Sender<SyncMessage>,
    /// Pending entries by token, with the instant they are due
    pending: HashMap<TimerToken, (Instant, SyncMessage)>,
    /// Due instants; entries whose token was cancelled or rescheduled are skipped lazily
    queue: BinaryHeap<Reverse<(Instant, u64, TimerToken)>>,
    sequence: u64,
}

/// Handle to schedule and cancel messages on the DelayQueue
#[derive(Clone)]
pub struct DelayQueueHandle {
    control_tx: mpsc::UnboundedSender<Control>,
}

impl Scheduler for DelayQueueHandle {
    fn schedule_with_token(&self, token: TimerToken, delay: Duration, message: SyncMessage) {
        let due = Instant::now() + delay;
        if self
            .control_tx
            .send(Control::Schedule {
                token,
                due,
                message,
            })
            .is_err()
        {
            warn!("DelayQueue stopped, dropping scheduled message");
        }
    }

    fn cancel(&self, token: &TimerToken) {
        if self.control_tx.send(Control::Cancel(token.clone())).is_err() {
            debug!("DelayQueue stopped, nothing to cancel for {}", token);
        }
    }
}

impl DelayQueue {
    pub fn new(target: mpsc::Sender<SyncMessage>) -> (Self, DelayQueueHandle) {
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let queue = Self {
            control_rx,
            target,
            pending: HashMap::new(),
            queue: BinaryHeap::new(),
            sequence: 0,
        };

        (queue, DelayQueueHandle { control_tx })
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("DelayQueue started");

        loop {
            let next_due = self.queue.peek().map(|Reverse((due, _, _))| *due);
            let wait = async move {
                match next_due {
                    Some(due) => sleep_until(due).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                control = self.control_rx.recv() => match control {
                    Some(control) => self.apply(control),
                    None => break,
                },
                _ = wait => {
                    if !self.fire_due().await {
                        break;
                    }
                }
            }
        }

        info!("DelayQueue stopped with {} pending messages", self.pending.len());
        Ok(())
    }

    fn apply(&mut self, control: Control) {
        match control {
            Control::Schedule {
                token,
                due,
                message,
            } => {
                debug!("Scheduling {} as {}", message.kind(), token);
                self.sequence = self.sequence.wrapping_add(1);
                self.queue.push(Reverse((due, self.sequence, token.clone())));
                self.pending.insert(token, (due, message));
            }
            Control::Cancel(token) => {
                if self.pending.remove(&token).is_some() {
                    debug!("Cancelled {}", token);
                }
            }
        }
    }

    /// Deliver every due message; false once the target is gone
    async fn fire_due(&mut self) -> bool {
        let now = Instant::now();

        while let Some(Reverse((due, _, _))) = self.queue.peek() {
            if *due > now {
                break;
            }
            let Some(Reverse((due, _, token))) = self.queue.pop() else {
                break;
            };

            let is_current = self
                .pending
                .get(&token)
                .is_some_and(|(pending_due, _)| *pending_due == due);
            if !is_current {
                continue;
            }

            if let Some((_, message)) = self.pending.remove(&token) {
                debug!("Delivering {} for {}", message.kind(), token);
                if self.target.send(message).await.is_err() {
                    warn!("Orchestrator inbox closed, stopping DelayQueue");
                    return false;
                }
            }
        }

        true
    }
}
