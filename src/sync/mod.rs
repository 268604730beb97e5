// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace synchronization: state machine, row store and runtime.

pub mod backoff;
pub mod machine;
pub mod orchestrator;
pub mod state;
pub mod store;

pub use machine::{transition, Command, SyncPolicy, Transition};
pub use orchestrator::{OrchestratorHandle, SyncOrchestrator};
pub use state::{Snapshot, SyncInfo, SyncInstance, SyncState};
pub use store::SagaStore;
