// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Row store for sync instances with one exclusive lock per correlation id.

use crate::sync::state::SyncInstance;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

type Row = Arc<Mutex<Option<SyncInstance>>>;

/// Exclusive access to one row; the row is unlocked when the guard drops
pub type RowGuard = OwnedMutexGuard<Option<SyncInstance>>;

#[derive(Default)]
pub struct SagaStore {
    rows: Mutex<HashMap<Uuid, Row>>,
}

impl SagaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the row for `id`, creating an empty row on first access.
    ///
    /// Handlers for the same id queue up on the lock; other ids are not affected.
    pub async fn lock(&self, id: Uuid) -> RowGuard {
        let row = {
            let mut rows = self.rows.lock().await;
            Arc::clone(rows.entry(id).or_default())
        };
        row.lock_owned().await
    }

    /// Read a copy of the row, waiting for any handler holding it
    pub async fn get(&self, id: Uuid) -> Option<SyncInstance> {
        let row = {
            let rows = self.rows.lock().await;
            rows.get(&id).cloned()
        }?;
        let guard = row.lock().await;
        guard.clone()
    }
}
