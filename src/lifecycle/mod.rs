//! Test-resource lifecycle: tagging at creation, listing, bulk deletion
//!
//! The host commerce system owns the resources (orders); this module only
//! indexes the ones born during testing and deletes them by marker. The host
//! notifies creation through the [`ResourceCreatedHook`] trait and carries
//! out individual deletions through [`ResourceDeleter`], so both directions
//! stay pure message-passing boundaries with no concrete-type coupling.
//!
//! Resources move `Created` -> `Tagged` -> `Deleted`. Only tagged resources
//! are discoverable here, and deletion is terminal. Running a bulk delete
//! while a probe run is still creating resources is an ordering hazard this
//! module does not arbitrate; callers sequence runs and cleanup themselves.

use crate::domain::auth::Operator;
use crate::domain::types::ResourceId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A host-system resource as seen at creation time
#[derive(Clone, Debug, Serialize)]
pub struct TestResource {
    pub id: ResourceId,
    /// Coarse creation time reported by the host
    pub created_at: DateTime<Utc>,
    /// Microsecond creation time, written at tagging; keeps two resources
    /// born in the same race window distinguishable
    pub created_at_micros: i64,
    /// Set once the resource has been tagged as test data
    pub test_marker: bool,
}

impl TestResource {
    /// A freshly created, not-yet-tagged resource
    pub fn created(id: ResourceId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            created_at_micros: 0,
            test_marker: false,
        }
    }
}

/// Creation notification the host system delivers exactly once per resource,
/// synchronously at creation, while testing is enabled
pub trait ResourceCreatedHook: Send + Sync {
    fn on_resource_created(&self, resource: TestResource);
}

/// Failure of a single resource deletion on the host side
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("resource {0} not found")]
    NotFound(ResourceId),

    #[error("host deletion failed: {0}")]
    Host(String),
}

/// Host-side deletion of one resource.
///
/// Whether deletion cascades to related host records (line items, payment
/// records) is the implementor's contract, not this crate's.
#[async_trait]
pub trait ResourceDeleter: Send + Sync {
    async fn delete(&self, id: ResourceId) -> Result<(), DeleteError>;
}

/// Deleter that only logs; stands in until an embedder wires a real host
#[derive(Debug, Default)]
pub struct LogOnlyDeleter;

#[async_trait]
impl ResourceDeleter for LogOnlyDeleter {
    async fn delete(&self, id: ResourceId) -> Result<(), DeleteError> {
        info!(%id, "would delete test resource");
        Ok(())
    }
}

/// Result of one bulk deletion; the count reflects successes only
#[derive(Clone, Copy, Debug, Serialize)]
pub struct DeletionReport {
    pub deleted: usize,
}

#[derive(Clone, Copy, Debug)]
struct TaggedEntry {
    created_at: DateTime<Utc>,
    created_at_micros: i64,
}

/// Indexes tagged test resources and drives their bulk removal
pub struct LifecycleManager {
    enabled: bool,
    deleter: Arc<dyn ResourceDeleter>,
    index: Mutex<BTreeMap<ResourceId, TaggedEntry>>,
    // Memoized tagged-resource count; cleared whenever the index changes
    cached_count: Mutex<Option<usize>>,
}

impl LifecycleManager {
    pub fn new(enabled: bool, deleter: Arc<dyn ResourceDeleter>) -> Self {
        Self {
            enabled,
            deleter,
            index: Mutex::new(BTreeMap::new()),
            cached_count: Mutex::new(None),
        }
    }

    /// Every currently tagged resource id, ordered by creation instant
    /// (microsecond timestamp, then id). Deleted resources never appear.
    pub fn list_tagged(&self, _op: &Operator) -> Vec<ResourceId> {
        let index = self.index.lock();
        let mut entries: Vec<_> = index
            .iter()
            .map(|(id, entry)| (entry.created_at_micros, *id))
            .collect();
        entries.sort_unstable();
        entries.into_iter().map(|(_, id)| id).collect()
    }

    /// Count of tagged resources, memoized until the index next changes
    pub fn tagged_count(&self, _op: &Operator) -> usize {
        let mut cached = self.cached_count.lock();
        match *cached {
            Some(count) => count,
            None => {
                let count = self.index.lock().len();
                *cached = Some(count);
                count
            }
        }
    }

    /// Delete every tagged resource through the host deleter.
    ///
    /// Deletions are independent: one failure is logged, lowers the count,
    /// and never aborts the batch. The index is emptied either way (deletion
    /// is terminal, and a resource the host already lost is equally gone) and
    /// the cached count is invalidated. An immediate second call deletes 0
    /// with no error.
    pub async fn delete_all(&self, _op: &Operator) -> DeletionReport {
        let ids: Vec<ResourceId> = {
            let mut index = self.index.lock();
            let ids = index.keys().copied().collect();
            index.clear();
            ids
        };
        *self.cached_count.lock() = None;

        let mut deleted = 0;
        for id in ids {
            match self.deleter.delete(id).await {
                Ok(()) => deleted += 1,
                Err(error) => warn!(%id, %error, "test resource deletion failed"),
            }
        }

        info!(deleted, "bulk test-resource deletion complete");
        DeletionReport { deleted }
    }
}

impl ResourceCreatedHook for LifecycleManager {
    /// Tag a freshly created resource: record the marker and a microsecond
    /// timestamp. A no-op while testing is disabled.
    fn on_resource_created(&self, resource: TestResource) {
        if !self.enabled {
            return;
        }
        let entry = TaggedEntry {
            created_at: resource.created_at,
            created_at_micros: Utc::now().timestamp_micros(),
        };
        self.index.lock().insert(resource.id, entry);
        *self.cached_count.lock() = None;
        debug!(id = %resource.id, at = %entry.created_at, "test resource tagged");
    }
}
