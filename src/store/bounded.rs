use std::sync::{Arc, Mutex};

use crate::error::StoreError;
use crate::metrics::MetricRecord;

use super::kv::{read_json_or_default, write_json};
use super::{KeyValueStore, METRICS_KEY};

/// Default number of records kept before the oldest are evicted.
pub const MAX_STORED_METRICS: usize = 1000;

/// Capacity-limited, insertion-ordered metric log persisted under
/// [`METRICS_KEY`].
///
/// Every `append` rewrites the whole sequence before returning. Appends from
/// the same process are serialized; appends from other processes sharing the
/// backend are last-writer-wins.
pub struct MetricStore {
    kv: Arc<dyn KeyValueStore>,
    capacity: usize,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for MetricStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricStore")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl MetricStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_capacity(kv, MAX_STORED_METRICS)
    }

    /// A zero capacity is bumped to one so the latest record always survives.
    #[must_use]
    pub fn with_capacity(kv: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            kv,
            capacity: capacity.max(1),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends one record at the tail and evicts from the head while over
    /// capacity.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read or written; the
    /// persisted sequence is left untouched in that case.
    pub fn append(&self, record: &MetricRecord) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_poisoned| StoreError::Poisoned {
                context: "metric append",
            })?;
        let mut records: Vec<MetricRecord> = read_json_or_default(self.kv.as_ref(), METRICS_KEY)?;
        records.push(record.clone());
        let overflow = records.len().saturating_sub(self.capacity);
        if overflow > 0 {
            records = records.split_off(overflow);
            tracing::debug!("Evicted {} oldest metric records", overflow);
        }
        write_json(self.kv.as_ref(), METRICS_KEY, &records)
    }

    /// Returns an owned copy of every stored record, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read. Corrupted content
    /// reads as an empty store.
    pub fn read_all(&self) -> Result<Vec<MetricRecord>, StoreError> {
        read_json_or_default(self.kv.as_ref(), METRICS_KEY)
    }

    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    pub fn len(&self) -> Result<usize, StoreError> {
        self.read_all().map(|records| records.len())
    }

    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.len().map(|len| len == 0)
    }

    /// Drops every stored record.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    pub fn clear(&self) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_poisoned| StoreError::Poisoned {
                context: "metric clear",
            })?;
        self.kv.remove(METRICS_KEY)
    }
}
