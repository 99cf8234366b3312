use crate::errors::PlannerError;
use crate::storage::Storage;
use crate::types::value::DataValue;
use crate::types::RecordRef;
use ahash::HashMap;
use itertools::Itertools;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inner {
    /// record type -> records in insertion order
    records: HashMap<String, Vec<RecordRef>>,
}

/// Keeps every record in memory. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, record_type: &str) -> usize {
        self.inner
            .lock()
            .records
            .get(record_type)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self, record_type: &str) -> bool {
        self.len(record_type) == 0
    }
}

impl Storage for InMemoryStorage {
    fn insert(&self, record: RecordRef) -> Result<(), PlannerError> {
        let primary_key = record
            .primary_key()
            .ok_or_else(|| PlannerError::PrimaryKeyNotFound(record.record_type().to_string()))?
            .clone();
        let mut inner = self.inner.lock();
        let records = inner
            .records
            .entry(record.record_type().to_string())
            .or_default();

        if records
            .iter()
            .any(|stored| stored.primary_key() == Some(&primary_key))
        {
            return Err(PlannerError::DuplicatePrimaryKey(primary_key.to_string()));
        }
        records.push(record);

        Ok(())
    }

    fn scan(&self, record_types: &[String]) -> Result<Vec<RecordRef>, PlannerError> {
        let inner = self.inner.lock();

        Ok(record_types
            .iter()
            .filter_map(|record_type| inner.records.get(record_type))
            .flatten()
            .cloned()
            .collect_vec())
    }

    fn delete(
        &self,
        record_type: &str,
        primary_key: &DataValue,
    ) -> Result<Option<RecordRef>, PlannerError> {
        let mut inner = self.inner.lock();
        let Some(records) = inner.records.get_mut(record_type) else {
            return Ok(None);
        };

        Ok(records
            .iter()
            .position(|record| record.primary_key() == Some(primary_key))
            .map(|position| records.remove(position)))
    }
}
