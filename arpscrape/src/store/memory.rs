//! In-memory record store.

use indexmap::IndexMap;

use super::{RecordStore, StoredAddress, sorted_rows};
use crate::error::StoreError;
use crate::extract::AddressRecord;

/// Store that lives only as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    rows: IndexMap<String, StoredAddress>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a row by hardware address.
    pub fn get(&self, hardware_address: &str) -> Option<&StoredAddress> {
        self.rows.get(hardware_address)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn upsert(&mut self, records: &[AddressRecord]) -> Result<usize, StoreError> {
        for record in records {
            self.rows
                .insert(record.hardware_address.clone(), StoredAddress::from(record));
        }
        Ok(records.len())
    }

    fn all(&self) -> Vec<StoredAddress> {
        sorted_rows(self.rows.values())
    }
}
