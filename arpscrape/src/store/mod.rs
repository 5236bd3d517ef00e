//! Persistence for address records.
//!
//! Rows are keyed by hardware address with replace-on-conflict semantics:
//! the last write for a hardware address wins, no history is kept.

mod json;
mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::extract::AddressRecord;

/// A persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAddress {
    /// Primary key.
    pub hardware_address: String,

    /// Last network address seen for this hardware address.
    pub network_address: String,

    /// Sort key derived from `network_address`.
    pub order_key: String,

    /// Collection time of the last write.
    pub updated_at: DateTime<Utc>,
}

impl From<&AddressRecord> for StoredAddress {
    fn from(record: &AddressRecord) -> Self {
        Self {
            hardware_address: record.hardware_address.clone(),
            network_address: record.network_address.clone(),
            order_key: record.order_key.clone(),
            updated_at: record.observed_at,
        }
    }
}

/// Durable home for address records.
pub trait RecordStore {
    /// Insert or replace rows keyed by hardware address, in order.
    ///
    /// Returns the number of rows written.
    fn upsert(&mut self, records: &[AddressRecord]) -> Result<usize, StoreError>;

    /// All rows ordered by `order_key`.
    fn all(&self) -> Vec<StoredAddress>;
}

/// Rows sorted the way [`RecordStore::all`] promises.
pub(crate) fn sorted_rows<'a>(rows: impl Iterator<Item = &'a StoredAddress>) -> Vec<StoredAddress> {
    let mut rows: Vec<_> = rows.cloned().collect();
    rows.sort_by(|a, b| {
        a.order_key
            .cmp(&b.order_key)
            .then_with(|| a.hardware_address.cmp(&b.hardware_address))
    });
    rows
}
