//! JSON file backed record store.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;

use super::{RecordStore, StoredAddress, sorted_rows};
use crate::error::StoreError;
use crate::extract::AddressRecord;

/// Store persisted as a JSON array of rows.
///
/// The whole file is rewritten on every upsert: written to a sibling temp
/// file, then renamed over the original.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    rows: IndexMap<String, StoredAddress>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing or empty file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let rows = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => IndexMap::new(),
            Ok(text) => {
                let rows: Vec<StoredAddress> =
                    serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                        path: path.clone(),
                        source,
                    })?;
                rows.into_iter()
                    .map(|row| (row.hardware_address.clone(), row))
                    .collect()
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => IndexMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        debug!("opened {} with {} rows", path.display(), rows.len());
        Ok(Self { path, rows })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write every row to disk.
    fn persist(&self) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(&self.all())?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let mut temp = OsString::from(self.path.as_os_str());
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        fs::write(&temp, data).map_err(|source| self.io_error(source))?;
        if let Err(source) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(self.io_error(source));
        }
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordStore for JsonFileStore {
    fn upsert(&mut self, records: &[AddressRecord]) -> Result<usize, StoreError> {
        for record in records {
            self.rows
                .insert(record.hardware_address.clone(), StoredAddress::from(record));
        }
        self.persist()?;
        debug!("wrote {} records to {}", records.len(), self.path.display());
        Ok(records.len())
    }

    fn all(&self) -> Vec<StoredAddress> {
        sorted_rows(self.rows.values())
    }
}
