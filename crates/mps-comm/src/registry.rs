//! Device registry
//!
//! Directory of bound stations, indexed by connection handle and by logical
//! station address. The registry is an owned value: construct one at startup
//! and pass it by reference; tests create as many as they like.
//!
//! All operations take a short-held mutex and never perform I/O.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use crate::connection::ConnectionState;
use crate::error::RegistryError;
use crate::handle::ConnectionHandle;
use crate::handler::StationHandler;
use crate::transport::Endpoint;

/// Identity and binding of one station
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    /// Connection handle
    pub handle: ConnectionHandle,
    /// Display name
    pub name: String,
    /// Network address and logical station address
    pub endpoint: Endpoint,
    /// Bound handler
    pub handler: StationHandler,
}

impl DeviceRecord {
    /// Logical station address
    pub fn address(&self) -> u16 {
        self.endpoint.address
    }
}

#[derive(Default)]
struct Inner {
    by_handle: HashMap<ConnectionHandle, DeviceRecord>,
    by_address: HashMap<u16, ConnectionHandle>,
}

/// Directory of bound stations
#[derive(Default)]
pub struct DeviceRegistry {
    inner: Mutex<Inner>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every mutation leaves both maps consistent before it can panic
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a record
    ///
    /// Fails without changing the registry if its handle or address is
    /// already bound.
    pub fn register(&self, record: DeviceRecord) -> Result<ConnectionHandle, RegistryError> {
        let mut inner = self.lock();
        let handle = record.handle;
        let address = record.address();
        if inner.by_handle.contains_key(&handle) {
            return Err(RegistryError::DuplicateHandle(handle));
        }
        if inner.by_address.contains_key(&address) {
            return Err(RegistryError::DuplicateAddress(address));
        }

        info!(
            "Registered {} '{}' at address {} (handle {})",
            record.handler.kind(),
            record.name,
            address,
            handle
        );
        inner.by_address.insert(address, handle);
        inner.by_handle.insert(handle, record);
        Ok(handle)
    }

    /// Remove a record; removing twice fails with `NotFound`
    pub fn unregister(&self, handle: ConnectionHandle) -> Result<DeviceRecord, RegistryError> {
        let mut inner = self.lock();
        let record = inner
            .by_handle
            .remove(&handle)
            .ok_or(RegistryError::NotFound)?;
        inner.by_address.remove(&record.address());
        debug!("Unregistered '{}' (handle {})", record.name, handle);
        Ok(record)
    }

    pub fn lookup_by_handle(&self, handle: ConnectionHandle) -> Result<DeviceRecord, RegistryError> {
        self.lock()
            .by_handle
            .get(&handle)
            .cloned()
            .ok_or(RegistryError::NotFound)
    }

    pub fn lookup_by_address(&self, address: u16) -> Result<DeviceRecord, RegistryError> {
        let inner = self.lock();
        inner
            .by_address
            .get(&address)
            .and_then(|handle| inner.by_handle.get(handle))
            .cloned()
            .ok_or(RegistryError::NotFound)
    }

    /// Look up a station by display name
    pub fn lookup_by_name(&self, name: &str) -> Result<DeviceRecord, RegistryError> {
        self.lock()
            .by_handle
            .values()
            .find(|record| record.name == name)
            .cloned()
            .ok_or(RegistryError::NotFound)
    }

    /// Snapshot of all records, ordered by address
    pub fn records(&self) -> Vec<DeviceRecord> {
        let mut records: Vec<DeviceRecord> = self.lock().by_handle.values().cloned().collect();
        records.sort_by_key(|record| record.address());
        records
    }

    /// Connection state of every station, by name, ordered by address
    pub fn states(&self) -> Vec<(String, ConnectionState)> {
        self.records()
            .into_iter()
            .map(|record| {
                let state = record.handler.link().connection_state();
                (record.name, state)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().by_handle.is_empty()
    }
}
