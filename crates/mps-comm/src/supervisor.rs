//! Binding configured stations and tearing them down
//!
//! The [`Supervisor`] spawns one worker per station, registers its handler
//! and keeps the worker's stop handle. On shutdown every worker is stopped
//! and awaited before the registry is emptied.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::config::{CommConfig, StationConfig};
use crate::error::{ConfigError, RegistryError};
use crate::handle::ConnectionHandle;
use crate::handler::StationHandler;
use crate::registry::{DeviceRecord, DeviceRegistry};
use crate::transport::Connector;
use crate::worker::{StationTask, StationWorker};

/// Owns the station workers of one registry
pub struct Supervisor {
    registry: Arc<DeviceRegistry>,
    connector: Arc<dyn Connector>,
    config: CommConfig,
    tasks: Mutex<HashMap<ConnectionHandle, StationTask>>,
}

impl Supervisor {
    /// Fails if `config` does not validate; nothing is bound yet
    pub fn new(
        registry: Arc<DeviceRegistry>,
        connector: Arc<dyn Connector>,
        config: CommConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry,
            connector,
            config,
            tasks: Mutex::new(HashMap::new()),
        })
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &CommConfig {
        &self.config
    }

    /// Register a station and start its worker
    ///
    /// Must be called from within a tokio runtime. Nothing is spawned if the
    /// registry rejects the station.
    pub fn bind(&self, station: &StationConfig) -> Result<ConnectionHandle, RegistryError> {
        let (worker, link, stop) =
            StationWorker::new(station, &self.config, Arc::clone(&self.connector));
        let record = DeviceRecord {
            handle: ConnectionHandle::next(),
            name: station.name.clone(),
            endpoint: station.endpoint(),
            handler: StationHandler::bind(link),
        };
        let handle = self.registry.register(record)?;

        let task = worker.spawn(stop);
        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(handle, task);
        Ok(handle)
    }

    /// Bind every station of the config
    pub fn bind_all(&self) -> Result<Vec<ConnectionHandle>, RegistryError> {
        self.config
            .stations
            .iter()
            .map(|station| self.bind(station))
            .collect()
    }

    /// Unregister a station and stop its worker
    pub async fn unbind(&self, handle: ConnectionHandle) -> Result<DeviceRecord, RegistryError> {
        let record = self.registry.unregister(handle)?;
        let task = self
            .tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&handle);
        if let Some(task) = task {
            task.stop().await;
        }
        Ok(record)
    }

    /// Stop every worker, then empty the registry
    pub async fn shutdown(&self) {
        let tasks: Vec<(ConnectionHandle, StationTask)> = self
            .tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .drain()
            .collect();
        info!("Stopping {} station workers", tasks.len());

        for (_, task) in tasks {
            task.stop().await;
        }
        for record in self.registry.records() {
            let _ = self.registry.unregister(record.handle);
        }
        info!("Station communication shut down");
    }
}
