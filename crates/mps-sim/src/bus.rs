//! Simulated field bus
//!
//! A [`SimBus`] holds the virtual stations of a plant, keyed by logical
//! address, and hands out a [`SimConnector`] that station workers dial into
//! like they would into a PLC. Failures can be injected per station to drive
//! the reconnect path.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use mps_comm::{CommConfig, CommError, Connector, Endpoint, RegisterTransport};
use mps_protocol::StationStatus;
use tracing::{debug, info};

use crate::station::{VirtualStation, VirtualStationConfig, DEFAULT_SETTLE_READS};

#[derive(Default)]
struct BusState {
    stations: HashMap<u16, VirtualStation>,
    refused: HashSet<u16>,
    fail_next: HashMap<u16, CommError>,
    latency: Duration,
    connects: usize,
}

/// Shared set of virtual stations
#[derive(Clone, Default)]
pub struct SimBus {
    state: Arc<Mutex<BusState>>,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// One virtual station per configured station
    pub fn from_config(config: &CommConfig) -> Self {
        let bus = Self::new();
        for station in &config.stations {
            bus.add_station(VirtualStation::from_config(VirtualStationConfig {
                name: station.name.clone(),
                kind: station.kind,
                address: station.address,
                settle_reads: DEFAULT_SETTLE_READS,
            }));
        }
        bus
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a station, replacing any station at the same address
    pub fn add_station(&self, station: VirtualStation) -> Option<VirtualStation> {
        info!("Simulating {}", station.state_summary());
        self.lock().stations.insert(station.address(), station)
    }

    /// Remove a station; open transports to it fail from now on
    pub fn remove_station(&self, address: u16) -> Option<VirtualStation> {
        self.lock().stations.remove(&address)
    }

    /// Run `f` against the station at `address`
    pub fn with_station<R>(
        &self,
        address: u16,
        f: impl FnOnce(&mut VirtualStation) -> R,
    ) -> Option<R> {
        self.lock().stations.get_mut(&address).map(f)
    }

    /// Current status event of a station
    pub fn status(&self, address: u16) -> Option<StationStatus> {
        self.with_station(address, |station| station.status())
    }

    /// Addresses of all stations, ascending
    pub fn addresses(&self) -> Vec<u16> {
        let mut addresses: Vec<u16> = self.lock().stations.keys().copied().collect();
        addresses.sort_unstable();
        addresses
    }

    /// Refuse new connections to a station
    pub fn refuse_connections(&self, address: u16, refuse: bool) {
        let mut state = self.lock();
        if refuse {
            state.refused.insert(address);
        } else {
            state.refused.remove(&address);
        }
    }

    /// Fail the next register operation on a station with `error`
    pub fn fail_next(&self, address: u16, error: CommError) {
        self.lock().fail_next.insert(address, error);
    }

    /// Delay applied to every register operation
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Number of successful connects so far
    pub fn connects(&self) -> usize {
        self.lock().connects
    }

    pub fn connector(&self) -> SimConnector {
        SimConnector { bus: self.clone() }
    }

    async fn operate<R>(
        &self,
        address: u16,
        f: impl FnOnce(&mut VirtualStation) -> R,
    ) -> Result<R, CommError> {
        let latency = self.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.lock();
        if let Some(error) = state.fail_next.remove(&address) {
            debug!("Injecting failure on station {}: {}", address, error);
            return Err(error);
        }
        state
            .stations
            .get_mut(&address)
            .map(f)
            .ok_or_else(|| CommError::IoFailure(format!("station {address} is gone")))
    }
}

/// [`Connector`] dialing into a [`SimBus`]
#[derive(Clone)]
pub struct SimConnector {
    bus: SimBus,
}

#[async_trait]
impl Connector for SimConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn RegisterTransport>, CommError> {
        let mut state = self.bus.lock();
        if state.refused.contains(&endpoint.address)
            || !state.stations.contains_key(&endpoint.address)
        {
            return Err(CommError::ConnectionRefused(endpoint.to_string()));
        }
        state.connects += 1;
        debug!("Simulated connect to {}", endpoint);
        Ok(Box::new(SimTransport {
            address: endpoint.address,
            bus: self.bus.clone(),
            open: true,
        }))
    }
}

/// Register transport to one virtual station
pub struct SimTransport {
    address: u16,
    bus: SimBus,
    open: bool,
}

impl SimTransport {
    fn check_open(&self) -> Result<(), CommError> {
        if self.open {
            Ok(())
        } else {
            Err(CommError::NotConnected)
        }
    }
}

#[async_trait]
impl RegisterTransport for SimTransport {
    async fn write_registers(&mut self, start: u16, words: &[u16]) -> Result<(), CommError> {
        self.check_open()?;
        // The PLC acknowledges any write; a bad frame shows up in the status
        let _ = self
            .bus
            .operate(self.address, |station| station.write_registers(start, words))
            .await?;
        Ok(())
    }

    async fn read_registers(&mut self, start: u16, count: u16) -> Result<Vec<u16>, CommError> {
        self.check_open()?;
        self.bus
            .operate(self.address, |station| station.read_registers(start, count))
            .await
    }

    async fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mps_protocol::band::BandCommand;
    use mps_protocol::{encode_command, MessageHeader, StationCommand, StationKind};

    fn endpoint(address: u16) -> Endpoint {
        Endpoint::new("sim", 502, address)
    }

    fn run_words() -> Vec<u16> {
        encode_command(
            &StationCommand::Band(BandCommand::Run),
            &MessageHeader::new(0, 1),
        )
    }

    #[tokio::test]
    async fn test_connect_requires_station() {
        let bus = SimBus::new();
        let connector = bus.connector();
        assert!(matches!(
            connector.connect(&endpoint(1)).await,
            Err(CommError::ConnectionRefused(_))
        ));

        bus.add_station(VirtualStation::new("C-CS", StationKind::Band, 1));
        assert!(connector.connect(&endpoint(1)).await.is_ok());
        assert_eq!(bus.connects(), 1);
    }

    #[tokio::test]
    async fn test_refused_station() {
        let bus = SimBus::new();
        bus.add_station(VirtualStation::new("C-CS", StationKind::Band, 1));
        bus.refuse_connections(1, true);
        assert!(bus.connector().connect(&endpoint(1)).await.is_err());

        bus.refuse_connections(1, false);
        assert!(bus.connector().connect(&endpoint(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_write_reaches_station() {
        let bus = SimBus::new();
        bus.add_station(VirtualStation::new("C-CS", StationKind::Band, 1));
        let mut transport = bus.connector().connect(&endpoint(1)).await.unwrap();

        transport.write_registers(0, &run_words()).await.unwrap();
        let commands = bus
            .with_station(1, |station| station.take_commands())
            .unwrap();
        assert_eq!(commands, vec![StationCommand::Band(BandCommand::Run)]);
    }

    #[tokio::test]
    async fn test_injected_failure_hits_once() {
        let bus = SimBus::new();
        bus.add_station(VirtualStation::new("C-CS", StationKind::Band, 1));
        let mut transport = bus.connector().connect(&endpoint(1)).await.unwrap();

        bus.fail_next(1, CommError::IoFailure("noise".into()));
        assert_eq!(
            transport.read_registers(0, 2).await,
            Err(CommError::IoFailure("noise".into()))
        );
        assert_eq!(transport.read_registers(0, 2).await, Ok(vec![0, 0]));
    }

    #[tokio::test]
    async fn test_removed_station_fails_io() {
        let bus = SimBus::new();
        bus.add_station(VirtualStation::new("C-CS", StationKind::Band, 1));
        let mut transport = bus.connector().connect(&endpoint(1)).await.unwrap();

        bus.remove_station(1);
        assert!(matches!(
            transport.read_registers(0, 2).await,
            Err(CommError::IoFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_closed_transport_is_not_connected() {
        let bus = SimBus::new();
        bus.add_station(VirtualStation::new("C-CS", StationKind::Band, 1));
        let mut transport = bus.connector().connect(&endpoint(1)).await.unwrap();

        transport.close().await;
        assert_eq!(
            transport.write_registers(0, &run_words()).await,
            Err(CommError::NotConnected)
        );
    }
}
