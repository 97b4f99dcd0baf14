//! MPS Station Tester
//!
//! Binds the configured stations, runs one action against them and shuts the
//! workers down again. With `--simulate` the stations are virtual.

mod args;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use mps_comm::{
    CommConfig, ConfigError, ConnectionState, Connector, DeviceRecord, DeviceRegistry,
    ModbusTcpConnector, RegistryError, StationConfig, StationError, Supervisor,
};
use mps_protocol::StationKind;
use mps_sim::SimBus;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::{Action, Cli};

#[derive(Debug, Error)]
enum TesterError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("no station named or addressed '{0}'")]
    UnknownStation(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Station(#[from] StationError),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mps_tester=info,mps_protocol=info,mps_comm=info,mps_sim=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    run(cli).await?;
    Ok(())
}

async fn run(cli: Cli) -> Result<(), TesterError> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => CommConfig::default_path()?,
    };

    if let Action::InitConfig { host } = &cli.action {
        let config = default_plant(host);
        config.save(&path)?;
        println!("Wrote {} stations to {}", config.stations.len(), path.display());
        return Ok(());
    }

    let config = load_config(&path, cli.simulate)?;
    let connector: Arc<dyn Connector> = if cli.simulate {
        info!("Simulating {} stations", config.stations.len());
        Arc::new(SimBus::from_config(&config).connector())
    } else {
        Arc::new(ModbusTcpConnector)
    };

    let registry = Arc::new(DeviceRegistry::new());
    let supervisor = Supervisor::new(Arc::clone(&registry), connector, config)?;
    supervisor.bind_all()?;

    let result = execute(&cli, &registry).await;
    supervisor.shutdown().await;
    result
}

fn load_config(path: &Path, simulate: bool) -> Result<CommConfig, TesterError> {
    match CommConfig::load(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::Io(e)) if simulate && e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{} not found, simulating the default plant", path.display());
            Ok(default_plant("sim"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Config with one station of each kind
fn default_plant(host: &str) -> CommConfig {
    let station = |name: &str, kind: StationKind, address: u16| StationConfig {
        name: name.to_string(),
        kind,
        host: host.to_string(),
        port: 502,
        address,
    };
    CommConfig {
        stations: vec![
            station("C-CS", StationKind::Band, 1),
            station("C-DS", StationKind::Deliver, 2),
            station("C-BS", StationKind::IncomingStation, 3),
            station("C-RS1", StationKind::PickPlace1, 4),
            station("C-RS2", StationKind::PickPlace2, 5),
        ],
        ..CommConfig::default()
    }
}

fn find_station(registry: &DeviceRegistry, station: &str) -> Result<DeviceRecord, TesterError> {
    let found = match station.parse::<u16>() {
        Ok(address) => registry.lookup_by_address(address),
        Err(_) => registry.lookup_by_name(station),
    };
    match found {
        Ok(record) => Ok(record),
        Err(RegistryError::NotFound) => Err(TesterError::UnknownStation(station.to_string())),
        Err(e) => Err(e.into()),
    }
}

async fn wait_connected(record: &DeviceRecord, timeout: Duration) {
    let mut state = record.handler.link().watch_state();
    let connected =
        tokio::time::timeout(timeout, state.wait_for(|s| *s == ConnectionState::Connected)).await;
    if !matches!(connected, Ok(Ok(_))) {
        warn!(
            "'{}' did not connect within {:?}, trying anyway",
            record.name, timeout
        );
    }
}

async fn execute(cli: &Cli, registry: &DeviceRegistry) -> Result<(), TesterError> {
    let record = match cli.action.station() {
        Some(station) => {
            let record = find_station(registry, station)?;
            wait_connected(&record, Duration::from_secs(cli.connect_timeout)).await;
            Some(record)
        }
        None => None,
    };
    let handler = record.as_ref().map(|r| &r.handler);

    match (&cli.action, handler) {
        (Action::States, _) => {
            let deadline = tokio::time::Instant::now() + Duration::from_secs(cli.connect_timeout);
            for record in registry.records() {
                let mut state = record.handler.link().watch_state();
                let _ = tokio::time::timeout_at(
                    deadline,
                    state.wait_for(|s| *s == ConnectionState::Connected),
                )
                .await;
            }
            for (name, state) in registry.states() {
                println!("{name:<8} {state}");
            }
        }
        (Action::Watch, _) => watch(registry).await,
        (Action::Status { .. }, Some(h)) => {
            println!("{:?}", h.link().status().await?);
        }
        (Action::Reset { .. }, Some(h)) => h.link().reset().await?,
        (Action::Identify { .. }, Some(h)) => h.link().identify().await?,
        (
            Action::Light {
                color,
                state,
                seconds,
                ..
            },
            Some(h),
        ) => {
            h.link()
                .set_light(
                    (*color).into(),
                    (*state).into(),
                    Duration::from_secs(*seconds),
                )
                .await?
        }
        (Action::ResetLights { .. }, Some(h)) => h.link().reset_lights().await?,
        (Action::RunBand { .. }, Some(h)) => h.as_band()?.run().await?,
        (Action::Deliver { lane, .. }, Some(h)) => h.as_deliver()?.deliver(*lane).await?,
        (Action::GetCap { color, side, .. }, Some(h)) => {
            h.as_incoming()?
                .get_cap((*color).into(), (*side).into())
                .await?
        }
        (Action::CapReady { .. }, Some(h)) => {
            println!("{}", h.as_incoming()?.cap_ready().await?);
        }
        (Action::ProduceEnd { .. }, Some(h)) => h.as_pick_place_1()?.produce_end().await?,
        (Action::ProduceRing { ring, .. }, Some(h)) => {
            h.as_pick_place_2()?.produce_ring((*ring).into()).await?
        }
        (Action::InitConfig { .. }, _) | (_, None) => {}
    }
    Ok(())
}

/// Print events of every station until Ctrl-C
async fn watch(registry: &DeviceRegistry) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    for record in registry.records() {
        let mut events = record.handler.link().subscribe();
        let tx = tx.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Dropped {} events", n);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
    drop(tx);

    info!("Watching {} stations, Ctrl-C to stop", registry.len());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => match event {
                Some(event) => println!("{event:?}"),
                None => break,
            },
        }
    }
}
