//! Per-station worker task
//!
//! One task owns each [`StationConnection`]. It serves queued requests one at
//! a time, polls the status region on a fixed period and drives reconnects
//! with backoff. Since the register protocol has no request/response
//! correlation, everything touching a connection goes through its worker.
//!
//! # Shutdown
//!
//! When stopped, the worker finishes the request in flight, answers every
//! request still queued with [`StationError::Closed`], closes its transport
//! and exits.

use std::sync::Arc;
use std::time::Duration;

use mps_protocol::{decode_status, StationKind, StationStatus};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{CommConfig, StationConfig};
use crate::connection::{ConnectionState, StationConnection};
use crate::error::{CommError, StationError};
use crate::events::StationEvent;
use crate::link::StationLink;
use crate::reconnect::ReconnectPolicy;
use crate::transport::Connector;

/// Capacity of each station's event channel
const EVENT_CAPACITY: usize = 64;

/// Request queued to a station worker
#[derive(Debug)]
pub(crate) enum Request {
    /// Write holding registers
    Write {
        start: u16,
        words: Vec<u16>,
        reply: oneshot::Sender<Result<(), StationError>>,
    },
    /// Read input registers
    Read {
        start: u16,
        count: u16,
        reply: oneshot::Sender<Result<Vec<u16>, StationError>>,
    },
}

impl Request {
    fn reject(self, error: StationError) {
        match self {
            Request::Write { reply, .. } => {
                let _ = reply.send(Err(error));
            }
            Request::Read { reply, .. } => {
                let _ = reply.send(Err(error));
            }
        }
    }
}

/// Stop signal and join handle of a spawned worker
pub struct StationTask {
    stop: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl StationTask {
    /// Signal the worker and wait for it to exit
    pub async fn stop(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.join.await {
            warn!("Station worker ended abnormally: {}", e);
        }
    }
}

/// The worker side of one station
pub struct StationWorker {
    kind: StationKind,
    address: u16,
    connection: StationConnection,
    requests: mpsc::Receiver<Request>,
    stop: oneshot::Receiver<()>,
    events: broadcast::Sender<StationEvent>,
    policy: ReconnectPolicy,
    poll_interval: Duration,
    reconnect_at: Option<Instant>,
    last_state: ConnectionState,
    last_status: Option<StationStatus>,
}

impl StationWorker {
    /// Create a worker and the link handlers use to reach it
    ///
    /// Nothing runs until [`spawn`](Self::spawn) is called.
    pub fn new(
        station: &StationConfig,
        config: &CommConfig,
        connector: Arc<dyn Connector>,
    ) -> (Self, StationLink, oneshot::Sender<()>) {
        let connection = StationConnection::new(station.endpoint(), connector, config.io_timeout());
        let (request_tx, request_rx) = mpsc::channel(config.request_queue);
        let (stop_tx, stop_rx) = oneshot::channel();
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let link = StationLink::new(
            station.kind,
            station.address,
            config.controller_address,
            request_tx,
            connection.subscribe_state(),
            event_tx.clone(),
        );
        let worker = Self {
            kind: station.kind,
            address: station.address,
            connection,
            requests: request_rx,
            stop: stop_rx,
            events: event_tx,
            policy: ReconnectPolicy::new(&config.reconnect),
            poll_interval: config.poll_interval(),
            reconnect_at: None,
            last_state: ConnectionState::Disconnected,
            last_status: None,
        };
        (worker, link, stop_tx)
    }

    /// Spawn the worker on the current runtime
    pub fn spawn(self, stop: oneshot::Sender<()>) -> StationTask {
        StationTask {
            stop,
            join: tokio::spawn(self.run()),
        }
    }

    async fn run(mut self) {
        info!(
            "Station worker started for {} at {}",
            self.kind,
            self.connection.endpoint()
        );

        let mut poll = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.reconnect_at = Some(Instant::now());

        loop {
            let connected = self.connection.state() == ConnectionState::Connected;
            let reconnect_at = self.reconnect_at;
            let deadline = reconnect_at.unwrap_or_else(Instant::now);

            tokio::select! {
                biased;

                _ = &mut self.stop => {
                    info!("Shutdown requested for station {}", self.address);
                    break;
                }

                request = self.requests.recv() => {
                    let Some(request) = request else {
                        debug!("All links to station {} dropped", self.address);
                        break;
                    };
                    self.serve(request).await;
                }

                _ = sleep_until(deadline), if reconnect_at.is_some() => {
                    self.attempt_connect().await;
                }

                _ = poll.tick(), if connected => {
                    self.poll_status().await;
                }
            }
        }

        self.shutdown().await;
    }

    async fn serve(&mut self, request: Request) {
        if self.connection.state() != ConnectionState::Connected {
            request.reject(StationError::Comm(CommError::Unavailable));
            return;
        }

        match request {
            Request::Write { start, words, reply } => {
                debug!("Station {}: write {:?} at {}", self.address, words, start);
                let result = self.connection.write_registers(start, &words).await;
                self.after_io(&result);
                let _ = reply.send(result.map_err(StationError::from));
            }
            Request::Read {
                start,
                count,
                reply,
            } => {
                let result = self.connection.read_registers(start, count).await;
                self.after_io(&result);
                let _ = reply.send(result.map_err(StationError::from));
            }
        }
    }

    async fn poll_status(&mut self) {
        let layout = self.kind.layout();
        let count = layout.status_len() as u16;
        let result = self
            .connection
            .read_registers(layout.status_start, count)
            .await;
        self.after_io(&result);

        let Ok(words) = result else {
            return;
        };
        match decode_status(self.kind, &words) {
            Ok(status) => {
                if self.last_status != Some(status) {
                    debug!("Station {} status: {:?}", self.address, status);
                    self.last_status = Some(status);
                    self.publish(StationEvent::Status {
                        address: self.address,
                        status,
                    });
                }
            }
            Err(error) => {
                warn!("Station {} reported undecodable status: {}", self.address, error);
                self.last_status = None;
                self.publish(StationEvent::StatusUnknown {
                    address: self.address,
                    error,
                });
            }
        }
    }

    async fn attempt_connect(&mut self) {
        self.reconnect_at = None;
        let result = match self.connection.state() {
            ConnectionState::Faulted => self.connection.reconnect().await,
            _ => self.connection.connect().await,
        };
        self.sync_state();

        match result {
            Ok(()) => {
                if self.policy.failures() > 0 {
                    info!(
                        "Station {} reconnected after {} failed attempts",
                        self.address,
                        self.policy.failures()
                    );
                }
                self.policy.reset();
                self.last_status = None;
            }
            Err(e) => {
                if self.policy.record_failure() {
                    warn!(
                        "Station {} degraded after {} failed attempts: {}",
                        self.address,
                        self.policy.failures(),
                        e
                    );
                    self.publish(StationEvent::Degraded {
                        address: self.address,
                        attempts: self.policy.failures(),
                    });
                }
                self.schedule_reconnect();
            }
        }
    }

    fn after_io<T>(&mut self, result: &Result<T, CommError>) {
        self.sync_state();
        if result.is_err() && self.connection.state() == ConnectionState::Faulted {
            self.schedule_reconnect();
        }
    }

    fn schedule_reconnect(&mut self) {
        let delay = self.policy.next_delay();
        debug!("Station {}: reconnect in {:?}", self.address, delay);
        self.reconnect_at = Some(Instant::now() + delay);
    }

    fn sync_state(&mut self) {
        let state = self.connection.state();
        if state != self.last_state {
            self.last_state = state;
            self.publish(StationEvent::StateChanged {
                address: self.address,
                state,
            });
        }
    }

    fn publish(&self, event: StationEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    async fn shutdown(mut self) {
        self.requests.close();
        let mut rejected = 0usize;
        while let Ok(request) = self.requests.try_recv() {
            request.reject(StationError::Closed);
            rejected += 1;
        }
        if rejected > 0 {
            debug!(
                "Station {}: rejected {} queued requests on shutdown",
                self.address, rejected
            );
        }

        self.connection.close().await;
        self.sync_state();
        info!("Station worker for {} stopped", self.address);
    }
}
