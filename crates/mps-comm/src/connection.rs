//! Station connection and its lifecycle state machine
//!
//! ```text
//! Disconnected --connect()--> Connecting --ok--> Connected
//!                                 |                  |
//!                                 +--err--> Disconnected
//!                                                    | io error
//!                                                    v
//!                         Connecting <--reconnect()-- Faulted
//! ```
//!
//! Only `Connected` permits register I/O. Every call on the network is bounded
//! by the I/O timeout; a timeout faults the connection like any other
//! transport error.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::CommError;
use crate::transport::{Connector, Endpoint, RegisterTransport};

/// Lifecycle state of a station connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Faulted,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Faulted => "faulted",
        };
        f.write_str(s)
    }
}

/// One transport endpoint plus the state machine around it
///
/// Created disconnected; [`connect`](Self::connect) is the fallible step.
/// State changes are published on a watch channel so observers get read-only
/// snapshots without touching the connection.
pub struct StationConnection {
    endpoint: Endpoint,
    connector: Arc<dyn Connector>,
    transport: Option<Box<dyn RegisterTransport>>,
    io_timeout: Duration,
    state_tx: watch::Sender<ConnectionState>,
}

impl StationConnection {
    pub fn new(endpoint: Endpoint, connector: Arc<dyn Connector>, io_timeout: Duration) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            endpoint,
            connector,
            transport: None,
            io_timeout,
            state_tx,
        }
    }

    /// Endpoint this connection talks to
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Observe state changes
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            info!("Station {}: {} -> {}", self.endpoint, previous, state);
        }
    }

    /// Open the transport
    ///
    /// A no-op if already connected. On failure the connection returns to
    /// `Disconnected` and the caller decides when to retry.
    pub async fn connect(&mut self) -> Result<(), CommError> {
        match self.state() {
            ConnectionState::Connected => return Ok(()),
            ConnectionState::Faulted => self.drop_transport().await,
            _ => {}
        }
        self.set_state(ConnectionState::Connecting);

        let connector = Arc::clone(&self.connector);
        let endpoint = self.endpoint.clone();
        let io_timeout = self.io_timeout;
        let result =
            match tokio::time::timeout(io_timeout, async move { connector.connect(&endpoint).await })
                .await
            {
                Ok(result) => result,
                Err(_) => Err(CommError::Timeout(io_timeout)),
            };
        match result {
            Ok(transport) => {
                self.transport = Some(transport);
                self.set_state(ConnectionState::Connected);
                Ok(())
            }
            Err(e) => {
                debug!("Connect to {} failed: {}", self.endpoint, e);
                self.set_state(ConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    /// Drop a faulted transport and connect again
    pub async fn reconnect(&mut self) -> Result<(), CommError> {
        self.drop_transport().await;
        if self.state() == ConnectionState::Connected {
            self.set_state(ConnectionState::Disconnected);
        }
        self.connect().await
    }

    /// Close the transport and return to `Disconnected`
    pub async fn close(&mut self) {
        self.drop_transport().await;
        self.set_state(ConnectionState::Disconnected);
    }

    /// Write holding registers; faults the connection on transport errors
    pub async fn write_registers(&mut self, start: u16, words: &[u16]) -> Result<(), CommError> {
        let io_timeout = self.io_timeout;
        let transport = self.connected_transport()?;
        let result = match tokio::time::timeout(io_timeout, transport.write_registers(start, words))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(CommError::Timeout(io_timeout)),
        };
        self.check(result)
    }

    /// Read input registers; faults the connection on transport errors
    pub async fn read_registers(&mut self, start: u16, count: u16) -> Result<Vec<u16>, CommError> {
        let io_timeout = self.io_timeout;
        let transport = self.connected_transport()?;
        let result = match tokio::time::timeout(io_timeout, transport.read_registers(start, count))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(CommError::Timeout(io_timeout)),
        };
        self.check(result)
    }

    fn connected_transport(&mut self) -> Result<&mut Box<dyn RegisterTransport>, CommError> {
        if self.state() != ConnectionState::Connected {
            return Err(CommError::NotConnected);
        }
        self.transport.as_mut().ok_or(CommError::NotConnected)
    }

    fn check<T>(&mut self, result: Result<T, CommError>) -> Result<T, CommError> {
        if let Err(e) = &result {
            if e.is_transient() {
                warn!("Station {} faulted: {}", self.endpoint, e);
                self.set_state(ConnectionState::Faulted);
            }
        }
        result
    }

    async fn drop_transport(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct ReadOnly;

    #[async_trait]
    impl RegisterTransport for ReadOnly {
        async fn write_registers(&mut self, _start: u16, _words: &[u16]) -> Result<(), CommError> {
            Err(CommError::IoFailure("broken pipe".into()))
        }

        async fn read_registers(&mut self, _start: u16, count: u16) -> Result<Vec<u16>, CommError> {
            Ok(vec![0; count as usize])
        }
    }

    struct Toggle(AtomicBool);

    #[async_trait]
    impl Connector for Toggle {
        async fn connect(
            &self,
            _endpoint: &Endpoint,
        ) -> Result<Box<dyn RegisterTransport>, CommError> {
            if self.0.load(Ordering::SeqCst) {
                Ok(Box::new(ReadOnly))
            } else {
                Err(CommError::ConnectionRefused("refused".into()))
            }
        }
    }

    fn connection(up: bool) -> (StationConnection, Arc<Toggle>) {
        let connector = Arc::new(Toggle(AtomicBool::new(up)));
        let conn = StationConnection::new(
            Endpoint::new("localhost", 502, 1),
            connector.clone(),
            Duration::from_millis(100),
        );
        (conn, connector)
    }

    #[tokio::test]
    async fn test_io_requires_connected() {
        let (mut conn, _) = connection(true);
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert_eq!(conn.read_registers(0, 2).await, Err(CommError::NotConnected));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_failed_connect_returns_to_disconnected() {
        let (mut conn, _) = connection(false);
        assert!(matches!(
            conn.connect().await,
            Err(CommError::ConnectionRefused(_))
        ));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_io_error_faults_then_reconnect() {
        let (mut conn, _) = connection(true);
        conn.connect().await.unwrap();
        assert_eq!(conn.read_registers(0, 2).await, Ok(vec![0, 0]));

        assert!(conn.write_registers(0, &[1]).await.is_err());
        assert_eq!(conn.state(), ConnectionState::Faulted);
        assert_eq!(conn.read_registers(0, 2).await, Err(CommError::NotConnected));

        conn.reconnect().await.unwrap();
        assert_eq!(conn.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_state_is_observable() {
        let (mut conn, _) = connection(true);
        let rx = conn.subscribe_state();
        conn.connect().await.unwrap();
        assert_eq!(*rx.borrow(), ConnectionState::Connected);
        conn.close().await;
        assert_eq!(*rx.borrow(), ConnectionState::Disconnected);
    }
}
