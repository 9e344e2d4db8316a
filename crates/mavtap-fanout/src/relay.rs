use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use mavtap_messages::MessageRegistry;
use mavtap_transport::{
    Datagram, DatagramSocket, DatagramSource, DEFAULT_MAX_DATAGRAM, DEFAULT_PORT,
};
use serde::Serialize;
use tracing::{debug, error, info, trace, warn};

use crate::error::{FanoutError, Result};
use crate::hub::SubscriberHub;

/// Relay settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// UDP address to receive telemetry on. Default: `0.0.0.0:14550`.
    pub bind: SocketAddr,
    /// How long a receive blocks before the loop re-checks for shutdown.
    pub read_timeout: Duration,
    /// Receive buffer size per datagram.
    pub max_datagram_size: usize,
    /// When set, only records with these message ids are broadcast.
    pub message_filter: Option<Vec<u8>>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            read_timeout: Duration::from_millis(100),
            max_datagram_size: DEFAULT_MAX_DATAGRAM,
            message_filter: None,
        }
    }
}

/// Point-in-time relay counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    /// Datagrams received.
    pub received: u64,
    /// Datagrams decoded into records (known or unknown type), filtered or not.
    pub decoded: u64,
    /// Decoded records with no registered decoder, filtered or not.
    pub unknown: u64,
    /// Datagrams dropped as malformed.
    pub dropped: u64,
    /// Decoded records withheld from subscribers by the message filter.
    pub filtered: u64,
}

#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    decoded: AtomicU64,
    unknown: AtomicU64,
    dropped: AtomicU64,
    filtered: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> RelayStats {
        RelayStats {
            received: self.received.load(Ordering::Relaxed),
            decoded: self.decoded.load(Ordering::Relaxed),
            unknown: self.unknown.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
        }
    }
}

/// A running receive-decode-broadcast loop.
///
/// Datagrams are handled one at a time on a dedicated thread, in arrival order.
/// Dropping the relay stops it.
pub struct Relay {
    running: Arc<AtomicBool>,
    counters: Arc<Counters>,
    worker: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl Relay {
    /// Bind the UDP socket from `config` and start relaying into `hub`.
    pub fn start(config: RelayConfig, hub: SubscriberHub) -> Result<Self> {
        let socket = DatagramSocket::bind_with_capacity(config.bind, config.max_datagram_size)?;
        socket.set_read_timeout(Some(config.read_timeout))?;
        let local_addr = socket.local_addr()?;
        info!(transport = socket.transport_name(), %local_addr, "relay socket bound");

        let mut relay = Self::start_with_source(socket, config, hub)?;
        relay.local_addr = Some(local_addr);
        Ok(relay)
    }

    /// Start relaying from an arbitrary datagram source.
    ///
    /// `config.bind` and the socket settings are ignored.
    pub fn start_with_source<S>(source: S, config: RelayConfig, hub: SubscriberHub) -> Result<Self>
    where
        S: DatagramSource + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let counters = Arc::new(Counters::default());

        let worker = RelayWorker {
            registry: MessageRegistry::global(),
            hub,
            message_filter: config.message_filter,
            counters: Arc::clone(&counters),
        };
        let flag = Arc::clone(&running);
        let handle = std::thread::Builder::new()
            .name("mavtap-relay".to_string())
            .spawn(move || worker.run(source, &flag))
            .map_err(|source| FanoutError::Spawn {
                name: "relay",
                source,
            })?;

        info!("relay started");
        Ok(Self {
            running,
            counters,
            worker: Some(handle),
            local_addr: None,
        })
    }

    /// Stop the loop and wait for the worker to exit. Idempotent.
    ///
    /// The UDP socket is closed when the worker exits.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("relay worker panicked");
            }
            info!(stats = ?self.counters.snapshot(), "relay stopped");
        }
    }

    /// True until `stop` is called or the source fails.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Current counters.
    pub fn stats(&self) -> RelayStats {
        self.counters.snapshot()
    }

    /// Bound UDP address, when started with [`Relay::start`].
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("running", &self.is_running())
            .field("local_addr", &self.local_addr)
            .field("stats", &self.stats())
            .finish()
    }
}

struct RelayWorker {
    registry: &'static MessageRegistry,
    hub: SubscriberHub,
    message_filter: Option<Vec<u8>>,
    counters: Arc<Counters>,
}

impl RelayWorker {
    fn run<S: DatagramSource>(self, mut source: S, running: &AtomicBool) {
        while running.load(Ordering::SeqCst) {
            match source.recv_datagram() {
                Ok(Some(datagram)) => self.handle(&datagram),
                Ok(None) => continue,
                Err(err) => {
                    error!(%err, "datagram source failed; relay stopping");
                    running.store(false, Ordering::SeqCst);
                }
            }
        }
    }

    fn handle(&self, datagram: &Datagram) {
        self.counters.received.fetch_add(1, Ordering::Relaxed);

        let record = match self.registry.decode(&datagram.payload) {
            Ok(record) => record,
            Err(err) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    sender = %datagram.sender,
                    len = datagram.payload.len(),
                    %err,
                    "dropping datagram"
                );
                return;
            }
        };

        self.counters.decoded.fetch_add(1, Ordering::Relaxed);
        if record.is_unknown() {
            self.counters.unknown.fetch_add(1, Ordering::Relaxed);
        }

        if let Some(filter) = &self.message_filter {
            if !filter.contains(&record.message_id) {
                self.counters.filtered.fetch_add(1, Ordering::Relaxed);
                trace!(message_id = record.message_id, "filtered");
                return;
            }
        }

        match self.hub.broadcast_record(&record) {
            Ok(report) => debug!(
                message = %record.type_name,
                delivered = report.delivered,
                skipped = report.skipped,
                failed = report.failed,
                "broadcast"
            ),
            Err(err) => warn!(%err, "failed to serialize record"),
        }
    }
}
