//! Datagram ingest and subscriber socket endpoints.
//!
//! Two transports live here:
//! - [`DatagramSocket`]: the UDP socket telemetry arrives on (port 14550 by default)
//! - [`UnixEndpoint`]: a Unix domain socket that subscribers connect to (Unix only)
//!
//! Everything above this crate consumes datagrams through the [`DatagramSource`]
//! trait, so the relay can be driven by a real socket or an in-memory queue.

pub mod error;
pub mod traits;
pub mod udp;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use traits::{Datagram, DatagramSource, CHANNEL_POLL_INTERVAL};
pub use udp::{DatagramSocket, DEFAULT_MAX_DATAGRAM, DEFAULT_PORT};

#[cfg(unix)]
pub use uds::UnixEndpoint;
