use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{Datagram, DatagramSource};

/// Standard ground-station port autopilots stream telemetry to.
pub const DEFAULT_PORT: u16 = 14550;

/// Largest UDP payload over IPv4.
pub const DEFAULT_MAX_DATAGRAM: usize = 65_507;

/// Connectionless UDP socket that telemetry datagrams arrive on.
///
/// Datagrams larger than the configured maximum are truncated by the kernel;
/// MAVLink v1 frames never exceed 263 bytes so the default leaves ample room.
pub struct DatagramSocket {
    socket: UdpSocket,
    scratch: Vec<u8>,
}

impl DatagramSocket {
    /// Bind to `addr` with the default receive buffer size.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        Self::bind_with_capacity(addr, DEFAULT_MAX_DATAGRAM)
    }

    /// Bind to `addr`, receiving at most `max_datagram_size` bytes per datagram.
    pub fn bind_with_capacity(addr: SocketAddr, max_datagram_size: usize) -> Result<Self> {
        let socket =
            UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        let local = socket.local_addr().unwrap_or(addr);
        info!(%local, "listening for telemetry datagrams");

        Ok(Self {
            socket,
            scratch: vec![0u8; max_datagram_size.max(1)],
        })
    }

    /// Receive one datagram (blocking, subject to the read timeout).
    ///
    /// A timeout surfaces as `TransportError::Recv` with kind `WouldBlock` or
    /// `TimedOut`; use [`DatagramSource::recv_datagram`] to get `Ok(None)` instead.
    pub fn recv(&mut self) -> Result<Datagram> {
        let (len, sender) = self
            .socket
            .recv_from(&mut self.scratch)
            .map_err(TransportError::Recv)?;
        debug!(%sender, len, "received datagram");
        Ok(Datagram {
            payload: Bytes::copy_from_slice(&self.scratch[..len]),
            sender,
        })
    }

    /// Set the read timeout used by `recv`.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Address the socket is actually bound to (resolves port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Into::into)
    }

    /// Maximum datagram size this socket receives without truncation.
    pub fn max_datagram_size(&self) -> usize {
        self.scratch.len()
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "udp"
    }
}

impl DatagramSource for DatagramSocket {
    fn recv_datagram(&mut self) -> Result<Option<Datagram>> {
        match self.recv() {
            Ok(datagram) => Ok(Some(datagram)),
            Err(TransportError::Recv(err)) if is_skippable(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl std::fmt::Debug for DatagramSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatagramSocket")
            .field("local_addr", &self.socket.local_addr().ok())
            .field("max_datagram_size", &self.scratch.len())
            .finish()
    }
}

/// Receive errors that leave the socket usable; the caller just polls again.
///
/// Windows reports an ICMP port-unreachable for an earlier send as
/// `ConnectionReset` on the next `recv_from`.
fn is_skippable(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::WouldBlock
            | ErrorKind::TimedOut
            | ErrorKind::Interrupted
            | ErrorKind::ConnectionReset
    )
}
