use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Result, TransportError};

/// How long an in-process channel source waits before reporting an empty poll.
pub const CHANNEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One received datagram and the address it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    /// Raw datagram bytes.
    pub payload: Bytes,
    /// Sender address. Carried for diagnostics; decoding only looks at `payload`.
    pub sender: SocketAddr,
}

impl Datagram {
    /// Create a new datagram.
    pub fn new(payload: impl Into<Bytes>, sender: SocketAddr) -> Self {
        Self {
            payload: payload.into(),
            sender,
        }
    }
}

/// Anything that yields datagrams one at a time.
///
/// `Ok(None)` means nothing arrived within the source's wait window; callers use it
/// as a chance to check for shutdown and then poll again.
pub trait DatagramSource: Send {
    /// Receive the next datagram.
    fn recv_datagram(&mut self) -> Result<Option<Datagram>>;
}

/// In-process source: datagrams pushed through an `mpsc` channel.
///
/// A dropped sender is reported as a broken pipe so the consumer stops polling.
impl DatagramSource for Receiver<Datagram> {
    fn recv_datagram(&mut self) -> Result<Option<Datagram>> {
        match self.recv_timeout(CHANNEL_POLL_INTERVAL) {
            Ok(datagram) => Ok(Some(datagram)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Io(std::io::Error::new(
                ErrorKind::BrokenPipe,
                "datagram channel closed",
            ))),
        }
    }
}

impl<S: DatagramSource + ?Sized> DatagramSource for Box<S> {
    fn recv_datagram(&mut self) -> Result<Option<Datagram>> {
        (**self).recv_datagram()
    }
}
