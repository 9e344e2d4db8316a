use std::net::SocketAddr;
use std::path::PathBuf;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind the UDP socket.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to bind the subscriber socket path.
    #[error("failed to bind to {path}: {source}")]
    BindPath {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to connect to a subscriber endpoint.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to receive a datagram.
    #[error("failed to receive datagram: {0}")]
    Recv(std::io::Error),

    /// Failed to accept an incoming subscriber connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// An I/O error occurred on the socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },
}

impl TransportError {
    /// The underlying I/O error, if this error wraps one.
    pub fn io_source(&self) -> Option<&std::io::Error> {
        match self {
            Self::Bind { source, .. }
            | Self::BindPath { source, .. }
            | Self::Connect { source, .. } => Some(source),
            Self::Recv(err) | Self::Accept(err) | Self::Io(err) => Some(err),
            Self::PathTooLong { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
