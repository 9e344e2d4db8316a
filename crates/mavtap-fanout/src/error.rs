/// Errors that can occur in fan-out and relay operations.
#[derive(Debug, thiserror::Error)]
pub enum FanoutError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] mavtap_transport::TransportError),

    /// A record could not be serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A worker thread could not be started.
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, FanoutError>;
