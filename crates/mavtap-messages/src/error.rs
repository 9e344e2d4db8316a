use mavtap_frame::FrameError;

/// Errors that can occur while decoding a datagram.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The datagram is not a well-formed frame.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The payload ends before the last field of its message type.
    #[error("{message} payload too short ({actual} bytes, need {required})")]
    PayloadTooShortForType {
        message: &'static str,
        required: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
