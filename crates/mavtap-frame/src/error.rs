/// Errors that can occur while reading or writing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The buffer cannot hold a header and checksum trailer.
    #[error("frame too short ({len} bytes, need at least 8)")]
    TooShort { len: usize },

    /// The first byte is not the MAVLink v1 start marker.
    #[error("invalid start marker 0x{found:02X} (expected 0xFE)")]
    BadMagic { found: u8 },

    /// A payload longer than a one-byte length field can declare.
    #[error("payload too large ({size} bytes, max 255)")]
    PayloadTooLarge { size: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
