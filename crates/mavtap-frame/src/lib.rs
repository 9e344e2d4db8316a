//! MAVLink v1 frame reader.
//!
//! Every datagram carries one frame:
//! - A start marker byte (0xFE)
//! - A 5-byte header: payload length, sequence, system id, component id, message id
//! - The payload (declared length bytes)
//! - A 2-byte checksum trailer, parsed but not verified
//!
//! Frames are borrowed views into the datagram; nothing is copied.

pub mod codec;
pub mod error;
pub mod message_id;

pub use codec::{
    encode_frame, read_frame, Frame, FrameHeader, CHECKSUM_SIZE, HEADER_SIZE, MIN_FRAME_SIZE,
    START_MARKER,
};
pub use error::{FrameError, Result};
pub use message_id::{ATTITUDE, RC_CHANNELS_RAW, SYS_STATUS, VFR_HUD};
