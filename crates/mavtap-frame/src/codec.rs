use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Header: marker (1) + length (1) + sequence (1) + system (1) + component (1) + message (1).
pub const HEADER_SIZE: usize = 6;

/// Trailing checksum: 2 bytes, little-endian.
pub const CHECKSUM_SIZE: usize = 2;

/// Smallest well-formed frame: header + checksum with an empty payload.
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + CHECKSUM_SIZE;

/// MAVLink v1 start-of-frame marker.
pub const START_MARKER: u8 = 0xFE;

/// Fixed header fields of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Declared payload length.
    pub payload_length: u8,
    /// Sender's packet counter. Not interpreted.
    pub sequence: u8,
    /// Sending system.
    pub system_id: u8,
    /// Sending component within the system.
    pub component_id: u8,
    /// Selects the payload decoder.
    pub message_id: u8,
}

/// A frame borrowed from a datagram.
///
/// The checksum is carried as received. It is never checked against the payload,
/// so a `Frame` makes no integrity claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Header fields.
    pub header: FrameHeader,
    /// Payload bytes, clamped to what the buffer actually holds.
    pub payload: &'a [u8],
    /// Unverified checksum, `None` when the buffer ends before the trailer.
    pub checksum: Option<u16>,
}

impl Frame<'_> {
    /// True when the buffer held fewer payload bytes than the header declared.
    pub fn is_truncated(&self) -> bool {
        self.payload.len() < usize::from(self.header.payload_length)
    }

    /// Total bytes the header says the frame occupies on the wire.
    pub fn declared_wire_size(&self) -> usize {
        MIN_FRAME_SIZE + usize::from(self.header.payload_length)
    }
}

/// Read a frame from one datagram.
///
/// Only the minimum size and the start marker are validated. If the declared
/// payload length runs past the end of the buffer, the payload is clamped to the
/// available bytes and the shortfall is left for the payload decoder to reject.
pub fn read_frame(buf: &[u8]) -> Result<Frame<'_>> {
    if buf.len() < MIN_FRAME_SIZE {
        return Err(FrameError::TooShort { len: buf.len() });
    }

    if buf[0] != START_MARKER {
        return Err(FrameError::BadMagic { found: buf[0] });
    }

    let header = FrameHeader {
        payload_length: buf[1],
        sequence: buf[2],
        system_id: buf[3],
        component_id: buf[4],
        message_id: buf[5],
    };

    let payload_end = (HEADER_SIZE + usize::from(header.payload_length)).min(buf.len());
    let payload = &buf[HEADER_SIZE..payload_end];
    let checksum = buf
        .get(payload_end..payload_end + CHECKSUM_SIZE)
        .map(|trailer| u16::from_le_bytes([trailer[0], trailer[1]]));

    Ok(Frame {
        header,
        payload,
        checksum,
    })
}

/// Write a frame around `payload` with a zeroed checksum.
///
/// `header.payload_length` is ignored; the real payload length is written.
/// Intended for crafting test traffic; the checksum is not computed.
///
/// Wire format:
/// ```text
/// ┌──────┬─────┬─────┬───────┬───────┬───────┬───────────┬──────────┐
/// │ 0xFE │ LEN │ SEQ │ SYSID │ COMPID│ MSGID │ Payload   │ CRC (2B) │
/// │      │     │     │       │       │       │ (LEN B)   │ LE       │
/// └──────┴─────┴─────┴───────┴───────┴───────┴───────────┴──────────┘
/// ```
pub fn encode_frame(header: FrameHeader, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let payload_length =
        u8::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
            size: payload.len(),
        })?;

    dst.reserve(MIN_FRAME_SIZE + payload.len());
    dst.put_u8(START_MARKER);
    dst.put_u8(payload_length);
    dst.put_u8(header.sequence);
    dst.put_u8(header.system_id);
    dst.put_u8(header.component_id);
    dst.put_u8(header.message_id);
    dst.put_slice(payload);
    dst.put_u16_le(0);
    Ok(())
}
