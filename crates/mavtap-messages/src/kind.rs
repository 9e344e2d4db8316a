use mavtap_frame::{ATTITUDE, RC_CHANNELS_RAW, SYS_STATUS, VFR_HUD};

use crate::decoders;
use crate::error::Result;
use crate::registry::{DecodeFn, MessageDescriptor};
use crate::types::MessagePayload;

/// The closed set of message types with built-in decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    SysStatus,
    Attitude,
    RcChannelsRaw,
    VfrHud,
}

impl MessageKind {
    /// All built-in kinds, ordered by message id.
    pub const ALL: [MessageKind; 4] = [
        MessageKind::SysStatus,
        MessageKind::Attitude,
        MessageKind::RcChannelsRaw,
        MessageKind::VfrHud,
    ];

    /// Look up the built-in kind for a message id.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Wire message id.
    pub fn id(self) -> u8 {
        match self {
            Self::SysStatus => SYS_STATUS,
            Self::Attitude => ATTITUDE,
            Self::RcChannelsRaw => RC_CHANNELS_RAW,
            Self::VfrHud => VFR_HUD,
        }
    }

    /// Protocol name, used as the record's type tag.
    pub fn name(self) -> &'static str {
        match self {
            Self::SysStatus => "SYS_STATUS",
            Self::Attitude => "ATTITUDE",
            Self::RcChannelsRaw => "RC_CHANNELS_RAW",
            Self::VfrHud => "VFR_HUD",
        }
    }

    /// Bytes the decoder reads: offset of the last field plus its width.
    pub fn min_payload_len(self) -> usize {
        match self {
            Self::SysStatus => decoders::SYS_STATUS_LEN,
            Self::Attitude => decoders::ATTITUDE_LEN,
            Self::RcChannelsRaw => decoders::RC_CHANNELS_RAW_LEN,
            Self::VfrHud => decoders::VFR_HUD_LEN,
        }
    }

    /// Decode `payload` as this kind.
    pub fn decode(self, payload: &[u8]) -> Result<MessagePayload> {
        (self.descriptor().decode)(payload)
    }

    /// Registry entry for this kind.
    pub fn descriptor(self) -> MessageDescriptor {
        let decode: DecodeFn = match self {
            Self::SysStatus => decoders::decode_sys_status,
            Self::Attitude => decoders::decode_attitude,
            Self::RcChannelsRaw => decoders::decode_rc_channels_raw,
            Self::VfrHud => decoders::decode_vfr_hud,
        };
        MessageDescriptor {
            id: self.id(),
            name: self.name(),
            min_payload_len: self.min_payload_len(),
            decode,
        }
    }
}
