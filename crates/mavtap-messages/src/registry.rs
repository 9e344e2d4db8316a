use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use mavtap_frame::read_frame;

use crate::error::{DecodeError, Result};
use crate::kind::MessageKind;
use crate::record::TelemetryRecord;
use crate::types::MessagePayload;

/// Payload decoder signature.
pub type DecodeFn = fn(&[u8]) -> Result<MessagePayload>;

static STANDARD: LazyLock<MessageRegistry> = LazyLock::new(MessageRegistry::standard);

/// Registry entry: everything needed to decode one message type.
#[derive(Debug, Clone, Copy)]
pub struct MessageDescriptor {
    /// Wire message id.
    pub id: u8,
    /// Type tag placed on decoded records.
    pub name: &'static str,
    /// Minimum payload bytes the decoder needs.
    pub min_payload_len: usize,
    /// The decoder itself.
    pub decode: DecodeFn,
}

/// Outcome of looking up a message id.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    /// The id has a registered decoder.
    Known(&'a MessageDescriptor),
    /// No decoder; the record is passed through without a payload.
    Passthrough(u8),
}

impl Resolution<'_> {
    /// Type tag for records of this resolution.
    pub fn type_name(&self) -> Cow<'static, str> {
        match self {
            Self::Known(descriptor) => Cow::Borrowed(descriptor.name),
            Self::Passthrough(id) => Cow::Owned(format!("UNKNOWN_{id}")),
        }
    }

    /// Run the decoder, if there is one.
    ///
    /// Payloads shorter than the descriptor's `min_payload_len` are rejected before
    /// the decoder sees them.
    pub fn decode(&self, payload: &[u8]) -> Result<Option<MessagePayload>> {
        match self {
            Self::Known(descriptor) => {
                if payload.len() < descriptor.min_payload_len {
                    return Err(DecodeError::PayloadTooShortForType {
                        message: descriptor.name,
                        required: descriptor.min_payload_len,
                        actual: payload.len(),
                    });
                }
                (descriptor.decode)(payload).map(Some)
            }
            Self::Passthrough(_) => Ok(None),
        }
    }
}

/// Message-id-keyed registry of payload decoders.
///
/// Read-only once built; share it by reference or `Arc`.
#[derive(Debug, Clone, Default)]
pub struct MessageRegistry {
    descriptors: HashMap<u8, MessageDescriptor>,
}

impl MessageRegistry {
    /// Create an empty registry. Every id resolves to pass-through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in message types.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for kind in MessageKind::ALL {
            registry.register(kind.descriptor());
        }
        registry
    }

    /// The process-wide standard registry.
    pub fn global() -> &'static MessageRegistry {
        &STANDARD
    }

    /// Register a decoder, returning the one it replaced.
    pub fn register(&mut self, descriptor: MessageDescriptor) -> Option<MessageDescriptor> {
        self.descriptors.insert(descriptor.id, descriptor)
    }

    /// Resolve a message id. Never fails.
    pub fn resolve(&self, id: u8) -> Resolution<'_> {
        match self.descriptors.get(&id) {
            Some(descriptor) => Resolution::Known(descriptor),
            None => Resolution::Passthrough(id),
        }
    }

    /// Type tag records with this id would carry.
    pub fn type_name(&self, id: u8) -> Cow<'static, str> {
        self.resolve(id).type_name()
    }

    /// Check if an id has a registered decoder.
    pub fn has_decoder(&self, id: u8) -> bool {
        self.descriptors.contains_key(&id)
    }

    /// Ids with registered decoders, ascending.
    pub fn message_ids(&self) -> Vec<u8> {
        let mut ids: Vec<u8> = self.descriptors.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Decode one datagram into a record.
    pub fn decode(&self, buf: &[u8]) -> Result<TelemetryRecord> {
        let frame = read_frame(buf)?;
        let resolution = self.resolve(frame.header.message_id);
        let payload = resolution.decode(frame.payload)?;

        Ok(TelemetryRecord {
            message_id: frame.header.message_id,
            type_name: resolution.type_name(),
            system_id: frame.header.system_id,
            component_id: frame.header.component_id,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use mavtap_frame::FrameError;

    use super::*;
    use crate::types::VfrHud;

    fn frame(message_id: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![0xFE, payload.len() as u8, 0, 1, 1, message_id];
        buf.extend_from_slice(payload);
        buf.extend_from_slice(&[0, 0]);
        buf
    }

    fn decode_heartbeat_as_hud(_payload: &[u8]) -> Result<MessagePayload> {
        Ok(MessagePayload::VfrHud(VfrHud {
            airspeed: 0.0,
            groundspeed: 0.0,
            heading: 0,
            throttle: 0,
            alt: 0.0,
            climb: 0.0,
        }))
    }

    #[test]
    fn standard_registers_builtin_ids() {
        let registry = MessageRegistry::standard();
        assert_eq!(registry.message_ids(), vec![1, 30, 35, 74]);
        for id in [1, 30, 35, 74] {
            assert!(registry.has_decoder(id));
            assert!(matches!(registry.resolve(id), Resolution::Known(d) if d.id == id));
        }
    }

    #[test]
    fn every_other_id_passes_through() {
        let registry = MessageRegistry::standard();
        for id in (0..=u8::MAX).filter(|id| ![1, 30, 35, 74].contains(id)) {
            let resolution = registry.resolve(id);
            assert!(matches!(resolution, Resolution::Passthrough(found) if found == id));
            assert_eq!(resolution.type_name(), format!("UNKNOWN_{id}"));
            assert_eq!(resolution.decode(&[]).unwrap(), None);
        }
    }

    #[test]
    fn type_names_for_builtin_ids() {
        let registry = MessageRegistry::global();
        assert_eq!(registry.type_name(1), "SYS_STATUS");
        assert_eq!(registry.type_name(30), "ATTITUDE");
        assert_eq!(registry.type_name(35), "RC_CHANNELS_RAW");
        assert_eq!(registry.type_name(74), "VFR_HUD");
        assert_eq!(registry.type_name(0), "UNKNOWN_0");
    }

    #[test]
    fn empty_registry_passes_everything_through() {
        let registry = MessageRegistry::new();
        let record = registry.decode(&frame(30, &[0u8; 28])).unwrap();

        assert_eq!(record.type_name, "UNKNOWN_30");
        assert!(record.payload.is_none());
        assert!(registry.message_ids().is_empty());
    }

    #[test]
    fn register_adds_a_message_type() {
        let mut registry = MessageRegistry::standard();
        let previous = registry.register(MessageDescriptor {
            id: 0,
            name: "HEARTBEAT",
            min_payload_len: 0,
            decode: decode_heartbeat_as_hud,
        });
        assert!(previous.is_none());

        let record = registry.decode(&frame(0, &[0u8; 9])).unwrap();
        assert_eq!(record.type_name, "HEARTBEAT");
        assert!(record.payload.is_some());
    }

    #[test]
    fn registered_minimum_is_checked_before_decoder_runs() {
        let mut registry = MessageRegistry::new();
        registry.register(MessageDescriptor {
            id: 0,
            name: "HEARTBEAT",
            min_payload_len: 9,
            decode: decode_heartbeat_as_hud,
        });

        assert_eq!(
            registry.decode(&[0xFE, 0, 0, 1, 1, 0, 0, 0]),
            Err(DecodeError::PayloadTooShortForType {
                message: "HEARTBEAT",
                required: 9,
                actual: 0,
            })
        );
        assert!(registry.decode(&frame(0, &[0u8; 9])).is_ok());
    }

    #[test]
    fn register_replaces_existing_decoder() {
        let mut registry = MessageRegistry::standard();
        let previous = registry.register(MessageDescriptor {
            id: 30,
            name: "ATTITUDE_OVERRIDE",
            min_payload_len: 0,
            decode: decode_heartbeat_as_hud,
        });

        assert_eq!(previous.map(|d| d.name), Some("ATTITUDE"));
        assert_eq!(registry.type_name(30), "ATTITUDE_OVERRIDE");
    }

    #[test]
    fn decode_propagates_frame_errors() {
        let registry = MessageRegistry::global();
        assert_eq!(
            registry.decode(&[0xFE, 0, 0]),
            Err(DecodeError::Frame(FrameError::TooShort { len: 3 }))
        );
        assert_eq!(
            registry.decode(&[0x55; 8]),
            Err(DecodeError::Frame(FrameError::BadMagic { found: 0x55 }))
        );
    }

    #[test]
    fn decode_short_payload_for_known_type() {
        let registry = MessageRegistry::global();
        let err = registry.decode(&frame(1, &[0u8; 12])).unwrap_err();

        assert_eq!(
            err,
            DecodeError::PayloadTooShortForType {
                message: "SYS_STATUS",
                required: 31,
                actual: 12,
            }
        );
    }

    #[test]
    fn global_is_shared() {
        assert!(std::ptr::eq(
            MessageRegistry::global(),
            MessageRegistry::global()
        ));
    }

    #[test]
    fn global_usable_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    MessageRegistry::global()
                        .decode(&frame(74, &[0u8; 20]))
                        .unwrap()
                        .type_name
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "VFR_HUD");
        }
    }
}
