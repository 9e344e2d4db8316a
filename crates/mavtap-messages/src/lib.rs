//! Message registry and typed payload decoders.
//!
//! Turns one datagram into one [`TelemetryRecord`]:
//! frame reader -> registry lookup by message id -> field decoder -> record.
//!
//! Decoding is pure. The standard registry is immutable and shared process-wide,
//! so [`decode`] can be called from any thread without locking.

pub mod decoders;
pub mod error;
pub mod kind;
pub mod record;
pub mod registry;
pub mod types;

pub use error::{DecodeError, Result};
pub use kind::MessageKind;
pub use record::{decode, try_decode, TelemetryRecord};
pub use registry::{DecodeFn, MessageDescriptor, MessageRegistry, Resolution};
pub use types::{Attitude, MessagePayload, RcChannelsRaw, SysStatus, VfrHud};
