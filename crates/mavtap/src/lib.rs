//! MAVLink v1 telemetry tap.
//!
//! mavtap receives MAVLink v1 frames over UDP, decodes a small set of common
//! telemetry messages, and fans each result out to subscribers as one JSON line.
//!
//! # Crate Structure
//!
//! - [`transport`]: UDP datagram socket and the Unix socket subscribers connect to
//! - [`frame`]: MAVLink v1 frame header parsing and message ids
//! - [`messages`]: message registry, field decoders, and [`messages::TelemetryRecord`]
//! - [`fanout`]: subscribers, the subscriber hub, and the relay loop
//!
//! ```no_run
//! use mavtap::fanout::{channel_subscriber, Relay, RelayConfig, SubscriberHub};
//!
//! let hub = SubscriberHub::new();
//! let (subscriber, events) = channel_subscriber("app");
//! hub.register(Box::new(subscriber));
//!
//! let _relay = Relay::start(RelayConfig::default(), hub)?;
//! for event in events {
//!     println!("{event}");
//! }
//! # Ok::<(), mavtap::fanout::FanoutError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use mavtap_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use mavtap_frame::*;
}

/// Re-export message decoding types.
pub mod messages {
    pub use mavtap_messages::*;
}

/// Re-export fan-out and relay types.
pub mod fanout {
    pub use mavtap_fanout::*;
}

pub use mavtap_messages::{decode, try_decode, TelemetryRecord};
