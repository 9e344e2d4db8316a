//! Subscriber fan-out and relay lifecycle.
//!
//! The [`Relay`] owns the receive loop: datagram in, record out, one JSON event
//! to every open subscriber in the [`SubscriberHub`]. The hub, not the decoder,
//! owns the set of live subscribers.

pub mod error;
pub mod hub;
#[cfg(unix)]
pub mod listener;
pub mod relay;
pub mod subscriber;

pub use error::{FanoutError, Result};
pub use hub::{BroadcastReport, SubscriberHub};
#[cfg(unix)]
pub use listener::{ListenerConfig, SubscriberListener};
pub use relay::{Relay, RelayConfig, RelayStats};
pub use subscriber::{
    channel_subscriber, CallbackSubscriber, ChannelSubscriber, StreamSubscriber, Subscriber,
};
