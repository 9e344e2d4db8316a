//! Message ids with built-in decoders.
//!
//! Any other id is still a valid frame; it just has no typed payload.

/// Onboard sensors, battery and link health.
pub const SYS_STATUS: u8 = 1;

/// Vehicle orientation.
pub const ATTITUDE: u8 = 30;

/// Raw RC receiver channel values.
pub const RC_CHANNELS_RAW: u8 = 35;

/// Heads-up display metrics.
pub const VFR_HUD: u8 = 74;
