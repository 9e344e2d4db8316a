use serde::Serialize;

use crate::kind::MessageKind;

/// SYS_STATUS (id 1): onboard sensor bitmasks, battery and link health.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SysStatus {
    pub onboard_control_sensors_present: u32,
    pub onboard_control_sensors_enabled: u32,
    pub onboard_control_sensors_health: u32,
    pub load: u16,
    /// Volts.
    pub voltage_battery: f64,
    /// Amps.
    pub current_battery: f64,
    pub battery_remaining: i8,
    pub drop_rate_comm: u16,
    pub errors_comm: u16,
    pub errors_count1: u16,
    pub errors_count2: u16,
    pub errors_count3: u16,
    pub errors_count4: u16,
}

/// ATTITUDE (id 30): orientation in degrees, body rates as sent.
///
/// `pitch` is sign-inverted relative to the wire value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Attitude {
    pub time_boot_ms: u32,
    /// Degrees.
    pub roll: f64,
    /// Degrees, sign-inverted.
    pub pitch: f64,
    /// Degrees.
    pub yaw: f64,
    pub rollspeed: f32,
    pub pitchspeed: f32,
    pub yawspeed: f32,
}

/// RC_CHANNELS_RAW (id 35).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RcChannelsRaw {
    pub time_boot_ms: u32,
    pub port: u8,
    pub chan1_raw: u16,
    pub chan2_raw: u16,
    pub chan3_raw: u16,
    pub chan4_raw: u16,
    pub chan5_raw: u16,
    pub chan6_raw: u16,
    pub chan7_raw: u16,
    pub chan8_raw: u16,
    pub rssi: u8,
}

impl RcChannelsRaw {
    /// Channels 1 through 8 in order.
    pub fn channels(&self) -> [u16; 8] {
        [
            self.chan1_raw,
            self.chan2_raw,
            self.chan3_raw,
            self.chan4_raw,
            self.chan5_raw,
            self.chan6_raw,
            self.chan7_raw,
            self.chan8_raw,
        ]
    }
}

/// VFR_HUD (id 74).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VfrHud {
    pub airspeed: f32,
    pub groundspeed: f32,
    pub heading: i16,
    pub throttle: u16,
    pub alt: f32,
    pub climb: f32,
}

/// Typed payload of a recognized message.
///
/// Serializes as a single keyed object (`{"attitude": {...}}`) so it can be
/// flattened into the record's JSON form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MessagePayload {
    #[serde(rename = "sysStatus")]
    SysStatus(SysStatus),
    #[serde(rename = "attitude")]
    Attitude(Attitude),
    #[serde(rename = "rcChannels")]
    RcChannelsRaw(RcChannelsRaw),
    #[serde(rename = "vfrHud")]
    VfrHud(VfrHud),
}

impl MessagePayload {
    /// The message type this payload was decoded as.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::SysStatus(_) => MessageKind::SysStatus,
            Self::Attitude(_) => MessageKind::Attitude,
            Self::RcChannelsRaw(_) => MessageKind::RcChannelsRaw,
            Self::VfrHud(_) => MessageKind::VfrHud,
        }
    }
}
