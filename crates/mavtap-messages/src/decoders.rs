//! Field decoders, one per built-in message type.
//!
//! Every field is little-endian at a fixed offset from the payload start. The
//! layouts are contiguous, so each decoder checks the full span once and then
//! reads fields front to back; struct literal fields are evaluated in the order
//! written, which is wire order.

use bytes::Buf;

use crate::error::{DecodeError, Result};
use crate::types::{Attitude, MessagePayload, RcChannelsRaw, SysStatus, VfrHud};

/// SYS_STATUS span: `errors_count4` at offset 29, 2 bytes.
pub const SYS_STATUS_LEN: usize = 31;

/// ATTITUDE span: `yawspeed` at offset 24, 4 bytes.
pub const ATTITUDE_LEN: usize = 28;

/// RC_CHANNELS_RAW span: `rssi` at offset 21, 1 byte.
pub const RC_CHANNELS_RAW_LEN: usize = 22;

/// VFR_HUD span: `climb` at offset 16, 4 bytes.
pub const VFR_HUD_LEN: usize = 20;

const MILLIVOLTS_PER_VOLT: f64 = 1000.0;
const CENTIAMPS_PER_AMP: f64 = 100.0;

pub fn decode_sys_status(payload: &[u8]) -> Result<MessagePayload> {
    let mut buf = checked(payload, "SYS_STATUS", SYS_STATUS_LEN)?;
    Ok(MessagePayload::SysStatus(SysStatus {
        onboard_control_sensors_present: buf.get_u32_le(),
        onboard_control_sensors_enabled: buf.get_u32_le(),
        onboard_control_sensors_health: buf.get_u32_le(),
        load: buf.get_u16_le(),
        voltage_battery: f64::from(buf.get_u16_le()) / MILLIVOLTS_PER_VOLT,
        current_battery: f64::from(buf.get_i16_le()) / CENTIAMPS_PER_AMP,
        battery_remaining: buf.get_i8(),
        drop_rate_comm: buf.get_u16_le(),
        errors_comm: buf.get_u16_le(),
        errors_count1: buf.get_u16_le(),
        errors_count2: buf.get_u16_le(),
        errors_count3: buf.get_u16_le(),
        errors_count4: buf.get_u16_le(),
    }))
}

pub fn decode_attitude(payload: &[u8]) -> Result<MessagePayload> {
    let mut buf = checked(payload, "ATTITUDE", ATTITUDE_LEN)?;
    Ok(MessagePayload::Attitude(Attitude {
        time_boot_ms: buf.get_u32_le(),
        roll: radians_to_degrees(buf.get_f32_le()),
        pitch: -radians_to_degrees(buf.get_f32_le()),
        yaw: radians_to_degrees(buf.get_f32_le()),
        rollspeed: buf.get_f32_le(),
        pitchspeed: buf.get_f32_le(),
        yawspeed: buf.get_f32_le(),
    }))
}

pub fn decode_rc_channels_raw(payload: &[u8]) -> Result<MessagePayload> {
    let mut buf = checked(payload, "RC_CHANNELS_RAW", RC_CHANNELS_RAW_LEN)?;
    Ok(MessagePayload::RcChannelsRaw(RcChannelsRaw {
        time_boot_ms: buf.get_u32_le(),
        port: buf.get_u8(),
        chan1_raw: buf.get_u16_le(),
        chan2_raw: buf.get_u16_le(),
        chan3_raw: buf.get_u16_le(),
        chan4_raw: buf.get_u16_le(),
        chan5_raw: buf.get_u16_le(),
        chan6_raw: buf.get_u16_le(),
        chan7_raw: buf.get_u16_le(),
        chan8_raw: buf.get_u16_le(),
        rssi: buf.get_u8(),
    }))
}

pub fn decode_vfr_hud(payload: &[u8]) -> Result<MessagePayload> {
    let mut buf = checked(payload, "VFR_HUD", VFR_HUD_LEN)?;
    Ok(MessagePayload::VfrHud(VfrHud {
        airspeed: buf.get_f32_le(),
        groundspeed: buf.get_f32_le(),
        heading: buf.get_i16_le(),
        throttle: buf.get_u16_le(),
        alt: buf.get_f32_le(),
        climb: buf.get_f32_le(),
    }))
}

/// Returns the first `required` bytes of `payload`, or the too-short error.
fn checked<'a>(payload: &'a [u8], message: &'static str, required: usize) -> Result<&'a [u8]> {
    payload
        .get(..required)
        .ok_or(DecodeError::PayloadTooShortForType {
            message,
            required,
            actual: payload.len(),
        })
}

fn radians_to_degrees(radians: f32) -> f64 {
    f64::from(radians).to_degrees()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use bytes::{BufMut, BytesMut};

    use super::*;

    fn sys_status_payload() -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_u32_le(0x0020_FC0F);
        buf.put_u32_le(0x0020_FC0E);
        buf.put_u32_le(0x0000_FC0D);
        buf.put_u16_le(512);
        buf.put_u16_le(12_345);
        buf.put_i16_le(-250);
        buf.put_i8(-1);
        buf.put_u16_le(3);
        buf.put_u16_le(4);
        buf.put_u16_le(5);
        buf.put_u16_le(6);
        buf.put_u16_le(7);
        buf.put_u16_le(0xFFFF);
        buf
    }

    #[test]
    fn sys_status_fields_and_unit_conversions() {
        let payload = sys_status_payload();
        assert_eq!(payload.len(), SYS_STATUS_LEN);

        let MessagePayload::SysStatus(status) = decode_sys_status(&payload).unwrap() else {
            panic!("expected SYS_STATUS payload");
        };

        assert_eq!(status.onboard_control_sensors_present, 0x0020_FC0F);
        assert_eq!(status.onboard_control_sensors_enabled, 0x0020_FC0E);
        assert_eq!(status.onboard_control_sensors_health, 0x0000_FC0D);
        assert_eq!(status.load, 512);
        assert_eq!(status.voltage_battery, 12_345.0 / 1000.0);
        assert_eq!(status.current_battery, -250.0 / 100.0);
        assert_eq!(status.battery_remaining, -1);
        assert_eq!(status.drop_rate_comm, 3);
        assert_eq!(status.errors_comm, 4);
        assert_eq!(status.errors_count1, 5);
        assert_eq!(status.errors_count2, 6);
        assert_eq!(status.errors_count3, 7);
        assert_eq!(status.errors_count4, 0xFFFF);
    }

    #[test]
    fn sys_status_odd_offsets_read_unaligned() {
        let mut payload = vec![0u8; SYS_STATUS_LEN];
        payload[18] = 0x9C; // battery_remaining = -100
        payload[19..21].copy_from_slice(&0x1234u16.to_le_bytes());
        payload[29..31].copy_from_slice(&0xBEEFu16.to_le_bytes());

        let MessagePayload::SysStatus(status) = decode_sys_status(&payload).unwrap() else {
            panic!("expected SYS_STATUS payload");
        };
        assert_eq!(status.battery_remaining, -100);
        assert_eq!(status.drop_rate_comm, 0x1234);
        assert_eq!(status.errors_count4, 0xBEEF);
    }

    #[test]
    fn attitude_converts_to_degrees_and_inverts_pitch() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(123_456);
        buf.put_f32_le(0.1);
        buf.put_f32_le(0.1);
        buf.put_f32_le(0.1);
        buf.put_f32_le(0.5);
        buf.put_f32_le(-0.25);
        buf.put_f32_le(1.5);

        let MessagePayload::Attitude(attitude) = decode_attitude(&buf).unwrap() else {
            panic!("expected ATTITUDE payload");
        };

        let expected = f64::from(0.1f32) * (180.0 / PI);
        assert_eq!(attitude.time_boot_ms, 123_456);
        assert!((attitude.roll - expected).abs() < 1e-12);
        assert!((attitude.pitch + expected).abs() < 1e-12);
        assert!((attitude.yaw - expected).abs() < 1e-12);
        assert!(attitude.roll > 0.0 && attitude.yaw > 0.0 && attitude.pitch < 0.0);
        assert_eq!(attitude.rollspeed, 0.5);
        assert_eq!(attitude.pitchspeed, -0.25);
        assert_eq!(attitude.yawspeed, 1.5);
    }

    #[test]
    fn rc_channels_raw_reads_odd_aligned_channels() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(42);
        buf.put_u8(1);
        for chan in 0..8u16 {
            buf.put_u16_le(1000 + chan * 100);
        }
        buf.put_u8(254);

        let MessagePayload::RcChannelsRaw(rc) = decode_rc_channels_raw(&buf).unwrap() else {
            panic!("expected RC_CHANNELS_RAW payload");
        };

        assert_eq!(rc.time_boot_ms, 42);
        assert_eq!(rc.port, 1);
        assert_eq!(
            rc.channels(),
            [1000, 1100, 1200, 1300, 1400, 1500, 1600, 1700]
        );
        assert_eq!(rc.rssi, 254);
    }

    #[test]
    fn vfr_hud_signed_heading_and_floats() {
        let mut buf = BytesMut::new();
        buf.put_f32_le(14.5);
        buf.put_f32_le(15.25);
        buf.put_i16_le(-90);
        buf.put_u16_le(65);
        buf.put_f32_le(123.45);
        buf.put_f32_le(-1.0);

        let MessagePayload::VfrHud(hud) = decode_vfr_hud(&buf).unwrap() else {
            panic!("expected VFR_HUD payload");
        };

        assert_eq!(hud.airspeed, 14.5);
        assert_eq!(hud.groundspeed, 15.25);
        assert_eq!(hud.heading, -90);
        assert_eq!(hud.throttle, 65);
        assert!((hud.alt - 123.45).abs() < 1e-4);
        assert_eq!(hud.climb, -1.0);
    }

    #[test]
    fn one_byte_short_is_rejected_for_every_type() {
        let cases: [(fn(&[u8]) -> Result<MessagePayload>, &str, usize); 4] = [
            (decode_sys_status, "SYS_STATUS", SYS_STATUS_LEN),
            (decode_attitude, "ATTITUDE", ATTITUDE_LEN),
            (decode_rc_channels_raw, "RC_CHANNELS_RAW", RC_CHANNELS_RAW_LEN),
            (decode_vfr_hud, "VFR_HUD", VFR_HUD_LEN),
        ];

        for (decode, name, required) in cases {
            let payload = vec![0u8; required - 1];
            assert_eq!(
                decode(&payload),
                Err(DecodeError::PayloadTooShortForType {
                    message: name,
                    required,
                    actual: required - 1,
                })
            );
        }
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(
            decode_vfr_hud(&[]),
            Err(DecodeError::PayloadTooShortForType { actual: 0, .. })
        ));
    }

    #[test]
    fn extra_trailing_bytes_are_ignored() {
        let mut payload = vec![0u8; VFR_HUD_LEN + 8];
        payload[8..10].copy_from_slice(&270i16.to_le_bytes());
        payload[VFR_HUD_LEN..].fill(0xFF);

        let MessagePayload::VfrHud(hud) = decode_vfr_hud(&payload).unwrap() else {
            panic!("expected VFR_HUD payload");
        };
        assert_eq!(hud.heading, 270);
        assert_eq!(hud.climb, 0.0);
    }
}
