use std::fmt;

use cached::proc_macro::cached;
use itertools::Itertools;

pub const CARRIER_KHZ: u32 = 40;

// Pulse timings in microseconds
pub const HDR_MARK: u32 = 3400;
pub const HDR_SPACE: u32 = 1750;
pub const BIT_MARK: u32 = 450;
pub const ONE_SPACE: u32 = 1300;
pub const ZERO_SPACE: u32 = 420;
pub const MSG_SPACE: u32 = 17_500;

// Device codes
pub const POWER_OFF: u8 = 0x00;
pub const POWER_ON: u8 = 0x20;

pub const MODE_AUTO: u8 = 0x60;
pub const MODE_HEAT: u8 = 0x48;
pub const MODE_COOL: u8 = 0x58;
pub const MODE_DRY: u8 = 0x50;

pub const FAN_AUTO: u8 = 0x00;
pub const FAN_1: u8 = 0x01;
pub const FAN_2: u8 = 0x02;
pub const FAN_3: u8 = 0x03;
pub const FAN_4: u8 = 0x04;

// Setpoints in degrees celsius. 31 is reserved for simulated fan-only
// operation and 10 for the FE maintenance mode; neither is accepted from
// callers directly.
pub const TEMP_MIN: u8 = 17;
pub const TEMP_MAX: u8 = 30;
pub const TEMP_DEFAULT: u8 = 23;
pub const TEMP_FAN: u8 = 31;
pub const TEMP_MAINTENANCE: u8 = 10;

pub const FRAME_LENGTH: usize = 18;

const FRAME_TEMPLATE: [u8; FRAME_LENGTH] = [
    0x23, 0xCB, 0x26, 0x01, 0x00, 0x20, 0x48, 0x00, 0xC0, 0x7A, 0x61, 0x00, 0x00, 0x00, 0x10,
    0x40, 0x00, 0x00,
];

/// A complete wire-level command: the 18-byte template with the per-call
/// overrides applied and the checksum in the final byte.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct MitsubishiFrame([u8; FRAME_LENGTH]);

impl MitsubishiFrame {
    pub fn bytes(&self) -> &[u8; FRAME_LENGTH] {
        &self.0
    }

    pub fn checksum(&self) -> u8 {
        self.0[17]
    }
}

impl fmt::Display for MitsubishiFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0.iter().map(|b| format!("0x{:02X}", b)).join(", ")
        )
    }
}

#[cached]
pub fn mitsubishi_frame(power: u8, mode: u8, fan: u8, temperature: u8) -> MitsubishiFrame {
    let mut frame = FRAME_TEMPLATE;
    frame[5] = power;
    frame[6] = mode;
    frame[9] = fan;
    if temperature == TEMP_MAINTENANCE {
        frame[7] = 0x00;
        frame[15] = 0x20;
    } else {
        frame[7] = temperature - 16;
    }
    frame[17] = frame[..17].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    MitsubishiFrame(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checksum_of(frame: &MitsubishiFrame) -> u8 {
        frame.bytes()[..17]
            .iter()
            .fold(0u8, |acc, b| acc.wrapping_add(*b))
    }

    #[test]
    fn checksum_is_truncated_sum_of_leading_bytes() {
        let frame = mitsubishi_frame(POWER_ON, MODE_COOL, FAN_2, 26);
        assert_eq!(frame.checksum(), checksum_of(&frame));
    }

    #[test]
    fn heat_at_23_matches_known_frame() {
        let frame = mitsubishi_frame(POWER_ON, MODE_HEAT, FAN_AUTO, 23);
        assert_eq!(
            frame.bytes(),
            &[
                0x23, 0xCB, 0x26, 0x01, 0x00, 0x20, 0x48, 0x07, 0xC0, 0x00, 0x61, 0x00, 0x00,
                0x00, 0x10, 0x40, 0x00, 0xF5,
            ]
        );
    }

    #[test]
    fn maintenance_sentinel_rewrites_temperature_and_flag_bytes() {
        let frame = mitsubishi_frame(POWER_ON, MODE_HEAT, FAN_AUTO, TEMP_MAINTENANCE);
        assert_eq!(frame.bytes()[7], 0x00);
        assert_eq!(frame.bytes()[15], 0x20);
        assert_eq!(frame.checksum(), checksum_of(&frame));
    }

    #[test]
    fn frame_displays_as_hex_bytes() {
        let frame = mitsubishi_frame(POWER_ON, MODE_HEAT, FAN_AUTO, 23);
        assert!(frame.to_string().starts_with("0x23, 0xCB, 0x26"));
    }
}
