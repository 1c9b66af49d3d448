pub mod types;

use std::convert::Infallible;

use crate::ir::mitsubishi::types::{
    mitsubishi_frame, MitsubishiFrame, BIT_MARK, CARRIER_KHZ, FAN_1, FAN_2, FAN_3, FAN_4,
    FAN_AUTO, HDR_MARK, HDR_SPACE, MODE_AUTO, MODE_COOL, MODE_DRY, MODE_HEAT, MSG_SPACE,
    ONE_SPACE, POWER_OFF, POWER_ON, TEMP_DEFAULT, TEMP_FAN, TEMP_MAINTENANCE, TEMP_MAX, TEMP_MIN,
    ZERO_SPACE,
};
use crate::ir::types::{
    AcCommand, AcMode, FanSpeed, IrSequence, IrStatus, IrTarget, PulseEmitter, SequenceEmitter,
};

/// The two remote variants. They share the frame layout; only FE honors the
/// maintenance mode.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Model {
    Fd,
    Fe,
}

impl Model {
    pub const fn supports_maintenance(&self) -> bool {
        matches!(self, Model::Fe)
    }
}

#[derive(Debug)]
pub struct Mitsubishi {
    model: Model,
    powered: bool,
    mode: AcMode,
    fan: FanSpeed,
    temp: u8,
}

impl Mitsubishi {
    pub fn new(model: Model) -> Self {
        Mitsubishi {
            model,
            powered: false,
            mode: AcMode::Heat,
            fan: FanSpeed::Auto,
            temp: TEMP_DEFAULT,
        }
    }

    pub fn model(&self) -> Model {
        self.model
    }

    /// Maps a symbolic command to device codes. Total: anything the device
    /// cannot express degrades to the heat-pump defaults (heat, 23 degrees,
    /// auto fan).
    fn normalize(&self, command: &AcCommand) -> (u8, u8, u8, u8) {
        let power = if command.power { POWER_ON } else { POWER_OFF };
        let fan = match command.fan {
            FanSpeed::Auto => FAN_AUTO,
            FanSpeed::F1 => FAN_1,
            FanSpeed::F2 => FAN_2,
            FanSpeed::F3 => FAN_3,
            FanSpeed::F4 => FAN_4,
        };
        let mode = match command.mode {
            AcMode::Auto => MODE_AUTO,
            AcMode::Heat => MODE_HEAT,
            AcMode::Cool => MODE_COOL,
            AcMode::Dry => MODE_DRY,
            // no fan-only mode on the wire; cool at the reserved top setpoint
            AcMode::Fan => return (power, MODE_COOL, fan, TEMP_FAN),
            AcMode::Maintenance if self.model.supports_maintenance() => {
                return (power, MODE_HEAT, FAN_AUTO, TEMP_MAINTENANCE);
            }
            AcMode::Maintenance => MODE_HEAT,
        };
        (power, mode, fan, clamp_setpoint(command.temperature))
    }

    pub fn frame(&self, command: &AcCommand) -> MitsubishiFrame {
        let (power, mode, fan, temperature) = self.normalize(command);
        mitsubishi_frame(power, mode, fan, temperature)
    }

    /// Emits `command` through `ir`: a 40 kHz carrier, two identical bursts
    /// of header plus frame bytes, an inter-message gap after the first
    /// burst only, and a trailing end mark.
    pub fn send<P: PulseEmitter>(&self, ir: &mut P, command: &AcCommand) -> Result<(), P::Error> {
        let frame = self.frame(command);
        ir.set_frequency(CARRIER_KHZ)?;
        for burst in 0..2 {
            ir.mark(HDR_MARK)?;
            ir.space(HDR_SPACE)?;
            for byte in frame.bytes() {
                ir.send_byte(*byte, BIT_MARK, ZERO_SPACE, ONE_SPACE)?;
            }
            if burst == 0 {
                ir.mark(BIT_MARK)?;
                ir.space(MSG_SPACE)?;
            }
        }
        ir.mark(BIT_MARK)?;
        ir.space(0)?;
        Ok(())
    }

    fn command(&self) -> AcCommand {
        AcCommand {
            power: self.powered,
            mode: self.mode,
            fan: self.fan,
            temperature: self.temp,
        }
    }

    fn as_ir_sequence(&self) -> Result<IrSequence, <Mitsubishi as IrTarget>::Error> {
        let mut emitter = SequenceEmitter::default();
        self.send(&mut emitter, &self.command())?;
        Ok(emitter.into_sequence())
    }
}

fn clamp_setpoint(temperature: u8) -> u8 {
    if (TEMP_MIN..=TEMP_MAX).contains(&temperature) {
        temperature
    } else {
        TEMP_DEFAULT
    }
}

impl IrTarget for Mitsubishi {
    type Error = Infallible;
    const FRAME_LENGTH: usize = types::FRAME_LENGTH;

    fn power_off(&mut self) -> Result<IrSequence, Self::Error> {
        self.powered = false;
        self.as_ir_sequence()
    }

    fn power_on(&mut self) -> Result<IrSequence, Self::Error> {
        self.powered = true;
        self.as_ir_sequence()
    }

    fn is_powered(&self) -> bool {
        self.powered
    }

    fn temp_set(&mut self, temperature: u8) -> Result<IrSequence, Self::Error> {
        self.temp = clamp_setpoint(temperature);
        self.as_ir_sequence()
    }

    fn fan_set(&mut self, fan: FanSpeed) -> Result<IrSequence, Self::Error> {
        self.fan = fan;
        self.as_ir_sequence()
    }

    fn mode_set(&mut self, mode: AcMode) -> Result<IrSequence, Self::Error> {
        self.mode = mode;
        self.as_ir_sequence()
    }

    fn status(&self) -> IrStatus {
        IrStatus {
            powered: self.powered,
            mode: self.mode,
            fan: self.fan,
            temperature: self.temp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::IrPulse;
    use strum::IntoEnumIterator;

    fn fe() -> Mitsubishi {
        Mitsubishi::new(Model::Fe)
    }

    fn heat(temperature: u8) -> AcCommand {
        AcCommand {
            power: true,
            mode: AcMode::Heat,
            fan: FanSpeed::Auto,
            temperature,
        }
    }

    #[test]
    fn accepted_setpoints_encode_as_offsets() {
        let dev = fe();
        for t in TEMP_MIN..=TEMP_MAX {
            let frame = dev.frame(&heat(t));
            assert_eq!(frame.bytes()[7], t - 16);
            assert_eq!(frame.bytes()[15], 0x40);
        }
    }

    #[test]
    fn out_of_range_setpoints_fall_back_to_default() {
        let dev = fe();
        for t in [0, 10, 16, 31, 32, 100] {
            let frame = dev.frame(&heat(t));
            assert_eq!(frame.bytes()[7], TEMP_DEFAULT - 16);
            assert_eq!(frame.bytes()[15], 0x40);
        }
    }

    #[test]
    fn fan_mode_cools_at_the_reserved_top_setpoint() {
        let dev = fe();
        let frame = dev.frame(&AcCommand {
            power: true,
            mode: AcMode::Fan,
            fan: FanSpeed::F2,
            temperature: 20,
        });
        assert_eq!(frame.bytes()[6], MODE_COOL);
        assert_eq!(frame.bytes()[7], TEMP_FAN - 16);
        assert_eq!(frame.bytes()[9], FAN_2);
    }

    #[test]
    fn maintenance_on_fe_overrides_temperature_and_fan() {
        let dev = fe();
        let frame = dev.frame(&AcCommand {
            power: true,
            mode: AcMode::Maintenance,
            fan: FanSpeed::F3,
            temperature: 25,
        });
        assert_eq!(frame.bytes()[6], MODE_HEAT);
        assert_eq!(frame.bytes()[7], 0x00);
        assert_eq!(frame.bytes()[9], FAN_AUTO);
        assert_eq!(frame.bytes()[15], 0x20);
    }

    #[test]
    fn maintenance_on_fd_has_no_special_effect() {
        let dev = Mitsubishi::new(Model::Fd);
        let frame = dev.frame(&AcCommand {
            power: true,
            mode: AcMode::Maintenance,
            fan: FanSpeed::F2,
            temperature: 25,
        });
        assert_eq!(frame.bytes()[6], MODE_HEAT);
        assert_eq!(frame.bytes()[7], 25 - 16);
        assert_eq!(frame.bytes()[9], FAN_2);
        assert_eq!(frame.bytes()[15], 0x40);
    }

    #[test]
    fn power_and_mode_are_independent() {
        let dev = fe();
        let frame = dev.frame(&AcCommand {
            power: false,
            mode: AcMode::Cool,
            fan: FanSpeed::F1,
            temperature: 20,
        });
        assert_eq!(frame.bytes()[5], POWER_OFF);
        assert_eq!(frame.bytes()[6], MODE_COOL);
        assert_eq!(frame.bytes()[7], 20 - 16);
        assert_eq!(frame.bytes()[9], FAN_1);
    }

    #[test]
    fn every_mode_and_model_yields_a_valid_checksum() {
        for model in [Model::Fd, Model::Fe] {
            let dev = Mitsubishi::new(model);
            for mode in AcMode::iter() {
                for fan in FanSpeed::iter() {
                    let frame = dev.frame(&AcCommand {
                        power: true,
                        mode,
                        fan,
                        temperature: 22,
                    });
                    let sum = frame.bytes()[..17]
                        .iter()
                        .fold(0u8, |acc, b| acc.wrapping_add(*b));
                    assert_eq!(frame.checksum(), sum);
                }
            }
        }
    }

    #[test]
    fn pulse_train_repeats_the_frame_twice_with_gap_and_end_mark() {
        // header pair plus 18 bytes of 8 mark/space pairs each
        const BURST: usize = 2 + 18 * 8 * 2;

        let dev = fe();
        let mut emitter = SequenceEmitter::default();
        dev.send(&mut emitter, &heat(23)).unwrap();
        assert_eq!(emitter.carrier_khz(), Some(CARRIER_KHZ));

        let pulses = emitter.into_sequence().into_inner();
        assert_eq!(pulses.len(), BURST * 2 + 4);
        assert_eq!(pulses[0], IrPulse(HDR_MARK as u128));
        assert_eq!(pulses[1], IrPulse(HDR_SPACE as u128));
        // gap after the first burst only
        assert_eq!(pulses[BURST], IrPulse(BIT_MARK as u128));
        assert_eq!(pulses[BURST + 1], IrPulse(MSG_SPACE as u128));
        assert_eq!(pulses[BURST + 2], IrPulse(HDR_MARK as u128));
        // both bursts carry identical data
        assert_eq!(&pulses[2..BURST], &pulses[BURST + 4..BURST * 2 + 2]);
        // end mark
        assert_eq!(pulses[BURST * 2 + 2], IrPulse(BIT_MARK as u128));
        assert_eq!(pulses[BURST * 2 + 3], IrPulse(0));
    }

    #[test]
    fn target_state_round_trips_through_status() {
        let mut dev = fe();
        dev.mode_set(AcMode::Cool).unwrap();
        dev.fan_set(FanSpeed::F4).unwrap();
        dev.temp_set(26).unwrap();
        dev.power_on().unwrap();
        let status = dev.status();
        assert!(status.powered);
        assert_eq!(status.mode, AcMode::Cool);
        assert_eq!(status.fan, FanSpeed::F4);
        assert_eq!(status.temperature, 26);
        assert!(dev.is_powered());
    }

    #[test]
    fn target_temp_set_clamps_to_default() {
        let mut dev = fe();
        dev.temp_set(33).unwrap();
        assert_eq!(dev.status().temperature, TEMP_DEFAULT);
    }
}
