use std::convert::Infallible;
use std::str::FromStr;

use num_traits::AsPrimitive;
use strum_macros::EnumIter;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct IrPulse(pub u128);

impl IrPulse {
    pub fn into_inner(self) -> u128 {
        self.0
    }
}

impl AsPrimitive<u128> for IrPulse {
    fn as_(self) -> u128 {
        self.0
    }
}

impl AsPrimitive<f64> for IrPulse {
    fn as_(self) -> f64 {
        self.0.as_()
    }
}

impl AsPrimitive<usize> for IrPulse {
    fn as_(self) -> usize {
        self.0.as_()
    }
}

#[derive(Debug, Clone, Default, PartialOrd, PartialEq)]
pub struct IrSequence(pub Vec<IrPulse>);

impl IrSequence {
    pub fn into_inner(self) -> Vec<IrPulse> {
        self.0
    }
}

impl AsRef<[IrPulse]> for IrSequence {
    fn as_ref(&self) -> &[IrPulse] {
        &self.0
    }
}

// emitter

/// Contract of the physical pulse-emission service: carrier selection plus
/// raw mark/space pulses. Byte emission is least-significant bit first.
pub trait PulseEmitter {
    type Error: std::error::Error + Send + Sync;

    fn set_frequency(&mut self, khz: u32) -> Result<(), Self::Error>;
    fn mark(&mut self, micros: u32) -> Result<(), Self::Error>;
    fn space(&mut self, micros: u32) -> Result<(), Self::Error>;

    fn send_byte(
        &mut self,
        byte: u8,
        bit_mark: u32,
        zero_space: u32,
        one_space: u32,
    ) -> Result<(), Self::Error> {
        let mut bits = byte;
        for _ in 0..8 {
            self.mark(bit_mark)?;
            if (bits & 1) == 0 {
                self.space(zero_space)?;
            } else {
                self.space(one_space)?;
            }
            bits >>= 1;
        }
        Ok(())
    }
}

/// Records the pulse train as an [`IrSequence`] instead of driving hardware.
/// Marks land on even offsets, spaces on odd ones, which is the layout the
/// output stage plays back.
#[derive(Debug, Default)]
pub struct SequenceEmitter {
    carrier_khz: Option<u32>,
    pulses: Vec<IrPulse>,
}

impl SequenceEmitter {
    pub fn carrier_khz(&self) -> Option<u32> {
        self.carrier_khz
    }

    pub fn into_sequence(self) -> IrSequence {
        IrSequence(self.pulses)
    }
}

impl PulseEmitter for SequenceEmitter {
    type Error = Infallible;

    fn set_frequency(&mut self, khz: u32) -> Result<(), Self::Error> {
        self.carrier_khz = Some(khz);
        Ok(())
    }

    fn mark(&mut self, micros: u32) -> Result<(), Self::Error> {
        self.pulses.push(IrPulse(micros as u128));
        Ok(())
    }

    fn space(&mut self, micros: u32) -> Result<(), Self::Error> {
        self.pulses.push(IrPulse(micros as u128));
        Ok(())
    }
}

// target

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, EnumIter)]
pub enum AcMode {
    Auto,
    Heat,
    Cool,
    Dry,
    Fan,
    Maintenance,
}

impl Default for AcMode {
    fn default() -> Self {
        AcMode::Heat
    }
}

#[derive(Error, Debug)]
#[error("Invalid AC mode")]
pub struct InvalidAcMode;

impl FromStr for AcMode {
    type Err = InvalidAcMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(AcMode::Auto),
            "heat" => Ok(AcMode::Heat),
            "cool" => Ok(AcMode::Cool),
            "dry" => Ok(AcMode::Dry),
            "fan" => Ok(AcMode::Fan),
            "maintenance" => Ok(AcMode::Maintenance),
            _ => Err(InvalidAcMode),
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, EnumIter)]
pub enum FanSpeed {
    Auto,
    F1,
    F2,
    F3,
    F4,
}

impl Default for FanSpeed {
    fn default() -> Self {
        FanSpeed::Auto
    }
}

#[derive(Error, Debug)]
#[error("Invalid fan speed")]
pub struct InvalidFanSpeed;

impl FromStr for FanSpeed {
    type Err = InvalidFanSpeed;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(FanSpeed::Auto),
            "1" => Ok(FanSpeed::F1),
            "2" => Ok(FanSpeed::F2),
            "3" => Ok(FanSpeed::F3),
            "4" => Ok(FanSpeed::F4),
            _ => Err(InvalidFanSpeed),
        }
    }
}

/// One symbolic remote-control command. Transient and caller-owned; every
/// send builds its frame fresh from these fields.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct AcCommand {
    pub power: bool,
    pub mode: AcMode,
    pub fan: FanSpeed,
    pub temperature: u8,
}

#[derive(Debug, Clone)]
pub struct IrStatus {
    pub powered: bool,
    pub mode: AcMode,
    pub fan: FanSpeed,
    pub temperature: u8,
}

pub trait IrTarget {
    type Error: std::error::Error + Send + Sync;
    const FRAME_LENGTH: usize;
    fn power_off(&mut self) -> Result<IrSequence, Self::Error>;
    fn power_on(&mut self) -> Result<IrSequence, Self::Error>;
    fn is_powered(&self) -> bool;
    fn temp_set(&mut self, temperature: u8) -> Result<IrSequence, Self::Error>;
    fn fan_set(&mut self, fan: FanSpeed) -> Result<IrSequence, Self::Error>;
    fn mode_set(&mut self, mode: AcMode) -> Result<IrSequence, Self::Error>;
    fn status(&self) -> IrStatus;
}
