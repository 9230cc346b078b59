/* FC0012 register and field catalog.
 *
 * The chip exposes a flat byte register space at I2C address 0xC6 behind
 * the demodulator's repeater. Everything here is static data; the tuning
 * transaction in tuner.rs decides when each register is touched.
 * */
use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(test)]
use proptest_derive::Arbitrary;

/// I2C address of the FC0012 behind the demodulator's repeater.
pub const I2C_ADDRESS: u8 = 0xC6;

/// Reference crystal, Hz.
pub const XTAL_FREQUENCY: u64 = 28_800_000;

/// Calibration readback window. Values outside it mean the VCO cannot
/// center in the selected range.
pub const CALIBRATION_MIN: u8 = 0x02;
pub const CALIBRATION_MAX: u8 = 0x3C;

/// Value written to R13 to enable AGC.
pub const R13_AGC_ENABLE: u8 = 0x0A;

/// Control register addresses.
#[rustfmt::skip]
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Register {
    R00, R01, R02, R03, R04, R05, R06, R07, R08, R09, R0A, R0B, R0C, R0D,
    R0E, R0F, R10, R11, R12, R13, R14, R15, R16, R17, R18, R19, R1A, R1B,
    R1C, R1D,
}

bitflags! {
    /// PLL enable bits ORed into the R05 divider preset on every tune.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct R05Flags: u8 {
        const PLL_ENABLE = 0x07;
    }

    /// Control bits carried in R06 on top of the divider preset.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct R06Flags: u8 {
        /// Selects the upper of the VCO's two frequency sub-ranges.
        const VCO_SELECT = 0x08;
    }

    /// R11 housekeeping bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct R11Flags: u8 {
        /// 6 MHz narrowband mode, cleared while the PLL locks.
        const NARROW_BAND = 0x04;
    }

    /// Calibration trigger and readback bits in R0E.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CalFlags: u8 {
        const START = 0x80;
        const VALUE = 0x3F;
    }
}

/// A sub-range of bits within one control register. Writes through a field
/// leave the bits outside its mask untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub register: Register,
    pub mask: u8,
}

impl Field {
    /// Low-noise-amplifier gain code, R14[4:0].
    pub const LNA_GAIN: Field = Field {
        register: Register::R14,
        mask: 0x1F,
    };
    /// Bandwidth selection, R06[7:6].
    pub const BANDWIDTH: Field = Field {
        register: Register::R06,
        mask: 0xC0,
    };

    /// Register byte after installing `value` into this field of
    /// `current`.
    pub fn apply(self, current: u8, value: u8) -> u8 {
        (current & !self.mask) | (value & self.mask)
    }
}

/// Manual LNA gain settings and their device codes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(test, derive(Arbitrary))]
#[repr(u8)]
pub enum LnaGain {
    Minus9p9Db = 0x02,
    Plus7p1Db = 0x08,
    Plus17p9Db = 0x17,
    #[default]
    Plus19p2Db = 0x10,
}

impl fmt::Display for LnaGain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LnaGain::Minus9p9Db => "-9.9db",
            LnaGain::Plus7p1Db => "7.1db",
            LnaGain::Plus17p9Db => "17.9db",
            LnaGain::Plus19p2Db => "19.2db",
        };
        f.write_str(label)
    }
}

/// Register image written at power-up, R01 through R15.
#[rustfmt::skip]
pub const POWER_ON_DEFAULTS: [(Register, u8); 21] = [
    (Register::R01, 0x05), (Register::R02, 0x10), (Register::R03, 0x00),
    (Register::R04, 0x00), (Register::R05, 0x0F), (Register::R06, 0x00),
    (Register::R07, 0x00), (Register::R08, 0xFF), (Register::R09, 0x6E),
    (Register::R0A, 0xB8), (Register::R0B, 0x82), (Register::R0C, 0xFC),
    (Register::R0D, 0x02), (Register::R0E, 0x00), (Register::R0F, 0x00),
    (Register::R10, 0x00), (Register::R11, 0x00), (Register::R12, 0x1F),
    (Register::R13, 0x08), (Register::R14, 0x00), (Register::R15, 0x04),
];

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn register_addresses_are_contiguous() {
        for addr in 0x00..=0x1D {
            assert_eq!(addr, u8::from(Register::try_from(addr).unwrap()));
        }
        assert!(Register::try_from(0x1E).is_err());
    }

    #[test]
    fn lna_gain_codes_round_trip() {
        for gain in [
            LnaGain::Minus9p9Db,
            LnaGain::Plus7p1Db,
            LnaGain::Plus17p9Db,
            LnaGain::Plus19p2Db,
        ] {
            assert_eq!(gain, LnaGain::try_from(u8::from(gain)).unwrap());
        }
    }

    proptest! {
        #[test]
        fn field_write_preserves_unmasked_bits(current: u8, value: u8) {
            let next = Field::LNA_GAIN.apply(current, value);
            prop_assert_eq!(
                next & !Field::LNA_GAIN.mask,
                current & !Field::LNA_GAIN.mask
            );
            prop_assert_eq!(next & Field::LNA_GAIN.mask, value & Field::LNA_GAIN.mask);

            let next = Field::BANDWIDTH.apply(current, value);
            prop_assert_eq!(
                next & !Field::BANDWIDTH.mask,
                current & !Field::BANDWIDTH.mask
            );
        }

        #[test]
        fn lna_codes_fit_their_field(gain: LnaGain) {
            prop_assert_eq!(u8::from(gain) & !Field::LNA_GAIN.mask, 0);
        }
    }
}
