//! Frequency synthesis and calibration engine for the Fitipower FC0012
//! tuner, reached over I2C through a demodulator front end's repeater.
//!
//! The caller supplies the byte-level bus as a [`BusAdapter`]; this crate
//! derives the PLL divider parameters for a requested frequency, programs
//! them, and runs the chip's self-calibration sequence.

use std::io;
use thiserror::Error;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod divider;
pub mod pll;
pub mod registers;
pub mod tuner;

pub use config::{Fc0012Config, TunerConfig};
pub use registers::LnaGain;
pub use tuner::Fc0012;

/// Tuner chip variants known to the capability surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TunerType {
    Fc0012,
    R820t,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("bus communication failed")]
    Io(#[from] io::Error),
    #[error(
        "no valid PLL combination for {frequency} Hz with divider /{divider}: \
         pm {pm} am {am} fractional {fractional}"
    )]
    InfeasiblePll {
        frequency: u64,
        divider: u32,
        pm: i64,
        am: i64,
        fractional: i64,
    },
    #[error("PLL calibration {value:#04x} out of limits [0x02, 0x3c] for {frequency} Hz")]
    Calibration { frequency: u64, value: u8 },
    #[error("expected a {expected:?} configuration, got {found:?}")]
    ConfigMismatch {
        expected: TunerType,
        found: TunerType,
    },
    #[error("failed to apply tuner configuration")]
    Apply(#[source] Box<Error>),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Byte-level access to the tuner's I2C bus through the demodulator front
/// end. Implementations are assumed reliable at the byte level; the engine
/// only sequences calls against them.
///
/// The engine shares an adapter behind a `Mutex` that serves as the bus
/// lock; adapter methods are only called with that lock held.
pub trait BusAdapter {
    /// Read one register byte from the device at `address`. When
    /// `control_repeater` is set the adapter brackets the access with its
    /// own repeater enable/disable.
    fn read_register(&mut self, address: u8, register: u8, control_repeater: bool)
        -> io::Result<u8>;
    /// Write one register byte to the device at `address`.
    fn write_register(
        &mut self,
        address: u8,
        register: u8,
        value: u8,
        control_repeater: bool,
    ) -> io::Result<()>;
    /// Whether the I2C repeater is currently enabled.
    fn is_repeater_enabled(&self) -> bool;
    fn enable_repeater(&mut self) -> io::Result<()>;
    fn disable_repeater(&mut self) -> io::Result<()>;
}

/// Capability surface of one embedded tuner chip.
pub trait Tuner {
    fn tuner_type(&self) -> TunerType;
    /// Lowest tunable frequency, Hz.
    fn minimum_frequency(&self) -> u64;
    /// Highest tunable frequency, Hz.
    fn maximum_frequency(&self) -> u64;
    /// Half-width of the DC spike exclusion zone, Hz.
    fn dc_spike_half_bandwidth(&self) -> u64;
    /// Fraction of the sampled bandwidth usable for decoding.
    fn usable_bandwidth(&self) -> f64;
    /// Tunes the chip to `frequency`, running the calibration sequence.
    ///
    /// A transport failure mid-transaction is logged and swallowed and the
    /// requested frequency is still recorded, so the hardware may be
    /// mistuned until the next successful attempt. PLL infeasibility and
    /// calibration failures are reported as errors.
    fn set_tuned_frequency(&mut self, frequency: u64) -> Result<()>;
    /// Enables AGC, or programs `gain` into the LNA when `agc` is false.
    fn set_gain(&mut self, agc: bool, gain: LnaGain) -> Result<()>;
    /// Applies a stored configuration record. Records for a different chip
    /// variant are rejected before any hardware access.
    fn apply(&mut self, config: &TunerConfig) -> Result<()>;
    /// Adjusts chip filters for the demodulator sample rate. Chips that
    /// need no adjustment keep the default no-op.
    fn set_sample_rate_filters(&mut self, _sample_rate: u32) -> Result<()> {
        Ok(())
    }
}
