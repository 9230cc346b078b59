//! The FC0012 engine: tuning transaction, gain control and configuration
//! adapter, all bracketed by the shared bus lock and the demodulator's
//! I2C repeater.

use log::{debug, error};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::TunerConfig;
use crate::divider::DividerConfig;
use crate::pll::{self, PllParameters};
use crate::registers::{
    CalFlags, Field, LnaGain, Register, R05Flags, R06Flags, R11Flags, CALIBRATION_MAX,
    CALIBRATION_MIN, I2C_ADDRESS, POWER_ON_DEFAULTS, R13_AGC_ENABLE,
};
use crate::{BusAdapter, Error, Result, Tuner, TunerType};

/// Lowest tunable frequency, Hz.
pub const MINIMUM_FREQUENCY: u64 = 21_733_400;
/// Highest tunable frequency, Hz.
pub const MAXIMUM_FREQUENCY: u64 = 947_733_400;
/// Half-width of the DC spike exclusion zone, Hz.
pub const DC_SPIKE_HALF_BANDWIDTH: u64 = 15_000;
/// Fraction of the sampled bandwidth usable for decoding.
pub const USABLE_BANDWIDTH: f64 = 0.95;

/// Synthesis and calibration engine for one FC0012.
///
/// The adapter is shared, not owned; the mutex around it is the bus lock
/// and is held for the whole of every register transaction. Multiple
/// engines over independent adapters are fine, which is how the tests
/// drive simulated hardware.
pub struct Fc0012<A: BusAdapter> {
    bus: Arc<Mutex<A>>,
    tuned_frequency: u64,
}

impl<A: BusAdapter> Fc0012<A> {
    pub fn new(bus: Arc<Mutex<A>>) -> Self {
        Fc0012 {
            bus,
            tuned_frequency: MINIMUM_FREQUENCY,
        }
    }

    /// Frequency recorded by the last tuning attempt.
    pub fn tuned_frequency(&self) -> u64 {
        self.tuned_frequency
    }

    /// Acquires the bus lock. A poisoned lock is taken over as-is; the
    /// adapter carries no invariants a panicked holder could break.
    fn lock(&self) -> MutexGuard<'_, A> {
        self.bus.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(bus: &mut A, register: Register, value: u8, control_repeater: bool) -> io::Result<()> {
        bus.write_register(I2C_ADDRESS, register.into(), value, control_repeater)
    }

    fn read(bus: &mut A, register: Register, control_repeater: bool) -> io::Result<u8> {
        bus.read_register(I2C_ADDRESS, register.into(), control_repeater)
    }

    /// Read-modify-write of one register field, preserving the bits
    /// outside the field's mask. Caller must already hold the bus lock
    /// and have the repeater in the required state.
    fn write_field(bus: &mut A, field: Field, value: u8, control_repeater: bool) -> io::Result<()> {
        let current = Self::read(bus, field.register, control_repeater)?;
        Self::write(bus, field.register, field.apply(current, value), control_repeater)
    }

    /// Power-up initialization: loads the register image and enables AGC.
    pub fn init(&mut self) -> Result<()> {
        let mut bus = self.lock();
        bus.enable_repeater()?;
        for &(register, value) in POWER_ON_DEFAULTS.iter() {
            Self::write(&mut bus, register, value, false)?;
        }
        Self::write(&mut bus, Register::R13, R13_AGC_ENABLE, false)?;
        bus.disable_repeater()?;
        Ok(())
    }

    /// One full tuning transaction, run with the bus lock held.
    fn tune(bus: &mut A, frequency: u64) -> Result<()> {
        let repeater_was_enabled = bus.is_repeater_enabled();
        if !repeater_was_enabled {
            bus.enable_repeater()?;
        }

        let divider = DividerConfig::select(frequency);
        let params = pll::solve(frequency, &divider)?;
        debug!(
            "FC0012 tuning {} Hz: divider /{} pm {} am {} fractional {} vco {}",
            frequency, divider.divider, params.pm, params.am, params.fractional,
            params.vco_select,
        );

        Self::program(bus, &divider, &params, frequency)?;

        // Restored on the success path only; a failed attempt leaves the
        // repeater enabled. Matches the gain path's asymmetry, see
        // set_gain.
        if !repeater_was_enabled {
            bus.disable_repeater()?;
        }
        Ok(())
    }

    /// Programs the divisor registers and runs calibration, flipping the
    /// VCO range bit and recalibrating at most once.
    fn program(
        bus: &mut A,
        divider: &DividerConfig,
        params: &PllParameters,
        frequency: u64,
    ) -> Result<()> {
        let register5 = divider.register5 | R05Flags::PLL_ENABLE.bits();
        let mut register6 = divider.register6();
        if params.vco_select {
            register6 |= R06Flags::VCO_SELECT.bits();
        }

        Self::write(bus, Register::R01, params.am, false)?;
        Self::write(bus, Register::R02, params.pm, false)?;
        Self::write(bus, Register::R03, (params.fractional >> 8) as u8, false)?;
        Self::write(bus, Register::R04, (params.fractional & 0xFF) as u8, false)?;
        Self::write(bus, Register::R05, register5, false)?;
        Self::write(bus, Register::R06, register6, false)?;

        // Narrowband bit must be clear while the PLL locks.
        let r11 = Self::read(bus, Register::R11, false)?;
        Self::write(bus, Register::R11, r11 & !R11Flags::NARROW_BAND.bits(), false)?;

        let mut calibration = Self::calibrate(bus)?;

        let flipped = if params.vco_select && calibration > CALIBRATION_MAX {
            register6 &= !R06Flags::VCO_SELECT.bits();
            true
        } else if !params.vco_select && calibration < CALIBRATION_MIN {
            register6 |= R06Flags::VCO_SELECT.bits();
            true
        } else {
            false
        };

        if flipped {
            Self::write(bus, Register::R06, register6, false)?;
            calibration = Self::calibrate(bus)?;
            if (!params.vco_select && calibration < CALIBRATION_MIN)
                || (params.vco_select && calibration > CALIBRATION_MAX)
            {
                error!(
                    "FC0012 calibration {calibration:#04x} still out of limits after VCO \
                     range flip for {frequency} Hz"
                );
                return Err(Error::Calibration {
                    frequency,
                    value: calibration,
                });
            }
        }
        Ok(())
    }

    /// Pulses the calibration trigger and reads back the result.
    fn calibrate(bus: &mut A) -> io::Result<u8> {
        Self::write(bus, Register::R0E, CalFlags::START.bits(), false)?;
        Self::write(bus, Register::R0E, 0x00, false)?;
        Self::write(bus, Register::R0E, 0x00, false)?;
        Ok(Self::read(bus, Register::R0E, false)? & CalFlags::VALUE.bits())
    }

    fn apply_gain(bus: &mut A, agc: bool, gain: LnaGain) -> Result<()> {
        if !agc {
            Self::write_field(bus, Field::LNA_GAIN, gain.into(), false)?;
        }
        // The chip wants the mode register rewritten in either mode.
        Self::write(bus, Register::R13, R13_AGC_ENABLE, false)?;
        Ok(())
    }
}

impl<A: BusAdapter> Tuner for Fc0012<A> {
    fn tuner_type(&self) -> TunerType {
        TunerType::Fc0012
    }

    fn minimum_frequency(&self) -> u64 {
        MINIMUM_FREQUENCY
    }

    fn maximum_frequency(&self) -> u64 {
        MAXIMUM_FREQUENCY
    }

    fn dc_spike_half_bandwidth(&self) -> u64 {
        DC_SPIKE_HALF_BANDWIDTH
    }

    fn usable_bandwidth(&self) -> f64 {
        USABLE_BANDWIDTH
    }

    fn set_tuned_frequency(&mut self, frequency: u64) -> Result<()> {
        {
            let mut bus = self.lock();
            match Self::tune(&mut bus, frequency) {
                Ok(()) => {}
                // Transient transport failures are logged and swallowed;
                // the requested frequency is still recorded below. See
                // the trait documentation.
                Err(Error::Io(e)) => {
                    error!("FC0012 bus error while tuning {frequency} Hz: {e}");
                }
                Err(e) => return Err(e),
            }
        }
        // Only touched once the lock is released.
        self.tuned_frequency = frequency;
        Ok(())
    }

    fn set_gain(&mut self, agc: bool, gain: LnaGain) -> Result<()> {
        let mut bus = self.lock();
        let repeater_was_enabled = bus.is_repeater_enabled();
        if !repeater_was_enabled {
            bus.enable_repeater()?;
        }

        let result = Self::apply_gain(&mut bus, agc, gain);

        // Unlike tuning, the repeater is put back even when a write
        // failed.
        if !repeater_was_enabled {
            bus.disable_repeater()?;
        }
        result
    }

    fn apply(&mut self, config: &TunerConfig) -> Result<()> {
        match config {
            TunerConfig::Fc0012(c) => self
                .set_gain(c.agc, c.lna_gain)
                .map_err(|e| Error::Apply(Box::new(e))),
            other => Err(Error::ConfigMismatch {
                expected: TunerType::Fc0012,
                found: other.tuner_type(),
            }),
        }
    }
}
