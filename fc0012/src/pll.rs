//! PLL divisor solver.
//!
//! The chip splits the integral divisor across two register fields: R02
//! holds multiples of 8 (`pm`) and R01 the remainder (`am`). The usable
//! floor of the remainder field is 2, so remainders below that are folded
//! into `pm` to preserve the true divisor.

use crate::divider::DividerConfig;
use crate::{Error, Result};

/// Divisor set programmed into the PLL for one tuning attempt. Produced
/// by [`solve`], consumed once by the tuning transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PllParameters {
    /// High-order integral divisor, R02. Valid range 11-31.
    pub pm: u8,
    /// Low-order integral divisor, R01. Valid range 2-15.
    pub am: u8,
    /// 16-bit fractional divisor, split across R03/R04.
    pub fractional: u16,
    /// VCO frequency sub-range selection, carried into R06.
    pub vco_select: bool,
}

/// Solves for the divisor set that realizes `frequency` under `divider`.
///
/// Out-of-range results are reported as [`Error::InfeasiblePll`] rather
/// than clamped; the engine never silently tunes to the wrong frequency.
pub fn solve(frequency: u64, divider: &DividerConfig) -> Result<PllParameters> {
    let integral_step = divider.integral_step();
    let vco_select = frequency as f64 / integral_step as f64 >= 212.5;

    let mut integral = (frequency / integral_step) as i64;
    let mut pm = (integral / 8).clamp(11, 31);
    let mut am = integral - pm * 8;
    if am < 2 {
        am += 8;
        pm -= 1;
    }
    am = am.min(15);
    // The integral actually programmed; clamping may have moved it off
    // the exact request, so the residual is computed against it.
    integral = pm * 8 + am;

    let residual = frequency as i64 - integral * integral_step as i64;
    let fractional = (residual as f64 / divider.fractional_step()).round() as i64;

    if !(11..=31).contains(&pm) || !(2..=15).contains(&am) || !(0..=65_535).contains(&fractional) {
        return Err(Error::InfeasiblePll {
            frequency,
            divider: divider.divider,
            pm,
            am,
            fractional,
        });
    }

    Ok(PllParameters {
        pm: pm as u8,
        am: am as u8,
        fractional: fractional as u16,
        vco_select,
    })
}
