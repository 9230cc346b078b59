//! Fixed catalog of PLL pre-divider configurations, one per band of
//! target frequencies.

use crate::registers::XTAL_FREQUENCY;

/// One PLL pre-divider configuration, valid over a band of target
/// frequencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DividerConfig {
    /// Division ratio applied ahead of the PLL.
    pub divider: u32,
    /// Whether the divider chain runs in 3x mode.
    pub mode_3x: bool,
    /// R05 preset selecting this divider.
    pub register5: u8,
    /// Lowest target frequency this entry covers, Hz.
    pub minimum_frequency: u64,
    /// Highest target frequency this entry covers, Hz.
    pub maximum_frequency: u64,
}

/// Divider catalog in lookup order. Bands overlap; selection takes the
/// first entry containing the frequency.
#[rustfmt::skip]
pub const DIVIDERS: [DividerConfig; 10] = [
    DividerConfig { divider: 96, mode_3x: true,  register5: 0x82, minimum_frequency:  13_500_000, maximum_frequency:  39_749_997 },
    DividerConfig { divider: 64, mode_3x: false, register5: 0x82, minimum_frequency:  20_500_000, maximum_frequency:  59_624_996 },
    DividerConfig { divider: 48, mode_3x: true,  register5: 0x42, minimum_frequency:  27_000_000, maximum_frequency:  79_499_995 },
    DividerConfig { divider: 32, mode_3x: false, register5: 0x42, minimum_frequency:  40_500_000, maximum_frequency: 119_249_993 },
    DividerConfig { divider: 24, mode_3x: true,  register5: 0x22, minimum_frequency:  54_000_000, maximum_frequency: 158_999_990 },
    DividerConfig { divider: 16, mode_3x: false, register5: 0x22, minimum_frequency:  81_000_000, maximum_frequency: 238_499_986 },
    DividerConfig { divider: 12, mode_3x: true,  register5: 0x12, minimum_frequency: 108_000_000, maximum_frequency: 317_999_981 },
    DividerConfig { divider:  8, mode_3x: false, register5: 0x12, minimum_frequency: 162_000_000, maximum_frequency: 476_999_972 },
    DividerConfig { divider:  6, mode_3x: true,  register5: 0x0A, minimum_frequency: 235_200_000, maximum_frequency: 635_999_963 },
    DividerConfig { divider:  4, mode_3x: false, register5: 0x0A, minimum_frequency: 514_900_000, maximum_frequency: 953_999_945 },
];

/// Fallback entry (the /16 divider) when no band contains the frequency.
pub const DEFAULT_DIVIDER: DividerConfig = DIVIDERS[5];

impl DividerConfig {
    /// First catalog entry whose band contains `frequency`, or the
    /// documented default. Selection itself never fails.
    pub fn select(frequency: u64) -> DividerConfig {
        DIVIDERS
            .iter()
            .copied()
            .find(|d| d.contains(frequency))
            .unwrap_or(DEFAULT_DIVIDER)
    }

    pub fn contains(&self, frequency: u64) -> bool {
        self.minimum_frequency <= frequency && frequency <= self.maximum_frequency
    }

    /// R06 preset for this divider.
    pub fn register6(&self) -> u8 {
        if self.mode_3x {
            0xA0
        } else {
            0xA2
        }
    }

    /// Frequency step of one unit of the integral divisor, Hz.
    pub fn integral_step(&self) -> u64 {
        XTAL_FREQUENCY / 2 / u64::from(self.divider)
    }

    /// Frequency step of one unit of the 16-bit fractional divisor, Hz.
    pub fn fractional_step(&self) -> f64 {
        XTAL_FREQUENCY as f64 / f64::from(self.divider) / 65_536.0
    }

    /// Frequency realized by a programmed divisor triple, Hz.
    pub fn frequency(&self, pm: u8, am: u8, fractional: u16) -> f64 {
        (u64::from(pm) * 8 + u64::from(am)) as f64 * self.integral_step() as f64
            + self.fractional_step() * f64::from(fractional)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_increase_monotonically() {
        for pair in DIVIDERS.windows(2) {
            assert!(pair[0].minimum_frequency < pair[1].minimum_frequency);
            assert!(pair[0].maximum_frequency < pair[1].maximum_frequency);
        }
    }

    #[test]
    fn bands_cover_the_supported_range() {
        // Each band must start before the previous one ends, so lookups
        // inside the supported range can never fall through to the
        // default.
        for pair in DIVIDERS.windows(2) {
            assert!(pair[1].minimum_frequency <= pair[0].maximum_frequency);
        }
    }

    #[test]
    fn selects_first_matching_band() {
        // 30 MHz sits inside the /96, /64 and /48 bands; declared order
        // wins.
        assert_eq!(DividerConfig::select(30_000_000).divider, 96);
        assert_eq!(DividerConfig::select(100_000_000).divider, 32);
        assert_eq!(DividerConfig::select(400_000_000).divider, 8);
        assert_eq!(DividerConfig::select(900_000_000).divider, 4);
    }

    #[test]
    fn selects_at_band_boundaries() {
        assert_eq!(DividerConfig::select(13_500_000).divider, 96);
        assert_eq!(DividerConfig::select(953_999_945).divider, 4);
    }

    #[test]
    fn out_of_range_falls_back_to_default() {
        assert_eq!(DividerConfig::select(10_000_000), DEFAULT_DIVIDER);
        assert_eq!(DividerConfig::select(1_000_000_000), DEFAULT_DIVIDER);
        assert_eq!(DEFAULT_DIVIDER.divider, 16);
    }

    #[test]
    fn step_sizes_follow_the_crystal() {
        let d96 = DIVIDERS[0];
        assert_eq!(d96.integral_step(), 150_000);
        assert!((d96.fractional_step() - 4.577_636_718_75).abs() < 1e-9);

        let d4 = DIVIDERS[9];
        assert_eq!(d4.integral_step(), 3_600_000);
        assert!((d4.fractional_step() - 109.863_281_25).abs() < 1e-9);
    }
}
