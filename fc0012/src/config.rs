//! Stored tuner configuration records.
//!
//! Each embedded tuner accepts exactly one [`TunerConfig`] variant;
//! handing a record to the wrong chip is a caller error, reported before
//! any hardware access.

use serde::{Deserialize, Serialize};

use crate::registers::LnaGain;
use crate::TunerType;

/// Gain configuration for the FC0012.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fc0012Config {
    pub agc: bool,
    pub lna_gain: LnaGain,
}

impl Default for Fc0012Config {
    fn default() -> Self {
        Fc0012Config {
            agc: false,
            lna_gain: LnaGain::Plus19p2Db,
        }
    }
}

/// Gain configuration for the R820T.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct R820tConfig {
    pub lna_agc: bool,
    pub mixer_agc: bool,
}

/// Per-chip configuration records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TunerConfig {
    Fc0012(Fc0012Config),
    R820t(R820tConfig),
}

impl TunerConfig {
    pub fn tuner_type(&self) -> TunerType {
        match self {
            TunerConfig::Fc0012(_) => TunerType::Fc0012,
            TunerConfig::R820t(_) => TunerType::R820t,
        }
    }
}
