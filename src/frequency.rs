use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

use itertools::{Itertools, MinMaxResult};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::result::ConfigError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FreqUnit {
    Hz,
    #[serde(rename = "kHz")]
    KHz,
    MHz,
    GHz,
}

impl Default for FreqUnit {
    fn default() -> Self {
        FreqUnit::Hz
    }
}

impl FreqUnit {
    /// Number of Hz in one of this unit.
    pub fn multiplier(self) -> f64 {
        use FreqUnit::*;
        match self {
            Hz => 1.,
            KHz => 1e3,
            MHz => 1e6,
            GHz => 1e9,
        }
    }

    /// Express a value given in Hz in this unit.
    pub fn from_hz(self, hz: f64) -> f64 {
        hz / self.multiplier()
    }
}

impl FromStr for FreqUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use FreqUnit::*;
        match s.to_ascii_lowercase().as_str() {
            "hz" => Ok(Hz),
            "khz" => Ok(KHz),
            "mhz" => Ok(MHz),
            "ghz" => Ok(GHz),
            _ => Err(ConfigError::InvalidUnit(s.to_owned())),
        }
    }
}

impl fmt::Display for FreqUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use FreqUnit::*;
        let token = match self {
            Hz => "Hz",
            KHz => "kHz",
            MHz => "MHz",
            GHz => "GHz",
        };
        f.write_str(token)
    }
}

/// `unit * value` gives the value in Hz.
impl Mul<f64> for FreqUnit {
    type Output = f64;

    fn mul(self, rhs: f64) -> f64 {
        self.multiplier() * rhs
    }
}

/// A frequency axis, always stored in Hz.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Frequency {
    f: Array1<f64>,
}

impl From<Vec<f64>> for Frequency {
    fn from(freqs: Vec<f64>) -> Self {
        Frequency {
            f: Array::from_vec(freqs),
        }
    }
}

impl From<Array1<f64>> for Frequency {
    fn from(f: Array1<f64>) -> Self {
        Frequency { f }
    }
}

impl Frequency {
    /// Evenly spaced axis from `start` to `stop` inclusive, both given in `unit`.
    pub fn new(start: f64, stop: f64, npoints: usize, unit: Option<FreqUnit>) -> Self {
        let unit = unit.unwrap_or_default();
        Frequency {
            f: Array::linspace(unit * start, unit * stop, npoints),
        }
    }

    pub fn hz(&self) -> &Array1<f64> {
        &self.f
    }

    pub fn npoints(&self) -> usize {
        self.f.len()
    }

    pub fn is_empty(&self) -> bool {
        self.f.is_empty()
    }

    /// The axis rescaled to `unit`.
    pub fn scaled(&self, unit: FreqUnit) -> Array1<f64> {
        self.f.mapv(|hz| unit.from_hz(hz))
    }

    /// Lowest and highest frequency in Hz.
    pub fn extent(&self) -> Option<(f64, f64)> {
        match self.f.iter().copied().minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(f) => Some((f, f)),
            MinMaxResult::MinMax(lo, hi) => Some((lo, hi)),
        }
    }

    /// Index of the first point that is lower than its predecessor.
    pub fn first_decrease(&self) -> Option<usize> {
        self.f
            .iter()
            .tuple_windows()
            .position(|(prev, next)| next < prev)
            .map(|i| i + 1)
    }
}
