//! Plottable quantities derived from a complex parameter series.

use std::f64::consts::PI;

use itertools::Itertools;
use ndarray::prelude::*;
use ndarray::Zip;
use num::complex::Complex;

use crate::frequency::FreqUnit;
use crate::network::Network;
use crate::parameter::{Parameter, PlotType};

/// Added to `|s|` before taking the log so exact zeros stay finite.
/// This is an approximation, not a physical noise floor.
pub const MAGNITUDE_EPSILON: f64 = 1e-20;

/// `20·log10(|s| + ε)`
pub fn magnitude_db(s: ArrayView1<Complex<f64>>) -> Array1<f64> {
    s.mapv(|c| 20. * (c.norm() + MAGNITUDE_EPSILON).log10())
}

/// Removes jumps of more than π between neighbours by adding multiples of 2π.
/// Input and output are in radians.
pub fn unwrap_phase(phase: ArrayView1<f64>) -> Array1<f64> {
    let mut out = phase.to_owned();
    let mut correction = 0.;
    for (k, (prev, next)) in phase.iter().tuple_windows().enumerate() {
        let step = next - prev;
        if step.abs() >= PI {
            let mut wrapped = (step + PI).rem_euclid(2. * PI) - PI;
            if wrapped == -PI && step > 0. {
                wrapped = PI;
            }
            correction += wrapped - step;
        }
        out[k + 1] += correction;
    }
    out
}

/// Unwrapped phase in degrees.
pub fn phase_deg(s: ArrayView1<Complex<f64>>) -> Array1<f64> {
    unwrap_phase(s.mapv(|c| c.arg()).view()).mapv(f64::to_degrees)
}

/// Finite differences per sample: one-sided at the ends, centred elsewhere.
pub fn gradient(y: ArrayView1<f64>) -> Array1<f64> {
    let n = y.len();
    if n < 2 {
        return Array1::zeros(n);
    }
    Array1::from_shape_fn(n, |i| {
        if i == 0 {
            y[1] - y[0]
        } else if i == n - 1 {
            y[n - 1] - y[n - 2]
        } else {
            (y[i + 1] - y[i - 1]) / 2.
        }
    })
}

/// `-dφ/dω` in ns. Empty when there are fewer than 3 points.
/// Points where the frequency does not move are left at zero.
pub fn group_delay_ns(s: ArrayView1<Complex<f64>>, f_hz: ArrayView1<f64>) -> Array1<f64> {
    if s.len() < 3 {
        return Array1::zeros(0);
    }
    let phase = unwrap_phase(s.mapv(|c| c.arg()).view());
    let d_phase = gradient(phase.view());
    let d_omega = gradient(f_hz.mapv(|f| 2. * PI * f).view());
    Zip::from(&d_phase)
        .and(&d_omega)
        .map_collect(|&dp, &dw| if dw == 0. { 0. } else { -dp / dw * 1e9 })
}

/// Metric values for one parameter of a network, one per frequency
/// (empty for group delay on fewer than 3 points).
pub fn metric_values(network: &Network, param: Parameter, plot: PlotType) -> Array1<f64> {
    let s = network.param(param);
    match plot {
        PlotType::Magnitude => magnitude_db(s),
        PlotType::Phase => phase_deg(s),
        PlotType::GroupDelay => group_delay_ns(s, network.frequency().hz().view()),
    }
}

/// A derived curve ready for plotting: frequencies in `unit` and values.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub unit: FreqUnit,
    pub freq: Array1<f64>,
    pub values: Array1<f64>,
}

impl Curve {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there was not enough data to derive the metric.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.freq.iter().copied().zip(self.values.iter().copied())
    }
}

pub fn compute_metric(
    network: &Network,
    param: Parameter,
    plot: PlotType,
    unit: FreqUnit,
) -> Curve {
    let values = metric_values(network, param, plot);
    let freq = if values.is_empty() {
        Array1::zeros(0)
    } else {
        network.frequency().scaled(unit)
    };
    Curve { unit, freq, values }
}
