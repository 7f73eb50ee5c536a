//! Markers: frequency points read off one dataset's derived curve.

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::frequency::FreqUnit;
use crate::metric::metric_values;
use crate::network::Network;
use crate::parameter::{ParamTable, Parameter, PlotType};
use crate::registry::{IdRemap, Registry};

/// Linear interpolation of `y(x)` at `target`, clamped to the first and last
/// sample outside the axis. `None` with fewer than 2 points.
///
/// `x` must be non-decreasing.
pub fn interp_clamped(x: ArrayView1<f64>, y: ArrayView1<f64>, target: f64) -> Option<f64> {
    if x.len() < 2 || x.len() != y.len() {
        return None;
    }
    let last = x.len() - 1;
    if target <= x[0] {
        return Some(y[0]);
    }
    if target >= x[last] {
        return Some(y[last]);
    }
    let hi = x.iter().position(|&xi| xi >= target)?;
    if x[hi] == target {
        return Some(y[hi]);
    }
    let lo = hi - 1;
    let t = (target - x[lo]) / (x[hi] - x[lo]);
    Some(y[lo] + (y[hi] - y[lo]) * t)
}

/// The metric value of `param` at `target_hz`, or `None` if it cannot be
/// resolved for this network.
pub fn resolve_marker(
    network: &Network,
    param: Parameter,
    plot: PlotType,
    target_hz: f64,
) -> Option<f64> {
    let values = metric_values(network, param, plot);
    interp_clamped(network.frequency().hz().view(), values.view(), target_hz)
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub freq: f64,
    pub unit: FreqUnit,
    /// Registry id of the dataset the marker reads. `None` once that
    /// dataset has been removed.
    pub dataset: Option<usize>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl Marker {
    pub fn new(freq: f64, unit: FreqUnit, dataset: usize) -> Self {
        Marker {
            freq,
            unit,
            dataset: Some(dataset),
            visible: true,
        }
    }

    pub fn freq_hz(&self) -> f64 {
        self.unit * self.freq
    }

    pub fn is_stale(&self) -> bool {
        self.dataset.is_none()
    }
}

/// Display label for the marker at `index` in its list.
pub fn label(index: usize) -> String {
    format!("M{}", index + 1)
}

/// One marker's reading, ready for a legend.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerReadout {
    pub label: String,
    pub freq: f64,
    pub unit: FreqUnit,
    pub dataset: Option<usize>,
    pub dataset_label: Option<String>,
    pub value: Option<f64>,
    pub visible: bool,
}

/// Markers for every (plot type, parameter) pair. Labels are derived from
/// list position, so they renumber whenever a marker is removed.
#[derive(Debug, Clone, Default)]
pub struct MarkerBook {
    markers: ParamTable<Vec<Marker>>,
}

impl MarkerBook {
    pub fn new() -> Self {
        MarkerBook::default()
    }

    /// Appends a marker and returns its label.
    pub fn add(&mut self, plot: PlotType, param: Parameter, marker: Marker) -> String {
        let list = self.markers.get_mut(plot, param);
        list.push(marker);
        label(list.len() - 1)
    }

    pub fn remove(&mut self, plot: PlotType, param: Parameter, index: usize) -> Option<Marker> {
        let list = self.markers.get_mut(plot, param);
        if index < list.len() {
            Some(list.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, plot: PlotType, param: Parameter) -> &[Marker] {
        self.markers.get(plot, param)
    }

    pub fn get_mut(&mut self, plot: PlotType, param: Parameter, index: usize) -> Option<&mut Marker> {
        self.markers.get_mut(plot, param).get_mut(index)
    }

    pub fn labelled(&self, plot: PlotType, param: Parameter) -> impl Iterator<Item = (String, &Marker)> {
        self.get(plot, param)
            .iter()
            .enumerate()
            .map(|(i, marker)| (label(i), marker))
    }

    /// Every marker with its bucket, plot type major.
    pub fn iter(&self) -> impl Iterator<Item = (PlotType, Parameter, &Marker)> {
        self.markers
            .iter()
            .flat_map(|(plot, param, list)| list.iter().map(move |m| (plot, param, m)))
    }

    pub fn clear_bucket(&mut self, plot: PlotType, param: Parameter) {
        self.markers.get_mut(plot, param).clear();
    }

    pub fn clear(&mut self) {
        self.markers = ParamTable::default();
    }

    pub fn len(&self) -> usize {
        self.markers.iter().map(|(_, _, list)| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pushes a registry renumbering through every marker. Returns how many
    /// markers lost their dataset.
    pub fn remap_datasets(&mut self, remap: IdRemap) -> usize {
        let mut stale = 0;
        self.markers.for_each_mut(|plot, param, list| {
            for (i, marker) in list.iter_mut().enumerate() {
                if let Some(old) = marker.dataset {
                    marker.dataset = remap.apply(old);
                    if marker.dataset.is_none() {
                        log::warn!(
                            "{} on {} {:?} lost dataset {}",
                            label(i),
                            param,
                            plot,
                            old
                        );
                        stale += 1;
                    }
                }
            }
        });
        stale
    }

    /// Reads every marker of one bucket against the registry.
    pub fn readouts(
        &self,
        plot: PlotType,
        param: Parameter,
        registry: &Registry,
    ) -> Vec<MarkerReadout> {
        self.labelled(plot, param)
            .map(|(label, marker)| {
                let dataset = marker.dataset.and_then(|id| registry.get(id));
                MarkerReadout {
                    label,
                    freq: marker.freq,
                    unit: marker.unit,
                    dataset: marker.dataset,
                    dataset_label: marker.dataset.and_then(|id| registry.label(id)),
                    value: dataset.and_then(|d| {
                        resolve_marker(d.network(), param, plot, marker.freq_hz())
                    }),
                    visible: marker.visible,
                }
            })
            .collect()
    }
}
