//! Everything a host application needs for one window: loaded datasets,
//! markers, limit lines and display settings.

use std::path::{Path, PathBuf};

use crate::config::{EngineConfig, LimitEntry, MarkerEntry, SessionConfig};
use crate::frequency::FreqUnit;
use crate::limit::{LimitBook, Verdict};
use crate::marker::{MarkerBook, MarkerReadout};
use crate::metric::{compute_metric, Curve};
use crate::network::Network;
use crate::parameter::{Parameter, PlotType};
use crate::registry::{Dataset, Registry};
use crate::result::FormatError;

/// Result of loading one file of a batch.
#[derive(Debug)]
pub struct LoadOutcome {
    pub path: PathBuf,
    pub result: Result<usize, FormatError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetCurve {
    pub id: usize,
    pub label: String,
    pub curve: Curve,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetVerdict {
    pub id: usize,
    pub label: String,
    pub verdict: Verdict,
}

/// Per-dataset verdicts for one (plot type, parameter) pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LimitReport {
    pub verdicts: Vec<DatasetVerdict>,
}

impl LimitReport {
    /// Datasets that violate a rule.
    pub fn failing(&self) -> impl Iterator<Item = &DatasetVerdict> {
        self.verdicts.iter().filter(|v| v.verdict == Verdict::Fail)
    }

    pub fn any_fail(&self) -> bool {
        self.failing().next().is_some()
    }

    /// True when at least one dataset was checked and none failed.
    pub fn all_applicable_pass(&self) -> bool {
        let mut applicable = self.verdicts.iter().filter(|v| v.verdict.is_applicable());
        let mut any = false;
        let all_pass = applicable.all(|v| {
            any = true;
            v.verdict == Verdict::Pass
        });
        any && all_pass
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    config: EngineConfig,
    registry: Registry,
    markers: MarkerBook,
    limits: LimitBook,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Session {
            config,
            ..Session::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_display_unit(&mut self, unit: FreqUnit) {
        self.config.display_unit = unit;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn markers(&self) -> &MarkerBook {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut MarkerBook {
        &mut self.markers
    }

    pub fn limits(&self) -> &LimitBook {
        &self.limits
    }

    pub fn limits_mut(&mut self) -> &mut LimitBook {
        &mut self.limits
    }

    /// Parses `text` and adds it as a new dataset.
    pub fn load_text(&mut self, text: &str, source: Option<&str>) -> Result<usize, FormatError> {
        let network = Network::parse(text)?;
        let dataset = match source {
            Some(source) => Dataset::with_source(network, source),
            None => Dataset::from(network),
        };
        Ok(self.registry.add(dataset))
    }

    pub fn load_path(&mut self, path: &Path) -> Result<usize, FormatError> {
        let network = Network::from_snp(path)?;
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.registry.add(Dataset::with_source(network, source)))
    }

    /// Loads each file independently. A failed file leaves the registry as it was.
    pub fn load_paths<I>(&mut self, paths: I) -> Vec<LoadOutcome>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        paths
            .into_iter()
            .map(|path| {
                let path = path.as_ref();
                let result = self.load_path(path);
                if let Err(e) = &result {
                    log::warn!("failed to load {}: {}", path.display(), e);
                }
                LoadOutcome {
                    path: path.to_owned(),
                    result,
                }
            })
            .collect()
    }

    /// Removes a dataset, renumbers the rest and remaps markers.
    pub fn remove_dataset(&mut self, id: usize) -> Option<Dataset> {
        let (dataset, remap) = self.registry.remove(id)?;
        self.markers.remap_datasets(remap);
        Some(dataset)
    }

    pub fn rename_dataset(&mut self, id: usize, name: &str) -> bool {
        self.registry.rename(id, name)
    }

    /// Drops all datasets. Markers stay but no longer point anywhere.
    pub fn clear_datasets(&mut self) {
        let remap = self.registry.clear();
        self.markers.remap_datasets(remap);
    }

    /// Back to an empty session with the same display settings.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.markers.clear();
        self.limits.clear();
    }

    pub fn curves(&self, plot: PlotType, param: Parameter) -> Vec<DatasetCurve> {
        self.registry
            .iter()
            .map(|(id, dataset)| DatasetCurve {
                id,
                label: self.label(id),
                curve: compute_metric(dataset.network(), param, plot, self.config.display_unit),
            })
            .collect()
    }

    pub fn marker_readouts(&self, plot: PlotType, param: Parameter) -> Vec<MarkerReadout> {
        self.markers.readouts(plot, param, &self.registry)
    }

    /// Readouts of the visible markers only.
    pub fn legend(&self, plot: PlotType, param: Parameter) -> Vec<MarkerReadout> {
        self.marker_readouts(plot, param)
            .into_iter()
            .filter(|r| r.visible)
            .collect()
    }

    pub fn verdicts(&self, plot: PlotType, param: Parameter) -> LimitReport {
        let verdicts = self
            .registry
            .iter()
            .map(|(id, dataset)| DatasetVerdict {
                id,
                label: self.label(id),
                verdict: self.limits.evaluate(dataset.network(), param, plot),
            })
            .collect();
        LimitReport { verdicts }
    }

    /// Replaces markers, limit lines and display settings. Returns the number
    /// of limit lines that were dropped as malformed.
    pub fn apply_config(&mut self, config: &SessionConfig) -> usize {
        self.config = config.engine;
        self.markers.clear();
        for entry in &config.markers {
            self.markers.add(entry.plot, entry.param, entry.marker.clone());
        }
        self.limits.clear();
        config
            .limits
            .iter()
            .map(|entry| {
                self.limits
                    .extend_from_inputs(entry.plot, entry.param, std::iter::once(&entry.rule))
            })
            .sum()
    }

    pub fn to_config(&self) -> SessionConfig {
        SessionConfig {
            engine: self.config,
            markers: self
                .markers
                .iter()
                .map(|(plot, param, marker)| MarkerEntry {
                    plot,
                    param,
                    marker: marker.clone(),
                })
                .collect(),
            limits: self
                .limits
                .iter()
                .map(|(plot, param, rule)| LimitEntry {
                    plot,
                    param,
                    rule: rule.to_input(),
                })
                .collect(),
        }
    }

    fn label(&self, id: usize) -> String {
        self.registry
            .label(id)
            .unwrap_or_else(|| format!("ID {}", id))
    }
}
