use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::frequency::FreqUnit;
use crate::limit::LimitLineInput;
use crate::marker::Marker;
use crate::parameter::{Parameter, PlotType};
use crate::result::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Unit of the frequency axis of computed curves.
    pub display_unit: FreqUnit,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            display_unit: FreqUnit::MHz,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerEntry {
    pub plot: PlotType,
    pub param: Parameter,
    #[serde(flatten)]
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitEntry {
    pub plot: PlotType,
    pub param: Parameter,
    #[serde(flatten)]
    pub rule: LimitLineInput,
}

/// Marker and limit-line setup that can be saved and restored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub markers: Vec<MarkerEntry>,
    #[serde(default)]
    pub limits: Vec<LimitEntry>,
}

impl SessionConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        SessionConfig::from_json(&text)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
