//! Loads two-port S-parameter files, derives plottable curves (magnitude,
//! phase, group delay) and evaluates markers and pass/fail limit lines
//! against any number of loaded datasets.
//!
//! The free functions below are the whole engine; [`Session`] bundles them
//! with a dataset registry for host applications.

pub mod config;
pub mod frequency;
pub mod limit;
pub mod marker;
pub mod metric;
pub mod network;
pub mod parameter;
pub mod registry;
pub mod result;
pub mod session;
pub mod touchstone;

use ndarray::prelude::Array3;
use num::complex::Complex;

pub use crate::config::{EngineConfig, SessionConfig};
pub use crate::frequency::{FreqUnit, Frequency};
pub use crate::limit::{evaluate_limits, BoundKind, LimitLine, LimitLineInput, Verdict};
pub use crate::marker::{interp_clamped, resolve_marker, Marker, MarkerReadout};
pub use crate::metric::{compute_metric, Curve};
pub use crate::network::Network;
pub use crate::parameter::{ParamTable, Parameter, PlotType};
pub use crate::registry::{Dataset, IdRemap, Registry};
pub use crate::result::{ConfigError, FormatError, TokenError};
pub use crate::session::Session;
pub use crate::touchstone::{ParamFormat, Touchstone};

pub type CxArray3 = Array3<Complex<f64>>;

/// Parse Touchstone-like text into a normalised network.
pub fn parse_and_load(text: &str) -> Result<Network, FormatError> {
    Network::parse(text)
}
