use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Two-port scattering parameter, in the column order used by data rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    S11,
    S21,
    S12,
    S22,
}

impl Parameter {
    pub const ALL: [Parameter; 4] = [Parameter::S11, Parameter::S21, Parameter::S12, Parameter::S22];

    /// (row, col) position in the scattering matrix.
    pub fn matrix_index(self) -> (usize, usize) {
        use Parameter::*;
        match self {
            S11 => (0, 0),
            S21 => (1, 0),
            S12 => (0, 1),
            S22 => (1, 1),
        }
    }

    /// First of the two data-row columns holding this parameter.
    pub fn column(self) -> usize {
        1 + 2 * self.slot()
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl FromStr for Parameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Parameter::*;
        match s.to_ascii_lowercase().as_str() {
            "s11" => Ok(S11),
            "s21" => Ok(S21),
            "s12" => Ok(S12),
            "s22" => Ok(S22),
            _ => Err(format!("unknown parameter {:?}", s)),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (i, j) = self.matrix_index();
        write!(f, "S{}{}", i + 1, j + 1)
    }
}

/// Quantity derived from a parameter series for plotting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotType {
    /// Magnitude in dB.
    Magnitude,
    /// Unwrapped phase in degrees.
    Phase,
    /// Group delay in ns.
    GroupDelay,
}

impl PlotType {
    pub const ALL: [PlotType; 3] = [PlotType::Magnitude, PlotType::Phase, PlotType::GroupDelay];

    pub fn axis_label(self) -> &'static str {
        match self {
            PlotType::Magnitude => "Magnitude (dB)",
            PlotType::Phase => "Phase (deg)",
            PlotType::GroupDelay => "Group Delay (ns)",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Fixed table with one `T` per (plot type, parameter) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamTable<T> {
    cells: [[T; 4]; 3],
}

impl<T: Default> Default for ParamTable<T> {
    fn default() -> Self {
        ParamTable {
            cells: Default::default(),
        }
    }
}

impl<T> ParamTable<T> {
    pub fn get(&self, plot: PlotType, param: Parameter) -> &T {
        &self.cells[plot.slot()][param.slot()]
    }

    pub fn get_mut(&mut self, plot: PlotType, param: Parameter) -> &mut T {
        &mut self.cells[plot.slot()][param.slot()]
    }

    /// Every cell with its key, plot type major.
    pub fn iter(&self) -> impl Iterator<Item = (PlotType, Parameter, &T)> {
        PlotType::ALL.into_iter().flat_map(move |plot| {
            Parameter::ALL
                .into_iter()
                .map(move |param| (plot, param, self.get(plot, param)))
        })
    }

    pub fn for_each_mut<F: FnMut(PlotType, Parameter, &mut T)>(&mut self, mut f: F) {
        for plot in PlotType::ALL {
            for param in Parameter::ALL {
                f(plot, param, self.get_mut(plot, param));
            }
        }
    }
}
