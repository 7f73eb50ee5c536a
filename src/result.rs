use thiserror::Error;

/// Structural problems with a single input file. Fatal to that file only.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("no option line (`# ...`) found")]
    MissingOptions,
    #[error("option line has no DB, MA or RI format token: {0:?}")]
    UnknownFormat(String),
    #[error("unsupported frequency unit in option line: {0:?}")]
    UnknownUnit(String),
    #[error("no data rows with at least 9 numeric values")]
    NoData,
    #[error("frequency decreases at point {index}: {previous} Hz followed by {current} Hz")]
    NonMonotonic {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("s has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },
}

/// An option-line token that is not one of the values it was parsed as.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised option token {0:?}")]
pub struct TokenError(pub String);

/// Problems with user-supplied configuration. A limit line that raises one of
/// these is dropped, never the whole evaluation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("unknown frequency unit: {0:?}")]
    InvalidUnit(String),
    #[error("frequency window is empty: start {start} Hz is above stop {stop} Hz")]
    EmptyWindow { start: f64, stop: f64 },
    #[error("invalid session json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not access session file: {0}")]
    Io(#[from] std::io::Error),
}
