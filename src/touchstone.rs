use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use ndarray::prelude::*;
use nom::bytes::complete::take_till1;
use nom::character::complete::{char, multispace0};
use nom::multi::many0;
use nom::sequence::preceded;
use nom::IResult;
use regex::Regex;

use crate::frequency::FreqUnit;
use crate::result::{FormatError, TokenError};

/// Values per data row: frequency plus four parameters with two components each.
pub const ROW_WIDTH: usize = 9;

const NUMBER: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?";

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ParamType {
    S,
    Y,
    Z,
    G,
    H,
}

impl FromStr for ParamType {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ParamType::*;
        match s {
            "s" | "S" => Ok(S),
            "y" | "Y" => Ok(Y),
            "z" | "Z" => Ok(Z),
            "g" | "G" => Ok(G),
            "h" | "H" => Ok(H),
            _ => Err(TokenError(s.to_owned())),
        }
    }
}

/// How the two columns of each parameter are encoded.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ParamFormat {
    DBAngle,
    MagAngle,
    RealImag,
}

impl FromStr for ParamFormat {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ParamFormat::*;
        match s.to_ascii_lowercase().as_str() {
            "db" => Ok(DBAngle),
            "ma" => Ok(MagAngle),
            "ri" => Ok(RealImag),
            _ => Err(TokenError(s.to_owned())),
        }
    }
}

impl fmt::Display for ParamFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ParamFormat::*;
        f.write_str(match self {
            DBAngle => "DB",
            MagAngle => "MA",
            RealImag => "RI",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TouchstoneOptions {
    pub unit: FreqUnit,
    pub param_type: ParamType,
    pub param_format: ParamFormat,
    pub resistance: f64,
}

/// Raw contents of a Touchstone-like file: options plus one row of
/// `[freq, s11_a, s11_b, s21_a, s21_b, s12_a, s12_b, s22_a, s22_b]` per point.
#[derive(Clone)]
pub struct Touchstone {
    comments: Vec<String>,
    options: TouchstoneOptions,
    rows: Array2<f64>,
}

impl Touchstone {
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        let text = std::fs::read_to_string(path)?;
        Touchstone::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let mut comments = Vec::new();
        let mut options = None;
        let mut flat: Vec<f64> = Vec::new();

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix('!') {
                comments.push(comment.trim().to_owned());
                continue;
            }
            // Anything after an inline `!` is a comment.
            let line = match line.find('!') {
                Some(idx) => &line[..idx],
                None => line,
            };

            if line.starts_with('#') {
                if options.is_none() {
                    options = Some(parse_options_line(line)?);
                }
                continue;
            }
            if options.is_none() {
                log::trace!("line {}: before the option line, ignored", line_no + 1);
                continue;
            }

            let values: Vec<f64> = number_pattern()
                .find_iter(line)
                .filter_map(|m| m.as_str().parse::<f64>().ok())
                .take(ROW_WIDTH)
                .collect();
            if values.len() < ROW_WIDTH {
                log::trace!(
                    "line {}: {} numeric values, not a data row",
                    line_no + 1,
                    values.len()
                );
                continue;
            }
            flat.extend(values);
        }

        let options = options.ok_or(FormatError::MissingOptions)?;
        if flat.is_empty() {
            return Err(FormatError::NoData);
        }
        let npoints = flat.len() / ROW_WIDTH;
        let rows =
            Array::from_shape_vec((npoints, ROW_WIDTH), flat).map_err(|_| FormatError::NoData)?;
        log::debug!(
            "parsed {} points ({}, {:?} {})",
            npoints,
            options.unit,
            options.param_type,
            options.param_format
        );
        Ok(Touchstone {
            comments,
            options,
            rows,
        })
    }

    pub fn options(&self) -> &TouchstoneOptions {
        &self.options
    }

    pub fn unit(&self) -> FreqUnit {
        self.options.unit
    }

    pub fn format(&self) -> ParamFormat {
        self.options.param_format
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn rows(&self) -> ArrayView2<'_, f64> {
        self.rows.view()
    }

    /// Frequency column, in the file's own unit.
    pub fn freqs(&self) -> Vec<f64> {
        self.rows.column(0).to_vec()
    }

    pub fn npoints(&self) -> usize {
        self.rows.nrows()
    }
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(NUMBER).expect("number pattern is valid"))
}

fn option_tokens(line: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        char('#'),
        many0(preceded(multispace0, take_till1(|c: char| c.is_whitespace()))),
    )(line)
}

fn parse_options_line(line: &str) -> Result<TouchstoneOptions, FormatError> {
    let tokens = match option_tokens(line) {
        Ok((_, tokens)) => tokens,
        Err(_) => return Err(FormatError::UnknownFormat(line.to_owned())),
    };

    let mut unit = None;
    let mut param_type = None;
    let mut param_format = None;
    let mut resistance = 50.;
    let mut tokens = tokens.into_iter().peekable();
    while let Some(token) = tokens.next() {
        if token.eq_ignore_ascii_case("r") {
            match tokens.peek().map(|r| r.parse::<f64>()) {
                Some(Ok(r)) => {
                    resistance = r;
                    tokens.next();
                }
                _ => log::warn!("option line has `R` without a resistance: {:?}", line),
            }
        } else if let Ok(u) = token.parse::<FreqUnit>() {
            unit = unit.or(Some(u));
        } else if token.to_ascii_lowercase().ends_with("hz") {
            return Err(FormatError::UnknownUnit(token.to_owned()));
        } else if let Ok(f) = token.parse::<ParamFormat>() {
            param_format = param_format.or(Some(f));
        } else if let Ok(t) = token.parse::<ParamType>() {
            param_type = param_type.or(Some(t));
        }
    }

    let param_format = param_format.ok_or_else(|| FormatError::UnknownFormat(line.to_owned()))?;
    Ok(TouchstoneOptions {
        unit: unit.unwrap_or_default(),
        param_type: param_type.unwrap_or(ParamType::S),
        param_format,
        resistance,
    })
}

impl fmt::Debug for Touchstone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Touchstone:\n{}\n{}\n{}",
            format_args!("\tOptions: {:?}", self.options),
            format_args!("\tPoints: {}", self.npoints()),
            format_args!("\tComments: {:?}", self.comments),
        )
    }
}
