//! Frequency-banded pass/fail limit lines.

use serde::{Deserialize, Serialize};

use crate::frequency::FreqUnit;
use crate::metric::metric_values;
use crate::network::Network;
use crate::parameter::{ParamTable, Parameter, PlotType};
use crate::result::ConfigError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    Upper,
    Lower,
    Both,
}

impl BoundKind {
    pub fn checks_upper(self) -> bool {
        matches!(self, BoundKind::Upper | BoundKind::Both)
    }

    pub fn checks_lower(self) -> bool {
        matches!(self, BoundKind::Lower | BoundKind::Both)
    }
}

/// A validated rule with its window in Hz.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitLine {
    pub kind: BoundKind,
    pub start_hz: f64,
    pub stop_hz: f64,
    pub lower: f64,
    pub upper: f64,
}

impl LimitLine {
    pub fn new(
        kind: BoundKind,
        (start, start_unit): (f64, FreqUnit),
        (stop, stop_unit): (f64, FreqUnit),
        lower: f64,
        upper: f64,
    ) -> Result<Self, ConfigError> {
        let fields = [
            ("start", start),
            ("stop", stop),
            ("lower", lower),
            ("upper", upper),
        ];
        for (field, value) in fields {
            if value.is_nan() {
                return Err(ConfigError::InvalidNumber {
                    field,
                    value: value.to_string(),
                });
            }
        }
        let start_hz = start_unit * start;
        let stop_hz = stop_unit * stop;
        if start_hz > stop_hz {
            return Err(ConfigError::EmptyWindow {
                start: start_hz,
                stop: stop_hz,
            });
        }
        Ok(LimitLine {
            kind,
            start_hz,
            stop_hz,
            lower,
            upper,
        })
    }

    pub fn upper(start: f64, stop: f64, unit: FreqUnit, upper: f64) -> Result<Self, ConfigError> {
        LimitLine::new(BoundKind::Upper, (start, unit), (stop, unit), f64::NEG_INFINITY, upper)
    }

    pub fn lower(start: f64, stop: f64, unit: FreqUnit, lower: f64) -> Result<Self, ConfigError> {
        LimitLine::new(BoundKind::Lower, (start, unit), (stop, unit), lower, f64::INFINITY)
    }

    /// Part of the window inside `[lo, hi]`, if any.
    pub fn overlap(&self, (lo, hi): (f64, f64)) -> Option<(f64, f64)> {
        let start = self.start_hz.max(lo);
        let stop = self.stop_hz.min(hi);
        if start <= stop {
            Some((start, stop))
        } else {
            None
        }
    }

    pub fn contains(&self, f_hz: f64) -> bool {
        f_hz >= self.start_hz && f_hz <= self.stop_hz
    }

    pub fn is_violated_by(&self, value: f64) -> bool {
        (self.kind.checks_upper() && value > self.upper)
            || (self.kind.checks_lower() && value < self.lower)
    }

    /// Text form of this rule, window in Hz.
    pub fn to_input(&self) -> LimitLineInput {
        let bound = |used: bool, value: f64| if used { value.to_string() } else { String::new() };
        LimitLineInput {
            kind: self.kind,
            start: self.start_hz.to_string(),
            start_unit: FreqUnit::Hz.to_string(),
            stop: self.stop_hz.to_string(),
            stop_unit: FreqUnit::Hz.to_string(),
            lower: bound(self.kind.checks_lower(), self.lower),
            upper: bound(self.kind.checks_upper(), self.upper),
        }
    }
}

/// A limit line as entered by the user, every field still text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitLineInput {
    pub kind: BoundKind,
    pub start: String,
    pub start_unit: String,
    pub stop: String,
    pub stop_unit: String,
    #[serde(default)]
    pub lower: String,
    #[serde(default)]
    pub upper: String,
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, ConfigError> {
    match value.trim().parse::<f64>() {
        Ok(v) if !v.is_nan() => Ok(v),
        _ => Err(ConfigError::InvalidNumber {
            field,
            value: value.to_owned(),
        }),
    }
}

impl TryFrom<&LimitLineInput> for LimitLine {
    type Error = ConfigError;

    fn try_from(input: &LimitLineInput) -> Result<Self, Self::Error> {
        let start = parse_number("start", &input.start)?;
        let stop = parse_number("stop", &input.stop)?;
        let start_unit = input.start_unit.trim().parse::<FreqUnit>()?;
        let stop_unit = input.stop_unit.trim().parse::<FreqUnit>()?;
        // A bound the kind does not check is never read.
        let lower = if input.kind.checks_lower() {
            parse_number("lower", &input.lower)?
        } else {
            f64::NEG_INFINITY
        };
        let upper = if input.kind.checks_upper() {
            parse_number("upper", &input.upper)?
        } else {
            f64::INFINITY
        };
        LimitLine::new(input.kind, (start, start_unit), (stop, stop_unit), lower, upper)
    }
}

/// Outcome of checking one dataset's curve against the rules of one
/// (plot type, parameter) pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
    /// No rules are configured for the parameter.
    NoRules,
    /// Rules exist but none of their windows cover a sample of this dataset.
    NoOverlap,
}

impl Verdict {
    pub fn is_applicable(self) -> bool {
        matches!(self, Verdict::Pass | Verdict::Fail)
    }
}

pub fn evaluate_limits(
    network: &Network,
    param: Parameter,
    plot: PlotType,
    rules: &[LimitLine],
) -> Verdict {
    if rules.is_empty() {
        return Verdict::NoRules;
    }
    let values = metric_values(network, param, plot);
    let freqs = network.frequency().hz();
    let extent = match network.frequency().extent() {
        Some(extent) if values.len() == freqs.len() => extent,
        _ => return Verdict::NoOverlap,
    };

    let mut overlapped = false;
    for rule in rules {
        if rule.overlap(extent).is_none() {
            continue;
        }
        for (&f, &value) in freqs.iter().zip(values.iter()) {
            if !rule.contains(f) {
                continue;
            }
            overlapped = true;
            if rule.is_violated_by(value) {
                return Verdict::Fail;
            }
        }
    }
    if overlapped {
        Verdict::Pass
    } else {
        Verdict::NoOverlap
    }
}

/// Limit lines for every (plot type, parameter) pair.
#[derive(Debug, Clone, Default)]
pub struct LimitBook {
    rules: ParamTable<Vec<LimitLine>>,
}

impl LimitBook {
    pub fn new() -> Self {
        LimitBook::default()
    }

    pub fn add(&mut self, plot: PlotType, param: Parameter, rule: LimitLine) {
        self.rules.get_mut(plot, param).push(rule);
    }

    /// Converts and adds a user-entered rule. A malformed rule is not added.
    pub fn add_input(
        &mut self,
        plot: PlotType,
        param: Parameter,
        input: &LimitLineInput,
    ) -> Result<(), ConfigError> {
        let rule = LimitLine::try_from(input)?;
        self.add(plot, param, rule);
        Ok(())
    }

    /// Adds every rule that converts; the rest are logged and dropped.
    /// Returns the number dropped.
    pub fn extend_from_inputs<'a, I>(&mut self, plot: PlotType, param: Parameter, inputs: I) -> usize
    where
        I: IntoIterator<Item = &'a LimitLineInput>,
    {
        let mut skipped = 0;
        for input in inputs {
            if let Err(e) = self.add_input(plot, param, input) {
                log::warn!("skipping limit line on {} {:?}: {}", param, plot, e);
                skipped += 1;
            }
        }
        skipped
    }

    pub fn remove(&mut self, plot: PlotType, param: Parameter, index: usize) -> Option<LimitLine> {
        let list = self.rules.get_mut(plot, param);
        if index < list.len() {
            Some(list.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, plot: PlotType, param: Parameter) -> &[LimitLine] {
        self.rules.get(plot, param)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlotType, Parameter, &LimitLine)> {
        self.rules
            .iter()
            .flat_map(|(plot, param, list)| list.iter().map(move |r| (plot, param, r)))
    }

    pub fn clear_bucket(&mut self, plot: PlotType, param: Parameter) {
        self.rules.get_mut(plot, param).clear();
    }

    pub fn clear(&mut self) {
        self.rules = ParamTable::default();
    }

    pub fn evaluate(&self, network: &Network, param: Parameter, plot: PlotType) -> Verdict {
        evaluate_limits(network, param, plot, self.get(plot, param))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_point() -> Network {
        Network::parse(
            "# Hz S RI\n\
             1e9 0.1 0.0 0.9 0.0 0.9 0.0 0.1 0.0\n\
             2e9 0.1 0.0 0.9 0.0 0.9 0.0 0.1 0.0\n",
        )
        .unwrap()
    }

    fn input(kind: BoundKind, start: &str, stop: &str, lower: &str, upper: &str) -> LimitLineInput {
        LimitLineInput {
            kind,
            start: start.to_owned(),
            start_unit: "GHz".to_owned(),
            stop: stop.to_owned(),
            stop_unit: "GHz".to_owned(),
            lower: lower.to_owned(),
            upper: upper.to_owned(),
        }
    }

    #[test]
    fn test_no_rules() {
        let verdict = evaluate_limits(&two_point(), Parameter::S11, PlotType::Magnitude, &[]);
        assert_eq!(verdict, Verdict::NoRules);
        assert!(!verdict.is_applicable());
    }

    #[test]
    fn test_upper_limit_passes_inside_window() {
        let rule = LimitLine::upper(0.5, 1.5, FreqUnit::GHz, -10.).unwrap();
        let verdict = evaluate_limits(&two_point(), Parameter::S11, PlotType::Magnitude, &[rule]);
        assert_eq!(verdict, Verdict::Pass);
    }

    #[test]
    fn test_upper_limit_fails() {
        // S21 is about -0.9 dB.
        let rule = LimitLine::upper(0.5, 1.5, FreqUnit::GHz, -10.).unwrap();
        let verdict = evaluate_limits(&two_point(), Parameter::S21, PlotType::Magnitude, &[rule]);
        assert_eq!(verdict, Verdict::Fail);
    }

    #[test]
    fn test_samples_outside_window_contribute_nothing() {
        let net = Network::parse(
            "# GHz S DB\n1 -30 0 0 0 0 0 -30 0\n2 -30 0 0 0 0 0 -30 0\n3 -3 0 0 0 0 0 -3 0\n",
        )
        .unwrap();
        let rule = LimitLine::upper(0.5, 2.5, FreqUnit::GHz, -20.).unwrap();
        assert_eq!(
            evaluate_limits(&net, Parameter::S11, PlotType::Magnitude, &[rule]),
            Verdict::Pass
        );
        let rule = LimitLine::upper(2.5, 3.5, FreqUnit::GHz, -20.).unwrap();
        assert_eq!(
            evaluate_limits(&net, Parameter::S11, PlotType::Magnitude, &[rule]),
            Verdict::Fail
        );
    }

    #[test]
    fn test_nan_values_are_rejected() {
        assert!(matches!(
            LimitLine::upper(0., 5., FreqUnit::GHz, f64::NAN),
            Err(ConfigError::InvalidNumber { field: "upper", .. })
        ));
        assert!(matches!(
            LimitLine::lower(f64::NAN, 5., FreqUnit::GHz, -3.),
            Err(ConfigError::InvalidNumber { field: "start", .. })
        ));
        assert!(matches!(
            LimitLine::new(BoundKind::Both, (0., FreqUnit::Hz), (1., FreqUnit::Hz), f64::NAN, 0.),
            Err(ConfigError::InvalidNumber { field: "lower", .. })
        ));
        let rule = LimitLine::upper(0., 5., FreqUnit::GHz, -10.).unwrap();
        assert_eq!(rule.lower, f64::NEG_INFINITY);
        assert_eq!(
            evaluate_limits(&two_point(), Parameter::S21, PlotType::Magnitude, &[rule]),
            Verdict::Fail
        );
    }

    #[test]
    fn test_lower_and_both() {
        let net = two_point();
        let lower = LimitLine::lower(1., 2., FreqUnit::GHz, -25.).unwrap();
        assert_eq!(
            evaluate_limits(&net, Parameter::S11, PlotType::Magnitude, &[lower]),
            Verdict::Pass
        );
        let both = LimitLine::new(
            BoundKind::Both,
            (1., FreqUnit::GHz),
            (2000., FreqUnit::MHz),
            -19.,
            -10.,
        )
        .unwrap();
        assert_eq!(
            evaluate_limits(&net, Parameter::S11, PlotType::Magnitude, &[both]),
            Verdict::Fail
        );
    }

    #[test]
    fn test_no_overlap() {
        let rules = vec![
            LimitLine::upper(3., 4., FreqUnit::GHz, -10.).unwrap(),
            LimitLine::lower(1., 500., FreqUnit::MHz, -100.).unwrap(),
        ];
        assert_eq!(
            evaluate_limits(&two_point(), Parameter::S11, PlotType::Magnitude, &rules),
            Verdict::NoOverlap
        );
    }

    #[test]
    fn test_window_between_samples_is_no_overlap() {
        let rule = LimitLine::upper(1.2, 1.8, FreqUnit::GHz, -100.).unwrap();
        assert_eq!(
            evaluate_limits(&two_point(), Parameter::S11, PlotType::Magnitude, &[rule]),
            Verdict::NoOverlap
        );
    }

    #[test]
    fn test_non_overlapping_rules_are_ignored() {
        let rules = vec![
            LimitLine::upper(5., 6., FreqUnit::GHz, -100.).unwrap(),
            LimitLine::upper(0.5, 1.5, FreqUnit::GHz, -10.).unwrap(),
        ];
        assert_eq!(
            evaluate_limits(&two_point(), Parameter::S11, PlotType::Magnitude, &rules),
            Verdict::Pass
        );
    }

    #[test]
    fn test_group_delay_without_enough_points() {
        let rule = LimitLine::upper(0., 5., FreqUnit::GHz, 1.).unwrap();
        assert_eq!(
            evaluate_limits(&two_point(), Parameter::S21, PlotType::GroupDelay, &[rule]),
            Verdict::NoOverlap
        );
    }

    #[test]
    fn test_input_conversion() {
        let rule = LimitLine::try_from(&input(BoundKind::Upper, "0.5", " 1.5 ", "", "-10")).unwrap();
        assert_eq!(rule.start_hz, 0.5e9);
        assert_eq!(rule.stop_hz, 1.5e9);
        assert_eq!(rule.upper, -10.);
        assert_eq!(rule.lower, f64::NEG_INFINITY);

        assert!(matches!(
            LimitLine::try_from(&input(BoundKind::Both, "0.5", "1.5", "abc", "-10")),
            Err(ConfigError::InvalidNumber { field: "lower", .. })
        ));
        assert!(matches!(
            LimitLine::try_from(&input(BoundKind::Upper, "2", "1", "", "-10")),
            Err(ConfigError::EmptyWindow { .. })
        ));
        let mut bad_unit = input(BoundKind::Lower, "1", "2", "-3", "");
        bad_unit.stop_unit = "parsec".to_owned();
        assert!(matches!(
            LimitLine::try_from(&bad_unit),
            Err(ConfigError::InvalidUnit(_))
        ));
    }

    #[test]
    fn test_malformed_specs_are_skipped() {
        let mut book = LimitBook::new();
        let (plot, param) = (PlotType::Magnitude, Parameter::S11);
        let inputs = vec![
            input(BoundKind::Upper, "oops", "1.5", "", "-10"),
            input(BoundKind::Upper, "0.5", "1.5", "", "-10"),
        ];
        assert_eq!(book.extend_from_inputs(plot, param, &inputs), 1);
        assert_eq!(book.get(plot, param).len(), 1);
        assert_eq!(book.evaluate(&two_point(), param, plot), Verdict::Pass);
        assert_eq!(
            book.evaluate(&two_point(), Parameter::S21, plot),
            Verdict::NoRules
        );
    }

    #[test]
    fn test_only_bad_specs_means_no_rules() {
        let mut book = LimitBook::new();
        let (plot, param) = (PlotType::Phase, Parameter::S22);
        book.extend_from_inputs(plot, param, &[input(BoundKind::Lower, "1", "2", "", "")]);
        assert_eq!(book.evaluate(&two_point(), param, plot), Verdict::NoRules);
    }

    #[test]
    fn test_text_round_trip() {
        let rule = LimitLine::lower(1., 2., FreqUnit::GHz, -3.5).unwrap();
        let input = rule.to_input();
        assert_eq!(input.upper, "");
        assert_eq!(LimitLine::try_from(&input).unwrap(), rule);
    }
}
