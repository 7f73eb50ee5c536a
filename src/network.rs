use std::path::Path;

use ndarray::prelude::*;
use num::complex::Complex;

use crate::frequency::{FreqUnit, Frequency};
use crate::parameter::Parameter;
use crate::result::FormatError;
use crate::touchstone::{ParamFormat, Touchstone, ROW_WIDTH};
use crate::CxArray3;

impl ParamFormat {
    /// Combine the two columns of one parameter into a complex value.
    pub fn to_complex(self, a: f64, b: f64) -> Complex<f64> {
        use ParamFormat::*;
        match self {
            RealImag => Complex::new(a, b),
            DBAngle => Complex::from_polar(10f64.powf(a / 20.), b.to_radians()),
            MagAngle => Complex::from_polar(a, b.to_radians()),
        }
    }

    /// Split a complex value back into the two columns of this format.
    /// Angles come out in (-180, 180].
    pub fn to_pair(self, c: Complex<f64>) -> (f64, f64) {
        use ParamFormat::*;
        match self {
            RealImag => (c.re, c.im),
            DBAngle => (20. * c.norm().log10(), c.arg().to_degrees()),
            MagAngle => (c.norm(), c.arg().to_degrees()),
        }
    }
}

/// Two-port scattering data normalised to Hz and complex values.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    f: Frequency,
    s: CxArray3,
    z0: Complex<f64>,
    format: ParamFormat,
    comments: Vec<String>,
}

impl Network {
    /// `s` must have shape `(npoints, 2, 2)`.
    pub fn new(f: Frequency, s: CxArray3, format: ParamFormat) -> Result<Self, FormatError> {
        let expected = (f.npoints(), 2, 2);
        if s.dim() != expected {
            return Err(FormatError::ShapeMismatch {
                expected,
                found: s.dim(),
            });
        }
        Ok(Network {
            f,
            s,
            z0: Complex::new(50., 0.),
            format,
            comments: Vec::new(),
        })
    }

    pub fn from_snp(path: &Path) -> Result<Self, FormatError> {
        Network::from_touchstone(&Touchstone::from_path(path)?)
    }

    pub fn parse(text: &str) -> Result<Self, FormatError> {
        Network::from_touchstone(&Touchstone::parse(text)?)
    }

    pub fn from_touchstone(touchstone: &Touchstone) -> Result<Self, FormatError> {
        let rows = touchstone.rows();
        let unit = touchstone.unit();
        let format = touchstone.format();

        let f = Frequency::from(rows.column(0).mapv(|v| unit * v));
        if let Some(index) = f.first_decrease() {
            return Err(FormatError::NonMonotonic {
                index,
                previous: f.hz()[index - 1],
                current: f.hz()[index],
            });
        }

        let mut s = CxArray3::zeros((rows.nrows(), 2, 2));
        for param in Parameter::ALL {
            let (i, j) = param.matrix_index();
            let col = param.column();
            for (k, row) in rows.outer_iter().enumerate() {
                s[[k, i, j]] = format.to_complex(row[col], row[col + 1]);
            }
        }

        Ok(Network {
            f,
            s,
            z0: Complex::new(touchstone.options().resistance, 0.),
            format,
            comments: touchstone.comments().to_vec(),
        })
    }

    pub fn frequency(&self) -> &Frequency {
        &self.f
    }

    pub fn s(&self) -> &CxArray3 {
        &self.s
    }

    /// The series for one parameter, one value per frequency.
    pub fn param(&self, param: Parameter) -> ArrayView1<'_, Complex<f64>> {
        let (i, j) = param.matrix_index();
        self.s.slice(s![.., i, j])
    }

    pub fn z0(&self) -> Complex<f64> {
        self.z0
    }

    /// Encoding of the file this network was loaded from.
    pub fn format(&self) -> ParamFormat {
        self.format
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn npoints(&self) -> usize {
        self.f.npoints()
    }

    /// Data rows in file layout, frequency in `unit`, parameters in `format`.
    pub fn to_rows(&self, unit: FreqUnit, format: ParamFormat) -> Array2<f64> {
        let mut rows = Array2::zeros((self.npoints(), ROW_WIDTH));
        rows.column_mut(0).assign(&self.f.scaled(unit));
        for param in Parameter::ALL {
            let col = param.column();
            for (k, value) in self.param(param).iter().enumerate() {
                let (a, b) = format.to_pair(*value);
                rows[[k, col]] = a;
                rows[[k, col + 1]] = b;
            }
        }
        rows
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_instantiation() {
        let freq = Frequency::new(1., 3., 3, Some(FreqUnit::GHz));
        let one_c = Complex::new(1., 0.);
        let s = Array::from_elem((3, 2, 2), one_c);
        let net = Network::new(freq, s, ParamFormat::RealImag).unwrap();
        assert_eq!(net.npoints(), 3);
        assert_eq!(net.param(Parameter::S12).to_vec(), vec![one_c; 3]);
    }

    #[test]
    fn test_instantiation_with_wrong_shape() {
        let freq = Frequency::new(1., 3., 3, Some(FreqUnit::GHz));
        let s = CxArray3::zeros((2, 2, 2));
        match Network::new(freq, s, ParamFormat::RealImag) {
            Err(FormatError::ShapeMismatch { expected, found }) => {
                assert_eq!(expected, (3, 2, 2));
                assert_eq!(found, (2, 2, 2));
            }
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_two_point_ri() {
        let text = "# Hz S RI\n\
            1e9 0.1 0.0 0.9 0.0 0.9 0.0 0.1 0.0\n\
            2e9 0.1 0.0 0.9 0.0 0.9 0.0 0.1 0.0\n";
        let net = Network::parse(text).unwrap();
        assert_eq!(net.frequency().hz(), &array![1e9, 2e9]);
        assert_eq!(
            net.param(Parameter::S11).to_vec(),
            vec![Complex::new(0.1, 0.), Complex::new(0.1, 0.)]
        );
        assert_eq!(net.param(Parameter::S21)[0], Complex::new(0.9, 0.));
        assert_eq!(net.format(), ParamFormat::RealImag);
    }

    #[test]
    fn test_frequency_is_scaled_to_hz() {
        let net = Network::parse("# kHz S MA\n1.5 1 0 1 0 1 0 1 0\n").unwrap();
        assert_eq!(net.frequency().hz()[0], 1500.);
    }

    #[test]
    fn test_columns_map_to_parameters() {
        let net = Network::parse("# Hz S RI\n1 11 0 21 0 12 0 22 0\n").unwrap();
        assert_eq!(net.s()[[0, 0, 0]].re, 11.);
        assert_eq!(net.s()[[0, 1, 0]].re, 21.);
        assert_eq!(net.s()[[0, 0, 1]].re, 12.);
        assert_eq!(net.s()[[0, 1, 1]].re, 22.);
        assert_eq!(net.param(Parameter::S12)[0].re, 12.);
    }

    #[test]
    fn test_db_angle_conversion() {
        let c = ParamFormat::DBAngle.to_complex(-20., 90.);
        assert_relative_eq!(c.re, 0., epsilon = 1e-12);
        assert_relative_eq!(c.im, 0.1, epsilon = 1e-12);

        let c = ParamFormat::DBAngle.to_complex(0., 180.);
        assert_relative_eq!(c.re, -1., epsilon = 1e-12);
    }

    #[test]
    fn test_mag_angle_conversion() {
        let c = ParamFormat::MagAngle.to_complex(0.5, -45.);
        assert_relative_eq!(c.norm(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(c.arg().to_degrees(), -45., epsilon = 1e-9);
        assert_relative_eq!(c.re, 0.5 * std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_ri_round_trip_is_exact() {
        let values = [
            Complex::new(0.1, -0.2),
            Complex::new(-0.75, 0.33),
            Complex::new(1e-6, 4.5e3),
        ];
        for c in values {
            let (a, b) = ParamFormat::RealImag.to_pair(c);
            assert_eq!(ParamFormat::RealImag.to_complex(a, b), c);
        }
    }

    #[test]
    fn test_polar_round_trip() {
        for (mag, angle) in [(0.3, 10.), (1.2, -170.), (0.05, 270.), (0.9, 725.)] {
            let c = ParamFormat::MagAngle.to_complex(mag, angle);
            let (m, a) = ParamFormat::MagAngle.to_pair(c);
            assert_relative_eq!(m, mag, epsilon = 1e-12);
            let diff = (a - angle).rem_euclid(360.);
            assert!(diff < 1e-9 || 360. - diff < 1e-9, "{} vs {}", a, angle);

            let db = 20. * f64::log10(mag);
            let c = ParamFormat::DBAngle.to_complex(db, angle);
            let (d, a) = ParamFormat::DBAngle.to_pair(c);
            assert_relative_eq!(d, db, epsilon = 1e-9);
            let diff = (a - angle).rem_euclid(360.);
            assert!(diff < 1e-9 || 360. - diff < 1e-9, "{} vs {}", a, angle);
        }
    }

    #[test]
    fn test_decreasing_frequency_is_rejected() {
        let text = "# MHz S RI\n1 0 0 0 0 0 0 0 0\n3 0 0 0 0 0 0 0 0\n2 0 0 0 0 0 0 0 0\n";
        match Network::parse(text) {
            Err(FormatError::NonMonotonic {
                index,
                previous,
                current,
            }) => {
                assert_eq!(index, 2);
                assert_eq!(previous, 3e6);
                assert_eq!(current, 2e6);
            }
            other => panic!("expected NonMonotonic, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_frequency_is_accepted() {
        let text = "# Hz S RI\n1 0 0 0 0 0 0 0 0\n1 0 0 0 0 0 0 0 0\n";
        assert_eq!(Network::parse(text).unwrap().npoints(), 2);
    }

    #[test]
    fn test_to_rows_matches_file() {
        let path = std::path::PathBuf::from("tests/lowpass_ghz_db.s2p");
        let touchstone = Touchstone::from_path(&path).unwrap();
        let net = Network::from_touchstone(&touchstone).unwrap();
        let rows = net.to_rows(FreqUnit::GHz, ParamFormat::DBAngle);
        for (expected, actual) in touchstone.rows().iter().zip(rows.iter()) {
            let diff = (expected - actual).abs();
            // 180 and -180 are the same angle
            assert!(diff < 1e-9 || (diff - 360.).abs() < 1e-9, "{} vs {}", expected, actual);
        }
        assert_eq!(net.z0(), Complex::new(50., 0.));
    }

    #[test]
    fn test_from_snp() {
        let path = std::path::PathBuf::from("tests/ntwk_arbitrary_frequency.s2p");
        let net = Network::from_snp(&path).unwrap();
        assert_eq!(net.npoints(), 4);
        assert_eq!(
            net.param(Parameter::S22)[3],
            Complex::new(0.00741732005, -0.155084364)
        );
        assert_eq!(net.comments().len(), 2);
    }
}
