//! Euphotic depth from the 490 nm IOPs (Lee et al. 2007).
//!
//! The depth z where a given fraction of surface irradiance remains solves
//! `K1·z + K2·z/sqrt(1+z) = τ`. Substituting `y = sqrt(1+z)` turns it into the
//! cubic `K1·y³ + K2·y² − (K1+τ)·y − K2 = 0`, solved in closed form.

use std::f64::consts::PI;
use std::fmt::Display;

use crate::iop::error::QaaError;

const A490_FLOOR: f64 = 0.0195;
const BB490_FLOOR: f64 = 0.0016;

/// Light penetration target of the euphotic depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaterClarity {
    #[default]
    OnePercent,
    TenPercent,
    FiftyPercent,
}

impl WaterClarity {
    /// Map a percentage to its selector.
    ///
    /// Only 1, 10 and 50 are recognized. Anything else selects
    /// [`WaterClarity::OnePercent`], the conventional euphotic depth.
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            10 => Self::TenPercent,
            50 => Self::FiftyPercent,
            _ => Self::OnePercent,
        }
    }

    pub fn percent(&self) -> u32 {
        match self {
            Self::OnePercent => 1,
            Self::TenPercent => 10,
            Self::FiftyPercent => 50,
        }
    }

    /// Optical depth -ln(fraction) reached at the target depth
    pub fn tau(&self) -> f64 {
        match self {
            Self::OnePercent => 4.605,
            Self::TenPercent => 2.303,
            Self::FiftyPercent => 0.693,
        }
    }
}

impl Display for WaterClarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Euphotic depth in metres.
///
/// * `a490`, `bb490` - total absorption and backscattering at 490 nm [m^-1],
///   floored at 0.0195 and 0.0016
/// * `sun_zenith` - solar zenith angle in degrees
///
/// # Errors
///
/// [`QaaError::ImaginaryNumber`] when the cubic has no usable real root
/// (including NaN inputs), [`QaaError::NegativeNumber`] when the root is not
/// a positive depth.
pub fn qaaf_zeu(
    a490: f64,
    bb490: f64,
    sun_zenith: f64,
    percentile: WaterClarity,
) -> Result<f64, QaaError> {
    let a = floor_at(a490, A490_FLOOR);
    let bb = floor_at(bb490, BB490_FLOOR);
    let theta = sun_zenith.to_radians();

    let k1 = (-0.057 + 0.482 * a.sqrt() + 4.221 * bb) * (1.0 + 0.090 * theta.sin());
    let k2 = (0.183 + 0.702 * a - 2.567 * bb) * (1.465 - 0.667 * theta.cos());

    solve_depth(k1, k2, percentile.tau())
}

// Comparisons keep NaN as NaN, unlike f64::max
fn floor_at(value: f64, floor: f64) -> f64 {
    if value < floor { floor } else { value }
}

fn solve_depth(k1: f64, k2: f64, tau: f64) -> Result<f64, QaaError> {
    // Normalized cubic y³ + A·y² + B·y + C = 0
    let a = k2 / k1;
    let b = -(k1 + tau) / k1;
    let c = -k2 / k1;

    let q = (a * a - 3.0 * b) / 9.0;
    let r = (2.0 * a.powi(3) - 9.0 * a * b + 27.0 * c) / 54.0;
    if !(q >= 0.0) {
        return Err(QaaError::ImaginaryNumber { value: q });
    }

    let q3 = q.powi(3);
    let y = if r * r < q3 {
        // Three real roots, the largest one (y > 1) is the physical branch
        let theta = (r / q3.sqrt()).acos();
        -2.0 * q.sqrt() * ((theta + 2.0 * PI) / 3.0).cos() - a / 3.0
    } else {
        let aa = -r.signum() * (r.abs() + (r * r - q3).sqrt()).cbrt();
        let bb = if aa == 0.0 { 0.0 } else { q / aa };
        aa + bb - a / 3.0
    };

    let z = y * y - 1.0;
    if !(y > 0.0 && z > 0.0) {
        return Err(QaaError::NegativeNumber { value: z });
    }
    Ok(z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn zeu(a490: f64, bb490: f64, zenith: f64, percentile: WaterClarity) -> f64 {
        qaaf_zeu(a490, bb490, zenith, percentile).unwrap()
    }

    #[test]
    fn test_percentiles() {
        let z1 = zeu(0.03, 0.004, 30.0, WaterClarity::OnePercent);
        let z10 = zeu(0.03, 0.004, 30.0, WaterClarity::TenPercent);
        let z50 = zeu(0.03, 0.004, 30.0, WaterClarity::FiftyPercent);

        assert_abs_diff_eq!(z1, 70.07162453815516, epsilon = 1e-9);
        assert_abs_diff_eq!(z10, 30.27472935370888, epsilon = 1e-9);
        assert_abs_diff_eq!(z50, 6.379969622602883, epsilon = 1e-9);
        assert!(z1 > z10 && z10 > z50);
    }

    #[test]
    fn test_root_satisfies_attenuation_model() {
        for (a, bb, zenith) in [(0.5, 0.02, 45.0), (2.0, 0.05, 60.0), (0.1, 0.2, 0.0)] {
            let z = zeu(a, bb, zenith, WaterClarity::OnePercent);
            let theta = f64::to_radians(zenith);
            let k1 = (-0.057 + 0.482 * f64::sqrt(a) + 4.221 * bb) * (1.0 + 0.090 * theta.sin());
            let k2 = (0.183 + 0.702 * a - 2.567 * bb) * (1.465 - 0.667 * theta.cos());
            let tau = k1 * z + k2 * z / (1.0 + z).sqrt();
            assert_abs_diff_eq!(tau, 4.605, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_turbid_water_is_shallow() {
        let z = zeu(2.0, 0.05, 60.0, WaterClarity::OnePercent);
        assert_abs_diff_eq!(z, 2.600796783024868, epsilon = 1e-9);
    }

    #[test]
    fn test_inputs_are_floored() {
        let floored = zeu(0.0195, 0.0016, 0.0, WaterClarity::OnePercent);
        let below = zeu(0.01, 0.001, 0.0, WaterClarity::OnePercent);
        let negative = zeu(-1.0, -1.0, 0.0, WaterClarity::OnePercent);
        assert_eq!(below, floored);
        assert_eq!(negative, floored);

        // Each input is floored on its own
        let a_only = zeu(0.01, 0.0016, 0.0, WaterClarity::OnePercent);
        let bb_only = zeu(0.0195, 0.001, 0.0, WaterClarity::OnePercent);
        assert_eq!(a_only, floored);
        assert_eq!(bb_only, floored);

        let a_low = zeu(0.01, 0.004, 30.0, WaterClarity::OnePercent);
        let a_floor = zeu(0.0195, 0.004, 30.0, WaterClarity::OnePercent);
        assert_eq!(a_low, a_floor);
        let bb_low = zeu(0.5, 0.0, 30.0, WaterClarity::OnePercent);
        let bb_floor = zeu(0.5, 0.0016, 30.0, WaterClarity::OnePercent);
        assert_eq!(bb_low, bb_floor);
        assert_abs_diff_eq!(floored, 157.2964580344617, epsilon = 1e-9);
    }

    #[test]
    fn test_unknown_percent_falls_back_to_one_percent() {
        assert_eq!(WaterClarity::from_percent(1), WaterClarity::OnePercent);
        assert_eq!(WaterClarity::from_percent(10), WaterClarity::TenPercent);
        assert_eq!(WaterClarity::from_percent(50), WaterClarity::FiftyPercent);
        assert_eq!(WaterClarity::from_percent(0), WaterClarity::OnePercent);
        assert_eq!(WaterClarity::from_percent(37), WaterClarity::OnePercent);
        assert_eq!(WaterClarity::default().tau(), 4.605);

        let fallback = zeu(0.03, 0.004, 30.0, WaterClarity::from_percent(37));
        let explicit = zeu(0.03, 0.004, 30.0, WaterClarity::OnePercent);
        assert_eq!(fallback, explicit);
    }

    #[test]
    fn test_negative_q_is_imaginary() {
        let err = solve_depth(-1.0, 0.1, 4.605).unwrap_err();
        assert!(matches!(err, QaaError::ImaginaryNumber { .. }));
        assert!(err.value() < 0.0);
    }

    #[test]
    fn test_non_positive_root_is_negative_number() {
        // Trigonometric branch
        let err = solve_depth(1.0, 0.1, -0.5).unwrap_err();
        assert!(matches!(err, QaaError::NegativeNumber { .. }));
        // Cardano branch
        let err = solve_depth(1.0, 1.0, -0.5).unwrap_err();
        assert!(matches!(err, QaaError::NegativeNumber { .. }));
    }

    #[test]
    fn test_nan_input_is_imaginary() {
        let result = qaaf_zeu(f64::NAN, 0.004, 30.0, WaterClarity::OnePercent);
        let err = result.unwrap_err();
        assert!(matches!(err, QaaError::ImaginaryNumber { .. }));
    }
}
