//! Shape-preserving monotone cubic interpolation (Fritsch-Carlson / PCHIP).
//!
//! The interpolant is C¹, reproduces the control values exactly at the
//! knots, and never overshoots between control points, which keeps
//! interpolated stopping-profile shape parameters inside the range spanned
//! by the calibration data.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PchipError {
    #[error("monotone cubic interpolation requires at least 2 knots, got {actual}")]
    InsufficientKnots { actual: usize },
    #[error("knot and value lengths differ: {knots} vs {values}")]
    LengthMismatch { knots: usize, values: usize },
    #[error("knots must be strictly increasing, index {index} has {current} after {previous}")]
    NonIncreasingKnot {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("interpolation input '{field}' must be finite at index {index}, got {value}")]
    NonFiniteValue {
        field: &'static str,
        index: usize,
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonotoneCubic {
    knots: Vec<f64>,
    values: Vec<f64>,
    derivatives: Vec<f64>,
}

impl MonotoneCubic {
    pub fn new(knots: Vec<f64>, values: Vec<f64>) -> Result<Self, PchipError> {
        validate_input(&knots, &values)?;
        let derivatives = pchip_derivatives(&knots, &values);
        Ok(Self {
            knots,
            values,
            derivatives,
        })
    }

    pub fn knot_min(&self) -> f64 {
        self.knots[0]
    }

    pub fn knot_max(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    /// Evaluate the interpolant. Outside the knot range the boundary cubic
    /// is extrapolated; range policing is the owner's responsibility.
    pub fn evaluate(&self, x: f64) -> f64 {
        let segment = self.segment_index(x);
        let width = self.knots[segment + 1] - self.knots[segment];
        let t = (x - self.knots[segment]) / width;

        // Cubic Hermite basis on the unit interval.
        let h00 = (1.0 + 2.0 * t) * (1.0 - t) * (1.0 - t);
        let h10 = t * (1.0 - t) * (1.0 - t);
        let h01 = t * t * (3.0 - 2.0 * t);
        let h11 = t * t * (t - 1.0);

        h00 * self.values[segment]
            + h10 * width * self.derivatives[segment]
            + h01 * self.values[segment + 1]
            + h11 * width * self.derivatives[segment + 1]
    }

    fn segment_index(&self, x: f64) -> usize {
        let count = self.knots.len();
        let mut low = 0;
        let mut high = count - 1;
        while high - low > 1 {
            let mid = (low + high) / 2;
            if self.knots[mid] > x {
                high = mid;
            } else {
                low = mid;
            }
        }
        low
    }
}

fn validate_input(knots: &[f64], values: &[f64]) -> Result<(), PchipError> {
    if knots.len() < 2 {
        return Err(PchipError::InsufficientKnots {
            actual: knots.len(),
        });
    }
    if knots.len() != values.len() {
        return Err(PchipError::LengthMismatch {
            knots: knots.len(),
            values: values.len(),
        });
    }
    for (index, knot) in knots.iter().copied().enumerate() {
        if !knot.is_finite() {
            return Err(PchipError::NonFiniteValue {
                field: "knots",
                index,
                value: knot,
            });
        }
        if index > 0 && knot <= knots[index - 1] {
            return Err(PchipError::NonIncreasingKnot {
                index,
                previous: knots[index - 1],
                current: knot,
            });
        }
    }
    for (index, value) in values.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(PchipError::NonFiniteValue {
                field: "values",
                index,
                value,
            });
        }
    }
    Ok(())
}

/// Fritsch-Carlson knot derivatives: weighted harmonic means of adjacent
/// secant slopes in the interior, shape-clamped three-point estimates at the
/// boundaries. Zero wherever adjacent secants change sign.
fn pchip_derivatives(knots: &[f64], values: &[f64]) -> Vec<f64> {
    let count = knots.len();
    let widths: Vec<f64> = knots.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let secants: Vec<f64> = values
        .windows(2)
        .zip(widths.iter())
        .map(|(pair, width)| (pair[1] - pair[0]) / width)
        .collect();

    if count == 2 {
        return vec![secants[0], secants[0]];
    }

    let mut derivatives = vec![0.0; count];
    for index in 1..count - 1 {
        let left = secants[index - 1];
        let right = secants[index];
        if left * right <= 0.0 {
            continue;
        }
        let weight_left = 2.0 * widths[index] + widths[index - 1];
        let weight_right = widths[index] + 2.0 * widths[index - 1];
        derivatives[index] = (weight_left + weight_right) / (weight_left / left + weight_right / right);
    }
    derivatives[0] = edge_derivative(widths[0], widths[1], secants[0], secants[1]);
    derivatives[count - 1] = edge_derivative(
        widths[count - 2],
        widths[count - 3],
        secants[count - 2],
        secants[count - 3],
    );
    derivatives
}

fn edge_derivative(width_near: f64, width_far: f64, secant_near: f64, secant_far: f64) -> f64 {
    let mut derivative = ((2.0 * width_near + width_far) * secant_near - width_near * secant_far)
        / (width_near + width_far);
    if derivative * secant_near <= 0.0 {
        derivative = 0.0;
    } else if secant_near * secant_far < 0.0 && derivative.abs() > 3.0 * secant_near.abs() {
        derivative = 3.0 * secant_near;
    }
    derivative
}

#[cfg(test)]
mod tests {
    use super::{MonotoneCubic, PchipError};

    #[test]
    fn interpolant_matches_control_values_at_knots() {
        let knots = vec![1.0, 2.0, 4.0, 8.0, 20.0];
        let values = vec![3.0, 3.1, 3.4, 3.2, 5.0];
        let interpolant = MonotoneCubic::new(knots.clone(), values.clone()).expect("valid input");
        for (knot, value) in knots.iter().zip(values.iter()) {
            assert!((interpolant.evaluate(*knot) - value).abs() < 1.0e-12);
        }
    }

    #[test]
    fn monotone_data_yields_monotone_interpolant_without_overshoot() {
        let knots = vec![10.0, 12.0, 16.0, 20.0, 28.0];
        let values = vec![100.0, 112.0, 131.0, 140.0, 168.0];
        let interpolant = MonotoneCubic::new(knots, values).expect("valid input");

        let mut previous = interpolant.evaluate(10.0);
        let samples = 400;
        for step in 1..=samples {
            let x = 10.0 + 18.0 * step as f64 / samples as f64;
            let current = interpolant.evaluate(x);
            assert!(
                current + 1.0e-10 >= previous,
                "interpolant decreased at x={x}: {current} < {previous}"
            );
            assert!((100.0..=168.0).contains(&current));
            previous = current;
        }
    }

    #[test]
    fn linear_data_is_reproduced_exactly() {
        let knots = vec![0.0, 1.0, 3.0, 7.0];
        let values: Vec<f64> = knots.iter().map(|x| 2.5 * x - 1.0).collect();
        let interpolant = MonotoneCubic::new(knots, values).expect("valid input");
        for x in [0.25, 0.9, 2.0, 5.5, 6.9] {
            assert!((interpolant.evaluate(x) - (2.5 * x - 1.0)).abs() < 1.0e-10);
        }
    }

    #[test]
    fn two_point_table_interpolates_linearly() {
        let interpolant =
            MonotoneCubic::new(vec![10.0, 20.0], vec![100.0, 140.0]).expect("valid input");
        assert!((interpolant.evaluate(15.0) - 120.0).abs() < 1.0e-10);
    }

    #[test]
    fn rejects_short_mismatched_and_unsorted_input() {
        assert_eq!(
            MonotoneCubic::new(vec![1.0], vec![1.0]).expect_err("too short"),
            PchipError::InsufficientKnots { actual: 1 }
        );
        assert_eq!(
            MonotoneCubic::new(vec![1.0, 2.0], vec![1.0]).expect_err("mismatch"),
            PchipError::LengthMismatch { knots: 2, values: 1 }
        );
        assert_eq!(
            MonotoneCubic::new(vec![1.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]).expect_err("duplicate"),
            PchipError::NonIncreasingKnot {
                index: 1,
                previous: 1.0,
                current: 1.0,
            }
        );
    }
}
