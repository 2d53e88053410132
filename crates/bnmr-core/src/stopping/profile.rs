//! Modified-beta stopping distribution of implanted probe ions.
//!
//! The depth at which an implanted ion comes to rest follows a beta-shaped
//! density rescaled onto `[0, z_max]`. The density is normalized by
//! construction of its exponents through the beta function; no post-hoc
//! scaling is applied anywhere in the pipeline.

use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Shape parameters of the stopping distribution at one implantation energy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoppingProfile {
    pub alpha: f64,
    pub beta: f64,
    pub z_max_nm: f64,
}

impl StoppingProfile {
    pub fn new(alpha: f64, beta: f64, z_max_nm: f64) -> Result<Self, DomainError> {
        for (field, value) in [("alpha", alpha), ("beta", beta), ("z_max_nm", z_max_nm)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DomainError::NonPhysicalParameter {
                    field,
                    requirement: "finite and > 0",
                    value,
                });
            }
        }
        Ok(Self {
            alpha,
            beta,
            z_max_nm,
        })
    }

    /// Probability density at depth `z` (nm⁻¹); zero outside `[0, z_max]`.
    pub fn density(&self, depth_nm: f64) -> f64 {
        if !(0.0..=self.z_max_nm).contains(&depth_nm) {
            return 0.0;
        }
        let reduced = depth_nm / self.z_max_nm;
        let normalization = ln_beta(self.alpha, self.beta).exp() * self.z_max_nm;
        reduced.powf(self.alpha - 1.0) * (1.0 - reduced).powf(self.beta - 1.0) / normalization
    }

    /// Closed-form mean implantation depth `z_max · α / (α + β)`.
    pub fn mean_depth_nm(&self) -> f64 {
        self.z_max_nm * self.alpha / (self.alpha + self.beta)
    }
}

/// ln Β(a, b) = ln Γ(a) + ln Γ(b) − ln Γ(a + b).
pub fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

// Lanczos approximation, g = 7, 9 coefficients; relative error below 1e-13
// over the positive shape-parameter range used here.
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection Γ(x) Γ(1−x) = π / sin(πx).
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let shifted = x - 1.0;
    let mut series = LANCZOS_COEFFICIENTS[0];
    for (index, coefficient) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        series += coefficient / (shifted + index as f64);
    }
    let t = shifted + LANCZOS_G + 0.5;
    0.5 * (2.0 * PI).ln() + (shifted + 0.5) * t.ln() - t + series.ln()
}
