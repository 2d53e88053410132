//! Local spin-lattice relaxation rate at one depth.
//!
//! The rate combines a dipole-dipole contribution, driven by a BPP-type
//! Lorentzian spectral density of the screened field, with a power-law
//! normal-state background. Probes stopping inside the surface layer relax
//! at a fixed override rate; the step at the layer boundary is part of the
//! physical model, not a numerical artifact, and is never smoothed.

use crate::constants::{GYROMAGNETIC_RATIO_8LI, GYROMAGNETIC_RATIO_93NB};
use crate::domain::{ConvergenceError, DomainError};
use crate::screening::{ScreeningModel, SuperconductingState};
use serde::{Deserialize, Serialize};

/// Relaxation-mechanism parameters. Same mutability contract as
/// [`SuperconductingState`]: the caller updates fields between evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelaxationParameters {
    /// RMS dipolar field sensed by the probe (T).
    pub dipole_field_t: f64,
    /// Fluctuation rate of the host spins (s⁻¹).
    pub correlation_rate_hz: f64,
    /// Prefactor of the normal-state power law (s⁻¹ K⁻ᵐ).
    pub slr_constant: f64,
    /// Exponent of the normal-state power law.
    pub slr_exponent: f64,
    /// Thickness of the non-superconducting surface layer (nm).
    pub surface_thickness_nm: f64,
    /// Override rate inside the surface layer (s⁻¹).
    pub surface_rate_hz: f64,
}

impl RelaxationParameters {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.correlation_rate_hz.is_finite() || self.correlation_rate_hz <= 0.0 {
            return Err(DomainError::NonPhysicalParameter {
                field: "correlation_rate_hz",
                requirement: "finite and > 0",
                value: self.correlation_rate_hz,
            });
        }
        for (field, value) in [
            ("dipole_field_t", self.dipole_field_t),
            ("slr_constant", self.slr_constant),
            ("surface_thickness_nm", self.surface_thickness_nm),
            ("surface_rate_hz", self.surface_rate_hz),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::NonPhysicalParameter {
                    field,
                    requirement: "finite and >= 0",
                    value,
                });
            }
        }
        if !self.slr_exponent.is_finite() {
            return Err(DomainError::NonPhysicalParameter {
                field: "slr_exponent",
                requirement: "finite",
                value: self.slr_exponent,
            });
        }
        Ok(())
    }
}

/// Lorentzian spectral density J(ω) = 2τ / (1 + ω²τ²).
fn spectral_density(angular_frequency: f64, correlation_time_s: f64) -> f64 {
    let reduced = angular_frequency * correlation_time_s;
    2.0 * correlation_time_s / (1.0 + reduced * reduced)
}

/// Dipole-dipole (BPP) rate of the ⁸Li probe coupled to fluctuating ⁹³Nb
/// host spins in the local field. Finite for all finite non-negative inputs;
/// does not vanish at zero field because the dipolar coupling term survives.
pub fn bpp_rate(field_t: f64, dipole_field_t: f64, correlation_rate_hz: f64) -> f64 {
    let correlation_time = 1.0 / correlation_rate_hz;
    let probe_frequency = GYROMAGNETIC_RATIO_8LI * field_t;
    let host_frequency = GYROMAGNETIC_RATIO_93NB * field_t;
    let coupling = GYROMAGNETIC_RATIO_8LI * dipole_field_t;

    // Flip-flop (ω_p − ω_h) and flip-flip (ω_p + ω_h) terms of the
    // heteronuclear dipolar interaction.
    let difference = spectral_density(probe_frequency - host_frequency, correlation_time);
    let sum = spectral_density(probe_frequency + host_frequency, correlation_time);
    0.5 * coupling * coupling * (difference + sum)
}

/// Normal-state background c · Tᵐ. For T ≤ 0 the power law returns 0 unless
/// the exponent is exactly 0, in which case the constant survives. This
/// lenient convention is deliberate; see the pinned test below.
pub fn normal_state_rate(temperature_k: f64, slr_constant: f64, slr_exponent: f64) -> f64 {
    if temperature_k > 0.0 {
        slr_constant * temperature_k.powf(slr_exponent)
    } else if slr_exponent == 0.0 {
        slr_constant
    } else {
        0.0
    }
}

/// Local relaxation rate closing over one screening model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalRelaxationRate {
    pub screening: ScreeningModel,
}

impl LocalRelaxationRate {
    pub fn new(screening: ScreeningModel) -> Self {
        Self { screening }
    }

    /// Rate at `depth_nm` below the surface. Inside the surface layer the
    /// override rate is returned unconditionally; beyond it the screened
    /// field is evaluated at the depth past the layer and the dipolar and
    /// normal-state contributions are summed.
    pub fn rate(
        &self,
        depth_nm: f64,
        state: &SuperconductingState,
        relax: &RelaxationParameters,
    ) -> Result<f64, ConvergenceError> {
        let beyond_surface_nm = depth_nm - relax.surface_thickness_nm;
        if beyond_surface_nm < 0.0 {
            return Ok(relax.surface_rate_hz);
        }
        let screened_field = self.screening.field_at(beyond_surface_nm, state)?;
        Ok(
            bpp_rate(screened_field, relax.dipole_field_t, relax.correlation_rate_hz)
                + normal_state_rate(state.temperature_k, relax.slr_constant, relax.slr_exponent),
        )
    }
}
