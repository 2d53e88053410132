//! Meissner screening of the applied field inside the superconductor.
//!
//! Two interchangeable field models share a single capability,
//! `field_at(depth, state)`: a local two-fluid exponential decay, and a
//! nonlocal kernel inversion for specular surface scattering. Above T_c both
//! return the applied field unchanged.

pub mod kernels;

use crate::domain::{ConvergenceError, DomainError};
use crate::numerics::quadrature::{default_relative_tolerance, tanh_sinh};
use self::kernels::{bcs_kernel, pippard_kernel, two_fluid_penetration_depth_nm};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Bulk superconducting configuration. Mutated by the caller (typically the
/// fitter) between evaluations; never cached across mutations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuperconductingState {
    pub temperature_k: f64,
    pub critical_temperature_k: f64,
    /// Zero-temperature gap Δ₀ in meV; see [`kernels::gap_mev`] for the BCS
    /// weak-coupling estimate.
    pub gap_mev: f64,
    pub coherence_length_nm: f64,
    pub mean_free_path_nm: f64,
    pub penetration_depth_nm: f64,
    pub two_fluid_exponent: f64,
    pub applied_field_t: f64,
}

impl SuperconductingState {
    /// Normal state above T_c; screening applies at and below it.
    pub fn is_superconducting(&self) -> bool {
        self.temperature_k <= self.critical_temperature_k
    }

    pub fn penetration_depth_at_temperature_nm(&self) -> f64 {
        two_fluid_penetration_depth_nm(
            self.penetration_depth_nm,
            self.two_fluid_exponent,
            self.temperature_k,
            self.critical_temperature_k,
        )
    }

    /// Eager validation of the length and field scales. Temperature itself
    /// is deliberately not constrained here: the normal-state power law
    /// keeps its lenient T ≤ 0 convention.
    pub fn validate(&self) -> Result<(), DomainError> {
        let positive = [
            ("critical_temperature_k", self.critical_temperature_k),
            ("coherence_length_nm", self.coherence_length_nm),
            ("mean_free_path_nm", self.mean_free_path_nm),
            ("penetration_depth_nm", self.penetration_depth_nm),
            ("two_fluid_exponent", self.two_fluid_exponent),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(DomainError::NonPhysicalParameter {
                    field,
                    requirement: "finite and > 0",
                    value,
                });
            }
        }
        if !self.temperature_k.is_finite() {
            return Err(DomainError::NonPhysicalParameter {
                field: "temperature_k",
                requirement: "finite",
                value: self.temperature_k,
            });
        }
        for (field, value) in [
            ("gap_mev", self.gap_mev),
            ("applied_field_t", self.applied_field_t),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::NonPhysicalParameter {
                    field,
                    requirement: "finite and >= 0",
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Electrodynamic response kernel used by the nonlocal model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KernelKind {
    Pippard,
    Bcs,
}

impl KernelKind {
    fn evaluate(self, q_inv_nm: f64, state: &SuperconductingState) -> f64 {
        match self {
            Self::Pippard => pippard_kernel(
                q_inv_nm,
                state.temperature_k,
                state.critical_temperature_k,
                state.gap_mev,
                state.coherence_length_nm,
                state.mean_free_path_nm,
                state.penetration_depth_nm,
                state.two_fluid_exponent,
            ),
            Self::Bcs => bcs_kernel(
                q_inv_nm,
                state.temperature_k,
                state.critical_temperature_k,
                state.gap_mev,
                state.coherence_length_nm,
                state.mean_free_path_nm,
                state.penetration_depth_nm,
                state.two_fluid_exponent,
            ),
        }
    }
}

/// Screened-field strategy, selected at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreeningModel {
    /// Phenomenological two-fluid exponential decay.
    Local,
    /// Kernel-integral field penetration for a specular surface.
    Nonlocal(KernelKind),
}

impl ScreeningModel {
    /// Local field magnitude at `depth_nm` below the surface.
    pub fn field_at(
        &self,
        depth_nm: f64,
        state: &SuperconductingState,
    ) -> Result<f64, ConvergenceError> {
        if !state.is_superconducting() {
            return Ok(state.applied_field_t);
        }
        match self {
            Self::Local => {
                let lambda = state.penetration_depth_at_temperature_nm();
                Ok(state.applied_field_t * (-depth_nm / lambda).exp())
            }
            Self::Nonlocal(kind) => {
                Ok(state.applied_field_t * nonlocal_reduced_field(*kind, depth_nm, state)?)
            }
        }
    }

    /// B(z)/B₀ for diagnostics and tests.
    pub fn reduced_field_profile(
        &self,
        depth_nm: f64,
        state: &SuperconductingState,
    ) -> Result<f64, ConvergenceError> {
        if state.applied_field_t > 0.0 {
            return Ok(self.field_at(depth_nm, state)? / state.applied_field_t);
        }
        // Zero applied field: evaluate the profile at unit field.
        let mut unit_state = *state;
        unit_state.applied_field_t = 1.0;
        self.field_at(depth_nm, &unit_state)
    }
}

/// Specular-boundary inversion of the kernel equation,
///
/// B(z)/B₀ = (2/π) ∫₀^∞ q sin(qz) / (q² + K(q)) dq.
///
/// The integrand as written is only conditionally convergent; subtracting
/// the free-space part with ∫₀^∞ sin(qz)/q dq = π/2 gives
///
/// B(z)/B₀ = 1 − (2/π) ∫₀^∞ K(q) sin(qz) / (q (q² + K(q))) dq,
///
/// whose tail falls off like K(q)/q³ ~ 1/q⁴ and is carried by a finite
/// cutoff with a bounded remainder.
fn nonlocal_reduced_field(
    kind: KernelKind,
    depth_nm: f64,
    state: &SuperconductingState,
) -> Result<f64, ConvergenceError> {
    if depth_nm <= 0.0 {
        return Ok(1.0);
    }
    let tolerance = default_relative_tolerance();
    let cutoff = wavevector_cutoff(state, tolerance);
    let outcome = tanh_sinh(
        |q: f64| {
            let kernel = kind.evaluate(q, state);
            Ok(kernel * (q * depth_nm).sin() / (q * (q * q + kernel)))
        },
        0.0,
        cutoff,
        tolerance,
    )?;
    Ok(1.0 - (outcome.value / FRAC_PI_2))
}

/// Cutoff wavevector: beyond it the subtracted integrand's envelope
/// π/(4 ξ₀ λ² q³)-integrated tail is below a tenth of the tolerance, and it
/// clears every inverse length scale of the kernel.
fn wavevector_cutoff(state: &SuperconductingState, tolerance: f64) -> f64 {
    let lambda = state.penetration_depth_at_temperature_nm();
    let tail_bound = if lambda.is_finite() {
        (5.0 / (state.coherence_length_nm * lambda * lambda * tolerance)).cbrt()
    } else {
        0.0
    };
    let coherence_scale = 10.0 * (1.0 / state.coherence_length_nm + 1.0 / state.mean_free_path_nm);
    let lambda_scale = if lambda.is_finite() { 10.0 / lambda } else { 0.0 };
    tail_bound.max(coherence_scale).max(lambda_scale).max(1.0e-3)
}
