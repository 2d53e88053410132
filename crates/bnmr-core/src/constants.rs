//! Physical constants shared across the model modules, kept in one place to
//! avoid ad hoc per-module literals.

use std::f64::consts::PI;

/// Boltzmann constant in meV/K (CODATA).
pub const BOLTZMANN_MEV_PER_K: f64 = 8.617_333_262e-2;

/// BCS weak-coupling gap ratio Δ₀ / (k_B T_c).
pub const BCS_WEAK_COUPLING_RATIO: f64 = 1.764;

/// Gyromagnetic ratio of the ⁸Li probe in rad s⁻¹ T⁻¹ (γ/2π = 6.3016 MHz/T).
pub const GYROMAGNETIC_RATIO_8LI: f64 = 2.0 * PI * 6.301_6e6;

/// Gyromagnetic ratio of the ⁹³Nb host in rad s⁻¹ T⁻¹ (γ/2π = 10.405 MHz/T).
pub const GYROMAGNETIC_RATIO_93NB: f64 = 2.0 * PI * 10.405e6;
