//! Electrodynamic response kernels consumed by the nonlocal screening model.
//!
//! Both kernels share one calling contract: a single real scalar K(q) in
//! nm⁻² for given wavevector q (nm⁻¹) and superconducting parameters. The
//! q → 0 limit recovers the local effective penetration depth through
//! K(0) = ξ / (ξ₀ λ(T)²); the large-q envelope falls off as 1/q.

use crate::constants::{BCS_WEAK_COUPLING_RATIO, BOLTZMANN_MEV_PER_K};

/// BCS weak-coupling zero-temperature gap estimate in meV.
pub fn gap_mev(critical_temperature_k: f64) -> f64 {
    BCS_WEAK_COUPLING_RATIO * BOLTZMANN_MEV_PER_K * critical_temperature_k
}

/// Two-fluid temperature dependence of the magnetic penetration depth,
/// λ(T) = λ₀ / sqrt(1 − (T/T_c)^n). Diverges at T = T_c, where screening
/// vanishes.
pub fn two_fluid_penetration_depth_nm(
    penetration_depth_nm: f64,
    two_fluid_exponent: f64,
    temperature_k: f64,
    critical_temperature_k: f64,
) -> f64 {
    let reduced = (temperature_k / critical_temperature_k).powf(two_fluid_exponent);
    penetration_depth_nm / (1.0 - reduced).sqrt()
}

/// Pippard response kernel with the mean-free-path-shortened coherence
/// length 1/ξ = 1/ξ₀ + 1/ℓ.
#[allow(clippy::too_many_arguments)]
pub fn pippard_kernel(
    q_inv_nm: f64,
    temperature_k: f64,
    critical_temperature_k: f64,
    _gap_mev: f64,
    coherence_length_nm: f64,
    mean_free_path_nm: f64,
    penetration_depth_nm: f64,
    two_fluid_exponent: f64,
) -> f64 {
    let lambda = two_fluid_penetration_depth_nm(
        penetration_depth_nm,
        two_fluid_exponent,
        temperature_k,
        critical_temperature_k,
    );
    let coherence = 1.0 / (1.0 / coherence_length_nm + 1.0 / mean_free_path_nm);
    kernel_from_lengths(q_inv_nm, coherence, coherence_length_nm, lambda)
}

/// BCS-flavored kernel: the Pippard form with the temperature-dependent
/// effective coherence length 1/ξ = J(0,T)/ξ₀ + 1/ℓ, where
/// J(0,T) = (Δ(T)/Δ₀) tanh(Δ(T)/2k_B T) and Δ(T) follows the standard gap
/// interpolation Δ₀ tanh(1.74 √(T_c/T − 1)).
#[allow(clippy::too_many_arguments)]
pub fn bcs_kernel(
    q_inv_nm: f64,
    temperature_k: f64,
    critical_temperature_k: f64,
    gap_mev: f64,
    coherence_length_nm: f64,
    mean_free_path_nm: f64,
    penetration_depth_nm: f64,
    two_fluid_exponent: f64,
) -> f64 {
    let lambda = two_fluid_penetration_depth_nm(
        penetration_depth_nm,
        two_fluid_exponent,
        temperature_k,
        critical_temperature_k,
    );
    let range_factor = bcs_range_factor(temperature_k, critical_temperature_k, gap_mev);
    let coherence = 1.0 / (range_factor / coherence_length_nm + 1.0 / mean_free_path_nm);
    kernel_from_lengths(q_inv_nm, coherence, coherence_length_nm, lambda)
}

fn kernel_from_lengths(q: f64, coherence_nm: f64, coherence0_nm: f64, lambda_nm: f64) -> f64 {
    coherence_nm / (coherence0_nm * lambda_nm * lambda_nm) * pippard_shape(q * coherence_nm)
}

/// (3 / 2x³)((1 + x²) arctan x − x); → 1 as x → 0, → 3π/(4x) as x → ∞.
fn pippard_shape(x: f64) -> f64 {
    if x < 1.0e-3 {
        let x2 = x * x;
        return 1.0 - 0.2 * x2 + (3.0 / 35.0) * x2 * x2;
    }
    1.5 * ((1.0 + x * x) * x.atan() - x) / (x * x * x)
}

/// Reduced gap Δ(T)/Δ₀ from the standard interpolation formula.
pub fn reduced_gap(temperature_k: f64, critical_temperature_k: f64) -> f64 {
    if temperature_k <= 0.0 {
        return 1.0;
    }
    if temperature_k >= critical_temperature_k {
        return 0.0;
    }
    (1.74 * (critical_temperature_k / temperature_k - 1.0).sqrt()).tanh()
}

fn bcs_range_factor(temperature_k: f64, critical_temperature_k: f64, gap0_mev: f64) -> f64 {
    if temperature_k <= 0.0 {
        return 1.0;
    }
    let ratio = reduced_gap(temperature_k, critical_temperature_k);
    let gap_t = gap0_mev * ratio;
    ratio * (gap_t / (2.0 * BOLTZMANN_MEV_PER_K * temperature_k)).tanh()
}
