//! Shared error taxonomy for the depth-resolved model engine.
//!
//! Three failure classes are distinguished: malformed calibration input
//! (fatal at construction), per-call domain violations (the caller rejects
//! the offending parameter point), and quadrature budget exhaustion. No
//! failure is papered over with a default value; every error propagates so a
//! downstream fit never consumes a silently corrupted rate.

use thiserror::Error;

/// Malformed or insufficient calibration input. Fatal at table construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("calibration table requires at least 2 rows, got {actual}")]
    InsufficientRows { actual: usize },
    #[error(
        "calibration energies must be strictly increasing after sorting, row {index} has {current} keV after {previous} keV"
    )]
    NonIncreasingEnergy {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("calibration field '{field}' must be finite and > 0 at row {index}, got {value}")]
    NonPositiveShape {
        field: &'static str,
        index: usize,
        value: f64,
    },
    #[error("calibration field '{field}' must be finite at row {index}, got {value}")]
    NonFiniteField {
        field: &'static str,
        index: usize,
        value: f64,
    },
    #[error("calibration header is missing column '{column}'")]
    MissingColumn { column: &'static str },
    #[error("calibration line {line} has {actual} fields, header has {expected}")]
    FieldCountMismatch {
        line: usize,
        expected: usize,
        actual: usize,
    },
    #[error("calibration line {line} column '{column}' is not a number: '{value}'")]
    UnparsableField {
        line: usize,
        column: String,
        value: String,
    },
    #[error("failed to read calibration source: {detail}")]
    Io { detail: String },
    #[error("stopping-profile interpolant construction failed: {detail}")]
    Interpolant { detail: String },
}

/// Per-call violation of the model's valid parameter region. The analyzer
/// state stays intact; the caller is expected to reject the parameter point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error(
        "implantation energy {energy} keV lies outside the usable interpolation range [{min}, {max}] keV"
    )]
    EnergyOutOfRange { energy: f64, min: f64, max: f64 },
    #[error("parameter '{field}' must be {requirement}, got {value}")]
    NonPhysicalParameter {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },
    #[error("histogram averaging requires at least 1 bin")]
    NoHistogramBins,
}

/// Adaptive quadrature exhausted its refinement budget before reaching the
/// requested tolerance. Surfaced, never silently retried looser.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvergenceError {
    #[error(
        "{rule} quadrature did not reach relative tolerance {target:.3e} within {evaluations} evaluations (last relative change {achieved:.3e})"
    )]
    ToleranceNotReached {
        rule: &'static str,
        target: f64,
        achieved: f64,
        evaluations: usize,
    },
    #[error("{rule} quadrature produced a non-finite estimate")]
    NonFiniteEstimate { rule: &'static str },
    #[error("{rule} quadrature integrand returned a non-finite value at {abscissa}")]
    NonFiniteIntegrand { rule: &'static str, abscissa: f64 },
}

/// Unifying error for the public analyzer surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Convergence(#[from] ConvergenceError),
}

pub type ModelResult<T> = Result<T, ModelError>;
