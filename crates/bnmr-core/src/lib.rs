//! Depth-resolved spin-lattice relaxation (SLR) model engine for β-detected
//! NMR on superconducting films.
//!
//! Implanted probe ions stop at a depth drawn from a calibrated stopping
//! profile; at each depth the probe senses the Meissner-screened field and
//! relaxes at a local rate. The observable is the stopping-profile-weighted
//! average of that rate over depth, exposed through
//! [`DepthResolvedAnalyzer::evaluate`] as a function of implantation energy
//! with temperature, applied field, and the superconducting/relaxation
//! parameters held in caller-mutable configuration structs.

pub mod analyzer;
pub mod constants;
pub mod domain;
pub mod numerics;
pub mod relaxation;
pub mod screening;
pub mod stopping;

pub use analyzer::{AveragingStrategy, DepthResolvedAnalyzer};
pub use domain::{ConvergenceError, DataError, DomainError, ModelError, ModelResult};
pub use relaxation::{LocalRelaxationRate, RelaxationParameters};
pub use screening::{KernelKind, ScreeningModel, SuperconductingState};
pub use stopping::{CalibrationRow, StoppingProfile, StoppingProfileTable};
