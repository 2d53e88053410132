pub mod pchip;
pub mod quadrature;

pub use pchip::{MonotoneCubic, PchipError};
pub use quadrature::{
    default_relative_tolerance, tanh_sinh, tanh_sinh_with_budget, QuadratureOutcome,
};
