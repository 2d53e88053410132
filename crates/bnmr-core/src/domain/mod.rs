pub mod errors;

pub use errors::{ConvergenceError, DataError, DomainError, ModelError, ModelResult};
