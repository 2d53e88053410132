pub mod profile;
pub mod table;

pub use profile::{ln_beta, StoppingProfile};
pub use table::{CalibrationRow, StoppingProfileTable};
