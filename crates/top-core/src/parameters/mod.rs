//! Numeric parameters and the host registry they are appended to.
//! Use [NumericParameter::new] for a parameter with the host's defaults.

mod info;
mod manager;
pub use info::*;
pub use manager::*;
