//! Charge-distribution methods and the model type that runs them.
//!
//! [`Method`] selects one of the five formulations, [`ChargeModel`] binds a
//! method to one molecule's topology and parameters, and [`ComputeOptions`]
//! carries the shared optional settings.

mod implementation;
mod method;
mod options;

pub use implementation::{ChargeModel, ModelParams};
pub use method::Method;
pub use options::ComputeOptions;
