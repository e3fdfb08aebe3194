//! Partial atomic charges from electronegativity-equalization physics.
//!
//! Given a molecular topology (bond-graph connectivity, interatomic
//! distances, atomic diameters) and per-atom (optionally per-bond)
//! parameters, this crate assembles a screened-Coulomb interaction matrix,
//! couples it with a net-charge constraint, and solves for the charge
//! distribution minimizing the electrostatic energy. Five formulations are
//! provided ([`Method`]): two solving directly for atomic charges and three
//! solving for charge transfer along bonds, including the split-charge
//! equilibration model. Rank-deficient bond topologies (rings) are handled
//! by an SVD least-norm solve rather than rejected.
//!
//! Molecule parsing, atom/bond-type classification and the parameter-fitting
//! search algorithm are the caller's concern; the crate consumes plain
//! matrices, label lists and parameter tables, and exposes the flat-vector
//! parameter binding a fitting loop needs to re-evaluate many molecules
//! cheaply ([`ParameterBinding`], [`ChargeModel::compute_with_params`]).

pub mod bonds;
pub mod dispatch;
pub mod error;
pub mod fit;
pub mod math;
pub mod params;
pub mod solver;
pub mod types;

pub use dispatch::{build_model, compute_charges, prepare_tables};
pub use error::QdistError;
pub use fit::{FitInstance, ParameterBinding, type_weights, weighted_cost};
pub use params::{ParameterRow, ParameterTable, Property, TableKind, combined_params, expand_params};
pub use solver::{ChargeModel, ComputeOptions, Method, ModelParams};
pub use types::{ChargeResult, Topology};
