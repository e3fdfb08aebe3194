//! Numerical infrastructure shared by all charge-distribution methods.
//!
//! This module holds the pieces every method delegates to: physical
//! constants, the screened-Coulomb interaction matrix, and the linear-system
//! solvers (including the SVD least-norm fallback for rank-deficient bond
//! systems).

/// Physical constants used in interaction-matrix assembly.
pub mod constants;

/// Screened-Coulomb interaction matrix over the molecular graph.
pub mod coulomb;

/// Dense linear-system solvers for the atomic and bond-space formulations.
pub mod linsys;
