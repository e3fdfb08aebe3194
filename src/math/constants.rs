//! Physical constants for interaction-matrix assembly.

/// Coulomb energy prefactor e^2 / (4 pi eps0) in eV * nm, rounded as in the
/// reference parameterization.
///
/// Applied to the screened-Coulomb interaction when physical units are
/// requested, converting charge-squared-over-distance into an energy. With
/// the default dimensionless mode the prefactor is 1 and electronegativity,
/// hardness and the resulting interaction entries share an arbitrary common
/// energy scale.
pub const COULOMB_CONSTANT_EV_NM: f64 = 1.44;
