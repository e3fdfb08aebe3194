//! The `ChargeModel` type: one molecule, one method, repeated computation.
//!
//! A model is constructed once per (molecule, parameter-set) pair and holds
//! the immutable topology together with the method's parameter vectors.
//! `compute` re-derives the interaction matrices and charges from the current
//! parameters on every call; topology-dependent state (the bond-variable
//! list) is derived once and cached. For parameter fitting, a
//! [`ParameterBinding`](crate::ParameterBinding) plus
//! [`ChargeModel::compute_with_params`] re-evaluates the model against a flat
//! parameter vector without mutating it.

use super::{ComputeOptions, Method};
use crate::{
    bonds,
    error::QdistError,
    fit::ParameterBinding,
    math::{coulomb::coulomb_integrals, linsys},
    types::{ChargeResult, Topology, check_vector_dim},
};
use faer::{Col, ColRef, Mat};
use log::debug;
use std::cell::OnceCell;

/// Parameter vectors for constructing a [`ChargeModel`].
///
/// Which fields are required depends on the method: `electronegativity` is
/// always required, `hardness` by every method except [`Method::Aact`], and
/// `bond_hardness` by [`Method::Aact`] and [`Method::Sqe`]. Supplying an
/// unused field is not an error; it is simply ignored.
#[derive(Debug, Clone, Default)]
pub struct ModelParams {
    /// Per-atom electronegativity, length N.
    pub electronegativity: Vec<f64>,
    /// Per-atom hardness, length N.
    pub hardness: Option<Vec<f64>>,
    /// Per-bond hardness, one entry per charge-transfer edge in canonical
    /// bond-variable order.
    pub bond_hardness: Option<Vec<f64>>,
}

/// A charge-distribution model bound to one molecule.
///
/// # Examples
///
/// ```
/// use faer::{Col, Mat};
/// use qdist::{ChargeModel, ComputeOptions, Method, ModelParams, Topology};
///
/// // A diatomic molecule: one bond, 0.15 length units apart.
/// let topology = Topology::from_bonds(
///     2,
///     &[(0, 1)],
///     Mat::from_fn(2, 2, |i, j| if i == j { 0.0 } else { 0.15 }),
///     Col::from_fn(2, |_| 0.1),
/// )
/// .unwrap();
///
/// let params = ModelParams {
///     electronegativity: vec![3.0, 3.5],
///     hardness: Some(vec![6.0, 6.0]),
///     bond_hardness: None,
/// };
/// let model =
///     ChargeModel::new(topology, Method::Eem, params, &ComputeOptions::default()).unwrap();
///
/// let result = model.compute().unwrap();
/// let total: f64 = result.charges.iter().sum();
/// assert!(total.abs() < 1e-10);
/// assert!(result.charges[0] > 0.0, "the less electronegative atom ends up positive");
/// ```
#[derive(Debug, Clone)]
pub struct ChargeModel {
    topology: Topology,
    charge_transfer: Mat<f64>,
    method: Method,
    electronegativity: Col<f64>,
    hardness: Option<Col<f64>>,
    bond_hardness: Option<Col<f64>>,
    net_charge: f64,
    max_order: u32,
    physical_units: bool,
    atom_types: Option<Vec<String>>,
    bond_vars: OnceCell<Vec<(usize, usize)>>,
}

impl ChargeModel {
    /// Builds a model for one molecule, validating parameter presence and
    /// dimensions up front.
    ///
    /// # Errors
    ///
    /// - [`QdistError::ShapeMismatch`] if any parameter vector does not have
    ///   length N (per-bond hardness is checked later, against the derived
    ///   bond-variable count).
    /// - [`QdistError::MissingRequiredParameter`] if the method needs a
    ///   hardness or bond-hardness vector that was not supplied.
    pub fn new(
        topology: Topology,
        method: Method,
        params: ModelParams,
        options: &ComputeOptions,
    ) -> Result<Self, QdistError> {
        let n = topology.n_atoms();

        check_vector_dim(params.electronegativity.len(), n)?;
        let electronegativity = Col::from_fn(n, |i| params.electronegativity[i]);

        let hardness = match params.hardness {
            Some(h) => {
                check_vector_dim(h.len(), n)?;
                Some(Col::from_fn(n, |i| h[i]))
            }
            None if method.requires_atomic_hardness() => {
                return Err(QdistError::MissingRequiredParameter(
                    "hardness".to_string(),
                ));
            }
            None => None,
        };

        let bond_hardness = match params.bond_hardness {
            Some(bh) => Some(Col::from_fn(bh.len(), |i| bh[i])),
            None if method.requires_bond_hardness() => {
                return Err(QdistError::MissingRequiredParameter(
                    "bond_hardness".to_string(),
                ));
            }
            None => None,
        };

        let charge_transfer = topology.charge_transfer_topology(options.max_order);

        Ok(Self {
            topology,
            charge_transfer,
            method,
            electronegativity,
            hardness,
            bond_hardness,
            net_charge: options.net_charge,
            max_order: options.max_order,
            physical_units: options.physical_units,
            atom_types: None,
            bond_vars: OnceCell::new(),
        })
    }

    /// Attaches the caller's atom-type labels, one per atom in input order.
    ///
    /// The labels are not used by the charge computation itself; they are
    /// cached for fitting-side consumers such as per-type weighting.
    pub fn with_atom_types(mut self, atom_types: Vec<String>) -> Result<Self, QdistError> {
        check_vector_dim(atom_types.len(), self.topology.n_atoms())?;
        self.atom_types = Some(atom_types);
        Ok(self)
    }

    /// The molecular topology this model was built from.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The method this model runs.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The net molecular charge.
    pub fn net_charge(&self) -> f64 {
        self.net_charge
    }

    /// The cached atom-type labels, if attached.
    pub fn atom_types(&self) -> Option<&[String]> {
        self.atom_types.as_deref()
    }

    /// The bond-variable list for this model's charge-transfer topology,
    /// derived on first use and cached.
    pub fn bond_variables(&self) -> &[(usize, usize)] {
        self.bond_vars
            .get_or_init(|| bonds::bond_variables(self.charge_transfer.as_ref()))
    }

    /// Computes the charge distribution from the model's own parameters.
    pub fn compute(&self) -> Result<ChargeResult, QdistError> {
        self.compute_inner(
            self.electronegativity.as_ref(),
            self.hardness.as_ref().map(|h| h.as_ref()),
            self.bond_hardness.as_ref().map(|bh| bh.as_ref()),
        )
    }

    /// Computes the charge distribution from a flat parameter vector,
    /// addressed through a [`ParameterBinding`].
    ///
    /// The model itself is not mutated; a fitting loop can hold many models
    /// and re-evaluate all of them against one shared vector.
    pub fn compute_with_params(
        &self,
        binding: &ParameterBinding,
        flat: &[f64],
    ) -> Result<ChargeResult, QdistError> {
        let gathered = binding.gather(flat)?;
        self.compute_inner(
            gathered.electronegativity.as_ref(),
            gathered.hardness.as_ref().map(|h| h.as_ref()),
            gathered.bond_hardness.as_ref().map(|bh| bh.as_ref()),
        )
    }

    fn compute_inner(
        &self,
        electronegativity: ColRef<'_, f64>,
        hardness: Option<ColRef<'_, f64>>,
        bond_hardness: Option<ColRef<'_, f64>>,
    ) -> Result<ChargeResult, QdistError> {
        let n = self.topology.n_atoms();
        check_vector_dim(electronegativity.nrows(), n)?;
        if let Some(h) = hardness {
            check_vector_dim(h.nrows(), n)?;
        }

        let mut j_matrix = coulomb_integrals(&self.topology, self.max_order, self.physical_units);

        // Atomic diagonal per method; the Coulomb matrix itself has none.
        match self.method {
            Method::Eem | Method::QeqAtomic | Method::QeqBond => {
                let h = hardness.ok_or_else(|| {
                    QdistError::MissingRequiredParameter("hardness".to_string())
                })?;
                for i in 0..n {
                    j_matrix[(i, i)] = h[i];
                }
            }
            Method::Sqe { lambda, .. } => {
                let h = hardness.ok_or_else(|| {
                    QdistError::MissingRequiredParameter("hardness".to_string())
                })?;
                for i in 0..n {
                    j_matrix[(i, i)] = lambda * lambda * h[i];
                }
            }
            Method::Aact => {}
        }

        match self.method {
            Method::Eem => {
                let (charges, equalized) =
                    linsys::solve_augmented(j_matrix.as_ref(), electronegativity, self.net_charge)?;
                Ok(ChargeResult {
                    charges: charges.as_ref().iter().cloned().collect(),
                    equalized_electronegativity: Some(equalized),
                })
            }
            Method::QeqAtomic => {
                let charges = linsys::solve_row_substitution(
                    j_matrix.as_ref(),
                    electronegativity,
                    self.net_charge,
                )?;
                Ok(ChargeResult {
                    charges: charges.as_ref().iter().cloned().collect(),
                    equalized_electronegativity: None,
                })
            }
            Method::QeqBond | Method::Aact | Method::Sqe { .. } => self.compute_bond(
                j_matrix.as_ref(),
                electronegativity,
                bond_hardness,
            ),
        }
    }

    fn compute_bond(
        &self,
        j_matrix: faer::MatRef<'_, f64>,
        electronegativity: ColRef<'_, f64>,
        bond_hardness: Option<ColRef<'_, f64>>,
    ) -> Result<ChargeResult, QdistError> {
        let n = self.topology.n_atoms();
        let bond_vars = self.bond_variables();
        let b = bond_vars.len();
        debug!("solving in bond space with {b} bond variables over {n} atoms");

        let bond_elneg = bonds::bond_electronegativity(electronegativity, bond_vars);
        let mut bond_j = bonds::bond_j_matrix(j_matrix, bond_vars);

        // Per-bond hardness on the bond-space diagonal, where the method
        // calls for it. The externally supplied vector must match the
        // derived bond-variable count.
        match self.method {
            Method::Aact => {
                let bh = bond_hardness.ok_or_else(|| {
                    QdistError::MissingRequiredParameter("bond_hardness".to_string())
                })?;
                check_vector_dim(bh.nrows(), b)?;
                for i in 0..b {
                    bond_j[(i, i)] += 2.0 * bh[i];
                }
            }
            Method::Sqe { kappa, .. } => {
                let bh = bond_hardness.ok_or_else(|| {
                    QdistError::MissingRequiredParameter("bond_hardness".to_string())
                })?;
                check_vector_dim(bh.nrows(), b)?;
                for i in 0..b {
                    bond_j[(i, i)] += 2.0 * kappa * kappa * bh[i];
                }
            }
            _ => {}
        }

        let bond_charges = linsys::solve_bond_system(bond_j.as_ref(), bond_elneg.as_ref(), n)?;
        let charges =
            bonds::to_atomic_charges(self.net_charge, n, bond_charges.as_ref(), bond_vars);

        Ok(ChargeResult {
            charges: charges.as_ref().iter().cloned().collect(),
            equalized_electronegativity: None,
        })
    }
}
