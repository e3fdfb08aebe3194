//! Fitting-side machinery: flat-vector parameter bindings and weighting.
//!
//! An external fitting loop holds one flat parameter vector shared by every
//! molecule in the training set and repeatedly re-evaluates each molecule's
//! model against it. A [`ParameterBinding`] records, once per molecule,
//! which entries of that vector feed the model's electronegativity, hardness
//! and bond-hardness arrays; the models themselves stay immutable between
//! iterations. The search algorithm driving the vector is not part of this
//! crate.

use crate::error::QdistError;
use crate::params::ParameterTable;
use crate::solver::{ChargeModel, Method};
use crate::types::check_vector_dim;
use faer::Col;
use std::collections::HashMap;

/// Parameter vectors gathered from a flat vector through a binding.
pub(crate) struct GatheredParams {
    pub electronegativity: Col<f64>,
    pub hardness: Option<Col<f64>>,
    pub bond_hardness: Option<Col<f64>>,
}

/// Maps a flat global parameter vector onto one molecule's parameter arrays.
///
/// The flat vector is laid out column-major over the method's parameter
/// spec: the atomic table contributes `spec.len() * n_types` entries (all
/// electronegativities first, then all hardnesses), followed by the bond
/// table's entries for the bond-charge-transfer methods. A binding holds the
/// per-atom (and per-bond) indices into that vector and is created once per
/// molecule from the table row indices of its atom and bond types.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBinding {
    elneg_indices: Vec<usize>,
    hardness_indices: Option<Vec<usize>>,
    bond_hardness_indices: Option<Vec<usize>>,
}

impl ParameterBinding {
    /// Creates a binding for one molecule.
    ///
    /// `atom_rows` are the atomic-table row indices of the molecule's atom
    /// types, in atom order; `bond_rows` the bond-table row indices of its
    /// bond types, in canonical bond-variable order (required for
    /// [`Method::Aact`] and [`Method::Sqe`], ignored otherwise); `n_types`
    /// is the atomic table's type count.
    ///
    /// # Errors
    ///
    /// Returns [`QdistError::MissingRequiredParameter`] if the method needs
    /// bond rows and none were given.
    pub fn new(
        method: Method,
        atom_rows: &[usize],
        bond_rows: Option<&[usize]>,
        n_types: usize,
    ) -> Result<Self, QdistError> {
        let elneg_indices = atom_rows.to_vec();

        let hardness_indices = if method.requires_atomic_hardness() {
            Some(atom_rows.iter().map(|&row| row + n_types).collect())
        } else {
            None
        };

        let bond_hardness_indices = if method.requires_bond_hardness() {
            let bond_rows = bond_rows.ok_or_else(|| {
                QdistError::MissingRequiredParameter("bond type rows".to_string())
            })?;
            // Bond entries start after the atomic block, whose width is the
            // number of fitted atomic properties.
            let offset = method.atomic_param_spec().len() * n_types;
            Some(bond_rows.iter().map(|&row| row + offset).collect())
        } else {
            None
        };

        Ok(Self {
            elneg_indices,
            hardness_indices,
            bond_hardness_indices,
        })
    }

    /// The flat-vector indices feeding the electronegativity array.
    pub fn electronegativity_indices(&self) -> &[usize] {
        &self.elneg_indices
    }

    /// The flat-vector indices feeding the hardness array, if the method
    /// uses one.
    pub fn hardness_indices(&self) -> Option<&[usize]> {
        self.hardness_indices.as_deref()
    }

    /// The flat-vector indices feeding the bond-hardness array, if the
    /// method uses one.
    pub fn bond_hardness_indices(&self) -> Option<&[usize]> {
        self.bond_hardness_indices.as_deref()
    }

    pub(crate) fn gather(&self, flat: &[f64]) -> Result<GatheredParams, QdistError> {
        Ok(GatheredParams {
            electronegativity: take(flat, &self.elneg_indices)?,
            hardness: self
                .hardness_indices
                .as_deref()
                .map(|idx| take(flat, idx))
                .transpose()?,
            bond_hardness: self
                .bond_hardness_indices
                .as_deref()
                .map(|idx| take(flat, idx))
                .transpose()?,
        })
    }
}

fn take(flat: &[f64], indices: &[usize]) -> Result<Col<f64>, QdistError> {
    for &index in indices {
        if index >= flat.len() {
            return Err(QdistError::shape(
                format!("flat parameter vector of length > {index}"),
                format!("length {}", flat.len()),
            ));
        }
    }
    Ok(Col::from_fn(indices.len(), |k| flat[indices[k]]))
}

/// Per-type fitting weights over a training set.
///
/// Each type present in the table is weighted by `1 / sqrt(count)` of its
/// occurrences across the training set's atom types, so abundant types do
/// not dominate the cost; types that never occur get weight 0.
pub fn type_weights(atom_types: &[String], table: &ParameterTable) -> HashMap<String, f64> {
    table
        .rows()
        .iter()
        .map(|row| {
            let count = atom_types.iter().filter(|t| **t == row.label).count();
            let weight = if count == 0 {
                0.0
            } else {
                1.0 / (count as f64).sqrt()
            };
            (row.label.clone(), weight)
        })
        .collect()
}

/// One molecule's contribution to the fitting cost: its model, binding, and
/// reference charges.
pub struct FitInstance<'a> {
    /// The molecule's charge model.
    pub model: &'a ChargeModel,
    /// The binding addressing the shared flat vector for this molecule.
    pub binding: &'a ParameterBinding,
    /// Reference charges the model output is compared against, length N.
    pub target: &'a [f64],
}

/// Evaluates the weighted sum-of-squares cost of a flat parameter vector
/// over a training set.
///
/// For every instance, charges are computed through the binding and compared
/// to the target; each atom's squared deviation is scaled by the weight of
/// its type. Models must carry atom-type labels
/// ([`ChargeModel::with_atom_types`]); types absent from the weight map
/// contribute zero.
pub fn weighted_cost(
    instances: &[FitInstance<'_>],
    weights: &HashMap<String, f64>,
    flat: &[f64],
) -> Result<f64, QdistError> {
    let mut total = 0.0;
    for instance in instances {
        let atom_types = instance.model.atom_types().ok_or_else(|| {
            QdistError::MissingRequiredParameter(
                "atom types on the model (attach with with_atom_types)".to_string(),
            )
        })?;
        check_vector_dim(instance.target.len(), instance.model.topology().n_atoms())?;

        let result = instance.model.compute_with_params(instance.binding, flat)?;
        for ((charge, target), atom_type) in result
            .charges
            .iter()
            .zip(instance.target.iter())
            .zip(atom_types.iter())
        {
            let weight = weights.get(atom_type).copied().unwrap_or(0.0);
            let deviation = charge - target;
            total += weight * deviation * deviation;
        }
    }
    Ok(total)
}
