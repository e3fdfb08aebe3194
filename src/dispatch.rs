//! Assembling models from parameter tables and type labels.
//!
//! This layer glues the excluded collaborators together: the caller extracts
//! connectivity, distances and type labels from its own molecule
//! representation, the parameter tables supply per-type values, and the
//! functions here select a method by name, gather per-atom parameter
//! vectors, and produce a ready [`ChargeModel`] with its
//! [`ParameterBinding`].

use crate::error::QdistError;
use crate::fit::ParameterBinding;
use crate::params::{ParameterTable, Property};
use crate::solver::{ChargeModel, ComputeOptions, Method, ModelParams};
use crate::types::{ChargeResult, Topology};
use faer::{Col, Mat};

/// Parses a method name and assigns the matching fitted parameter specs to
/// the tables.
///
/// Call once per fitting run, before serializing the tables with
/// [`to_flat_array`](ParameterTable::to_flat_array) or building models
/// against them. A bond parameter table is required for the
/// bond-charge-transfer methods and ignored by the others.
///
/// # Errors
///
/// Returns [`QdistError::UnknownMethod`] for an unrecognized name and
/// [`QdistError::MissingRequiredParameter`] when a bond table is needed but
/// absent.
pub fn prepare_tables(
    method_name: &str,
    atom_table: &mut ParameterTable,
    bond_table: Option<&mut ParameterTable>,
) -> Result<Method, QdistError> {
    let method: Method = method_name.parse()?;
    atom_table.set_spec(method.atomic_param_spec());

    if method.requires_bond_hardness() {
        let bond_table = bond_table.ok_or_else(|| {
            QdistError::MissingRequiredParameter("bond parameter table".to_string())
        })?;
        bond_table.set_spec(method.bond_param_spec());
    }

    Ok(method)
}

/// Builds a [`ChargeModel`] and its [`ParameterBinding`] for one molecule.
///
/// `atom_types` holds one classifier label per atom, in atom order, and is
/// cached on the model for fitting weights. For the bond-charge-transfer
/// methods, `bond_types` must hold one label per charge-transfer edge in
/// canonical bond-variable order (row-major upper triangle of the
/// charge-transfer topology). Atomic diameters are looked up from the atom
/// table, so the table must carry a `diameter` column.
///
/// `kappa`/`lambda` from the options are applied when the method parses to
/// split-charge equilibration; other methods ignore them.
#[allow(clippy::too_many_arguments)]
pub fn build_model(
    connectivity: Mat<f64>,
    distances: Mat<f64>,
    atom_types: &[String],
    bond_types: Option<&[String]>,
    atom_table: &ParameterTable,
    bond_table: Option<&ParameterTable>,
    method_name: &str,
    options: &ComputeOptions,
) -> Result<(ChargeModel, ParameterBinding), QdistError> {
    let mut method: Method = method_name.parse()?;
    if let Method::Sqe { kappa, lambda } = &mut method {
        *kappa = options.kappa;
        *lambda = options.lambda;
    }

    let diameters = atom_table.gather(atom_types, Property::Diameter)?;
    let topology = Topology::new(
        connectivity,
        distances,
        Col::from_fn(diameters.len(), |i| diameters[i]),
    )?;

    let electronegativity = atom_table.gather(atom_types, Property::Electronegativity)?;
    let hardness = if method.requires_atomic_hardness() {
        Some(atom_table.gather(atom_types, Property::Hardness)?)
    } else {
        None
    };

    let (bond_hardness, bond_rows) = if method.requires_bond_hardness() {
        let bond_table = bond_table.ok_or_else(|| {
            QdistError::MissingRequiredParameter("bond parameter table".to_string())
        })?;
        let bond_types = bond_types.ok_or_else(|| {
            QdistError::MissingRequiredParameter("bond types".to_string())
        })?;
        (
            Some(bond_table.gather(bond_types, Property::Hardness)?),
            Some(bond_table.row_indices(bond_types)?),
        )
    } else {
        (None, None)
    };

    let params = ModelParams {
        electronegativity,
        hardness,
        bond_hardness,
    };
    let model = ChargeModel::new(topology, method, params, options)?
        .with_atom_types(atom_types.to_vec())?;

    let atom_rows = atom_table.row_indices(atom_types)?;
    let binding = ParameterBinding::new(
        method,
        &atom_rows,
        bond_rows.as_deref(),
        atom_table.n_types(),
    )?;

    Ok((model, binding))
}

/// Builds a model and computes its charge distribution in one step.
///
/// Convenience wrapper over [`build_model`] for callers that do not need the
/// model or binding afterwards.
#[allow(clippy::too_many_arguments)]
pub fn compute_charges(
    connectivity: Mat<f64>,
    distances: Mat<f64>,
    atom_types: &[String],
    bond_types: Option<&[String]>,
    atom_table: &ParameterTable,
    bond_table: Option<&ParameterTable>,
    method_name: &str,
    options: &ComputeOptions,
) -> Result<ChargeResult, QdistError> {
    let (model, _) = build_model(
        connectivity,
        distances,
        atom_types,
        bond_types,
        atom_table,
        bond_table,
        method_name,
        options,
    )?;
    model.compute()
}
