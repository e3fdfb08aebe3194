//! The bond-variable transform.
//!
//! Bond-based charge-distribution methods replace N atomic unknowns with one
//! unknown per charge-transfer edge plus conservation on each edge. This
//! module fixes the canonical bond-variable ordering and provides the
//! transformations between atomic space and bond space; the same enumeration
//! must be reused for every vector and matrix built within one solve.

use faer::{Col, ColRef, Mat, MatRef};

/// Enumerates the independent bond variables of a charge-transfer topology.
///
/// Returns every index pair `(i, j)` with `i < j` and a nonzero topology
/// entry, in row-major scan order of the strict upper triangle. The ordering
/// is deterministic: the same topology always yields the same list.
pub fn bond_variables(charge_transfer: MatRef<'_, f64>) -> Vec<(usize, usize)> {
    let n = charge_transfer.nrows();
    let mut bond_vars = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if charge_transfer[(i, j)] != 0.0 {
                bond_vars.push((i, j));
            }
        }
    }
    bond_vars
}

/// Transforms atomic electronegativities into the bond-space driving vector.
///
/// For each bond `(i, j)` the entry is `electronegativity[j] -
/// electronegativity[i]`; a positive bond charge then means transfer from
/// `i` to `j`.
pub fn bond_electronegativity(
    electronegativity: ColRef<'_, f64>,
    bond_vars: &[(usize, usize)],
) -> Col<f64> {
    Col::from_fn(bond_vars.len(), |b| {
        let (i, j) = bond_vars[b];
        electronegativity[j] - electronegativity[i]
    })
}

/// Transforms an atomic interaction matrix into bond space.
///
/// For bonds `b1 = (i, j)` and `b2 = (k, l)` the entry is the discrete
/// double difference
///
/// ```text
/// bondJ[b1, b2] = J[i, k] - J[i, l] - J[j, k] + J[j, l]
/// ```
///
/// mapping atomic pairwise interactions onto pairs of charge-transfer edges.
pub fn bond_j_matrix(j_matrix: MatRef<'_, f64>, bond_vars: &[(usize, usize)]) -> Mat<f64> {
    let b = bond_vars.len();
    Mat::from_fn(b, b, |b1, b2| {
        let (i, j) = bond_vars[b1];
        let (k, l) = bond_vars[b2];
        j_matrix[(i, k)] - j_matrix[(i, l)] - j_matrix[(j, k)] + j_matrix[(j, l)]
    })
}

/// Maps solved bond charges back onto atomic charges.
///
/// Every atom starts from the uniform background `net_charge / n_atoms`;
/// each bond `(i, j)` then moves its charge from `i` to `j`. The per-edge
/// transfers cancel in the total, so the atomic charges sum to `net_charge`
/// exactly regardless of how the bond system was solved.
pub fn to_atomic_charges(
    net_charge: f64,
    n_atoms: usize,
    bond_charges: ColRef<'_, f64>,
    bond_vars: &[(usize, usize)],
) -> Col<f64> {
    let mut charges = Col::from_fn(n_atoms, |_| net_charge / n_atoms as f64);
    for (b, &(i, j)) in bond_vars.iter().enumerate() {
        charges[i] -= bond_charges[b];
        charges[j] += bond_charges[b];
    }
    charges
}
