use crate::error::QdistError;
use faer::{Col, ColRef, Mat, MatRef, prelude::*};
use log::debug;
use std::panic::{self, AssertUnwindSafe};

/// Solves `a * x = rhs` by partial-pivot LU, rejecting singular systems.
///
/// The decomposition itself never reports rank deficiency, so the solution is
/// checked for finiteness afterwards; a zero pivot surfaces as a non-finite
/// entry. The solve is additionally guarded against panics in the underlying
/// kernels.
fn lu_solve(a: MatRef<'_, f64>, rhs: &Col<f64>) -> Result<Col<f64>, QdistError> {
    let solve_result = panic::catch_unwind(AssertUnwindSafe(|| a.partial_piv_lu().solve(rhs)));

    let solution = match solve_result {
        Ok(sol) => sol,
        Err(_) => {
            return Err(QdistError::SingularSystem(
                "dense solver panicked; the matrix is likely singular".to_string(),
            ));
        }
    };

    if solution.as_ref().iter().any(|x| !x.is_finite()) {
        return Err(QdistError::SingularSystem(
            "direct solve produced non-finite values; the matrix is singular or the input geometry is degenerate"
                .to_string(),
        ));
    }

    Ok(solution)
}

/// Solves the electronegativity-equalization system in its augmented form.
///
/// Builds the bordered (N+1) x (N+1) system: top-left block `j_matrix`, last
/// column -1 and last row +1 over the atomic block, zero corner. The extra
/// unknown is the common equalized electronegativity, enforced together with
/// the net-charge constraint `sum(q) = net_charge`.
///
/// Returns the charge vector and the equalized electronegativity.
pub fn solve_augmented(
    j_matrix: MatRef<'_, f64>,
    electronegativity: ColRef<'_, f64>,
    net_charge: f64,
) -> Result<(Col<f64>, f64), QdistError> {
    let n = j_matrix.nrows();
    let size = n + 1;

    let mut x = Mat::zeros(size, size);
    for i in 0..n {
        for j in 0..n {
            x[(i, j)] = j_matrix[(i, j)];
        }
    }
    x.col_mut(size - 1).subrows_mut(0, n).fill(-1.0);
    x.row_mut(size - 1).subcols_mut(0, n).fill(1.0);

    let mut y = Col::zeros(size);
    for i in 0..n {
        y[i] = -electronegativity[i];
    }
    y[size - 1] = net_charge;

    let solution = lu_solve(x.as_ref(), &y)?;
    let charges = Col::from_fn(n, |i| solution[i]);
    let equalized = solution[n];

    Ok((charges, equalized))
}

/// Solves the same equalization system by constraint substitution.
///
/// Subtracts row 0 of `j_matrix` from every row (and entry 0 of the driving
/// vector from every entry), then overwrites row 0 with ones and the first
/// right-hand-side entry with `net_charge`. Algebraically equivalent to
/// [`solve_augmented`] but stays N x N and skips the multiplier unknown.
pub fn solve_row_substitution(
    j_matrix: MatRef<'_, f64>,
    electronegativity: ColRef<'_, f64>,
    net_charge: f64,
) -> Result<Col<f64>, QdistError> {
    let n = j_matrix.nrows();

    let mut x = Mat::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            x[(i, j)] = j_matrix[(i, j)] - j_matrix[(0, j)];
        }
    }
    x.row_mut(0).fill(1.0);

    let mut y = Col::zeros(n);
    for i in 0..n {
        y[i] = electronegativity[0] - electronegativity[i];
    }
    y[0] = net_charge;

    lu_solve(x.as_ref(), &y)
}

/// Solves the bond-space system `bond_j * q = -bond_elneg` for bond charges.
///
/// With at most `n_atoms - 1` bond variables the system is expected to be
/// non-singular and is solved directly. With more bond variables than a
/// spanning structure supports (rings, fused rings) the matrix is rank
/// deficient, and the minimum-norm solution is constructed from the singular
/// value decomposition instead: singular values below a relative cutoff are
/// treated as zero and their components dropped.
///
/// The comparison against `n_atoms - 1` selects the branch only; it is not a
/// guarantee of non-singularity on the direct path.
pub fn solve_bond_system(
    bond_j: MatRef<'_, f64>,
    bond_elneg: ColRef<'_, f64>,
    n_atoms: usize,
) -> Result<Col<f64>, QdistError> {
    let b = bond_j.nrows();
    let neg_e = Col::from_fn(b, |i| -bond_elneg[i]);

    if b + 1 <= n_atoms {
        return lu_solve(bond_j, &neg_e);
    }

    debug!(
        "bond system has {b} variables for {n_atoms} atoms; using SVD least-norm solve"
    );

    let svd = bond_j.svd().map_err(|_| {
        QdistError::SingularSystem(
            "singular value decomposition of the bond interaction matrix failed to converge"
                .to_string(),
        )
    })?;
    let u = svd.U();
    let s = svd.S().column_vector();
    let v = svd.V();

    let s_max = s.iter().fold(0.0f64, |acc, &x| acc.max(x));
    let cutoff = s_max * b as f64 * f64::EPSILON;

    // w = S^+ . U^T . (-e), dropping components in the numerical null space;
    // q = V . w is then the least-norm particular solution.
    let mut w = Col::zeros(b);
    for k in 0..b {
        if s[k] > cutoff {
            let mut c_k = 0.0;
            for i in 0..b {
                c_k += u[(i, k)] * neg_e[i];
            }
            w[k] = c_k / s[k];
        }
    }

    let mut charges = Col::zeros(b);
    for i in 0..b {
        let mut q_i = 0.0;
        for k in 0..b {
            q_i += v[(i, k)] * w[k];
        }
        charges[i] = q_i;
    }

    Ok(charges)
}
