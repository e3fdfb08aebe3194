use super::constants::COULOMB_CONSTANT_EV_NM;
use crate::types::Topology;
use faer::Mat;
use libm::erf;
use rayon::prelude::*;

/// A thread-safe wrapper for raw matrix access to enable parallel filling.
///
/// Multiple threads write to disjoint parts of the matrix without locking;
/// safety rests on the pair partitioning in [`coulomb_integrals`].
struct UnsafeMatView {
    ptr: *mut f64,
    row_stride: isize,
    col_stride: isize,
}

unsafe impl Send for UnsafeMatView {}
unsafe impl Sync for UnsafeMatView {}

impl UnsafeMatView {
    /// Writes a value to the matrix at the specified (row, col) index.
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    /// 1. The (row, col) indices are within bounds.
    /// 2. No other thread is writing to the same address simultaneously.
    unsafe fn write(&self, row: usize, col: usize, val: f64) {
        let offset = (row as isize) * self.row_stride + (col as isize) * self.col_stride;
        unsafe {
            *self.ptr.offset(offset) = val;
        }
    }
}

/// Builds the symmetric N x N screened-Coulomb interaction matrix.
///
/// For every unordered atom pair whose bond-graph distance is at most
/// `max_order`, the entry is
///
/// ```text
/// C[i, j] = scale / r_ij * erf( r_ij / sqrt(d_i^2 + d_j^2) )
/// ```
///
/// where `r_ij` is the physical distance and `d_i` the atomic diameters; all
/// other entries, including the diagonal, are 0. `scale` is 1, or
/// [`COULOMB_CONSTANT_EV_NM`] when `physical_units` is set.
///
/// A zero distance on an included pair is undefined input and propagates the
/// IEEE non-finite result rather than being silently replaced; the solve
/// stage rejects non-finite systems.
pub fn coulomb_integrals(topology: &Topology, max_order: u32, physical_units: bool) -> Mat<f64> {
    let n = topology.n_atoms();
    let scale = if physical_units {
        COULOMB_CONSTANT_EV_NM
    } else {
        1.0
    };

    let mut coulomb = Mat::zeros(n, n);
    let mat_view = UnsafeMatView {
        ptr: coulomb.as_ptr_mut(),
        row_stride: coulomb.row_stride(),
        col_stride: coulomb.col_stride(),
    };

    let connectivity = topology.connectivity();
    let distances = topology.distances();
    let diameters = topology.diameters();
    let cutoff = max_order as f64;

    (0..n).into_par_iter().for_each(|i| {
        for j in (i + 1)..n {
            if connectivity[(i, j)] > cutoff {
                continue;
            }
            let r = distances[(i, j)];
            let width = (diameters[i] * diameters[i] + diameters[j] * diameters[j]).sqrt();
            let val = scale / r * erf(r / width);

            // SAFETY: Each unordered pair (i, j) with i < j is handled only by the
            // thread for i. That thread writes (i, j) and (j, i), so no two threads
            // write the same entries.
            unsafe {
                mat_view.write(i, j, val);
                mat_view.write(j, i, val);
            }
        }
    });

    coulomb
}
