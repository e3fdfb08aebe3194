//! Core types for representing molecular topology and calculation results.
//!
//! The [`Topology`] struct is the per-molecule input container: bond-graph
//! connectivity, physical interatomic distances, and atomic diameters, all
//! validated against a common atom count at construction. [`ChargeResult`]
//! carries the output of a charge-distribution calculation.

use crate::error::QdistError;
use faer::{Col, ColRef, Mat, MatRef};
use std::collections::VecDeque;

/// Checks that a vector has exactly the expected length.
pub fn check_vector_dim(actual: usize, expected: usize) -> Result<(), QdistError> {
    if actual != expected {
        return Err(QdistError::shape(
            format!("vector of length {expected}"),
            format!("length {actual}"),
        ));
    }
    Ok(())
}

/// Checks that a matrix is exactly `expected` x `expected`.
pub fn check_matrix_dim(shape: (usize, usize), expected: usize) -> Result<(), QdistError> {
    if shape != (expected, expected) {
        return Err(QdistError::shape(
            format!("matrix of shape ({expected}, {expected})"),
            format!("shape ({}, {})", shape.0, shape.1),
        ));
    }
    Ok(())
}

/// Molecular topology and geometry for one molecule.
///
/// Holds the three per-molecule inputs every charge-distribution method
/// consumes:
///
/// - `connectivity`: N x N matrix of bond-graph distances in hops (1 for a
///   direct bond, 2 for second neighbors, ...), 0 on the diagonal, symmetric.
/// - `distances`: N x N matrix of physical interatomic distances, symmetric,
///   in consistent length units.
/// - `diameters`: length-N vector of atomic size parameters, in the same
///   length units as `distances`.
///
/// Only dimensional consistency is validated here; chemical correctness of
/// the topology is the caller's responsibility.
#[derive(Debug, Clone)]
pub struct Topology {
    connectivity: Mat<f64>,
    distances: Mat<f64>,
    diameters: Col<f64>,
}

impl Topology {
    /// Creates a topology from pre-built connectivity and distance matrices.
    ///
    /// # Errors
    ///
    /// Returns [`QdistError::ShapeMismatch`] if the distance matrix or the
    /// diameter vector does not match the atom count implied by the
    /// connectivity matrix, or if the connectivity matrix is not square.
    pub fn new(
        connectivity: Mat<f64>,
        distances: Mat<f64>,
        diameters: Col<f64>,
    ) -> Result<Self, QdistError> {
        let n = connectivity.nrows();
        check_matrix_dim((connectivity.nrows(), connectivity.ncols()), n)?;
        check_matrix_dim((distances.nrows(), distances.ncols()), n)?;
        check_vector_dim(diameters.nrows(), n)?;

        Ok(Self {
            connectivity,
            distances,
            diameters,
        })
    }

    /// Creates a topology from an adjacency bond list, deriving the
    /// hop-count connectivity matrix by breadth-first search from each atom.
    ///
    /// Atom pairs with no path between them keep a connectivity entry of 0;
    /// charge-distribution methods assume a connected bond graph, and a
    /// disconnected one typically surfaces later as a singular system.
    ///
    /// # Errors
    ///
    /// Returns [`QdistError::ShapeMismatch`] if a bond references an atom
    /// index outside `0..n_atoms`, or if `distances`/`diameters` do not match
    /// `n_atoms`.
    pub fn from_bonds(
        n_atoms: usize,
        bonds: &[(usize, usize)],
        distances: Mat<f64>,
        diameters: Col<f64>,
    ) -> Result<Self, QdistError> {
        for &(i, j) in bonds {
            if i >= n_atoms || j >= n_atoms {
                return Err(QdistError::shape(
                    format!("bond atom indices < {n_atoms}"),
                    format!("bond ({i}, {j})"),
                ));
            }
        }

        let mut adjacency = vec![Vec::new(); n_atoms];
        for &(i, j) in bonds {
            adjacency[i].push(j);
            adjacency[j].push(i);
        }

        let mut connectivity = Mat::zeros(n_atoms, n_atoms);
        let mut hops = vec![0usize; n_atoms];
        let mut queue = VecDeque::new();
        for start in 0..n_atoms {
            hops.iter_mut().for_each(|h| *h = usize::MAX);
            hops[start] = 0;
            queue.clear();
            queue.push_back(start);
            while let Some(u) = queue.pop_front() {
                for &v in &adjacency[u] {
                    if hops[v] == usize::MAX {
                        hops[v] = hops[u] + 1;
                        queue.push_back(v);
                    }
                }
            }
            for (j, &h) in hops.iter().enumerate() {
                if j != start && h != usize::MAX {
                    connectivity[(start, j)] = h as f64;
                }
            }
        }

        Self::new(connectivity, distances, diameters)
    }

    /// The number of atoms N.
    pub fn n_atoms(&self) -> usize {
        self.connectivity.nrows()
    }

    /// The bond-graph connectivity matrix (distances in hops).
    pub fn connectivity(&self) -> MatRef<'_, f64> {
        self.connectivity.as_ref()
    }

    /// The physical interatomic distance matrix.
    pub fn distances(&self) -> MatRef<'_, f64> {
        self.distances.as_ref()
    }

    /// The atomic diameter vector.
    pub fn diameters(&self) -> ColRef<'_, f64> {
        self.diameters.as_ref()
    }

    /// Derives the charge-transfer topology: a binary mask over atom pairs
    /// with entry 1 where the bond-graph distance is at most `max_order`.
    ///
    /// Pairs marked 1 are allowed to exchange charge directly as bond
    /// variables. The diagonal carries a 1 (its hop count is 0) but never
    /// generates a bond variable, since enumeration is restricted to the
    /// strict upper triangle.
    pub fn charge_transfer_topology(&self, max_order: u32) -> Mat<f64> {
        let n = self.n_atoms();
        Mat::from_fn(n, n, |i, j| {
            if self.connectivity[(i, j)] <= max_order as f64 {
                1.0
            } else {
                0.0
            }
        })
    }
}

/// The result of a charge-distribution calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeResult {
    /// The computed partial atomic charges, in input atom order. Their sum
    /// equals the requested net molecular charge.
    pub charges: Vec<f64>,
    /// The common equalized electronegativity, reported as a diagnostic by
    /// the augmented-system method ([`Method::Eem`](crate::Method::Eem)) and
    /// `None` for every other method.
    pub equalized_electronegativity: Option<f64>,
}
