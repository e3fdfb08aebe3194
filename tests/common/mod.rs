#![allow(dead_code)]

use faer::{Col, Mat};
use qdist::Topology;

/// A diatomic molecule: one bond of length `r`, equal diameters `d`.
pub fn diatomic_topology(r: f64, d: f64) -> Topology {
    Topology::from_bonds(
        2,
        &[(0, 1)],
        Mat::from_fn(2, 2, |i, j| if i == j { 0.0 } else { r }),
        Col::from_fn(2, |_| d),
    )
    .unwrap()
}

/// An equilateral triangle: all three pairs bonded at distance `r`.
pub fn triangle_topology(r: f64, d: f64) -> Topology {
    Topology::from_bonds(
        3,
        &[(0, 1), (0, 2), (1, 2)],
        Mat::from_fn(3, 3, |i, j| if i == j { 0.0 } else { r }),
        Col::from_fn(3, |_| d),
    )
    .unwrap()
}

/// A linear chain of `n` atoms with neighbor spacing `r`.
pub fn chain_topology(n: usize, r: f64, d: f64) -> Topology {
    let bonds: Vec<(usize, usize)> = (0..n - 1).map(|i| (i, i + 1)).collect();
    Topology::from_bonds(
        n,
        &bonds,
        Mat::from_fn(n, n, |i, j| (i as f64 - j as f64).abs() * r),
        Col::from_fn(n, |_| d),
    )
    .unwrap()
}

/// Asserts that the charges sum to the net molecular charge.
pub fn assert_net_charge(charges: &[f64], net_charge: f64) {
    let total: f64 = charges.iter().sum();
    assert!(
        (total - net_charge).abs() < 1e-8,
        "charges sum to {total}, expected {net_charge}"
    );
}
