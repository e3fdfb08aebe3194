use approx::assert_abs_diff_eq;
use faer::Mat;
use qdist::{
    ComputeOptions, FitInstance, ParameterTable, QdistError, TableKind, build_model,
    combined_params, expand_params, prepare_tables, type_weights, weighted_cost,
};

fn atom_table() -> ParameterTable {
    let toml_str = r#"
    [[rows]]
    label = "C"
    electronegativity = 5.68
    hardness = 9.05
    diameter = 0.077

    [[rows]]
    label = "O"
    electronegativity = 8.5
    hardness = 13.2
    diameter = 0.066

    [[rows]]
    label = "H"
    electronegativity = 4.53
    hardness = 13.89
    diameter = 0.037
    "#;
    ParameterTable::load_from_str(toml_str, TableKind::Atom).unwrap()
}

fn bond_table() -> ParameterTable {
    let toml_str = r#"
    [[rows]]
    label = "C-O"
    electronegativity = 0.0
    hardness = 11.0

    [[rows]]
    label = "C-H"
    electronegativity = 0.0
    hardness = 9.5
    "#;
    ParameterTable::load_from_str(toml_str, TableKind::Bond).unwrap()
}

/// Connectivity and distances for a C-O diatomic.
fn diatomic_inputs() -> (Mat<f64>, Mat<f64>, Vec<String>) {
    let connectivity = Mat::from_fn(2, 2, |i, j| if i == j { 0.0 } else { 1.0 });
    let distances = Mat::from_fn(2, 2, |i, j| if i == j { 0.0 } else { 0.143 });
    let atom_types = vec!["C".to_string(), "O".to_string()];
    (connectivity, distances, atom_types)
}

#[test]
fn binding_round_trip_reproduces_compute() {
    // Re-evaluating a model through its binding with the tables' own flat
    // vector must reproduce the direct computation exactly.
    for method_name in ["EEM", "Qeq", "QeqBond", "AACT", "SQE"] {
        let mut atoms = atom_table();
        let mut bonds = bond_table();
        let method = prepare_tables(method_name, &mut atoms, Some(&mut bonds)).unwrap();

        let (connectivity, distances, atom_types) = diatomic_inputs();
        let bond_types = vec!["C-O".to_string()];
        let (model, binding) = build_model(
            connectivity,
            distances,
            &atom_types,
            method.requires_bond_hardness().then_some(&bond_types[..]),
            &atoms,
            method.requires_bond_hardness().then_some(&bonds),
            method_name,
            &ComputeOptions::default(),
        )
        .unwrap();

        let direct = model.compute().unwrap();

        let bond_ref = method.requires_bond_hardness().then_some(&bonds);
        let (free, pinned) = combined_params(&atoms, bond_ref);
        let total_len = free.len() + pinned.len();
        let flat = expand_params(&free, &pinned, total_len).unwrap();

        let rebound = model.compute_with_params(&binding, &flat).unwrap();
        for (a, b) in direct.charges.iter().zip(rebound.charges.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }
}

#[test]
fn binding_survives_table_constraints() {
    // Pinning entries removes them from the free vector but the expanded
    // vector fed to the binding is unchanged.
    let mut atoms = atom_table();
    prepare_tables("EEM", &mut atoms, None).unwrap();
    atoms
        .add_constraint("O", qdist::Property::Hardness)
        .unwrap();

    let (connectivity, distances, atom_types) = diatomic_inputs();
    let (model, binding) = build_model(
        connectivity,
        distances,
        &atom_types,
        None,
        &atoms,
        None,
        "EEM",
        &ComputeOptions::default(),
    )
    .unwrap();

    let (free, pinned) = atoms.to_flat_array();
    assert_eq!(free.len(), atoms.flat_len() - 1);
    let flat = expand_params(&free, &pinned, atoms.flat_len()).unwrap();

    let direct = model.compute().unwrap();
    let rebound = model.compute_with_params(&binding, &flat).unwrap();
    for (a, b) in direct.charges.iter().zip(rebound.charges.iter()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-12);
    }
}

#[test]
fn perturbing_the_flat_vector_moves_the_charges() {
    let mut atoms = atom_table();
    prepare_tables("EEM", &mut atoms, None).unwrap();

    let (connectivity, distances, atom_types) = diatomic_inputs();
    let (model, binding) = build_model(
        connectivity,
        distances,
        &atom_types,
        None,
        &atoms,
        None,
        "EEM",
        &ComputeOptions::default(),
    )
    .unwrap();

    let (mut flat, _) = atoms.to_flat_array();
    let baseline = model.compute_with_params(&binding, &flat).unwrap();

    // Raise oxygen's electronegativity; oxygen (atom 1) must get more
    // negative.
    flat[1] += 1.0;
    let shifted = model.compute_with_params(&binding, &flat).unwrap();
    assert!(shifted.charges[1] < baseline.charges[1]);
}

#[test]
fn weighted_cost_is_zero_at_the_reference_charges() {
    let mut atoms = atom_table();
    prepare_tables("EEM", &mut atoms, None).unwrap();

    let (connectivity, distances, atom_types) = diatomic_inputs();
    let (model, binding) = build_model(
        connectivity,
        distances,
        &atom_types,
        None,
        &atoms,
        None,
        "EEM",
        &ComputeOptions::default(),
    )
    .unwrap();

    let (flat, _) = atoms.to_flat_array();
    let reference = model.compute_with_params(&binding, &flat).unwrap();

    let weights = type_weights(&atom_types, &atoms);
    let instances = [FitInstance {
        model: &model,
        binding: &binding,
        target: &reference.charges,
    }];

    let at_reference = weighted_cost(&instances, &weights, &flat).unwrap();
    assert_abs_diff_eq!(at_reference, 0.0, epsilon = 1e-16);

    // Any other target makes the cost positive.
    let off_target = vec![0.0, 0.0];
    let instances = [FitInstance {
        model: &model,
        binding: &binding,
        target: &off_target,
    }];
    let away = weighted_cost(&instances, &weights, &flat).unwrap();
    assert!(away > 0.0);
}

#[test]
fn weighted_cost_requires_atom_types_on_the_model() {
    use qdist::{ChargeModel, Method, ModelParams, Topology};
    use faer::Col;

    let topology = Topology::from_bonds(
        2,
        &[(0, 1)],
        Mat::from_fn(2, 2, |i, j| if i == j { 0.0 } else { 0.15 }),
        Col::from_fn(2, |_| 0.1),
    )
    .unwrap();
    let model = ChargeModel::new(
        topology,
        Method::Eem,
        ModelParams {
            electronegativity: vec![3.0, 3.5],
            hardness: Some(vec![6.0, 6.0]),
            bond_hardness: None,
        },
        &ComputeOptions::default(),
    )
    .unwrap();
    let binding =
        qdist::ParameterBinding::new(Method::Eem, &[0, 1], None, 2).unwrap();

    let target = vec![0.1, -0.1];
    let instances = [FitInstance {
        model: &model,
        binding: &binding,
        target: &target,
    }];
    let result = weighted_cost(&instances, &std::collections::HashMap::new(), &[0.0; 4]);
    assert!(matches!(
        result,
        Err(QdistError::MissingRequiredParameter(_))
    ));
}
