//! Parameter tables and utilities for loading them from TOML.
//!
//! A [`ParameterTable`] holds one row per distinct atom (or bond) type. The
//! dispatch layer gathers per-atom parameter vectors from it by type label,
//! and the fitting side serializes it to a flat parameter vector and back,
//! with a constraint list pinning selected entries to their original values
//! so optimization does not perturb them.

use crate::error::QdistError;
use serde::Deserialize;
use std::path::Path;

/// A named parameter column of a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    /// Electronegativity of the type.
    Electronegativity,
    /// Hardness of the type (atomic or per-bond).
    Hardness,
    /// Atomic diameter of the type; absent from bond tables and never
    /// fitted.
    Diameter,
}

impl Property {
    fn name(self) -> &'static str {
        match self {
            Property::Electronegativity => "electronegativity",
            Property::Hardness => "hardness",
            Property::Diameter => "diameter",
        }
    }
}

/// Whether a table describes atom types or bond types.
///
/// The kind only affects which lookup error is reported for an unknown
/// label; the row format is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Rows keyed by atom-type label; `diameter` is expected.
    Atom,
    /// Rows keyed by bond-type label; `diameter` is unused.
    Bond,
}

/// One row of a parameter table: a type label and its parameter columns.
///
/// The TOML representation is an array-of-tables entry; common alternative
/// column names from the literature are accepted as aliases:
///
/// ```toml
/// [[rows]]
/// label = "C"
/// electronegativity = 5.68
/// hardness = 9.05
/// diameter = 0.077
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParameterRow {
    /// The atom- or bond-type label this row is keyed by.
    #[serde(alias = "atom", alias = "type")]
    pub label: String,
    /// Electronegativity of the type.
    #[serde(alias = "chi")]
    pub electronegativity: f64,
    /// Hardness of the type.
    #[serde(alias = "eta")]
    pub hardness: f64,
    /// Atomic diameter; optional, since bond tables carry none.
    #[serde(default)]
    pub diameter: Option<f64>,
}

#[derive(Deserialize)]
struct TableFile {
    rows: Vec<ParameterRow>,
}

/// An ordered table of per-type parameters.
///
/// Row order is significant: the fitting machinery addresses parameters by
/// row index, and the flat-vector layout is column-major over the fitted
/// parameter spec (all electronegativities first, then all hardnesses, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTable {
    kind: TableKind,
    rows: Vec<ParameterRow>,
    spec: Vec<Property>,
    constraints: Vec<(usize, f64)>,
}

impl ParameterTable {
    /// Creates a table from rows already in memory.
    pub fn new(kind: TableKind, rows: Vec<ParameterRow>) -> Self {
        Self {
            kind,
            rows,
            spec: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Parses a table from a TOML string with a top-level `rows` array of
    /// tables.
    ///
    /// # Errors
    ///
    /// Returns [`QdistError::DeserializationError`] if the TOML content is
    /// invalid or a row is missing a required column.
    ///
    /// # Examples
    ///
    /// ```
    /// use qdist::{ParameterTable, TableKind};
    ///
    /// let toml_data = r#"
    /// [[rows]]
    /// label = "H"
    /// electronegativity = 4.53
    /// hardness = 13.89
    /// diameter = 0.037
    /// "#;
    ///
    /// let table = ParameterTable::load_from_str(toml_data, TableKind::Atom).unwrap();
    /// assert_eq!(table.n_types(), 1);
    /// ```
    pub fn load_from_str(toml_str: &str, kind: TableKind) -> Result<Self, QdistError> {
        let file: TableFile = toml::from_str(toml_str)?;
        Ok(Self::new(kind, file.rows))
    }

    /// Reads and parses a table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`QdistError::IoError`] if the file cannot be read, or
    /// [`QdistError::DeserializationError`] if its content is invalid.
    pub fn load_from_file(path: &Path, kind: TableKind) -> Result<Self, QdistError> {
        let content = std::fs::read_to_string(path).map_err(|io_error| QdistError::IoError {
            path: path.to_path_buf(),
            source: io_error,
        })?;
        Self::load_from_str(&content, kind)
    }

    /// The number of distinct types in the table.
    pub fn n_types(&self) -> usize {
        self.rows.len()
    }

    /// The table rows, in order.
    pub fn rows(&self) -> &[ParameterRow] {
        &self.rows
    }

    /// The fitted parameter spec currently assigned to this table.
    pub fn spec(&self) -> &[Property] {
        &self.spec
    }

    /// Assigns the fitted parameter spec (which columns enter the flat
    /// vector, in order). Clears any previously recorded constraints, since
    /// their flat indices depend on the spec.
    pub fn set_spec(&mut self, spec: &[Property]) {
        self.spec = spec.to_vec();
        self.constraints.clear();
    }

    /// The row index for a type label.
    ///
    /// # Errors
    ///
    /// Returns [`QdistError::UndefinedAtomType`] or
    /// [`QdistError::UndefinedBondType`] (per the table kind) when the label
    /// is absent.
    pub fn row_index(&self, label: &str) -> Result<usize, QdistError> {
        self.rows
            .iter()
            .position(|row| row.label == label)
            .ok_or_else(|| match self.kind {
                TableKind::Atom => QdistError::UndefinedAtomType(label.to_string()),
                TableKind::Bond => QdistError::UndefinedBondType(label.to_string()),
            })
    }

    /// The row indices for a list of type labels, in input order.
    pub fn row_indices(&self, labels: &[String]) -> Result<Vec<usize>, QdistError> {
        labels.iter().map(|label| self.row_index(label)).collect()
    }

    fn property_of_row(&self, row: usize, property: Property) -> Result<f64, QdistError> {
        let entry = &self.rows[row];
        match property {
            Property::Electronegativity => Ok(entry.electronegativity),
            Property::Hardness => Ok(entry.hardness),
            Property::Diameter => entry.diameter.ok_or_else(|| {
                QdistError::MissingRequiredParameter(format!(
                    "diameter for type '{}'",
                    entry.label
                ))
            }),
        }
    }

    /// Gathers one parameter column into a per-item vector, one entry per
    /// label in input order.
    pub fn gather(&self, labels: &[String], property: Property) -> Result<Vec<f64>, QdistError> {
        labels
            .iter()
            .map(|label| self.property_of_row(self.row_index(label)?, property))
            .collect()
    }

    fn spec_position(&self, property: Property) -> Result<usize, QdistError> {
        self.spec.iter().position(|&p| p == property).ok_or_else(|| {
            QdistError::MissingRequiredParameter(format!(
                "property '{}' is not part of the fitted parameter spec",
                property.name()
            ))
        })
    }

    /// Pins one (type, property) entry to its current value during fitting.
    ///
    /// Constrained entries are removed from the flat vector produced by
    /// [`to_flat_array`](Self::to_flat_array) and restored on
    /// [`update_from_flat`](Self::update_from_flat).
    pub fn add_constraint(&mut self, label: &str, property: Property) -> Result<(), QdistError> {
        let row = self.row_index(label)?;
        let position = self.spec_position(property)?;
        let value = self.property_of_row(row, property)?;
        let flat_index = position * self.n_types() + row;
        if !self.constraints.iter().any(|&(i, _)| i == flat_index) {
            self.constraints.push((flat_index, value));
        }
        Ok(())
    }

    /// The pinned (full-vector index, value) entries, in insertion order.
    pub fn pinned(&self) -> &[(usize, f64)] {
        &self.constraints
    }

    /// The length of the full flat vector (spec columns times type count).
    pub fn flat_len(&self) -> usize {
        self.spec.len() * self.n_types()
    }

    /// The full flat vector over the parameter spec, constrained entries
    /// included: column-major, all values of the first spec property first.
    pub fn full_flat_array(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(self.flat_len());
        for &property in &self.spec {
            for row in 0..self.n_types() {
                // Spec properties are always present; only Diameter can be
                // absent and it is never part of a fitted spec.
                flat.push(self.property_of_row(row, property).unwrap_or(0.0));
            }
        }
        flat
    }

    /// Serializes the table for fitting: the free parameter values (with
    /// constrained entries removed) plus the pinned (full index, value) list
    /// needed to reconstruct the full vector.
    pub fn to_flat_array(&self) -> (Vec<f64>, Vec<(usize, f64)>) {
        let full = self.full_flat_array();
        let free = full
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.constraints.iter().any(|&(c, _)| c == *i))
            .map(|(_, &v)| v)
            .collect();
        (free, self.constraints.clone())
    }

    /// Writes a free parameter vector back into the table, re-inserting the
    /// pinned values at their recorded positions.
    ///
    /// # Errors
    ///
    /// Returns [`QdistError::ShapeMismatch`] if the free vector length does
    /// not equal the flat length minus the constraint count.
    pub fn update_from_flat(&mut self, free: &[f64]) -> Result<(), QdistError> {
        let expected = self.flat_len() - self.constraints.len();
        if free.len() != expected {
            return Err(QdistError::shape(
                format!("free parameter vector of length {expected}"),
                format!("length {}", free.len()),
            ));
        }

        let full = expand_params(free, &self.constraints, self.flat_len())?;
        let n = self.n_types();
        for (position, &property) in self.spec.clone().iter().enumerate() {
            for row in 0..n {
                let value = full[position * n + row];
                let entry = &mut self.rows[row];
                match property {
                    Property::Electronegativity => entry.electronegativity = value,
                    Property::Hardness => entry.hardness = value,
                    Property::Diameter => entry.diameter = Some(value),
                }
            }
        }
        Ok(())
    }
}

/// Reconstructs a full flat vector from free values and pinned entries.
///
/// The pinned entries occupy their recorded full-vector indices; free values
/// fill the remaining positions in order.
pub fn expand_params(
    free: &[f64],
    pinned: &[(usize, f64)],
    total_len: usize,
) -> Result<Vec<f64>, QdistError> {
    if free.len() + pinned.len() != total_len {
        return Err(QdistError::shape(
            format!(
                "{} free plus {} pinned parameters",
                total_len - pinned.len(),
                pinned.len()
            ),
            format!("{} free parameters", free.len()),
        ));
    }

    let mut full = vec![None; total_len];
    for &(index, value) in pinned {
        if index >= total_len {
            return Err(QdistError::shape(
                format!("pinned index < {total_len}"),
                format!("index {index}"),
            ));
        }
        full[index] = Some(value);
    }

    let mut free_iter = free.iter();
    let full = full
        .into_iter()
        .map(|slot| match slot {
            Some(value) => value,
            // Lengths were checked above, so a free value always exists.
            None => *free_iter.next().expect("free parameter count mismatch"),
        })
        .collect();
    Ok(full)
}

/// Concatenates the flat serializations of an atomic table and an optional
/// bond table into one combined free vector plus pinned list.
///
/// Bond entries follow the atomic entries; bond pinned indices are offset by
/// the atomic full-vector length, matching the combined layout used by
/// [`ParameterBinding`](crate::ParameterBinding).
pub fn combined_params(
    atom_table: &ParameterTable,
    bond_table: Option<&ParameterTable>,
) -> (Vec<f64>, Vec<(usize, f64)>) {
    let (mut free, mut pinned) = atom_table.to_flat_array();
    if let Some(bond_table) = bond_table {
        let offset = atom_table.flat_len();
        let (bond_free, bond_pinned) = bond_table.to_flat_array();
        free.extend(bond_free);
        pinned.extend(
            bond_pinned
                .into_iter()
                .map(|(index, value)| (index + offset, value)),
        );
    }
    (free, pinned)
}
