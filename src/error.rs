use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all fallible operations in the `qdist` library.
///
/// Every failure mode carries enough context to act on: shape violations name
/// the expected and actual dimensions, lookup failures name the offending
/// label, and numerical failures describe the system that could not be
/// solved. All errors are unrecoverable at the point of detection and are
/// surfaced directly to the caller; there are no partial results.
#[derive(Error, Debug)]
pub enum QdistError {
    /// An input vector or matrix does not match the dimensions implied by
    /// the atom (or bond-variable) count. Raised at construction or at the
    /// first use of an externally supplied per-bond parameter vector, never
    /// silently truncated or padded.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Description of the expected shape, e.g. "vector of length 5".
        expected: String,
        /// Description of the shape actually received.
        actual: String,
    },

    /// A parameter that the selected charge-distribution method requires was
    /// not supplied, e.g. a bond-hardness vector or bond parameter table for
    /// the bond-charge-transfer methods. Raised before any matrix assembly.
    #[error("missing required parameter: {0}")]
    MissingRequiredParameter(String),

    /// An unrecognized method name was requested from the dispatch layer.
    #[error("unknown charge-distribution method: '{0}'")]
    UnknownMethod(String),

    /// A direct linear solve encountered a numerically singular or
    /// ill-conditioned matrix. Degenerate or disconnected topology is the
    /// likely cause. Not raised on the SVD fallback path, which tolerates
    /// rank deficiency by construction.
    #[error("failed to solve the linear system: {0}")]
    SingularSystem(String),

    /// An atom-type label produced by the caller's classifier is absent from
    /// the atomic parameter table.
    #[error("atom type '{0}' is not present in the parameter table")]
    UndefinedAtomType(String),

    /// A bond-type label produced by the caller's classifier is absent from
    /// the bond parameter table.
    #[error("bond type '{0}' is not present in the bond parameter table")]
    UndefinedBondType(String),

    /// An I/O error that occurred while reading a parameter table file.
    #[error("I/O error at path '{path}': {source}")]
    IoError {
        /// The path of the file that caused the I/O error.
        path: PathBuf,
        /// The underlying `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    /// A parameter table file could not be parsed, typically invalid TOML or
    /// a structural mismatch with the expected row format.
    #[error("failed to deserialize TOML parameters: {0}")]
    DeserializationError(#[from] toml::de::Error),
}

impl QdistError {
    pub(crate) fn shape(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        QdistError::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
