use crate::error::QdistError;
use crate::params::Property;
use std::str::FromStr;

/// The five charge-distribution formulations.
///
/// Each variant fixes how atomic hardness, bond hardness and charge transfer
/// enter the interaction matrix; the numerical machinery (Coulomb integrals,
/// bond transform, linear solves) is shared. The two atomic methods solve
/// for N atomic charges under an explicit net-charge constraint; the three
/// bond methods solve for one charge per charge-transfer edge and satisfy
/// the constraint by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    /// Electronegativity equalization (EEM): atomic hardness on the
    /// diagonal, net charge enforced through an augmented system whose extra
    /// unknown is the equalized electronegativity.
    Eem,
    /// Atomic charge equilibration (QEq): same interaction matrix as
    /// [`Method::Eem`], with the constraint eliminated by row substitution
    /// instead of an extra unknown.
    QeqAtomic,
    /// Charge equilibration over bond variables: atomic hardness enters the
    /// interaction matrix before the bond transform; no per-bond parameters.
    QeqBond,
    /// Atom-atom charge transfer (AACT): the atomic matrix carries no
    /// hardness; twice the per-bond hardness is added to the bond-space
    /// diagonal.
    Aact,
    /// Split-charge equilibration (SQE): atomic hardness scaled by
    /// `lambda^2` before the transform, plus `2 * kappa^2` times the
    /// per-bond hardness on the bond-space diagonal. Both scales default
    /// to 1.
    Sqe {
        /// Bond-hardness coupling scale.
        kappa: f64,
        /// Atomic-hardness coupling scale.
        lambda: f64,
    },
}

impl Method {
    /// Whether this method solves in bond space.
    pub fn uses_bond_space(self) -> bool {
        matches!(self, Method::QeqBond | Method::Aact | Method::Sqe { .. })
    }

    /// Whether this method requires a per-bond hardness vector (and hence a
    /// bond parameter table in the dispatch layer).
    pub fn requires_bond_hardness(self) -> bool {
        matches!(self, Method::Aact | Method::Sqe { .. })
    }

    /// Whether this method requires a per-atom hardness vector.
    pub fn requires_atomic_hardness(self) -> bool {
        !matches!(self, Method::Aact)
    }

    /// The atomic parameters this method fits, in flat-vector column order.
    pub fn atomic_param_spec(self) -> &'static [Property] {
        match self {
            Method::Aact => &[Property::Electronegativity],
            _ => &[Property::Electronegativity, Property::Hardness],
        }
    }

    /// The per-bond parameters this method fits, in flat-vector column order.
    pub fn bond_param_spec(self) -> &'static [Property] {
        match self {
            Method::Aact | Method::Sqe { .. } => &[Property::Hardness],
            _ => &[],
        }
    }
}

impl FromStr for Method {
    type Err = QdistError;

    /// Parses a method name as used by the dispatch layer.
    ///
    /// `"Qeq"` and `"QeqAtomic"` are aliases; `"SQE"` parses with both
    /// coupling scales at their default of 1.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "EEM" => Ok(Method::Eem),
            "Qeq" | "QeqAtomic" => Ok(Method::QeqAtomic),
            "QeqBond" => Ok(Method::QeqBond),
            "AACT" => Ok(Method::Aact),
            "SQE" => Ok(Method::Sqe {
                kappa: 1.0,
                lambda: 1.0,
            }),
            _ => Err(QdistError::UnknownMethod(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_methods() {
        assert_eq!("EEM".parse::<Method>().unwrap(), Method::Eem);
        assert_eq!("Qeq".parse::<Method>().unwrap(), Method::QeqAtomic);
        assert_eq!("QeqAtomic".parse::<Method>().unwrap(), Method::QeqAtomic);
        assert_eq!("QeqBond".parse::<Method>().unwrap(), Method::QeqBond);
        assert_eq!("AACT".parse::<Method>().unwrap(), Method::Aact);
        assert_eq!(
            "SQE".parse::<Method>().unwrap(),
            Method::Sqe {
                kappa: 1.0,
                lambda: 1.0
            }
        );
    }

    #[test]
    fn test_parse_unknown_method_names_offender() {
        let err = "Mulliken".parse::<Method>().unwrap_err();
        assert!(matches!(err, QdistError::UnknownMethod(_)));
        assert!(err.to_string().contains("Mulliken"));
    }

    #[test]
    fn test_param_specs() {
        assert_eq!(
            Method::Eem.atomic_param_spec(),
            &[Property::Electronegativity, Property::Hardness]
        );
        assert_eq!(Method::Eem.bond_param_spec(), &[] as &[Property]);
        assert_eq!(
            Method::Aact.atomic_param_spec(),
            &[Property::Electronegativity]
        );
        assert_eq!(Method::Aact.bond_param_spec(), &[Property::Hardness]);
        let sqe = Method::Sqe {
            kappa: 1.0,
            lambda: 1.0,
        };
        assert_eq!(sqe.bond_param_spec(), &[Property::Hardness]);
        assert!(sqe.uses_bond_space() && sqe.requires_bond_hardness());
        assert!(!Method::Aact.requires_atomic_hardness());
    }
}
