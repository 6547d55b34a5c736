//! Quantum components of a multi-component system and their densities.

use crate::error::NeoError;
use basis::basis::{AOBasis, MolecularBasis};
use nalgebra::DMatrix;
use periodic_table_on_an_enum::Element;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Identifies a component. Nuclei and positrons carry the atom index they
/// belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    Electron,
    Nucleus(usize),
    Positron(usize),
}

impl ComponentKind {
    pub fn is_electron(&self) -> bool {
        matches!(self, ComponentKind::Electron)
    }

    pub fn nucleus_index(&self) -> Option<usize> {
        match self {
            ComponentKind::Nucleus(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Electron => write!(f, "e"),
            ComponentKind::Nucleus(i) => write!(f, "n{}", i),
            ComponentKind::Positron(i) => write!(f, "p{}", i),
        }
    }
}

impl FromStr for ComponentKind {
    type Err = NeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NeoError::InvalidComponentLabel(s.to_string());
        if s == "e" {
            return Ok(ComponentKind::Electron);
        }
        let (head, index) = s.split_at(s.char_indices().nth(1).map_or(s.len(), |(i, _)| i));
        let index: usize = index.parse().map_err(|_| invalid())?;
        match head {
            "n" => Ok(ComponentKind::Nucleus(index)),
            "p" => Ok(ComponentKind::Positron(index)),
            _ => Err(invalid()),
        }
    }
}

/// One quantum species with its AO basis. Charges follow the usual sign
/// convention: electrons +1, positrons -1 and a nucleus of charge Z is -Z.
#[derive(Clone)]
pub struct Component {
    pub kind: ComponentKind,
    pub charge: f64,
    pub species: Option<Element>,
    pub basis: Arc<MolecularBasis>,
}

impl Component {
    pub fn electrons(basis: Arc<MolecularBasis>) -> Self {
        Self {
            kind: ComponentKind::Electron,
            charge: 1.0,
            species: None,
            basis,
        }
    }

    pub fn quantum_nucleus(index: usize, element: Element, basis: Arc<MolecularBasis>) -> Self {
        Self {
            kind: ComponentKind::Nucleus(index),
            charge: -(element.get_atomic_number() as f64),
            species: Some(element),
            basis,
        }
    }

    pub fn positrons(index: usize, basis: Arc<MolecularBasis>) -> Self {
        Self {
            kind: ComponentKind::Positron(index),
            charge: -1.0,
            species: None,
            basis,
        }
    }

    pub fn nao(&self) -> usize {
        self.basis.nao()
    }

    pub fn is_hydrogen_nucleus(&self) -> bool {
        matches!(self.kind, ComponentKind::Nucleus(_))
            && self
                .species
                .as_ref()
                .is_some_and(|e| e.get_atomic_number() == 1)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("kind", &self.kind)
            .field("charge", &self.charge)
            .field("species", &self.species.as_ref().map(|e| e.get_symbol()))
            .field("nao", &self.nao())
            .finish()
    }
}

/// A matrix per spin channel, or one shared by both.
#[derive(Clone, Debug, PartialEq)]
pub enum SpinMatrix {
    Restricted(DMatrix<f64>),
    Unrestricted {
        alpha: DMatrix<f64>,
        beta: DMatrix<f64>,
    },
}

impl SpinMatrix {
    /// Spin-summed matrix. For a restricted matrix this is the matrix
    /// itself, which already holds both spins.
    pub fn total(&self) -> DMatrix<f64> {
        match self {
            SpinMatrix::Restricted(m) => m.clone(),
            SpinMatrix::Unrestricted { alpha, beta } => alpha + beta,
        }
    }

    /// Shape of the first channel that is not n x n, if any.
    pub fn mismatched_shape(&self, n: usize) -> Option<(usize, usize)> {
        let channels: Vec<&DMatrix<f64>> = match self {
            SpinMatrix::Restricted(m) => vec![m],
            SpinMatrix::Unrestricted { alpha, beta } => vec![alpha, beta],
        };
        channels
            .into_iter()
            .map(|m| m.shape())
            .find(|&shape| shape != (n, n))
    }

    /// Σ_σ tr(self_σ · other_σ). A restricted `self` pairs with the total
    /// of `other`.
    pub fn contract(&self, other: &SpinMatrix) -> f64 {
        match (self, other) {
            (
                SpinMatrix::Unrestricted { alpha, beta },
                SpinMatrix::Unrestricted {
                    alpha: oa,
                    beta: ob,
                },
            ) => trace_product(alpha, oa) + trace_product(beta, ob),
            (SpinMatrix::Unrestricted { alpha, beta }, SpinMatrix::Restricted(d)) => {
                0.5 * (trace_product(alpha, d) + trace_product(beta, d))
            }
            (SpinMatrix::Restricted(m), d) => trace_product(m, &d.total()),
        }
    }
}

/// tr(A B) without forming the product.
pub fn trace_product(a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
    a.dot(&b.transpose())
}

pub type DensityMatrix = SpinMatrix;

/// Density matrices keyed by component.
pub type Densities = BTreeMap<ComponentKind, DensityMatrix>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        let kinds = [
            ComponentKind::Electron,
            ComponentKind::Nucleus(0),
            ComponentKind::Nucleus(12),
            ComponentKind::Positron(3),
        ];
        for kind in kinds {
            assert_eq!(kind.to_string().parse::<ComponentKind>().unwrap(), kind);
        }
        assert!("x1".parse::<ComponentKind>().is_err());
        assert!("n".parse::<ComponentKind>().is_err());
        assert!("nx".parse::<ComponentKind>().is_err());
        assert!("".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn test_kind_ordering_puts_electrons_first() {
        let mut kinds = vec![
            ComponentKind::Nucleus(2),
            ComponentKind::Positron(0),
            ComponentKind::Electron,
            ComponentKind::Nucleus(0),
        ];
        kinds.sort();
        assert_eq!(kinds[0], ComponentKind::Electron);
        assert!(kinds[0].is_electron() && !kinds[1].is_electron());
        assert_eq!(kinds[1], ComponentKind::Nucleus(0));
    }

    #[test]
    fn test_charges() {
        let basis = Arc::new(MolecularBasis::default());
        let h = Element::from_symbol("H").unwrap();
        let o = Element::from_symbol("O").unwrap();
        assert_eq!(Component::electrons(basis.clone()).charge, 1.0);
        assert_eq!(Component::positrons(0, basis.clone()).charge, -1.0);
        let nuc_h = Component::quantum_nucleus(1, h, basis.clone());
        assert_eq!(nuc_h.charge, -1.0);
        assert!(nuc_h.is_hydrogen_nucleus());
        let nuc_o = Component::quantum_nucleus(0, o, basis);
        assert_eq!(nuc_o.charge, -8.0);
        assert!(!nuc_o.is_hydrogen_nucleus());
    }

    #[test]
    fn test_spin_matrix_contract() {
        let d = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 2.0]);
        let v = DMatrix::from_row_slice(2, 2, &[0.2, 0.1, 0.1, -0.3]);
        let restricted = SpinMatrix::Restricted(d.clone());
        let split = SpinMatrix::Unrestricted {
            alpha: &d * 0.5,
            beta: &d * 0.5,
        };
        assert_eq!(restricted.total(), split.total());

        let vr = SpinMatrix::Restricted(v.clone());
        let vu = SpinMatrix::Unrestricted {
            alpha: v.clone(),
            beta: v.clone(),
        };
        let expected = (&v * &d).trace();
        assert!((vr.contract(&restricted) - expected).abs() < 1e-14);
        assert!((vu.contract(&split) - expected).abs() < 1e-14);
        assert!((vr.contract(&split) - expected).abs() < 1e-14);
        assert!((vu.contract(&restricted) - expected).abs() < 1e-14);
    }

    #[test]
    fn test_mismatched_shape() {
        let good = SpinMatrix::Restricted(DMatrix::zeros(3, 3));
        assert_eq!(good.mismatched_shape(3), None);
        assert_eq!(good.mismatched_shape(2), Some((3, 3)));
        let bad_beta = SpinMatrix::Unrestricted {
            alpha: DMatrix::zeros(2, 2),
            beta: DMatrix::zeros(2, 3),
        };
        assert_eq!(bad_beta.mismatched_shape(2), Some((2, 3)));
    }
}
