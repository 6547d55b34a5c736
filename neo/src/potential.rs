//! Potential matrices handed back to the SCF driver.
//!
//! An interaction potential may be tagged with the correlation energy it
//! carries and with the plain Coulomb part it was built from. The energy
//! expression needs the Coulomb part on its own to halve it, while the
//! correlation energy is a separate term.

use crate::component::SpinMatrix;
use nalgebra::DMatrix;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationTag {
    pub correlation_energy: f64,
    pub raw_coulomb: DMatrix<f64>,
}

/// Interaction potential of one component, in that component's basis.
#[derive(Clone, Debug, PartialEq)]
pub struct PotentialMatrix {
    pub matrix: DMatrix<f64>,
    pub tag: Option<CorrelationTag>,
}

impl PotentialMatrix {
    pub fn untagged(matrix: DMatrix<f64>) -> Self {
        Self { matrix, tag: None }
    }

    pub fn zeros(n: usize) -> Self {
        Self::untagged(DMatrix::zeros(n, n))
    }

    pub fn tagged(matrix: DMatrix<f64>, correlation_energy: f64, raw_coulomb: DMatrix<f64>) -> Self {
        Self {
            matrix,
            tag: Some(CorrelationTag {
                correlation_energy,
                raw_coulomb,
            }),
        }
    }

    pub fn is_tagged(&self) -> bool {
        self.tag.is_some()
    }

    /// Zero when untagged.
    pub fn correlation_energy(&self) -> f64 {
        self.tag.as_ref().map_or(0.0, |t| t.correlation_energy)
    }

    /// The Coulomb part; the whole matrix when untagged.
    pub fn raw_coulomb(&self) -> &DMatrix<f64> {
        self.tag.as_ref().map_or(&self.matrix, |t| &t.raw_coulomb)
    }

    pub fn into_matrix(self) -> DMatrix<f64> {
        self.matrix
    }
}

impl AddAssign for PotentialMatrix {
    fn add_assign(&mut self, rhs: Self) {
        let tag = match (self.tag.take(), rhs.tag) {
            (None, None) => None,
            (Some(mut t), None) => {
                t.raw_coulomb += &rhs.matrix;
                Some(t)
            }
            (None, Some(mut t)) => {
                t.raw_coulomb += &self.matrix;
                Some(t)
            }
            (Some(mut t), Some(u)) => {
                t.correlation_energy += u.correlation_energy;
                t.raw_coulomb += u.raw_coulomb;
                Some(t)
            }
        };
        self.matrix += rhs.matrix;
        self.tag = tag;
    }
}

impl Add for PotentialMatrix {
    type Output = PotentialMatrix;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

/// Merges in iteration order. An empty sum is the 0 x 0 potential.
impl Sum for PotentialMatrix {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.reduce(|acc, v| acc + v)
            .unwrap_or_else(|| PotentialMatrix::zeros(0))
    }
}

/// Energies a Kohn-Sham component reports alongside its potential.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KsEnergies {
    pub coulomb: f64,
    pub xc: f64,
}

/// The intra-component (HF or KS) potential of one component.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectivePotential {
    pub matrix: SpinMatrix,
    pub ks: Option<KsEnergies>,
}

impl EffectivePotential {
    pub fn hartree_fock(matrix: SpinMatrix) -> Self {
        Self { matrix, ks: None }
    }

    pub fn kohn_sham(matrix: SpinMatrix, coulomb: f64, xc: f64) -> Self {
        Self {
            matrix,
            ks: Some(KsEnergies { coulomb, xc }),
        }
    }
}
