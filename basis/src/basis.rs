use crate::cgto::{BasisSet, ContractedGTO};
use nalgebra::{DMatrix, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Integrals and values of a single basis function.
#[allow(non_snake_case)]
pub trait Basis {
    fn evaluate(&self, r: &Vector3<f64>) -> f64;
    fn Sab(a: &Self, b: &Self) -> f64;
    fn JKabcd(a: &Self, b: &Self, c: &Self, d: &Self) -> f64;
}

/// Atomic-orbital basis of one component, seen from the numerical
/// integration side: values on grid points and screening information.
pub trait AOBasis: Send + Sync {
    fn nao(&self) -> usize;

    /// Value of AO `i` at `r`.
    fn ao_value(&self, i: usize, r: &Vector3<f64>) -> f64;

    /// Centre and radius outside of which AO `i` is below `cutoff`.
    fn ao_extent(&self, i: usize, cutoff: f64) -> (Vector3<f64>, f64);

    fn overlap(&self) -> DMatrix<f64>;

    /// AO values on `points`, shape (points, nao). Columns switched off in
    /// `mask` are left at zero.
    fn eval_ao(&self, points: &[Vector3<f64>], mask: Option<&[bool]>) -> DMatrix<f64> {
        let nao = self.nao();
        let mut ao = DMatrix::zeros(points.len(), nao);
        for i in 0..nao {
            if mask.is_some_and(|m| !m[i]) {
                continue;
            }
            for (p, r) in points.iter().enumerate() {
                ao[(p, i)] = self.ao_value(i, r);
            }
        }
        ao
    }

    /// Which AOs reach above `cutoff` anywhere on `points`.
    fn non_negligible(&self, points: &[Vector3<f64>], cutoff: f64) -> Vec<bool> {
        (0..self.nao())
            .map(|i| {
                let (center, radius) = self.ao_extent(i, cutoff);
                let r2 = radius * radius;
                points.iter().any(|r| (r - center).norm_squared() <= r2)
            })
            .collect()
    }

    /// Overlap based pair screening: `true` where |S_ij| >= cutoff.
    fn pair_mask(&self, cutoff: f64) -> DMatrix<bool> {
        self.overlap().map(|s| s.abs() >= cutoff)
    }
}

/// All contracted functions of one component, possibly spread over several
/// centres.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MolecularBasis {
    pub functions: Vec<ContractedGTO>,
}

impl MolecularBasis {
    pub fn new(functions: Vec<ContractedGTO>) -> Self {
        Self { functions }
    }

    pub fn from_sets<'a>(sets: impl IntoIterator<Item = &'a BasisSet>) -> Self {
        let functions = sets
            .into_iter()
            .flat_map(|set| set.basis_set.iter().cloned())
            .collect();
        Self { functions }
    }

    /// Coulomb matrix J_{mn} = Σ_{ls} (mn|ls) D_{ls} of a density `dm_other`
    /// expanded in `other`, represented in this basis.
    pub fn coulomb_matrix(&self, other: &MolecularBasis, dm_other: &DMatrix<f64>) -> DMatrix<f64> {
        let n = self.functions.len();
        let m = other.functions.len();
        assert_eq!(dm_other.nrows(), m, "density does not match the partner basis");
        assert_eq!(dm_other.ncols(), m, "density does not match the partner basis");

        let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (0..=i).map(move |j| (i, j))).collect();
        let values: Vec<f64> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let (a, b) = (&self.functions[i], &self.functions[j]);
                let mut val = 0.0;
                for k in 0..m {
                    for l in 0..=k {
                        let d = if k == l {
                            dm_other[(k, k)]
                        } else {
                            dm_other[(k, l)] + dm_other[(l, k)]
                        };
                        if d == 0.0 {
                            continue;
                        }
                        val += d
                            * ContractedGTO::JKabcd(a, b, &other.functions[k], &other.functions[l]);
                    }
                }
                val
            })
            .collect();

        let mut j_mat = DMatrix::zeros(n, n);
        for (&(i, j), v) in pairs.iter().zip(values) {
            j_mat[(i, j)] = v;
            j_mat[(j, i)] = v;
        }
        j_mat
    }
}

impl AOBasis for MolecularBasis {
    fn nao(&self) -> usize {
        self.functions.len()
    }

    fn ao_value(&self, i: usize, r: &Vector3<f64>) -> f64 {
        self.functions[i].evaluate(r)
    }

    fn ao_extent(&self, i: usize, cutoff: f64) -> (Vector3<f64>, f64) {
        let f = &self.functions[i];
        (f.center, f.radial_extent(cutoff))
    }

    fn overlap(&self) -> DMatrix<f64> {
        let n = self.functions.len();
        DMatrix::from_fn(n, n, |i, j| {
            ContractedGTO::Sab(&self.functions[i], &self.functions[j])
        })
    }
}
