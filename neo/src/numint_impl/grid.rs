use basis::basis::AOBasis;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Clone, Debug)]
pub struct GridPoint {
    pub r: Vector3<f64>,
    pub w: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    pub radial_points: usize,
    pub r_max: f64,
    /// Number of points evaluated together.
    pub block_size: usize,
    /// AO values below this are treated as zero when building block masks.
    pub cutoff: f64,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            radial_points: 24,
            r_max: 12.0, // bohr
            block_size: 128,
            cutoff: 1e-15,
        }
    }
}

/// Atom-centred grid: Gauss-Legendre radial shells times an octahedral
/// angular rule, with Becke partition weights between atoms.
pub fn build_becke_atom_grid(coords: &[Vector3<f64>], params: &GridParams) -> Vec<GridPoint> {
    let (r_nodes, r_weights) = gauss_legendre(params.radial_points.max(2), 0.0, params.r_max);
    let angular = octahedral_6();

    let mut points = Vec::with_capacity(coords.len() * r_nodes.len() * angular.len());
    for (a, center) in coords.iter().enumerate() {
        for (&r, &wr) in r_nodes.iter().zip(&r_weights) {
            let shell_weight = wr * r * r;
            for (dir, w_ang) in &angular {
                let p = center + dir * r;
                let w = shell_weight * w_ang * becke_weights(&p, coords)[a];
                if w.is_finite() && w > 0.0 {
                    points.push(GridPoint { r: p, w });
                }
            }
        }
    }
    points
}

fn octahedral_6() -> Vec<(Vector3<f64>, f64)> {
    let w = 4.0 * PI / 6.0;
    [
        Vector3::x(),
        -Vector3::x(),
        Vector3::y(),
        -Vector3::y(),
        Vector3::z(),
        -Vector3::z(),
    ]
    .into_iter()
    .map(|dir| (dir, w))
    .collect()
}

/// Normalised Becke cell weights of every atom at `r`.
pub(crate) fn becke_weights(r: &Vector3<f64>, coords: &[Vector3<f64>]) -> Vec<f64> {
    let n = coords.len();
    if n == 1 {
        return vec![1.0];
    }

    let dist: Vec<f64> = coords.iter().map(|c| (r - c).norm()).collect();
    let mut cell = vec![1.0_f64; n];
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let rij = (coords[i] - coords[j]).norm();
            if rij < 1e-12 {
                cell[i] *= 0.5;
                continue;
            }
            let mut mu = (dist[i] - dist[j]) / rij;
            // three iterations of Becke's polynomial step
            for _ in 0..3 {
                mu = 1.5 * mu - 0.5 * mu * mu * mu;
            }
            cell[i] *= 0.5 * (1.0 - mu);
        }
    }

    let total: f64 = cell.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return vec![0.0; n];
    }
    cell.iter().map(|c| c / total).collect()
}

/// Gauss-Legendre nodes and weights on [a, b].
pub(crate) fn gauss_legendre(n: usize, a: f64, b: f64) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = vec![0.0_f64; n];
    let mut weights = vec![0.0_f64; n];
    let mid = 0.5 * (b + a);
    let half = 0.5 * (b - a);
    let nf = n as f64;

    for i in 0..(n + 1) / 2 {
        // Newton iteration from the Chebyshev-like initial guess
        let mut z = (PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
        let mut dp = 1.0;
        for _ in 0..100 {
            let (p_n, p_prev) = legendre_pn(n, z);
            dp = nf * (z * p_n - p_prev) / (z * z - 1.0);
            let dz = p_n / dp;
            z -= dz;
            if dz.abs() < 1e-15 {
                break;
            }
        }
        nodes[i] = mid - half * z;
        nodes[n - 1 - i] = mid + half * z;
        let w = 2.0 * half / ((1.0 - z * z) * dp * dp);
        weights[i] = w;
        weights[n - 1 - i] = w;
    }
    (nodes, weights)
}

/// (P_n(z), P_{n-1}(z)) by the three-term recurrence.
fn legendre_pn(n: usize, z: f64) -> (f64, f64) {
    let (mut p, mut p_prev) = (1.0, 0.0);
    for k in 1..=n {
        let kf = k as f64;
        let next = ((2.0 * kf - 1.0) * z * p - (kf - 1.0) * p_prev) / kf;
        p_prev = p;
        p = next;
    }
    (p, p_prev)
}

/// Quadrature grid split into contiguous blocks of at most `block_size`
/// points.
#[derive(Clone, Debug)]
pub struct Grids {
    coords: Vec<Vector3<f64>>,
    weights: Vec<f64>,
    block_size: usize,
    cutoff: f64,
}

/// A contiguous slice of the grid.
#[derive(Clone, Copy, Debug)]
pub struct GridBlock<'a> {
    pub index: usize,
    pub offset: usize,
    pub coords: &'a [Vector3<f64>],
    pub weights: &'a [f64],
}

impl GridBlock<'_> {
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Per-block table of AOs that are not negligible on the block's points.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockMask {
    masks: Vec<Vec<bool>>,
}

impl BlockMask {
    pub fn block(&self, index: usize) -> &[bool] {
        &self.masks[index]
    }

    pub fn any_active(&self, index: usize) -> bool {
        self.masks[index].iter().any(|&m| m)
    }
}

impl Grids {
    pub fn new(points: Vec<GridPoint>, block_size: usize, cutoff: f64) -> Self {
        let (coords, weights): (Vec<_>, Vec<_>) = points.into_iter().map(|p| (p.r, p.w)).unzip();
        Self {
            coords,
            weights,
            block_size: block_size.max(1),
            cutoff,
        }
    }

    pub fn build(coords: &[Vector3<f64>], params: &GridParams) -> Self {
        let points = build_becke_atom_grid(coords, params);
        Grids::new(points, params.block_size, params.cutoff)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn n_blocks(&self) -> usize {
        self.len().div_ceil(self.block_size)
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn block(&self, index: usize) -> GridBlock<'_> {
        let start = index * self.block_size;
        let end = (start + self.block_size).min(self.len());
        GridBlock {
            index,
            offset: start,
            coords: &self.coords[start..end],
            weights: &self.weights[start..end],
        }
    }

    pub fn blocks(&self) -> impl Iterator<Item = GridBlock<'_>> + '_ {
        (0..self.n_blocks()).map(move |i| self.block(i))
    }

    pub fn make_mask<B: AOBasis + ?Sized>(&self, basis: &B) -> BlockMask {
        let masks = self
            .blocks()
            .map(|block| basis.non_negligible(block.coords, self.cutoff))
            .collect();
        BlockMask { masks }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn coords(&self) -> &[Vector3<f64>] {
        &self.coords
    }
}
