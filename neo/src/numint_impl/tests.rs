//! Tests for grids and EPC integration

use super::grid::{becke_weights, gauss_legendre};
use super::numint::screened_gram;
use super::{eval_rho, nr_epc, GridParams, GridPoint, Grids, IntegratorParams};
use crate::epc_impl::{eval_epc, EpcPreset};
use basis::basis::{AOBasis, MolecularBasis};
use basis::cgto::BasisSet;
use nalgebra::{DMatrix, Vector3};
use periodic_table_on_an_enum::Element;
use std::f64::consts::PI;

const H_STO3G: &str = r#"
H    S
      3.42525091             0.15432897
      0.62391373             0.53532814
      0.16885540             0.44463454
"#;

/// One function whose value is a Cartesian coordinate of the point, so a
/// unit density matrix puts ρ = x² (or y², z²) on the grid.
struct AxisBasis {
    axis: usize,
}

impl AOBasis for AxisBasis {
    fn nao(&self) -> usize {
        1
    }

    fn ao_value(&self, _i: usize, r: &Vector3<f64>) -> f64 {
        r[self.axis]
    }

    fn ao_extent(&self, _i: usize, _cutoff: f64) -> (Vector3<f64>, f64) {
        (Vector3::zeros(), f64::INFINITY)
    }

    fn overlap(&self) -> DMatrix<f64> {
        DMatrix::identity(1, 1)
    }
}

fn h2_electron_basis() -> MolecularBasis {
    let a = BasisSet::parse_nwchem(H_STO3G, Vector3::zeros()).unwrap();
    let b = BasisSet::parse_nwchem(H_STO3G, Vector3::new(0.0, 0.0, 1.4)).unwrap();
    MolecularBasis::from_sets([&a, &b])
}

fn proton_basis(center: Vector3<f64>) -> MolecularBasis {
    let h = Element::from_symbol("H").unwrap();
    MolecularBasis::from_sets([&BasisSet::even_tempered_s(h, 4.0, 2.0, 2, center)])
}

fn h2_grids(block_size: usize) -> Grids {
    let coords = [Vector3::zeros(), Vector3::new(0.0, 0.0, 1.4)];
    let params = GridParams {
        block_size,
        ..GridParams::default()
    };
    Grids::build(&coords, &params)
}

fn electron_dm() -> DMatrix<f64> {
    DMatrix::from_element(2, 2, 0.6026)
}

fn nuclear_dm() -> DMatrix<f64> {
    DMatrix::from_row_slice(2, 2, &[0.8, 0.1, 0.1, 0.2])
}

/// Straightforward evaluation over every point with unmasked AOs.
fn dense_reference(
    basis_e: &MolecularBasis,
    dm_e: &DMatrix<f64>,
    basis_n: &MolecularBasis,
    dm_n: &DMatrix<f64>,
    grids: &Grids,
) -> (f64, DMatrix<f64>, DMatrix<f64>) {
    let params = EpcPreset::Epc17_2.params();
    let ao_e = basis_e.eval_ao(grids.coords(), None);
    let ao_n = basis_n.eval_ao(grids.coords(), None);
    let rho_e: Vec<f64> = eval_rho(&ao_e, dm_e, None).into_iter().map(|r| r.max(0.0)).collect();
    let rho_n: Vec<f64> = eval_rho(&ao_n, dm_n, None).into_iter().map(|r| r.max(0.0)).collect();
    let values = eval_epc(&params, &rho_e, &rho_n);
    let w = grids.weights();

    let exc: f64 = (0..w.len()).map(|p| w[p] * rho_n[p] * values.exc[p]).sum();
    let vmat_e = DMatrix::from_fn(ao_e.ncols(), ao_e.ncols(), |i, j| {
        (0..w.len())
            .map(|p| w[p] * values.vxc_e[p] * ao_e[(p, i)] * ao_e[(p, j)])
            .sum()
    });
    let vmat_n = DMatrix::from_fn(ao_n.ncols(), ao_n.ncols(), |i, j| {
        (0..w.len())
            .map(|p| w[p] * values.vxc_n[p] * ao_n[(p, i)] * ao_n[(p, j)])
            .sum()
    });
    (exc, vmat_e, vmat_n)
}

#[test]
fn test_gauss_legendre_exact_for_polynomials() {
    let (x, w) = gauss_legendre(8, 0.0, 2.0);
    let integral: f64 = x.iter().zip(&w).map(|(x, w)| w * x.powi(7)).sum();
    assert!((integral - 2.0_f64.powi(8) / 8.0).abs() < 1e-10);
    assert!((w.iter().sum::<f64>() - 2.0).abs() < 1e-12);
}

#[test]
fn test_becke_weights_partition_unity() {
    let coords = [
        Vector3::zeros(),
        Vector3::new(0.0, 0.0, 1.4),
        Vector3::new(1.0, 0.5, -0.3),
    ];
    for r in [
        Vector3::new(0.1, 0.2, 0.3),
        Vector3::new(-2.0, 1.0, 0.7),
        Vector3::new(0.0, 0.0, 0.7),
    ] {
        let w = becke_weights(&r, &coords);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(w.iter().all(|&x| (0.0..=1.0).contains(&x)));
    }
}

#[test]
fn test_grid_integrates_gaussian() {
    // ∫ exp(-r²) d³r = π^{3/2}, angular part is exact for spherical integrands
    let grids = Grids::build(&[Vector3::new(0.3, -0.2, 0.1)], &GridParams::default());
    let center = Vector3::new(0.3, -0.2, 0.1);
    let integral: f64 = grids
        .coords()
        .iter()
        .zip(grids.weights())
        .map(|(r, w)| w * (-(r - center).norm_squared()).exp())
        .sum();
    assert!((integral - PI.powf(1.5)).abs() < 1e-6, "got {}", integral);
}

#[test]
fn test_blocks_partition_grid() {
    let grids = h2_grids(50);
    assert_eq!(grids.block_size(), 50);
    assert_eq!(Grids::new(Vec::new(), 0, 1e-15).block_size(), 1);
    assert!(grids.len() > 50 && grids.len() <= 2 * 24 * 6);
    let mut covered = 0;
    for (i, block) in grids.blocks().enumerate() {
        assert_eq!(block.index, i);
        assert_eq!(block.offset, covered);
        assert!(block.len() <= 50 && !block.is_empty());
        covered += block.len();
    }
    assert_eq!(covered, grids.len());
    assert_eq!(grids.n_blocks(), grids.len().div_ceil(50));
}

#[test]
fn test_eval_rho_masked_equals_full() {
    let basis = h2_electron_basis();
    let points = vec![Vector3::new(0.0, 0.1, 0.2), Vector3::new(0.3, 0.0, 1.1)];
    let ao = basis.eval_ao(&points, None);
    let dm = DMatrix::from_row_slice(2, 2, &[0.5, 0.2, 0.2, 0.4]);
    let full = eval_rho(&ao, &dm, None);
    for (p, r) in points.iter().enumerate() {
        let phi = [basis.ao_value(0, r), basis.ao_value(1, r)];
        let expected = 0.5 * phi[0] * phi[0] + 0.4 * phi[1] * phi[1] + 0.4 * phi[0] * phi[1];
        assert!((full[p] - expected).abs() < 1e-14);
    }

    let masked_ao = basis.eval_ao(&points, Some(&[true, false][..]));
    let masked = eval_rho(&masked_ao, &dm, Some(&[true, false][..]));
    for (p, r) in points.iter().enumerate() {
        let phi = basis.ao_value(0, r);
        assert!((masked[p] - 0.5 * phi * phi).abs() < 1e-14);
    }
}

#[test]
fn test_two_point_grid_reference_values() {
    let rho_e = [0.10_f64, 0.05];
    let rho_n = [0.02_f64, 0.01];
    let points = (0..2)
        .map(|p| GridPoint {
            r: Vector3::new(rho_e[p].sqrt(), rho_n[p].sqrt(), 0.0),
            w: 0.5,
        })
        .collect();
    let grids = Grids::new(points, 128, 1e-15);
    let one = DMatrix::identity(1, 1);

    let result = nr_epc(
        &EpcPreset::Epc17_2.params(),
        &AxisBasis { axis: 0 },
        &one,
        &AxisBasis { axis: 1 },
        &one,
        &grids,
        &IntegratorParams::default(),
    );

    assert!((result.exc - (-0.0005520011378830185)).abs() < 1e-12);
    let vn = 0.5 * (-0.04512398794952676 * 0.02) + 0.5 * (-0.021965084963526425 * 0.01);
    let ve = 0.5 * (-0.009024797589905351 * 0.10) + 0.5 * (-0.004393016992705285 * 0.05);
    assert!((result.vmat_n[(0, 0)] - vn).abs() < 1e-12);
    assert!((result.vmat_e[(0, 0)] - ve).abs() < 1e-12);
}

#[test]
fn test_negative_density_is_clamped() {
    // a negative electronic density matrix gives ρe < 0; once clamped the
    // energy density and the nuclear potential vanish
    let points = vec![GridPoint {
        r: Vector3::new(0.3, 0.2, 0.0),
        w: 1.0,
    }];
    let grids = Grids::new(points, 16, 1e-15);
    let result = nr_epc(
        &EpcPreset::Epc17_1.params(),
        &AxisBasis { axis: 0 },
        &DMatrix::from_element(1, 1, -1.0),
        &AxisBasis { axis: 1 },
        &DMatrix::identity(1, 1),
        &grids,
        &IntegratorParams::default(),
    );
    assert_eq!(result.exc, 0.0);
    assert_eq!(result.vmat_n[(0, 0)], 0.0);
    // ve = -a ρn / a² at ρe = 0
    let expected = -0.04 / 2.35 * 0.09;
    assert!((result.vmat_e[(0, 0)] - expected).abs() < 1e-14);
}

#[test]
fn test_nr_epc_symmetric() {
    let basis_e = h2_electron_basis();
    let basis_n = proton_basis(Vector3::new(0.0, 0.0, 1.4));
    let dm_e = DMatrix::from_row_slice(2, 2, &[0.7, 0.3, 0.5, 0.4]);
    let result = nr_epc(
        &EpcPreset::Epc18_2.params(),
        &basis_e,
        &dm_e,
        &basis_n,
        &nuclear_dm(),
        &h2_grids(32),
        &IntegratorParams::default(),
    );
    assert!((&result.vmat_e - result.vmat_e.transpose()).amax() < 1e-14);
    assert!((&result.vmat_n - result.vmat_n.transpose()).amax() < 1e-14);
    assert!(result.exc < 0.0);
}

#[test]
fn test_block_skipping_matches_dense_reference() {
    let basis_e = h2_electron_basis();
    let basis_n = proton_basis(Vector3::new(0.0, 0.0, 1.4));
    let grids = h2_grids(6);
    let params = IntegratorParams {
        pair_cutoff: 0.0,
        ..IntegratorParams::default()
    };

    let mask_n = grids.make_mask(&basis_n);
    let skipped = (0..grids.n_blocks()).filter(|&b| !mask_n.any_active(b)).count();
    assert!(skipped > 0, "the test grid should contain blocks without nuclear density");

    let result = nr_epc(
        &EpcPreset::Epc17_2.params(),
        &basis_e,
        &electron_dm(),
        &basis_n,
        &nuclear_dm(),
        &grids,
        &params,
    );
    let (exc, vmat_e, vmat_n) =
        dense_reference(&basis_e, &electron_dm(), &basis_n, &nuclear_dm(), &grids);

    assert!((result.exc - exc).abs() < 1e-10, "{} vs {}", result.exc, exc);
    assert!((&result.vmat_e - vmat_e).amax() < 1e-10);
    assert!((&result.vmat_n - vmat_n).amax() < 1e-10);
}

#[test]
fn test_pair_screening_drops_distant_pairs() {
    // two electronic functions 60 bohr apart never overlap; their
    // off-diagonal element is screened out, the rest agrees with no screening
    let near = BasisSet::parse_nwchem(H_STO3G, Vector3::zeros()).unwrap();
    let far = BasisSet::parse_nwchem(H_STO3G, Vector3::new(0.0, 0.0, 60.0)).unwrap();
    let basis_e = MolecularBasis::from_sets([&near, &far]);
    let basis_n = proton_basis(Vector3::zeros());
    let coords = [Vector3::zeros(), Vector3::new(0.0, 0.0, 60.0)];
    let grids = Grids::build(&coords, &GridParams::default());
    let dm_e = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);

    let run = |pair_cutoff| {
        nr_epc(
            &EpcPreset::Epc17_1.params(),
            &basis_e,
            &dm_e,
            &basis_n,
            &nuclear_dm(),
            &grids,
            &IntegratorParams {
                pair_cutoff,
                ..IntegratorParams::default()
            },
        )
    };
    let screened = run(1e-13);
    let unscreened = run(0.0);
    assert_eq!(screened.vmat_e[(0, 1)], 0.0);
    assert!((screened.vmat_e[(0, 0)] - unscreened.vmat_e[(0, 0)]).abs() < 1e-14);
    assert!((screened.exc - unscreened.exc).abs() < 1e-14);
    assert!(unscreened.vmat_e[(0, 1)].abs() < 1e-12);
}

#[test]
fn test_screened_gram_skips_masked_pairs() {
    let ao = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 0.5, -1.0, 3.0, 0.25]);
    let f = [0.2, -0.4, 1.5];
    let active = [1, 3];
    let mut pair_mask = DMatrix::from_element(4, 4, true);
    pair_mask[(1, 3)] = false;
    pair_mask[(3, 1)] = false;

    let full = ao.transpose() * DMatrix::from_diagonal(&nalgebra::DVector::from_column_slice(&f)) * &ao;
    let screened = screened_gram(&ao, &f, &active, &pair_mask);
    assert_eq!(screened.shape(), (2, 2));
    assert_eq!(screened[(0, 1)], 0.0);
    assert_eq!(screened[(1, 0)], 0.0);
    assert!((screened[(0, 0)] - full[(0, 0)]).abs() < 1e-14);
    assert!((screened[(1, 1)] - full[(1, 1)]).abs() < 1e-14);

    let open = screened_gram(&ao, &f, &active, &DMatrix::from_element(4, 4, true));
    assert!((open - full).amax() < 1e-14);
}

#[test]
fn test_nr_epc_deterministic_across_batching() {
    let basis_e = h2_electron_basis();
    let basis_n = proton_basis(Vector3::zeros());
    let grids = h2_grids(8);
    let run = |blocks_per_batch| {
        nr_epc(
            &EpcPreset::Epc18_1.params(),
            &basis_e,
            &electron_dm(),
            &basis_n,
            &nuclear_dm(),
            &grids,
            &IntegratorParams {
                blocks_per_batch,
                ..IntegratorParams::default()
            },
        )
    };
    let a = run(1);
    let b = run(64);
    let c = run(64);
    assert_eq!(a.exc, b.exc);
    assert_eq!(a.vmat_e, b.vmat_e);
    assert_eq!(b.vmat_n, c.vmat_n);
}
