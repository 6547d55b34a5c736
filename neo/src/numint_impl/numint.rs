use super::grid::{GridBlock, Grids};
use crate::epc_impl::{eval_epc, EpcParams};
use basis::basis::AOBasis;
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorParams {
    /// Electronic AO pairs with |S_ij| below this are not accumulated.
    pub pair_cutoff: f64,
    /// Blocks evaluated in parallel before their results are summed.
    pub blocks_per_batch: usize,
}

impl Default for IntegratorParams {
    fn default() -> Self {
        Self {
            pair_cutoff: 1e-13,
            blocks_per_batch: 32,
        }
    }
}

/// Correlation energy and the two potential matrices of one
/// electron / nucleus pair.
#[derive(Clone, Debug)]
pub struct EpcIntegral {
    pub exc: f64,
    pub vmat_e: DMatrix<f64>,
    pub vmat_n: DMatrix<f64>,
}

/// Density on the rows of `ao` (points x nao). Only AOs switched on in
/// `mask` take part.
pub fn eval_rho(ao: &DMatrix<f64>, dm: &DMatrix<f64>, mask: Option<&[bool]>) -> Vec<f64> {
    let (ao, dm) = match mask {
        Some(mask) => {
            let idx: Vec<usize> = (0..ao.ncols()).filter(|&i| mask[i]).collect();
            (
                ao.select_columns(&idx),
                dm.select_rows(&idx).select_columns(&idx),
            )
        }
        None => (ao.clone(), dm.clone()),
    };
    let c = &ao * &dm;
    c.component_mul(&ao)
        .row_iter()
        .map(|row| row.sum())
        .collect()
}

fn clamp_negative(rho: &mut [f64]) {
    rho.iter_mut().for_each(|r| *r = r.max(0.0));
}

/// Σ_p ao[p, i] f[p] ao[p, j] over the selected columns.
fn weighted_gram(ao: &DMatrix<f64>, f: &[f64]) -> DMatrix<f64> {
    let aow = DMatrix::from_fn(ao.nrows(), ao.ncols(), |p, i| ao[(p, i)] * f[p]);
    ao.tr_mul(&aow)
}

/// Like `weighted_gram`, but only for column pairs (a, b) whose AOs
/// `active[a]`, `active[b]` pass `pair_mask`. Other entries are left zero
/// and never computed.
pub(crate) fn screened_gram(
    ao: &DMatrix<f64>,
    f: &[f64],
    active: &[usize],
    pair_mask: &DMatrix<bool>,
) -> DMatrix<f64> {
    let aow = DMatrix::from_fn(ao.nrows(), ao.ncols(), |p, i| ao[(p, i)] * f[p]);
    DMatrix::from_fn(active.len(), active.len(), |a, b| {
        if pair_mask[(active[a], active[b])] {
            ao.column(a).dot(&aow.column(b))
        } else {
            0.0
        }
    })
}

struct BlockContribution {
    exc: f64,
    // active electronic AOs and their half-weighted block matrix
    active_e: Vec<usize>,
    vmat_e: DMatrix<f64>,
    vmat_n: DMatrix<f64>,
}

#[allow(clippy::too_many_arguments)]
fn block_contribution<E: AOBasis + ?Sized, N: AOBasis + ?Sized>(
    epc: &EpcParams,
    block: GridBlock<'_>,
    basis_e: &E,
    dm_e: &DMatrix<f64>,
    mask_e: &[bool],
    basis_n: &N,
    dm_n: &DMatrix<f64>,
    mask_n: &[bool],
    pair_mask: &DMatrix<bool>,
) -> BlockContribution {
    let active_e: Vec<usize> = (0..mask_e.len()).filter(|&i| mask_e[i]).collect();

    let ao_e = basis_e.eval_ao(block.coords, Some(mask_e));
    let mut rho_e = eval_rho(&ao_e, dm_e, Some(mask_e));
    clamp_negative(&mut rho_e);

    let ao_n = basis_n.eval_ao(block.coords, Some(mask_n));
    let mut rho_n = eval_rho(&ao_n, dm_n, Some(mask_n));
    clamp_negative(&mut rho_n);

    let values = eval_epc(epc, &rho_e, &rho_n);

    let exc = block
        .weights
        .iter()
        .zip(&rho_n)
        .zip(&values.exc)
        .map(|((w, rn), e)| w * rn * e)
        .sum();

    // half weights, the full matrices are M + M^T
    let f_n: Vec<f64> = block
        .weights
        .iter()
        .zip(&values.vxc_n)
        .map(|(w, v)| 0.5 * w * v)
        .collect();
    let vmat_n = weighted_gram(&ao_n, &f_n);

    let f_e: Vec<f64> = block
        .weights
        .iter()
        .zip(&values.vxc_e)
        .map(|(w, v)| 0.5 * w * v)
        .collect();
    let vmat_e = screened_gram(&ao_e.select_columns(&active_e), &f_e, &active_e, pair_mask);

    BlockContribution {
        exc,
        active_e,
        vmat_e,
        vmat_n,
    }
}

/// Integrates the EPC functional over `grids` for one electron / nucleus
/// pair.
///
/// Blocks in which no nuclear AO is significant are skipped: the nuclear
/// density vanishes there, and with it the energy and both potentials.
/// The nuclear matrix is accumulated densely. The electronic matrix only
/// over AO pairs that are active in the block and pass overlap screening.
/// Blocks are evaluated in parallel batches and summed in block order, so
/// the result does not depend on the thread count.
pub fn nr_epc<E: AOBasis + ?Sized, N: AOBasis + ?Sized>(
    epc: &EpcParams,
    basis_e: &E,
    dm_e: &DMatrix<f64>,
    basis_n: &N,
    dm_n: &DMatrix<f64>,
    grids: &Grids,
    params: &IntegratorParams,
) -> EpcIntegral {
    let nao_e = basis_e.nao();
    let nao_n = basis_n.nao();
    assert_eq!(dm_e.shape(), (nao_e, nao_e), "electronic density does not match its basis");
    assert_eq!(dm_n.shape(), (nao_n, nao_n), "nuclear density does not match its basis");

    let mask_e = grids.make_mask(basis_e);
    let mask_n = grids.make_mask(basis_n);
    let pair_mask = basis_e.pair_mask(params.pair_cutoff);

    let active_blocks: Vec<usize> = (0..grids.n_blocks())
        .filter(|&b| mask_n.any_active(b))
        .collect();
    debug!(
        "EPC integration: {} of {} blocks carry nuclear density",
        active_blocks.len(),
        grids.n_blocks()
    );

    let mut exc = 0.0;
    let mut vmat_e = DMatrix::zeros(nao_e, nao_e);
    let mut vmat_n = DMatrix::zeros(nao_n, nao_n);

    for batch in active_blocks.chunks(params.blocks_per_batch.max(1)) {
        let contributions: Vec<BlockContribution> = batch
            .par_iter()
            .map(|&b| {
                block_contribution(
                    epc,
                    grids.block(b),
                    basis_e,
                    dm_e,
                    mask_e.block(b),
                    basis_n,
                    dm_n,
                    mask_n.block(b),
                    &pair_mask,
                )
            })
            .collect();

        for c in contributions {
            exc += c.exc;
            vmat_n += &c.vmat_n;
            for (a, &i) in c.active_e.iter().enumerate() {
                for (b, &j) in c.active_e.iter().enumerate() {
                    vmat_e[(i, j)] += c.vmat_e[(a, b)];
                }
            }
        }
    }

    let vmat_e = &vmat_e + vmat_e.transpose();
    let vmat_n = &vmat_n + vmat_n.transpose();
    EpcIntegral {
        exc,
        vmat_e,
        vmat_n,
    }
}
