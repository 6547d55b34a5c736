//! Grid integration of the EPC functional
//!
//! The grid is split into blocks of bounded size. For every block the
//! electronic and nuclear densities are built from AO values, the functional
//! is evaluated pointwise and its potentials are folded back into AO
//! matrices. Blocks where the nuclear basis vanishes are skipped.

mod grid;
mod numint;

pub use grid::{build_becke_atom_grid, BlockMask, GridBlock, GridParams, GridPoint, Grids};
pub use numint::{eval_rho, nr_epc, EpcIntegral, IntegratorParams};

#[cfg(test)]
mod tests;
