//! Electron-proton correlation (EPC) functionals
//!
//! Pointwise evaluation only: given the electronic and nuclear densities on
//! the same points, return the energy density and the two potentials. Grid
//! integration lives in `numint_impl`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use neo::{eval_epc, EpcFunctional};
//!
//! let epc: EpcFunctional = "17-2".parse()?;
//! let values = eval_epc(&epc.params(), &rho_e, &rho_n);
//! ```

mod epc;

pub use epc::{eval_epc, EpcConfig, EpcFamily, EpcFunctional, EpcParams, EpcPreset, EpcRecord, EpcValues};
