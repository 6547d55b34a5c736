//! Multi-component (nuclear-electronic orbital) potentials with
//! electron-proton correlation.
//!
//! Electrons and quantum nuclei are separate components, each with its own
//! AO basis and density matrix. Every pair of components interacts through
//! Coulomb; electron / quantum-hydrogen pairs can additionally carry an EPC
//! functional integrated on a shared grid.

pub mod app;
pub mod component;
pub mod config;
pub mod epc_impl;
pub mod error;
pub mod interaction_impl;
pub mod io;
pub mod ks_impl;
pub mod numint_impl;
pub mod potential;

pub use component::{Component, ComponentKind, Densities, DensityMatrix, SpinMatrix};
pub use epc_impl::{eval_epc, EpcConfig, EpcFamily, EpcFunctional, EpcParams, EpcPreset, EpcValues};
pub use error::{NeoError, Result};
pub use interaction_impl::{Interaction, InteractionCorrelation, InteractionCoulomb, PairPotentials};
pub use ks_impl::{ElectronicEnergy, MultiComponentKS, ScfSummary};
pub use numint_impl::{nr_epc, EpcIntegral, GridParams, Grids, IntegratorParams};
pub use potential::{CorrelationTag, EffectivePotential, KsEnergies, PotentialMatrix};
