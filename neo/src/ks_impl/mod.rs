//! Multi-component Kohn-Sham aggregation
//!
//! Collects the pairwise interaction potentials of every component and turns
//! them, together with each component's own potential, into the electronic
//! energy without counting a pair twice.

mod ks;

pub use ks::{ElectronicEnergy, MultiComponentKS, ScfSummary};
