//! Configuration of a multi-component calculation
//!
//! Geometry, basis files, the EPC functional, grid and integration settings,
//! and the density matrices to evaluate the potentials for.

mod args;

pub use args::Args;

use crate::epc_impl::EpcConfig;
use crate::numint_impl::{GridParams, IntegratorParams};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub geometry: Vec<Atom>,
    /// NWChem basis file per element symbol, for the electrons.
    #[serde(default)]
    pub basis_sets: HashMap<String, String>,
    pub nuclear_basis: Option<NuclearBasisParams>,
    pub epc: Option<EpcConfig>,
    pub grid: Option<GridParams>,
    pub integrator: Option<IntegratorParams>,
    /// Density matrices keyed by component label (`e`, `n0`, ...).
    #[serde(default)]
    pub densities: BTreeMap<String, DensityInput>,
}

/// Atomic position configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct Atom {
    pub element: String,
    pub coords: [f64; 3],
    /// Treat this nucleus quantum mechanically.
    pub quantum: Option<bool>,
}

impl Atom {
    pub fn is_quantum(&self) -> bool {
        self.quantum.unwrap_or(false)
    }
}

const NUCLEAR_ALPHA_0: f64 = 4.0;
const NUCLEAR_BETA: f64 = 2.0;
const NUCLEAR_COUNT: usize = 8;

/// Even-tempered s basis for quantum nuclei, α_k = alpha_0 β^k
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NuclearBasisParams {
    pub alpha_0: Option<f64>,
    pub beta: Option<f64>,
    pub count: Option<usize>,
}

impl Default for NuclearBasisParams {
    fn default() -> Self {
        NuclearBasisParams {
            alpha_0: Some(NUCLEAR_ALPHA_0),
            beta: Some(NUCLEAR_BETA),
            count: Some(NUCLEAR_COUNT),
        }
    }
}

impl NuclearBasisParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.alpha_0.is_none() {
            self.alpha_0 = defaults.alpha_0;
        }
        if self.beta.is_none() {
            self.beta = defaults.beta;
        }
        if self.count.is_none() {
            self.count = defaults.count;
        }
        self
    }

    /// (alpha_0, beta, count), with defaults filled in.
    pub fn resolved(&self) -> (f64, f64, usize) {
        (
            self.alpha_0.unwrap_or(NUCLEAR_ALPHA_0),
            self.beta.unwrap_or(NUCLEAR_BETA),
            self.count.unwrap_or(NUCLEAR_COUNT),
        )
    }
}

/// A density matrix as written in YAML: rows of a spin-summed matrix, or
/// separate alpha and beta matrices.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum DensityInput {
    Restricted(Vec<Vec<f64>>),
    Unrestricted {
        alpha: Vec<Vec<f64>>,
        beta: Vec<Vec<f64>>,
    },
}

impl Config {
    /// Apply default values to any missing sections
    pub fn with_defaults(mut self) -> Self {
        self.nuclear_basis = Some(self.nuclear_basis.unwrap_or_default().with_defaults());
        self.grid = Some(self.grid.unwrap_or_default());
        self.integrator = Some(self.integrator.unwrap_or_default());
        self
    }

    pub fn quantum_nuclei(&self) -> impl Iterator<Item = (usize, &Atom)> {
        self.geometry
            .iter()
            .enumerate()
            .filter(|(_, atom)| atom.is_quantum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epc_impl::EpcRecord;
    use std::collections::BTreeSet;

    #[test]
    fn test_parse_preset_config() {
        let yaml = r#"
geometry:
  - element: H
    coords: [0.0, 0.0, 0.0]
  - element: H
    coords: [0.0, 0.0, 1.4]
    quantum: true
basis_sets:
  H: sto-3g.h.nwchem
epc: "17-2"
densities:
  e: [[0.6, 0.6], [0.6, 0.6]]
  n1:
    alpha: [[1.0]]
    beta: [[0.0]]
"#;
        let config: Config = serde_yml::from_str::<Config>(yaml).unwrap().with_defaults();
        assert_eq!(config.epc, Some(EpcConfig::Name("17-2".to_string())));
        assert_eq!(config.quantum_nuclei().map(|(i, _)| i).collect::<Vec<_>>(), vec![1]);
        assert_eq!(config.grid, Some(GridParams::default()));
        assert_eq!(config.nuclear_basis.as_ref().unwrap().count, Some(8));
        assert!(matches!(config.densities["e"], DensityInput::Restricted(_)));
        assert!(matches!(config.densities["n1"], DensityInput::Unrestricted { .. }));
    }

    #[test]
    fn test_parse_record_config_with_partial_sections() {
        let yaml = r#"
geometry:
  - element: H
    coords: [0.0, 0.0, 0.0]
    quantum: true
epc:
  epc_type: "18"
  a: 1.8
  b: 0.1
  c: 0.03
  epc_nuc: [0]
grid:
  block_size: 64
nuclear_basis:
  beta: 1.5
"#;
        let config: Config = serde_yml::from_str::<Config>(yaml).unwrap().with_defaults();
        assert_eq!(
            config.epc,
            Some(EpcConfig::Record(EpcRecord {
                epc_type: Some("18".to_string()),
                a: Some(1.8),
                b: Some(0.1),
                c: Some(0.03),
                epc_nuc: Some(BTreeSet::from([0])),
            }))
        );
        let grid = config.grid.unwrap();
        assert_eq!(grid.block_size, 64);
        assert_eq!(grid.radial_points, GridParams::default().radial_points);
        let nuc = config.nuclear_basis.unwrap();
        assert_eq!(nuc.beta, Some(1.5));
        assert_eq!(nuc.alpha_0, Some(4.0));
        assert!(config.densities.is_empty());
    }
}
