//! Input/Output for the command-line driver
//!
//! Logging setup and NWChem basis file loading.

mod basis_loader;
mod output;

pub use basis_loader::{default_basis_path, read_nwchem};
pub use output::setup_output;
