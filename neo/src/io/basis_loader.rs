//! NWChem basis file loading

use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of the STO-3G file for `symbol` when the configuration names
/// none: `<base_dir>/basis_sets/sto-3g.<symbol>.nwchem`.
pub fn default_basis_path(base_dir: &Path, symbol: &str) -> PathBuf {
    base_dir
        .join("basis_sets")
        .join(format!("sto-3g.{}.nwchem", symbol.to_lowercase()))
}

/// Reads an NWChem basis file as text. Parsing happens per atom, since the
/// contracted functions carry their center.
pub fn read_nwchem(path: &Path) -> Result<String> {
    debug!("Reading basis file {}", path.display());
    fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read basis set file: {}", path.display()))
}
