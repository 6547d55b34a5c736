//! Command-line arguments of the `neo` binary

use clap::Parser;

/// Electron-proton correlation potentials for a multi-component system
/// described in a YAML file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override the EPC functional with a preset (17-1, 17-2, 18-1, 18-2)
    #[arg(long)]
    pub epc: Option<String>,

    /// Override the number of grid points per block
    #[arg(long)]
    pub block_size: Option<usize>,

    /// Override the AO pair screening threshold
    #[arg(long)]
    pub pair_cutoff: Option<f64>,
}
