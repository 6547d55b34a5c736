mod basis;
mod geometry;
mod report;
mod system;

pub use basis::{BasisLoader, BasisRegistry, NwchemFileLoader};
pub use geometry::{build_geometry, Geometry};
pub use report::{interaction_energy, report_potentials, InteractionEnergy};
pub use system::{build_components, build_system, parse_densities, NeoSystem};

use crate::config::{Args, Config};
use crate::epc_impl::EpcConfig;
use crate::io::setup_output;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct NeoApplication {
    args: Args,
    config: Config,
    base_dir: PathBuf,
}

impl NeoApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(Path::new(&args.config_file))?;
        let base_dir = Path::new(&args.config_file)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self {
            args,
            config,
            base_dir,
        })
    }

    pub fn run(mut self) -> Result<()> {
        setup_output(self.args.output.as_ref());
        info!("Reading configuration from: {}", self.args.config_file);
        apply_overrides(&self.args, &mut self.config);

        let geometry = build_geometry(&self.config)?;
        let mut registry = BasisRegistry::new(NwchemFileLoader::new(&self.base_dir));
        let system = build_system(&self.config, &geometry, &mut registry)?;

        let vint = system.ks.get_vint(&system.densities)?;
        report_potentials(&vint, &system.densities);
        Ok(())
    }
}

/// Reads a YAML configuration and fills in defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", path.display()))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}

fn apply_overrides(args: &Args, config: &mut Config) {
    if let Some(name) = &args.epc {
        info!("Overriding EPC functional with: {}", name);
        config.epc = Some(EpcConfig::Name(name.clone()));
    }
    if let Some(block_size) = args.block_size {
        info!("Overriding block_size with: {}", block_size);
        config.grid.get_or_insert_with(Default::default).block_size = block_size;
    }
    if let Some(pair_cutoff) = args.pair_cutoff {
        info!("Overriding pair_cutoff with: {}", pair_cutoff);
        config
            .integrator
            .get_or_insert_with(Default::default)
            .pair_cutoff = pair_cutoff;
    }
}
