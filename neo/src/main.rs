//! Command-line entry point: evaluates multi-component interaction
//! potentials for a system described in YAML.

use color_eyre::eyre::Result;
use neo::app::NeoApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    NeoApplication::from_cli()?.run()
}
