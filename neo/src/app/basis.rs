use crate::config::Config;
use crate::io::{default_basis_path, read_nwchem};
use ::basis::cgto::BasisSet;
use color_eyre::eyre::{Result, WrapErr};
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

/// Source of NWChem basis text for an element.
pub trait BasisLoader {
    fn load(&self, element: &Element, requested: Option<&str>) -> Result<String>;
}

/// Reads basis files relative to the directory holding the configuration.
pub struct NwchemFileLoader {
    base_dir: PathBuf,
}

impl NwchemFileLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl BasisLoader for NwchemFileLoader {
    fn load(&self, element: &Element, requested: Option<&str>) -> Result<String> {
        let path = match requested {
            Some(file) => self.base_dir.join(file),
            None => default_basis_path(&self.base_dir, element.get_symbol()),
        };
        read_nwchem(&path)
    }
}

/// Caches basis text per element and places it on every atom that needs it.
pub struct BasisRegistry<L: BasisLoader> {
    loader: L,
    cache: HashMap<&'static str, String>,
}

impl<L: BasisLoader> BasisRegistry<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            cache: HashMap::new(),
        }
    }

    /// Electronic basis of `element` centered at `center`.
    pub fn basis_set(
        &mut self,
        config: &Config,
        element: &Element,
        center: Vector3<f64>,
    ) -> Result<BasisSet> {
        let symbol = element.get_symbol();
        let text = match self.cache.entry(symbol) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let requested = config.basis_sets.get(symbol).map(|s| s.as_str());
                match requested {
                    Some(file) => info!("Loading basis for {} from {}", symbol, file),
                    None => info!("Loading default STO-3G basis for {}", symbol),
                }
                entry.insert(self.loader.load(element, requested)?)
            }
        };

        BasisSet::parse_nwchem(text, center)
            .wrap_err_with(|| format!("Invalid basis set for {}", symbol))
    }
}
