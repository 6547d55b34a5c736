//! Assembly of components, grids and densities from a configuration

use super::basis::{BasisLoader, BasisRegistry};
use super::geometry::Geometry;
use crate::component::{Component, ComponentKind, Densities, SpinMatrix};
use crate::config::{Config, DensityInput};
use crate::epc_impl::EpcFunctional;
use crate::ks_impl::MultiComponentKS;
use crate::numint_impl::Grids;
use ::basis::basis::MolecularBasis;
use ::basis::cgto::BasisSet;
use color_eyre::eyre::{eyre, Result, WrapErr};
use nalgebra::DMatrix;
use std::sync::Arc;
use tracing::info;

/// A multi-component system ready for potential evaluation.
pub struct NeoSystem {
    pub ks: MultiComponentKS,
    pub densities: Densities,
}

/// Electrons on every atom plus one component per quantum nucleus.
pub fn build_components<L: BasisLoader>(
    config: &Config,
    geometry: &Geometry,
    registry: &mut BasisRegistry<L>,
) -> Result<Vec<Component>> {
    info!("\nPreparing basis sets...");
    let sets = geometry
        .elements
        .iter()
        .zip(&geometry.coords)
        .map(|(element, &center)| registry.basis_set(config, element, center))
        .collect::<Result<Vec<_>>>()?;
    let electron_basis = MolecularBasis::from_sets(&sets);
    info!("  electrons: {} AOs", electron_basis.functions.len());

    let mut components = vec![Component::electrons(Arc::new(electron_basis))];

    let (alpha_0, beta, count) = config
        .nuclear_basis
        .clone()
        .unwrap_or_default()
        .resolved();
    for (i, _) in config.quantum_nuclei() {
        let element = geometry
            .elements
            .get(i)
            .ok_or_else(|| eyre!("Quantum atom {} is outside the geometry", i))?;
        let set = BasisSet::even_tempered_s(element.clone(), alpha_0, beta, count, geometry.coords[i]);
        info!(
            "  nucleus {} ({}): {} s functions, alpha_0 = {}, beta = {}",
            i,
            element.get_symbol(),
            set.len(),
            alpha_0,
            beta
        );
        let basis = Arc::new(MolecularBasis::from_sets([&set]));
        components.push(Component::quantum_nucleus(i, element.clone(), basis));
    }

    Ok(components)
}

fn to_matrix(rows: &[Vec<f64>]) -> Result<DMatrix<f64>> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(eyre!("Density matrix rows have different lengths"));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(DMatrix::from_row_slice(nrows, ncols, &flat))
}

/// Density matrices keyed by component, from their YAML labels.
pub fn parse_densities(config: &Config) -> Result<Densities> {
    config
        .densities
        .iter()
        .map(|(label, input)| {
            let kind: ComponentKind = label.parse()?;
            let dm = match input {
                DensityInput::Restricted(rows) => SpinMatrix::Restricted(to_matrix(rows)?),
                DensityInput::Unrestricted { alpha, beta } => SpinMatrix::Unrestricted {
                    alpha: to_matrix(alpha)?,
                    beta: to_matrix(beta)?,
                },
            };
            Ok((kind, dm))
        })
        .collect::<Result<Densities>>()
        .wrap_err("Invalid density matrix input")
}

/// Builds the component set, the shared grid and the interaction manager.
pub fn build_system<L: BasisLoader>(
    config: &Config,
    geometry: &Geometry,
    registry: &mut BasisRegistry<L>,
) -> Result<NeoSystem> {
    let epc = config
        .epc
        .clone()
        .map(EpcFunctional::try_from)
        .transpose()?;
    match &epc {
        Some(functional) => info!("EPC functional: {}", functional),
        None => info!("No EPC functional, pairs interact through Coulomb only"),
    }

    let components = build_components(config, geometry, registry)?;

    let grid_params = config.grid.clone().unwrap_or_default();
    let grids = Grids::build(&geometry.coords, &grid_params);
    info!(
        "Integration grid: {} points in {} blocks of {}, AO cutoff {:e}",
        grids.len(),
        grids.n_blocks(),
        grids.block_size(),
        grids.cutoff()
    );

    let params = config.integrator.clone().unwrap_or_default();
    let ks = MultiComponentKS::new(components, epc, Arc::new(grids), params);
    let densities = parse_densities(config)?;

    Ok(NeoSystem { ks, densities })
}
