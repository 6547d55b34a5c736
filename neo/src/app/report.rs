use crate::component::{trace_product, ComponentKind, Densities};
use crate::potential::PotentialMatrix;
use std::collections::BTreeMap;
use tracing::info;

/// Interaction energy split into its Coulomb and correlation parts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteractionEnergy {
    pub coulomb: f64,
    pub correlation: f64,
}

impl InteractionEnergy {
    pub fn total(&self) -> f64 {
        self.coulomb + self.correlation
    }
}

/// Each pair Coulomb energy appears in both members' raw Coulomb potentials,
/// hence the factor ½. The correlation energy is taken from the electrons,
/// which carry the sum over all their correlated partners.
pub fn interaction_energy(
    vint: &BTreeMap<ComponentKind, PotentialMatrix>,
    dms: &Densities,
) -> InteractionEnergy {
    let coulomb = vint
        .iter()
        .filter_map(|(kind, v)| {
            dms.get(kind)
                .map(|dm| 0.5 * trace_product(v.raw_coulomb(), &dm.total()))
        })
        .sum();
    let correlation = vint
        .get(&ComponentKind::Electron)
        .map_or(0.0, PotentialMatrix::correlation_energy);
    InteractionEnergy {
        coulomb,
        correlation,
    }
}

pub fn report_potentials(vint: &BTreeMap<ComponentKind, PotentialMatrix>, dms: &Densities) {
    info!("\nInteraction potentials:");
    for (kind, v) in vint {
        let trace = dms
            .get(kind)
            .map(|dm| trace_product(&v.matrix, &dm.total()));
        match (&v.tag, trace) {
            (Some(tag), Some(trace)) => info!(
                "  {:>3}: tr(V D) = {:+.10}, E_epc = {:+.10}",
                kind, trace, tag.correlation_energy
            ),
            (None, Some(trace)) => info!("  {:>3}: tr(V D) = {:+.10}", kind, trace),
            (_, None) => info!("  {:>3}: no density supplied", kind),
        }
    }

    let energy = interaction_energy(vint, dms);
    info!("\nInteraction Coulomb energy:     {:.10} au", energy.coulomb);
    info!("Electron-proton correlation:    {:.10} au", energy.correlation);
    info!("Total interaction energy:       {:.10} au", energy.total());
}
