use crate::component::{trace_product, Component, ComponentKind, Densities};
use crate::epc_impl::EpcFunctional;
use crate::error::{NeoError, Result};
use crate::interaction_impl::{Interaction, InteractionCorrelation};
use crate::numint_impl::{Grids, IntegratorParams};
use crate::potential::{EffectivePotential, PotentialMatrix};
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Breakdown of the electronic energy. `coul` and `exc` only collect
/// Kohn-Sham components.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScfSummary {
    pub e1: f64,
    pub coul: f64,
    pub exc: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElectronicEnergy {
    /// Total electronic energy over all components.
    pub e_elec: f64,
    /// Two-body part, summed over components.
    pub e2: f64,
    pub summary: ScfSummary,
}

/// Multi-component Kohn-Sham bookkeeping: one interaction per pair of
/// components, merged into per-component potentials and an electronic
/// energy that counts each pair once.
pub struct MultiComponentKS {
    components: BTreeMap<ComponentKind, Arc<Component>>,
    interactions: Vec<Box<dyn Interaction>>,
    epc: Option<EpcFunctional>,
    grids: Arc<Grids>,
    params: IntegratorParams,
}

impl MultiComponentKS {
    pub fn new(
        components: Vec<Component>,
        epc: Option<EpcFunctional>,
        grids: Arc<Grids>,
        params: IntegratorParams,
    ) -> Self {
        let mut ks = Self {
            components: BTreeMap::new(),
            interactions: Vec::new(),
            epc,
            grids,
            params,
        };
        ks.rebuild(components);
        ks
    }

    fn rebuild(&mut self, components: Vec<Component>) {
        self.components = components
            .into_iter()
            .map(|c| (c.kind, Arc::new(c)))
            .collect();

        let members: Vec<&Arc<Component>> = self.components.values().collect();
        self.interactions = members
            .iter()
            .enumerate()
            .flat_map(|(i, a)| members[i + 1..].iter().map(move |b| (*a, *b)))
            .map(|(a, b)| {
                Box::new(InteractionCorrelation::new(
                    a.clone(),
                    b.clone(),
                    self.epc.clone(),
                    self.grids.clone(),
                    self.params.clone(),
                )) as Box<dyn Interaction>
            })
            .collect();

        info!(
            "Multi-component system: {} components, {} interactions",
            self.components.len(),
            self.interactions.len()
        );
        for interaction in &self.interactions {
            let (a, b) = interaction.pair();
            debug!("  interaction {} - {}", a, b);
        }
    }

    /// Replaces the component set and rebuilds every interaction. Returns
    /// whether the set of component kinds changed.
    pub fn reset(&mut self, components: Vec<Component>) -> bool {
        let old: BTreeSet<ComponentKind> = self.components.keys().copied().collect();
        let new: BTreeSet<ComponentKind> = components.iter().map(|c| c.kind).collect();
        let changed = old != new;
        if changed {
            info!("Quantum particle set changed, rebuilding interactions");
        }
        self.rebuild(components);
        changed
    }

    pub fn components(&self) -> &BTreeMap<ComponentKind, Arc<Component>> {
        &self.components
    }

    pub fn interactions(&self) -> &[Box<dyn Interaction>] {
        &self.interactions
    }

    pub fn epc(&self) -> Option<&EpcFunctional> {
        self.epc.as_ref()
    }

    fn component(&self, kind: ComponentKind) -> Result<&Arc<Component>> {
        self.components
            .get(&kind)
            .ok_or(NeoError::UnknownComponent(kind))
    }

    fn check_densities(&self, dms: &Densities) -> Result<()> {
        for (&kind, dm) in dms {
            let component = self.component(kind)?;
            if let Some(found) = dm.mismatched_shape(component.nao()) {
                return Err(NeoError::DimensionMismatch {
                    what: "density matrix",
                    kind,
                    expected: component.nao(),
                    found,
                });
            }
        }
        Ok(())
    }

    /// Interaction potential of every component, summed over all pairs it
    /// takes part in. Components whose partners have no density yet get a
    /// zero matrix.
    pub fn get_vint(&self, dms: &Densities) -> Result<BTreeMap<ComponentKind, PotentialMatrix>> {
        self.check_densities(dms)?;

        // each component starts from zeros so it keeps its size with no partners
        let mut parts: BTreeMap<ComponentKind, Vec<PotentialMatrix>> = self
            .components
            .iter()
            .map(|(&kind, c)| (kind, vec![PotentialMatrix::zeros(c.nao())]))
            .collect();

        let pair_potentials: Vec<_> = self
            .interactions
            .par_iter()
            .map(|interaction| interaction.get_vint(dms))
            .collect();
        for potentials in pair_potentials {
            for (kind, v) in potentials {
                if let Some(acc) = parts.get_mut(&kind) {
                    acc.push(v);
                }
            }
        }

        let vint: BTreeMap<ComponentKind, PotentialMatrix> = parts
            .into_iter()
            .map(|(kind, vs)| (kind, vs.into_iter().sum()))
            .collect();
        Ok(vint)
    }

    /// Total electronic energy.
    ///
    /// Each component contributes tr[(h + ½ J_int) D] with J_int the raw
    /// Coulomb part of its interaction potential, since every pair Coulomb
    /// energy shows up in both members. A Kohn-Sham component adds its own
    /// Coulomb and xc energies plus the correlation energy of its pairs; a
    /// Hartree-Fock component adds ½ tr(V D).
    pub fn energy_elec(
        &self,
        dms: &Densities,
        h1e: &BTreeMap<ComponentKind, DMatrix<f64>>,
        vhf: &BTreeMap<ComponentKind, EffectivePotential>,
        vint: &BTreeMap<ComponentKind, PotentialMatrix>,
    ) -> Result<ElectronicEnergy> {
        self.check_densities(dms)?;

        let mut energy = ElectronicEnergy {
            e_elec: 0.0,
            e2: 0.0,
            summary: ScfSummary::default(),
        };

        for (&kind, component) in &self.components {
            let missing = |what| NeoError::MissingInput { what, kind };
            let dm = dms.get(&kind).ok_or_else(|| missing("density matrix"))?;
            let h = h1e.get(&kind).ok_or_else(|| missing("core Hamiltonian"))?;
            let v_own = vhf.get(&kind).ok_or_else(|| missing("effective potential"))?;
            let v_int = vint.get(&kind).ok_or_else(|| missing("interaction potential"))?;

            let nao = component.nao();
            let mismatch = |what, found| NeoError::DimensionMismatch {
                what,
                kind,
                expected: nao,
                found,
            };
            let square = |m: &DMatrix<f64>| Some(m.shape()).filter(|&s| s != (nao, nao));
            if let Some(found) = square(h) {
                return Err(mismatch("core Hamiltonian", found));
            }
            if let Some(found) = v_own.matrix.mismatched_shape(nao) {
                return Err(mismatch("effective potential", found));
            }
            if let Some(found) = square(&v_int.matrix).or_else(|| square(v_int.raw_coulomb())) {
                return Err(mismatch("interaction potential", found));
            }

            let h_eff = h + v_int.raw_coulomb() * 0.5;
            let e1 = trace_product(&h_eff, &dm.total());
            let e2 = match v_own.ks {
                Some(ks) => {
                    let exc = ks.xc + v_int.correlation_energy();
                    energy.summary.coul += ks.coulomb;
                    energy.summary.exc += exc;
                    ks.coulomb + exc
                }
                None => 0.5 * v_own.matrix.contract(dm),
            };
            debug!("E1 ({}) = {:.10}, E2 ({}) = {:.10}", kind, e1, kind, e2);

            energy.summary.e1 += e1;
            energy.e2 += e2;
            energy.e_elec += e1 + e2;
        }
        Ok(energy)
    }
}
