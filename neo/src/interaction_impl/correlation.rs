use super::{Interaction, InteractionCoulomb, PairPotentials};
use crate::component::{Component, ComponentKind, Densities};
use crate::epc_impl::EpcFunctional;
use crate::numint_impl::{nr_epc, Grids, IntegratorParams};
use crate::potential::PotentialMatrix;
use std::sync::Arc;
use tracing::debug;

/// Coulomb plus, for electron / quantum-hydrogen pairs, electron-proton
/// correlation integrated on the shared grid.
pub struct InteractionCorrelation {
    coulomb: InteractionCoulomb,
    epc: Option<EpcFunctional>,
    grids: Arc<Grids>,
    params: IntegratorParams,
}

impl InteractionCorrelation {
    pub fn new(
        first: Arc<Component>,
        second: Arc<Component>,
        epc: Option<EpcFunctional>,
        grids: Arc<Grids>,
        params: IntegratorParams,
    ) -> Self {
        Self {
            coulomb: InteractionCoulomb::new(first, second),
            epc,
            grids,
            params,
        }
    }

    /// The (electron, nucleus) members when the pair is made of exactly one
    /// of each.
    fn electron_nucleus(&self) -> Option<(&Component, &Component)> {
        let (a, b) = (self.coulomb.first(), self.coulomb.second());
        let is_nucleus = |c: &Component| c.kind.nucleus_index().is_some();
        if a.kind.is_electron() && is_nucleus(b) {
            Some((a, b))
        } else if b.kind.is_electron() && is_nucleus(a) {
            Some((b, a))
        } else {
            None
        }
    }

    /// Whether correlation applies: a functional is configured, the pair is
    /// an electron and a hydrogen nucleus, and that nucleus is covered by
    /// the functional.
    pub fn need_epc(&self) -> bool {
        let Some(epc) = &self.epc else {
            return false;
        };
        match self.electron_nucleus() {
            Some((_, nucleus)) => {
                nucleus.is_hydrogen_nucleus()
                    && nucleus
                        .kind
                        .nucleus_index()
                        .is_some_and(|i| epc.applies_to_nucleus(i))
            }
            None => false,
        }
    }
}

impl Interaction for InteractionCorrelation {
    fn pair(&self) -> (ComponentKind, ComponentKind) {
        self.coulomb.pair()
    }

    fn get_vint(&self, dms: &Densities) -> PairPotentials {
        let mut vint = self.coulomb.get_vint(dms);
        if !self.need_epc() {
            return vint;
        }
        let (Some((electrons, nucleus)), Some(epc)) = (self.electron_nucleus(), &self.epc) else {
            return vint;
        };
        let (Some(dm_e), Some(dm_n)) = (dms.get(&electrons.kind), dms.get(&nucleus.kind)) else {
            debug!(
                "no density for {} or {} yet, using Coulomb only",
                electrons.kind, nucleus.kind
            );
            return vint;
        };
        let (Some(vj_e), Some(vj_n)) = (vint.remove(&electrons.kind), vint.remove(&nucleus.kind))
        else {
            return vint;
        };

        let result = nr_epc(
            &epc.params(),
            electrons.basis.as_ref(),
            &dm_e.total(),
            nucleus.basis.as_ref(),
            &dm_n.total(),
            &self.grids,
            &self.params,
        );
        debug!(
            "EPC between {} and {}: E_epc = {:.10}",
            electrons.kind, nucleus.kind, result.exc
        );

        let vj_e = vj_e.into_matrix();
        let vj_n = vj_n.into_matrix();
        vint.insert(
            electrons.kind,
            PotentialMatrix::tagged(&vj_e + result.vmat_e, result.exc, vj_e),
        );
        vint.insert(
            nucleus.kind,
            PotentialMatrix::tagged(&vj_n + result.vmat_n, result.exc, vj_n),
        );
        vint
    }
}
