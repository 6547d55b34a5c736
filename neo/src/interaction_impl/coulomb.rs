use super::{Interaction, PairPotentials};
use crate::component::{Component, ComponentKind, Densities};
use crate::potential::PotentialMatrix;
use nalgebra::DMatrix;
use std::sync::Arc;

/// Classical Coulomb coupling between the densities of two components.
#[derive(Clone, Debug)]
pub struct InteractionCoulomb {
    first: Arc<Component>,
    second: Arc<Component>,
}

impl InteractionCoulomb {
    pub fn new(first: Arc<Component>, second: Arc<Component>) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &Arc<Component> {
        &self.first
    }

    pub fn second(&self) -> &Arc<Component> {
        &self.second
    }

    /// q_self q_other J_self[D_other].
    fn potential_on(target: &Component, source: &Component, dm_source: &DMatrix<f64>) -> DMatrix<f64> {
        let j = target.basis.coulomb_matrix(&source.basis, dm_source);
        j * (target.charge * source.charge)
    }
}

impl Interaction for InteractionCoulomb {
    fn pair(&self) -> (ComponentKind, ComponentKind) {
        (self.first.kind, self.second.kind)
    }

    fn get_vint(&self, dms: &Densities) -> PairPotentials {
        let mut vint = PairPotentials::new();
        for (target, source) in [(&self.first, &self.second), (&self.second, &self.first)] {
            if let Some(dm) = dms.get(&source.kind) {
                let v = Self::potential_on(target, source, &dm.total());
                vint.insert(target.kind, PotentialMatrix::untagged(v));
            }
        }
        vint
    }
}
