//! Pairwise interactions between components
//!
//! Every pair of components interacts through Coulomb. An electron /
//! quantum-hydrogen pair may additionally carry electron-proton correlation,
//! in which case both potentials come back tagged with the correlation energy
//! and the plain Coulomb matrices.

mod coulomb;
mod correlation;

pub use coulomb::InteractionCoulomb;
pub use correlation::InteractionCorrelation;

use crate::component::{ComponentKind, Densities};
use crate::potential::PotentialMatrix;
use std::collections::BTreeMap;

/// Potentials of the members of one pair, keyed by member.
pub type PairPotentials = BTreeMap<ComponentKind, PotentialMatrix>;

/// One unordered pair of interacting components.
pub trait Interaction: Send + Sync {
    fn pair(&self) -> (ComponentKind, ComponentKind);

    /// Potentials felt by the members given the current densities. A member
    /// is left out when its partner's density is not available.
    fn get_vint(&self, dms: &Densities) -> PairPotentials;
}
