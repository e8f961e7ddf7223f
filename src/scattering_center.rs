//! Capabilities a material needs from the atoms/nuclides it is made of.
//!
//! A scattering center owns its own cross section data and collision
//! physics. Materials never mutate a center; they hold `Arc` handles so one
//! set of nuclear data can be shared by every material and every worker
//! thread that references it.

use crate::bank::ParticleBank;
use crate::particle::Particle;
use rand::Rng;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Energy dependent cross sections and collision physics of one constituent.
///
/// Energies are in the units of the underlying data (MeV for the photon
/// tables, eV for neutron tables). Cross sections are microscopic, in barns.
pub trait ScatteringCenter: Send + Sync {
    /// Reaction identifier used by this kind of center (an MT number, a
    /// photoatomic reaction enum, ...).
    type ReactionType: Copy + Eq + Hash + Debug;

    /// Atomic weight in g/mol, used by the weight/mass density conversions.
    fn atomic_weight(&self) -> f64;

    fn total_cross_section(&self, energy: f64) -> f64;

    fn absorption_cross_section(&self, energy: f64) -> f64;

    /// Cross section of a single reaction; zero when the center does not
    /// have that reaction.
    fn reaction_cross_section(&self, energy: f64, reaction: Self::ReactionType) -> f64;

    /// Microscopic survival probability `1 - σa/σt` (one when `σt` is zero).
    fn survival_probability(&self, energy: f64) -> f64 {
        let total = self.total_cross_section(energy);

        if total > 0.0 {
            (1.0 - self.absorption_cross_section(energy) / total).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    fn absorption_reaction_types(&self) -> HashSet<Self::ReactionType>;

    fn scattering_reaction_types(&self) -> HashSet<Self::ReactionType>;

    fn misc_reaction_types(&self) -> HashSet<Self::ReactionType>;

    /// Every reaction the center knows about, including summary reactions.
    fn reaction_types(&self) -> HashSet<Self::ReactionType> {
        let mut types = self.absorption_reaction_types();
        types.extend(self.scattering_reaction_types());
        types.extend(self.misc_reaction_types());
        types
    }

    /// Analogue collision: an absorption terminates the particle.
    fn collide_analogue<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        bank: &mut ParticleBank,
        rng: &mut R,
    );

    /// Survival biased collision: absorption is replaced by a weight
    /// reduction by this center's survival probability.
    fn collide_survival_bias<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        bank: &mut ParticleBank,
        rng: &mut R,
    );
}

/// Extra capabilities of centers used in adjoint (reversed-time) transport.
pub trait AdjointScatteringCenter: ScatteringCenter {
    /// Sum of the discrete reactions that exist exactly at `energy`; zero
    /// away from a line energy.
    fn total_line_energy_cross_section(&self, energy: f64) -> f64;

    /// Total cross section of the forward (physical) process.
    fn total_forward_cross_section(&self, energy: f64) -> f64;

    fn does_energy_have_line_energy_reaction(&self, energy: f64) -> bool;

    /// Collide a probe particle through one of the line-energy reactions.
    fn collide_at_line_energy<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        bank: &mut ParticleBank,
        rng: &mut R,
    );
}
