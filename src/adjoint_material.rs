use crate::bank::ParticleBank;
use crate::error::{MaterialError, Result};
use crate::material::{CollisionMode, Material};
use crate::particle::Particle;
use crate::scattering_center::AdjointScatteringCenter;
use log::trace;
use rand::Rng;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

/// Material for adjoint (reversed-time) transport.
///
/// Wraps a [`Material`] and adds the line-energy sampling channel used by
/// probe particles, plus the weight factors that relate adjoint tallies to
/// the forward process. Every ordinary query is available through `Deref`.
#[derive(Debug)]
pub struct AdjointMaterial<C> {
    material: Material<C>,
    /// Energies at which callers force probe particles; stored and handed
    /// back as given, never read by the collision routines.
    critical_line_energies: Vec<f64>,
}

impl<C: AdjointScatteringCenter> AdjointMaterial<C> {
    /// Build an adjoint material; see [`Material::new`] for the fraction and
    /// density conventions. `critical_line_energies` must be positive and
    /// strictly increasing.
    pub fn new<S: AsRef<str>>(
        id: u32,
        density: f64,
        centers: &HashMap<String, Arc<C>>,
        fractions: &[f64],
        names: &[S],
        critical_line_energies: Vec<f64>,
    ) -> Result<Self> {
        let material = Material::new(id, density, centers, fractions, names)?;

        Self::from_material(material, critical_line_energies)
    }

    pub fn from_material(material: Material<C>, critical_line_energies: Vec<f64>) -> Result<Self> {
        if critical_line_energies.iter().any(|energy| !(*energy > 0.0) || !energy.is_finite()) {
            return Err(MaterialError::InvalidConfiguration(format!(
                "material {} critical line energies must be positive: {:?}",
                material.id(),
                critical_line_energies
            )));
        }

        if critical_line_energies.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(MaterialError::InvalidConfiguration(format!(
                "material {} critical line energies must be strictly increasing: {:?}",
                material.id(),
                critical_line_energies
            )));
        }

        Ok(AdjointMaterial {
            material,
            critical_line_energies,
        })
    }

    pub fn material(&self) -> &Material<C> {
        &self.material
    }

    /// Line energies supplied at construction, for the transport driver
    /// that creates probe particles.
    pub fn critical_line_energies(&self) -> &[f64] {
        &self.critical_line_energies
    }

    /// True if any constituent has a reaction channel exactly at `energy`.
    pub fn does_energy_have_line_energy_reaction(&self, energy: f64) -> bool {
        self.material
            .constituents()
            .any(|(_, center)| center.does_energy_have_line_energy_reaction(energy))
    }

    pub fn macroscopic_total_line_energy_cross_section(&self, energy: f64) -> f64 {
        self.material
            .macroscopic_cross_section(energy, C::total_line_energy_cross_section)
    }

    pub fn macroscopic_total_forward_cross_section(&self, energy: f64) -> f64 {
        self.material
            .macroscopic_cross_section(energy, C::total_forward_cross_section)
    }

    /// Σt,adjoint / Σt,forward, or one where the forward total is zero.
    pub fn adjoint_weight_factor(&self, energy: f64) -> f64 {
        let forward = self.macroscopic_total_forward_cross_section(energy);

        let weight_factor = if forward > 0.0 {
            self.material.macroscopic_total_cross_section(energy) / forward
        } else {
            1.0
        };

        debug_assert!(weight_factor > 0.0, "adjoint weight factor {} at {}", weight_factor, energy);

        weight_factor
    }

    /// Σline / Σt,forward, or one where the forward total is zero.
    pub fn adjoint_line_energy_weight_factor(&self, energy: f64) -> f64 {
        let forward = self.macroscopic_total_forward_cross_section(energy);

        let weight_factor = if forward > 0.0 {
            self.macroscopic_total_line_energy_cross_section(energy) / forward
        } else {
            1.0
        };

        debug_assert!(weight_factor >= 0.0);

        weight_factor
    }

    /// Collide a probe particle through a line-energy reaction.
    ///
    /// The constituent is sampled with the same cumulative walk as an
    /// ordinary collision, weighted by `Nᵢ · σline,ᵢ(E)`.
    ///
    /// # Panics
    /// If the particle is not a probe or there is no line-energy reaction
    /// at its energy.
    pub fn collide_at_line_energy<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) {
        assert!(particle.probe, "only probe particles can collide at a line energy");
        assert!(
            self.does_energy_have_line_energy_reaction(particle.energy()),
            "material {} has no line energy reaction at {}",
            self.material.id(),
            particle.energy()
        );

        let i = self.material.sample_constituent_index(
            particle.energy(),
            rng,
            C::total_line_energy_cross_section,
        );

        trace!(
            "material {}: line energy collision with {:?}",
            self.material.id(),
            self.material.constituent_name(i)
        );

        if let Some((_, center)) = self.material.constituents().nth(i) {
            center.collide_at_line_energy(particle, bank, rng);
        }
    }

    /// Probes at a line energy take the line channel; every other particle,
    /// probes included, collides through the ordinary material path.
    fn is_line_energy_collision(&self, particle: &Particle) -> bool {
        particle.probe && self.does_energy_have_line_energy_reaction(particle.energy())
    }

    pub fn collide_analogue<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) {
        if self.is_line_energy_collision(particle) {
            self.collide_at_line_energy(particle, bank, rng);
        } else {
            self.material.collide_analogue(particle, bank, rng);
        }
    }

    /// Ordinary adjoint particles take the standard survival biased path.
    pub fn collide_survival_bias<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) {
        if self.is_line_energy_collision(particle) {
            self.collide_at_line_energy(particle, bank, rng);
        } else {
            self.material.collide_survival_bias(particle, bank, rng);
        }
    }

    pub fn collide<R: Rng + ?Sized>(
        &self,
        mode: CollisionMode,
        particle: &mut Particle,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) {
        match mode {
            CollisionMode::Analogue => self.collide_analogue(particle, bank, rng),
            CollisionMode::SurvivalBias => self.collide_survival_bias(particle, bank, rng),
        }
    }
}

impl<C> Deref for AdjointMaterial<C> {
    type Target = Material<C>;

    fn deref(&self) -> &Material<C> {
        &self.material
    }
}
