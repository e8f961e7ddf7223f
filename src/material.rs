use crate::bank::ParticleBank;
use crate::constants::INVALID_MATERIAL_ID;
use crate::error::{MaterialError, Result};
use crate::fractions::{
    are_fractions_valid, convert_mass_density_to_number_density,
    convert_weight_fractions_to_atom_fractions, normalize_fractions,
    scale_fractions_by_number_density,
};
use crate::particle::Particle;
use crate::scattering_center::ScatteringCenter;
use log::{debug, info, trace, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// How a material dispatches a collision to the sampled constituent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionMode {
    /// Absorption terminates the history.
    #[default]
    Analogue,
    /// Absorption reduces the particle weight instead of killing it.
    SurvivalBias,
}

/// A homogeneous mixture of scattering centers.
///
/// A `Material` is built once from signed fractions and a signed density and
/// is immutable afterwards, so a single instance can be shared (behind an
/// `Arc`) by every history and every worker thread that tracks particles
/// through it.
///
/// Construction follows two sign conventions:
/// * negative fractions are weight fractions, positive fractions are atom
///   fractions (mixed signs are rejected);
/// * a negative density is a mass density in g/cm³, a positive density is a
///   number density in atoms/(b·cm).
///
/// After construction each constituent carries its absolute number density
/// (the normalized atom fraction times the material number density), in the
/// order the constituents were given. That order is the order used by the
/// cumulative walk in [`Material::sample_constituent_index`].
#[derive(Debug)]
pub struct Material<C> {
    id: u32,
    number_density: f64,
    /// (number density, center) in insertion order
    constituents: Vec<(f64, Arc<C>)>,
    names: Vec<String>,
    name_index: HashMap<String, usize>,
}

impl<C: ScatteringCenter> Material<C> {
    /// Build a material from signed fractions and a signed density.
    ///
    /// `centers` maps constituent names to their scattering centers; it may
    /// contain entries the material does not use.
    pub fn new<S: AsRef<str>>(
        id: u32,
        density: f64,
        centers: &HashMap<String, Arc<C>>,
        fractions: &[f64],
        names: &[S],
    ) -> Result<Self> {
        if id >= INVALID_MATERIAL_ID {
            return Err(MaterialError::InvalidConfiguration(format!(
                "material id {} is reserved as the invalid id",
                id
            )));
        }

        if density == 0.0 || !density.is_finite() {
            return Err(MaterialError::InvalidConfiguration(format!(
                "material {} has an invalid density ({})",
                id, density
            )));
        }

        let signed: Vec<(f64, ())> = fractions.iter().map(|fraction| (*fraction, ())).collect();
        if !are_fractions_valid(&signed) {
            return Err(MaterialError::InvalidConfiguration(format!(
                "material {} fractions must be non-zero and share one sign: {:?}",
                id, fractions
            )));
        }

        if fractions.len() != names.len() {
            return Err(MaterialError::InvalidConfiguration(format!(
                "material {} has {} fractions but {} constituent names",
                id,
                fractions.len(),
                names.len()
            )));
        }

        let mut constituents = Vec::with_capacity(fractions.len());
        let mut name_list = Vec::with_capacity(names.len());
        let mut name_index = HashMap::with_capacity(names.len());

        for (i, (fraction, name)) in fractions.iter().zip(names).enumerate() {
            let name = name.as_ref();

            let center = centers
                .get(name)
                .ok_or_else(|| MaterialError::UnknownConstituent(name.to_string()))?;

            if name_index.insert(name.to_string(), i).is_some() {
                return Err(MaterialError::DuplicateConstituent(name.to_string()));
            }

            constituents.push((*fraction, Arc::clone(center)));
            name_list.push(name.to_string());
        }

        let weight_fractions = fractions[0] < 0.0;
        let mass_density = density < 0.0;

        if weight_fractions || mass_density {
            if let Some((_, center)) = constituents
                .iter()
                .find(|(_, center)| !(center.atomic_weight() > 0.0))
            {
                return Err(MaterialError::InvalidConfiguration(format!(
                    "material {} needs atomic weights but a constituent reports {}",
                    id,
                    center.atomic_weight()
                )));
            }
        }

        // Subnormal or overflowing sums cannot be normalized reliably.
        let norm = if weight_fractions {
            constituents
                .iter()
                .map(|(fraction, center)| -fraction / center.atomic_weight())
                .sum::<f64>()
        } else {
            constituents.iter().map(|(fraction, _)| *fraction).sum::<f64>()
        };
        if !norm.is_normal() {
            return Err(MaterialError::InvalidConfiguration(format!(
                "material {} fractions cannot be normalized (sum {:e}): {:?}",
                id, norm, fractions
            )));
        }

        if weight_fractions {
            debug!("material {}: converting weight fractions to atom fractions", id);
            convert_weight_fractions_to_atom_fractions(&mut constituents, |center| {
                center.atomic_weight()
            });
        } else {
            normalize_fractions(&mut constituents);
        }

        let number_density = if mass_density {
            let number_density =
                convert_mass_density_to_number_density(-density, &constituents, |center| {
                    center.atomic_weight()
                });
            debug!(
                "material {}: mass density {} g/cm3 -> {} atoms/b-cm",
                id, -density, number_density
            );
            number_density
        } else {
            density
        };

        scale_fractions_by_number_density(number_density, &mut constituents);

        info!(
            "material {} built: {} constituents, number density {:e} atoms/b-cm",
            id,
            constituents.len(),
            number_density
        );

        Ok(Material {
            id,
            number_density,
            constituents,
            names: name_list,
            name_index,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Total number density in atoms/(b·cm).
    pub fn number_density(&self) -> f64 {
        self.number_density
    }

    pub fn len(&self) -> usize {
        self.constituents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constituents.is_empty()
    }

    /// Constituent names in insertion order.
    pub fn constituent_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// (number density, center) pairs in insertion order.
    pub fn constituents(&self) -> impl Iterator<Item = (f64, &Arc<C>)> {
        self.constituents
            .iter()
            .map(|(number_density, center)| (*number_density, center))
    }

    pub fn has_constituent(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    fn constituent_position(&self, name: &str) -> Result<usize> {
        self.name_index
            .get(name)
            .copied()
            .ok_or_else(|| MaterialError::UnknownConstituent(name.to_string()))
    }

    /// The scattering center registered under `name`.
    pub fn constituent(&self, name: &str) -> Result<&Arc<C>> {
        let i = self.constituent_position(name)?;
        Ok(&self.constituents[i].1)
    }

    /// Number density of one constituent in atoms/(b·cm).
    pub fn constituent_number_density(&self, name: &str) -> Result<f64> {
        let i = self.constituent_position(name)?;
        Ok(self.constituents[i].0)
    }

    /// Σᵢ Nᵢ · σᵢ(E) for any microscopic cross section.
    ///
    /// `evaluator` picks which microscopic cross section of a center is
    /// aggregated (total, absorption, a single reaction, ...).
    #[inline]
    pub fn macroscopic_cross_section<F>(&self, energy: f64, evaluator: F) -> f64
    where
        F: Fn(&C, f64) -> f64,
    {
        debug_assert!(energy > 0.0 && energy.is_finite());

        self.constituents
            .iter()
            .map(|(number_density, center)| number_density * evaluator(center.as_ref(), energy))
            .sum()
    }

    pub fn macroscopic_total_cross_section(&self, energy: f64) -> f64 {
        self.macroscopic_cross_section(energy, C::total_cross_section)
    }

    pub fn macroscopic_absorption_cross_section(&self, energy: f64) -> f64 {
        self.macroscopic_cross_section(energy, C::absorption_cross_section)
    }

    pub fn macroscopic_reaction_cross_section(&self, energy: f64, reaction: C::ReactionType) -> f64 {
        self.macroscopic_cross_section(energy, |center, energy| {
            center.reaction_cross_section(energy, reaction)
        })
    }

    /// `1 - Σa/Σt`, or one when the total cross section is zero.
    pub fn survival_probability(&self, energy: f64) -> f64 {
        let total = self.macroscopic_total_cross_section(energy);

        let survival_probability = if total > 0.0 {
            1.0 - self.macroscopic_absorption_cross_section(energy) / total
        } else {
            1.0
        };

        // Round-off can push a pure absorber slightly outside [0, 1]
        survival_probability.clamp(0.0, 1.0)
    }

    /// Mean free path 1/Σt in cm, `None` where the material is transparent.
    pub fn mean_free_path(&self, energy: f64) -> Option<f64> {
        let total = self.macroscopic_total_cross_section(energy);

        if total > 0.0 {
            Some(1.0 / total)
        } else {
            None
        }
    }

    /// Sample an exponential free-flight distance in cm.
    /// Returns `None` if the total cross section is zero.
    pub fn sample_distance_to_collision<R: Rng + ?Sized>(
        &self,
        energy: f64,
        rng: &mut R,
    ) -> Option<f64> {
        let total = self.macroscopic_total_cross_section(energy);

        if total <= 0.0 {
            return None;
        }

        // 1 - ξ lies in (0, 1], avoiding ln(0)
        let xi = 1.0 - rng.gen::<f64>();
        Some(-xi.ln() / total)
    }

    fn collect_reaction_types<F>(&self, types_of: F) -> HashSet<C::ReactionType>
    where
        F: Fn(&C) -> HashSet<C::ReactionType>,
    {
        let mut types = HashSet::new();
        for (_, center) in &self.constituents {
            types.extend(types_of(center.as_ref()));
        }
        types
    }

    /// Union of the absorption reactions of every constituent.
    pub fn absorption_reaction_types(&self) -> HashSet<C::ReactionType> {
        self.collect_reaction_types(C::absorption_reaction_types)
    }

    pub fn scattering_reaction_types(&self) -> HashSet<C::ReactionType> {
        self.collect_reaction_types(C::scattering_reaction_types)
    }

    pub fn misc_reaction_types(&self) -> HashSet<C::ReactionType> {
        self.collect_reaction_types(C::misc_reaction_types)
    }

    pub fn reaction_types(&self) -> HashSet<C::ReactionType> {
        self.collect_reaction_types(C::reaction_types)
    }

    /// Sample the index of the constituent a particle interacts with.
    ///
    /// A threshold `ξ · Σ(E)` is drawn and the constituents are walked in
    /// insertion order, accumulating `Nᵢ · σᵢ(E)`; the first index whose
    /// partial sum exceeds the threshold is returned. The threshold and the
    /// walk must use the same `evaluator`.
    ///
    /// # Panics
    /// If the macroscopic cross section is zero, or if the walk exhausts the
    /// constituents without crossing the threshold (an aggregation bug).
    pub fn sample_constituent_index<R, F>(&self, energy: f64, rng: &mut R, evaluator: F) -> usize
    where
        R: Rng + ?Sized,
        F: Fn(&C, f64) -> f64,
    {
        let macroscopic_cross_section = self.macroscopic_cross_section(energy, &evaluator);

        if !(macroscopic_cross_section > 0.0) {
            panic!(
                "material {}: cannot sample a constituent at energy {}, macroscopic cross section is {}",
                self.id, energy, macroscopic_cross_section
            );
        }

        let threshold = rng.gen::<f64>() * macroscopic_cross_section;

        let mut partial_sum = 0.0;

        for (i, (number_density, center)) in self.constituents.iter().enumerate() {
            partial_sum += number_density * evaluator(center.as_ref(), energy);

            if partial_sum > threshold {
                trace!("material {}: sampled constituent {} at energy {}", self.id, i, energy);
                return i;
            }
        }

        panic!(
            "material {}: constituent sampling failed at energy {} (threshold {}, accumulated {} of {})",
            self.id, energy, threshold, partial_sum, macroscopic_cross_section
        );
    }

    /// Sample a constituent weighted by its macroscopic total cross section.
    pub fn sample_collision_constituent<R: Rng + ?Sized>(&self, energy: f64, rng: &mut R) -> usize {
        self.sample_constituent_index(energy, rng, C::total_cross_section)
    }

    /// Name of the constituent at a sampled index.
    pub fn constituent_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// A transparent material leaves the particle untouched.
    fn collision_constituent<R: Rng + ?Sized>(&self, energy: f64, rng: &mut R) -> Option<usize> {
        if self.macroscopic_total_cross_section(energy) > 0.0 {
            Some(self.sample_collision_constituent(energy, rng))
        } else {
            warn!(
                "material {}: collision requested at energy {} where the total cross section is zero",
                self.id, energy
            );
            None
        }
    }

    /// Collide a particle, terminating it on absorption.
    pub fn collide_analogue<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) {
        if let Some(i) = self.collision_constituent(particle.energy(), rng) {
            self.constituents[i]
                .1
                .collide_analogue(particle, bank, rng);
        }
    }

    /// Collide a particle with survival biasing.
    ///
    /// The constituent is sampled first and only that constituent's
    /// microscopic survival probability is applied to the weight.
    pub fn collide_survival_bias<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) {
        if let Some(i) = self.collision_constituent(particle.energy(), rng) {
            self.constituents[i]
                .1
                .collide_survival_bias(particle, bank, rng);
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
