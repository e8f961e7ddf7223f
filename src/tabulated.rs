use crate::bank::ParticleBank;
use crate::error::{MaterialError, Result};
use crate::particle::Particle;
use crate::physics::{isotropic_scatter, sample_isotropic_direction};
use crate::scattering_center::{AdjointScatteringCenter, ScatteringCenter};
use crate::utilities::{interpolate_linear, interpolate_log_log};
use log::{debug, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// How a reaction contributes to a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionClass {
    /// Removes the particle (analogue) or reduces its weight (survival bias).
    Absorption,
    /// Redirects the particle, keeping it alive.
    Scattering,
    /// Tallied only; not part of the total and never sampled.
    Misc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    LinLin,
    LogLog,
}

/// A cross section tabulated on its own energy grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tabulation {
    pub energy: Vec<f64>,
    /// Cross section values in barns, one per energy point.
    pub cross_section: Vec<f64>,
}

impl Tabulation {
    pub fn evaluate(&self, energy: f64, interpolation: Interpolation) -> f64 {
        match interpolation {
            Interpolation::LinLin => interpolate_linear(&self.energy, &self.cross_section, energy),
            Interpolation::LogLog => interpolate_log_log(&self.energy, &self.cross_section, energy),
        }
    }

    fn validate(&self, what: &str, interpolation: Interpolation) -> Result<()> {
        let invalid = |reason: &str| {
            Err(MaterialError::InvalidConfiguration(format!("{}: {}", what, reason)))
        };

        if self.energy.is_empty() {
            return invalid("empty energy grid");
        }
        if self.energy.len() != self.cross_section.len() {
            return invalid("energy and cross section lengths differ");
        }
        if self.energy.windows(2).any(|pair| pair[0] >= pair[1]) {
            return invalid("energy grid is not strictly increasing");
        }
        if self.cross_section.iter().any(|xs| !(*xs >= 0.0) || !xs.is_finite()) {
            return invalid("cross sections must be finite and non-negative");
        }
        if interpolation == Interpolation::LogLog
            && self.energy.iter().chain(&self.cross_section).any(|v| *v <= 0.0)
        {
            return invalid("log-log interpolation needs positive energies and cross sections");
        }

        Ok(())
    }
}

/// One reaction channel, identified by its ENDF/MT number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabulatedReaction {
    pub mt: i32,
    pub class: ReactionClass,
    #[serde(flatten)]
    pub data: Tabulation,
    /// Fraction of the incoming energy lost in a scatter.
    #[serde(default)]
    pub energy_loss_fraction: f64,
}

/// Discrete adjoint channel that only exists at one exact energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineEnergyReaction {
    pub mt: i32,
    pub energy: f64,
    pub cross_section: f64,
    /// Energy the particle leaves the reaction with.
    pub outgoing_energy: f64,
}

/// Scattering center backed by tabulated cross sections.
///
/// ```json
/// {
///   "name": "H",
///   "atomic_weight": 1.008,
///   "reactions": [
///     { "mt": 2, "class": "scattering", "energy": [1e-5, 20.0], "cross_section": [20.0, 1.0] },
///     { "mt": 102, "class": "absorption", "energy": [1e-5, 20.0], "cross_section": [0.3, 0.0] }
///   ]
/// }
/// ```
///
/// The total cross section is the sum of the absorption and scattering
/// channels. For adjoint use an optional `forward_total` and a list of
/// `line_energy_reactions` can be supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabulatedAtom {
    pub name: String,
    /// g/mol
    pub atomic_weight: f64,
    #[serde(default)]
    pub interpolation: Interpolation,
    pub reactions: Vec<TabulatedReaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_total: Option<Tabulation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_energy_reactions: Vec<LineEnergyReaction>,
}

impl TabulatedAtom {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let atom: TabulatedAtom = serde_json::from_str(json)?;
        atom.validate()?;
        debug!(
            "loaded '{}' with {} reactions and {} line energy reactions",
            atom.name,
            atom.reactions.len(),
            atom.line_energy_reactions.len()
        );
        Ok(atom)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check grids, classes and line data; called by the JSON loaders.
    pub fn validate(&self) -> Result<()> {
        if !(self.atomic_weight > 0.0) || !self.atomic_weight.is_finite() {
            return Err(MaterialError::InvalidConfiguration(format!(
                "'{}' atomic weight must be positive, got {}",
                self.name, self.atomic_weight
            )));
        }

        let mut seen = HashSet::new();
        for reaction in &self.reactions {
            if !seen.insert(reaction.mt) {
                return Err(MaterialError::InvalidConfiguration(format!(
                    "'{}' has more than one MT {} reaction",
                    self.name, reaction.mt
                )));
            }
            if !(0.0..=1.0).contains(&reaction.energy_loss_fraction) {
                return Err(MaterialError::InvalidConfiguration(format!(
                    "'{}' MT {} energy loss fraction {} is outside [0, 1]",
                    self.name, reaction.mt, reaction.energy_loss_fraction
                )));
            }
            reaction
                .data
                .validate(&format!("'{}' MT {}", self.name, reaction.mt), self.interpolation)?;
        }

        if let Some(forward) = &self.forward_total {
            forward.validate(&format!("'{}' forward total", self.name), self.interpolation)?;
        }

        for line in &self.line_energy_reactions {
            if !(line.energy > 0.0) || !(line.outgoing_energy > 0.0) || !(line.cross_section >= 0.0) {
                return Err(MaterialError::InvalidConfiguration(format!(
                    "'{}' line energy reaction MT {} needs positive energies and a non-negative cross section",
                    self.name, line.mt
                )));
            }
        }

        Ok(())
    }

    fn reactions_of(&self, class: ReactionClass) -> impl Iterator<Item = &TabulatedReaction> {
        self.reactions.iter().filter(move |r| r.class == class)
    }

    fn class_cross_section(&self, energy: f64, class: ReactionClass) -> f64 {
        self.reactions_of(class)
            .map(|r| r.data.evaluate(energy, self.interpolation))
            .sum()
    }

    fn class_types(&self, class: ReactionClass) -> HashSet<i32> {
        self.reactions_of(class).map(|r| r.mt).collect()
    }

    fn line_reactions_at(&self, energy: f64) -> impl Iterator<Item = &LineEnergyReaction> {
        self.line_energy_reactions
            .iter()
            .filter(move |line| line.energy == energy)
    }

    /// Pick one reaction in proportion to its cross section.
    fn sample_reaction<'a, R, I>(&'a self, energy: f64, candidates: I, rng: &mut R) -> Option<&'a TabulatedReaction>
    where
        R: Rng + ?Sized,
        I: Iterator<Item = &'a TabulatedReaction>,
    {
        let weighted: Vec<(f64, &TabulatedReaction)> = candidates
            .map(|r| (r.data.evaluate(energy, self.interpolation), r))
            .filter(|(xs, _)| *xs > 0.0)
            .collect();

        pick_weighted(&weighted, rng)
    }

    fn scatter<R: Rng + ?Sized>(&self, particle: &mut Particle, rng: &mut R) {
        let reaction = self.sample_reaction(
            particle.energy(),
            self.reactions_of(ReactionClass::Scattering),
            rng,
        );

        if let Some(reaction) = reaction {
            trace!("'{}': MT {} scatter at {}", self.name, reaction.mt, particle.energy());
            isotropic_scatter(particle, reaction.energy_loss_fraction, rng);
        }
    }
}

fn pick_weighted<'a, T, R: Rng + ?Sized>(weighted: &[(f64, &'a T)], rng: &mut R) -> Option<&'a T> {
    let total: f64 = weighted.iter().map(|(w, _)| w).sum();
    if !(total > 0.0) {
        return None;
    }

    let threshold = rng.gen::<f64>() * total;
    let mut partial_sum = 0.0;
    for (w, item) in weighted {
        partial_sum += w;
        if partial_sum > threshold {
            return Some(*item);
        }
    }

    // rounding in the partial sums
    weighted.last().map(|(_, item)| *item)
}

impl ScatteringCenter for TabulatedAtom {
    type ReactionType = i32;

    fn atomic_weight(&self) -> f64 {
        self.atomic_weight
    }

    fn total_cross_section(&self, energy: f64) -> f64 {
        self.class_cross_section(energy, ReactionClass::Absorption)
            + self.class_cross_section(energy, ReactionClass::Scattering)
    }

    fn absorption_cross_section(&self, energy: f64) -> f64 {
        self.class_cross_section(energy, ReactionClass::Absorption)
    }

    fn reaction_cross_section(&self, energy: f64, reaction: i32) -> f64 {
        self.reactions
            .iter()
            .find(|r| r.mt == reaction)
            .map_or(0.0, |r| r.data.evaluate(energy, self.interpolation))
    }

    fn absorption_reaction_types(&self) -> HashSet<i32> {
        self.class_types(ReactionClass::Absorption)
    }

    fn scattering_reaction_types(&self) -> HashSet<i32> {
        self.class_types(ReactionClass::Scattering)
    }

    fn misc_reaction_types(&self) -> HashSet<i32> {
        self.class_types(ReactionClass::Misc)
    }

    fn collide_analogue<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) {
        let reaction = self.sample_reaction(
            particle.energy(),
            self.reactions
                .iter()
                .filter(|r| r.class != ReactionClass::Misc),
            rng,
        );

        match reaction {
            Some(r) if r.class == ReactionClass::Absorption => {
                trace!("'{}': MT {} absorption at {}", self.name, r.mt, particle.energy());
                particle.kill();
            }
            Some(r) => {
                trace!("'{}': MT {} scatter at {}", self.name, r.mt, particle.energy());
                isotropic_scatter(particle, r.energy_loss_fraction, rng);
            }
            None => {}
        }
    }

    fn collide_survival_bias<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) {
        let energy = particle.energy();
        let scattering = self.class_cross_section(energy, ReactionClass::Scattering);

        if scattering > 0.0 {
            particle.multiply_weight(self.survival_probability(energy));
            self.scatter(particle, rng);
        } else {
            particle.kill();
        }
    }
}

impl AdjointScatteringCenter for TabulatedAtom {
    fn total_line_energy_cross_section(&self, energy: f64) -> f64 {
        self.line_reactions_at(energy).map(|line| line.cross_section).sum()
    }

    /// Falls back to the adjoint total when no forward data was given.
    fn total_forward_cross_section(&self, energy: f64) -> f64 {
        match &self.forward_total {
            Some(forward) => forward.evaluate(energy, self.interpolation),
            None => self.total_cross_section(energy),
        }
    }

    fn does_energy_have_line_energy_reaction(&self, energy: f64) -> bool {
        self.line_reactions_at(energy).any(|line| line.cross_section > 0.0)
    }

    /// The probe ends here; the reaction product is banked as an ordinary
    /// particle at the outgoing energy.
    fn collide_at_line_energy<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) {
        let weighted: Vec<(f64, &LineEnergyReaction)> = self
            .line_reactions_at(particle.energy())
            .map(|line| (line.cross_section, line))
            .collect();

        let line = match pick_weighted(&weighted, rng) {
            Some(line) => line,
            None => panic!(
                "'{}' has no line energy reaction at {}",
                self.name,
                particle.energy()
            ),
        };

        trace!(
            "'{}': line MT {} at {} -> {}",
            self.name,
            line.mt,
            line.energy,
            line.outgoing_energy
        );

        let direction = sample_isotropic_direction(rng);
        bank.push(particle.spawn_secondary(direction, line.outgoing_energy));
        particle.kill();
    }
}
