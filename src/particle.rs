use serde::{Deserialize, Serialize};

/// Kind of particle being transported.
///
/// Scattering centers are written for one kind each (photoatoms for photons,
/// adjoint photoatoms for adjoint photons, ...); the material layer only
/// reads it when routing adjoint probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleType {
    Neutron,
    Photon,
    Electron,
    Positron,
    AdjointNeutron,
    AdjointPhoton,
    AdjointElectron,
}

impl ParticleType {
    /// True for the reversed-time particle kinds.
    pub fn is_adjoint(self) -> bool {
        matches!(
            self,
            ParticleType::AdjointNeutron | ParticleType::AdjointPhoton | ParticleType::AdjointElectron
        )
    }
}

/// State of a single particle during one history.
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: u64,
    pub kind: ParticleType,
    pub position: [f64; 3],
    pub direction: [f64; 3],
    pub energy: f64,
    /// Statistical weight; reduced rather than killed under survival biasing.
    pub weight: f64,
    /// Adjoint probes sample the discrete line-energy channels only.
    pub probe: bool,
    pub alive: bool,
}

impl Particle {
    pub fn new(kind: ParticleType, position: [f64; 3], direction: [f64; 3], energy: f64) -> Self {
        Self {
            id: 0,
            kind,
            position,
            direction,
            energy,
            weight: 1.0,
            probe: false,
            alive: true,
        }
    }

    /// Create an adjoint probe particle at a line energy.
    pub fn probe(kind: ParticleType, position: [f64; 3], direction: [f64; 3], energy: f64) -> Self {
        Self {
            probe: true,
            ..Self::new(kind, position, direction, energy)
        }
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn multiply_weight(&mut self, factor: f64) {
        debug_assert!(factor >= 0.0);
        self.weight *= factor;
    }

    /// Terminate the history of this particle.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Create a secondary that inherits position, kind and weight.
    pub fn spawn_secondary(&self, direction: [f64; 3], energy: f64) -> Self {
        Self {
            id: self.id,
            kind: self.kind,
            position: self.position,
            direction,
            energy,
            weight: self.weight,
            probe: false,
            alive: true,
        }
    }
}
