// Particle banking for secondaries produced during a collision.
//
// A collision may create new particles (fluorescence, pair production,
// line-energy conversions) that must be transported later in the same
// history. They are pushed here and popped in FIFO order by the transport
// loop.

use crate::particle::Particle;
use std::collections::VecDeque;

/// Per-history queue of particles waiting to be transported.
///
/// Each worker owns its own bank, so no synchronisation is needed.
#[derive(Debug)]
pub struct ParticleBank {
    queue: VecDeque<Particle>,
}

impl ParticleBank {
    pub fn new() -> Self {
        ParticleBank {
            queue: VecDeque::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ParticleBank {
            queue: VecDeque::with_capacity(capacity),
        }
    }

    /// Bank a secondary particle created by a reaction.
    pub fn push(&mut self, particle: Particle) {
        self.queue.push_back(particle);
    }

    /// Next particle to transport, or `None` when the history is finished.
    pub fn pop(&mut self) -> Option<Particle> {
        self.queue.pop_front()
    }

    /// Peek at the oldest banked particle.
    pub fn front(&self) -> Option<&Particle> {
        self.queue.front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.queue.iter()
    }
}

impl Default for ParticleBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleType;

    fn photon(energy: f64) -> Particle {
        Particle::new(ParticleType::Photon, [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], energy)
    }

    #[test]
    fn test_particle_bank_basic() {
        let mut bank = ParticleBank::new();
        assert!(bank.is_empty());
        assert_eq!(bank.len(), 0);

        bank.push(photon(1.0));
        assert_eq!(bank.len(), 1);
        assert!(!bank.is_empty());
        assert_eq!(bank.front().unwrap().energy, 1.0);

        let retrieved = bank.pop().unwrap();
        assert_eq!(retrieved.energy, 1.0);
        assert!(bank.is_empty());
        assert!(bank.pop().is_none());
    }

    #[test]
    fn test_particle_bank_is_fifo() {
        let mut bank = ParticleBank::with_capacity(4);
        bank.push(photon(14.0));
        bank.push(photon(7.0));
        bank.push(photon(0.511));

        let energies: Vec<f64> = bank.iter().map(|p| p.energy).collect();
        assert_eq!(energies, vec![14.0, 7.0, 0.511]);

        assert_eq!(bank.pop().unwrap().energy, 14.0);
        assert_eq!(bank.pop().unwrap().energy, 7.0);

        bank.clear();
        assert!(bank.is_empty());
    }
}
