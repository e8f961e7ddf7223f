//! Material composition and collision sampling for Monte Carlo particle
//! transport.
//!
//! A [`Material`] is a homogeneous mixture of scattering centers built from
//! signed fractions and a signed density. It answers macroscopic cross
//! section queries and samples which constituent a particle collides with.
//! [`AdjointMaterial`] adds the line-energy channel used by adjoint probes.

pub mod adjoint_material;
pub mod bank;
pub mod config;
pub mod constants;
pub mod error;
pub mod fast_rng;
pub mod fractions;
pub mod material;
pub mod materials;
pub mod particle;
pub mod physics;
pub mod scattering_center;
pub mod tabulated;
pub mod utilities;

pub use adjoint_material::AdjointMaterial;
pub use bank::ParticleBank;
pub use config::{Config, ConstituentDefinition, MaterialDefinition, CONFIG};
pub use error::{MaterialError, Result};
pub use fast_rng::FastRng;
pub use material::{CollisionMode, Material};
pub use materials::Materials;
pub use particle::{Particle, ParticleType};
pub use scattering_center::{AdjointScatteringCenter, ScatteringCenter};
pub use tabulated::{
    Interpolation, LineEnergyReaction, ReactionClass, TabulatedAtom, TabulatedReaction, Tabulation,
};
pub use utilities::{interpolate_linear, interpolate_log_log};
