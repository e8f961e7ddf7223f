// Global configuration and serialisable material definitions
use crate::adjoint_material::AdjointMaterial;
use crate::error::Result;
use crate::material::{CollisionMode, Material};
use crate::scattering_center::{AdjointScatteringCenter, ScatteringCenter};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// Process wide run configuration
pub static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::new()));

/// Run level settings shared by every worker.
///
/// A single global instance is exposed via the `CONFIG` static (a
/// `Lazy<Mutex<Config>>`). Most code should obtain a guard with
/// [`Config::global`] rather than accessing the mutex directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How collisions treat absorption.
    pub collision_mode: CollisionMode,
    /// Master seed; each history derives its own stream from it.
    pub seed: u64,
    /// Materials to build for the run.
    pub materials: Vec<MaterialDefinition>,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Config {
            collision_mode: CollisionMode::Analogue,
            seed: 1,
            materials: Vec::new(),
        }
    }

    /// Parse a configuration; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get the global configuration instance
    pub fn global() -> std::sync::MutexGuard<'static, Self> {
        CONFIG
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// One named constituent and its signed fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentDefinition {
    pub name: String,
    /// Positive for atom fraction, negative for weight fraction.
    pub fraction: f64,
}

/// Serialisable description of a material.
///
/// ```json
/// {
///   "id": 1,
///   "density": -2.0,
///   "constituents": [
///     { "name": "H", "fraction": -0.111 },
///     { "name": "O", "fraction": -0.889 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDefinition {
    pub id: u32,
    /// Positive for atoms/(b·cm), negative for g/cm³.
    pub density: f64,
    pub constituents: Vec<ConstituentDefinition>,
    /// Only read when building an adjoint material.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub critical_line_energies: Vec<f64>,
}

impl MaterialDefinition {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn split(&self) -> (Vec<f64>, Vec<&str>) {
        self.constituents
            .iter()
            .map(|c| (c.fraction, c.name.as_str()))
            .unzip()
    }

    pub fn build<C: ScatteringCenter>(&self, centers: &HashMap<String, Arc<C>>) -> Result<Material<C>> {
        let (fractions, names) = self.split();
        Material::new(self.id, self.density, centers, &fractions, &names)
    }

    pub fn build_adjoint<C: AdjointScatteringCenter>(
        &self,
        centers: &HashMap<String, Arc<C>>,
    ) -> Result<AdjointMaterial<C>> {
        let (fractions, names) = self.split();
        AdjointMaterial::new(
            self.id,
            self.density,
            centers,
            &fractions,
            &names,
            self.critical_line_energies.clone(),
        )
    }
}
