use crate::config::MaterialDefinition;
use crate::error::{MaterialError, Result};
use crate::material::Material;
use crate::scattering_center::ScatteringCenter;
use log::info;
use std::collections::HashMap;
use std::sync::Arc;

/// Container for many [`Material`] instances sharing one scattering center table.
///
/// The `centers` map holds one `Arc<C>` per constituent name; every material
/// built through the collection clones handles out of it, so the nuclear data
/// for a constituent exists exactly once however many materials use it.
/// Materials are kept in insertion order and can be looked up by id.
#[derive(Debug)]
pub struct Materials<C> {
    /// Storage for materials in a vector
    materials: Vec<Material<C>>,
    /// material id -> position in `materials`
    index: HashMap<u32, usize>,
    /// Shared table: constituent name -> `Arc<C>`
    centers: HashMap<String, Arc<C>>,
}

impl<C: ScatteringCenter> Materials<C> {
    /// Create an empty collection over a table of scattering centers.
    pub fn new(centers: HashMap<String, Arc<C>>) -> Self {
        Materials {
            materials: Vec::new(),
            index: HashMap::new(),
            centers,
        }
    }

    /// Build every definition against the shared table.
    pub fn from_definitions(
        definitions: &[MaterialDefinition],
        centers: HashMap<String, Arc<C>>,
    ) -> Result<Self> {
        let mut materials = Self::new(centers);
        for definition in definitions {
            materials.add_definition(definition)?;
        }

        info!(
            "built {} materials from {} scattering centers",
            materials.len(),
            materials.centers.len()
        );

        Ok(materials)
    }

    /// Build a material from a definition and append it.
    pub fn add_definition(&mut self, definition: &MaterialDefinition) -> Result<u32> {
        let material = definition.build(&self.centers)?;
        self.append(material)
    }

    /// Append a material; its id must be new to the collection.
    pub fn append(&mut self, material: Material<C>) -> Result<u32> {
        let id = material.id();
        if self.index.contains_key(&id) {
            return Err(MaterialError::InvalidConfiguration(format!(
                "material id {} is defined more than once",
                id
            )));
        }

        self.index.insert(id, self.materials.len());
        self.materials.push(material);
        Ok(id)
    }

    pub fn get(&self, id: u32) -> Option<&Material<C>> {
        self.index.get(&id).map(|&i| &self.materials[i])
    }

    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    /// Get the number of materials in the collection
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Get an iterator over the materials in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Material<C>> {
        self.materials.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.materials.iter().map(|m| m.id())
    }

    pub fn centers(&self) -> &HashMap<String, Arc<C>> {
        &self.centers
    }

    /// Move every material out, e.g. to wrap each one in an `Arc`.
    pub fn into_materials(self) -> Vec<Material<C>> {
        self.materials
    }
}
