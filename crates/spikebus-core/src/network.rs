//! The network: all populations and projections with UID-indexed lookup

use ahash::AHashMap;

use crate::error::{CoreError, Result};
use crate::population::PopulationVariant;
use crate::projection::ProjectionVariant;
use crate::uid::Uid;

/// Container owning every population and projection of a model.
///
/// Entities are added at construction time and handed to a backend with
/// `load_populations` / `load_projections`; insertion order is preserved and
/// drives the backend's processing order.
#[derive(Debug, Clone, Default)]
pub struct Network {
    populations: Vec<PopulationVariant>,
    projections: Vec<ProjectionVariant>,
    population_index: AHashMap<Uid, usize>,
    projection_index: AHashMap<Uid, usize>,
}

impl Network {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a population. Fails if its UID is already present.
    pub fn add_population(&mut self, population: impl Into<PopulationVariant>) -> Result<()> {
        let population = population.into();
        let uid = population.uid();
        if self.population_index.contains_key(&uid) {
            return Err(CoreError::DuplicateUid { uid });
        }
        self.population_index.insert(uid, self.populations.len());
        self.populations.push(population);
        Ok(())
    }

    /// Add a projection. Fails if its UID is already present.
    pub fn add_projection(&mut self, projection: ProjectionVariant) -> Result<()> {
        let uid = projection.uid();
        if self.projection_index.contains_key(&uid) {
            return Err(CoreError::DuplicateUid { uid });
        }
        self.projection_index.insert(uid, self.projections.len());
        self.projections.push(projection);
        Ok(())
    }

    /// Check whether a population with `uid` exists.
    pub fn is_population_exists(&self, uid: Uid) -> bool {
        self.population_index.contains_key(&uid)
    }

    /// Check whether a projection with `uid` exists.
    pub fn is_projection_exists(&self, uid: Uid) -> bool {
        self.projection_index.contains_key(&uid)
    }

    /// Look up a population by UID.
    pub fn get_population(&self, uid: Uid) -> Option<&PopulationVariant> {
        self.population_index.get(&uid).map(|&i| &self.populations[i])
    }

    /// Look up a projection by UID.
    pub fn get_projection(&self, uid: Uid) -> Option<&ProjectionVariant> {
        self.projection_index.get(&uid).map(|&i| &self.projections[i])
    }

    /// Populations in insertion order.
    pub fn populations(&self) -> &[PopulationVariant] {
        &self.populations
    }

    /// Projections in insertion order.
    pub fn projections(&self) -> &[ProjectionVariant] {
        &self.projections
    }

    /// Number of populations.
    pub fn population_count(&self) -> usize {
        self.populations.len()
    }

    /// Number of projections.
    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }
}
