//! Populations: ordered neuron collections sharing one neuron type

use crate::neuron::BlifatNeuron;
use crate::tag::TagMap;
use crate::uid::Uid;

/// An ordered, fixed-size collection of neuron records of one type.
///
/// The population owns its neurons; size is fixed after construction, while
/// individual records are mutated by the backend's kernels.
#[derive(Debug, Clone)]
pub struct Population<N> {
    uid: Uid,
    tags: TagMap,
    neurons: Vec<N>,
}

impl<N> Population<N> {
    /// Create a population from pre-built neuron records.
    pub fn new(neurons: Vec<N>) -> Self {
        Self {
            uid: Uid::new(),
            tags: TagMap::new(),
            neurons,
        }
    }

    /// Create a population of `count` neurons produced by `generator`.
    pub fn from_fn(count: usize, generator: impl FnMut(usize) -> N) -> Self {
        Self::new((0..count).map(generator).collect())
    }

    /// UID of this population.
    pub fn get_uid(&self) -> Uid {
        self.uid
    }

    /// Tags attached to this population.
    pub fn tags(&self) -> &TagMap {
        &self.tags
    }

    /// Mutable tags attached to this population.
    pub fn tags_mut(&mut self) -> &mut TagMap {
        &mut self.tags
    }

    /// Number of neurons.
    pub fn size(&self) -> usize {
        self.neurons.len()
    }

    /// The neuron records, in index order.
    pub fn neurons(&self) -> &[N] {
        &self.neurons
    }

    /// Mutable neuron records, in index order.
    pub fn neurons_mut(&mut self) -> &mut [N] {
        &mut self.neurons
    }

    /// Iterate over the neuron records.
    pub fn iter(&self) -> impl Iterator<Item = &N> {
        self.neurons.iter()
    }
}

/// Tagged union over the supported population types.
#[derive(Debug, Clone)]
pub enum PopulationVariant {
    /// A population of BLIFAT neurons.
    Blifat(Population<BlifatNeuron>),
}

impl PopulationVariant {
    /// UID of the wrapped population.
    pub fn uid(&self) -> Uid {
        match self {
            Self::Blifat(p) => p.get_uid(),
        }
    }

    /// Number of neurons in the wrapped population.
    pub fn size(&self) -> usize {
        match self {
            Self::Blifat(p) => p.size(),
        }
    }

    /// Name of the wrapped neuron type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Blifat(_) => "BLIFATNeuron",
        }
    }
}

impl From<Population<BlifatNeuron>> for PopulationVariant {
    fn from(population: Population<BlifatNeuron>) -> Self {
        Self::Blifat(population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_from_fn() {
        let population = Population::from_fn(4, |_| BlifatNeuron::default());
        assert_eq!(population.size(), 4);
        assert!(!population.get_uid().is_nil());
    }

    #[test]
    fn test_distinct_uids() {
        let a = Population::<BlifatNeuron>::new(vec![]);
        let b = Population::<BlifatNeuron>::new(vec![]);
        assert_ne!(a.get_uid(), b.get_uid());
    }

    #[test]
    fn test_variant_dispatch() {
        let population = Population::from_fn(2, |_| BlifatNeuron::default());
        let uid = population.get_uid();
        let variant = PopulationVariant::from(population);
        assert_eq!(variant.uid(), uid);
        assert_eq!(variant.size(), 2);
        assert_eq!(variant.type_name(), "BLIFATNeuron");
    }
}
