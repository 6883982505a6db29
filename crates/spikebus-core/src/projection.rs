//! Projections: directed synapse collections between two populations
//!
//! A projection owns its synapses, the UIDs of its presynaptic and
//! postsynaptic populations, and precomputed forward indexes mapping neuron
//! indexes to synapse indexes in both directions. It never owns populations;
//! cross-entity references go through UIDs and the message bus.

use ahash::AHashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::messaging::ImpactKind;
use crate::tag::TagMap;
use crate::uid::Uid;

/// How an STDP projection treats spikes from one sender population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProcessingMode {
    /// Deliver spikes through the synapse kernel only; no history recording.
    SpikeOnly,
    /// Record spike history only; the message is consumed and not delivered.
    StdpOnly,
    /// Record spike history and deliver the spikes as usual.
    StdpAndSpike,
}

/// Access to the wiring of a synapse record.
pub trait SynapseModel {
    /// Index of the presynaptic neuron in the source population.
    fn pre_index(&self) -> u32;
    /// Index of the postsynaptic neuron in the target population.
    fn post_index(&self) -> u32;
}

/// View of the delta-synapse parameters of a synapse record.
///
/// Implemented both by the plain delta synapse and by wrappers (such as the
/// STDP composition) that carry a delta synapse inside.
pub trait DeltaLike: SynapseModel {
    /// Synaptic weight delivered at the impact step.
    fn weight(&self) -> f32;
    /// Delivery delay in steps; always at least 1.
    fn delay(&self) -> u64;
    /// Impact classification of this synapse.
    fn kind(&self) -> ImpactKind;
}

/// A delta synapse: one weighted pulse delivered `delay` steps after the
/// presynaptic spike.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeltaSynapse {
    /// Index of the presynaptic neuron.
    pub pre_index: u32,
    /// Index of the postsynaptic neuron.
    pub post_index: u32,
    /// Synaptic weight; finite.
    pub weight: f32,
    /// Delivery delay in steps.
    pub delay: u64,
    /// Impact classification.
    pub kind: ImpactKind,
}

impl DeltaSynapse {
    /// Create a delta synapse. The delay must be at least 1 step.
    pub fn new(pre_index: u32, post_index: u32, weight: f32, delay: u64, kind: ImpactKind) -> Result<Self> {
        if delay == 0 {
            return Err(CoreError::invalid_parameter("delay", "0", ">= 1"));
        }
        Ok(Self {
            pre_index,
            post_index,
            weight,
            delay,
            kind,
        })
    }

    /// Create an excitatory delta synapse.
    pub fn excitatory(pre_index: u32, post_index: u32, weight: f32, delay: u64) -> Result<Self> {
        Self::new(pre_index, post_index, weight, delay, ImpactKind::Excitatory)
    }
}

impl SynapseModel for DeltaSynapse {
    fn pre_index(&self) -> u32 {
        self.pre_index
    }

    fn post_index(&self) -> u32 {
        self.post_index
    }
}

impl DeltaLike for DeltaSynapse {
    fn weight(&self) -> f32 {
        self.weight
    }

    fn delay(&self) -> u64 {
        self.delay
    }

    fn kind(&self) -> ImpactKind {
        self.kind
    }
}

/// Additive STDP rule state attached to one synapse.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdditiveStdpRule {
    /// Potentiation window size in steps.
    pub tau_plus: u32,
    /// Depression window size in steps.
    pub tau_minus: u32,
    /// Recorded presynaptic spike steps, capped at `tau_plus + tau_minus`.
    pub presynaptic_spike_times: Vec<u64>,
    /// Recorded postsynaptic spike steps, capped at `tau_plus + tau_minus`.
    pub postsynaptic_spike_times: Vec<u64>,
}

impl AdditiveStdpRule {
    /// Create a rule with empty spike histories. Both windows must be positive.
    pub fn new(tau_plus: u32, tau_minus: u32) -> Result<Self> {
        if tau_plus == 0 {
            return Err(CoreError::invalid_parameter("tau_plus", "0", "> 0"));
        }
        if tau_minus == 0 {
            return Err(CoreError::invalid_parameter("tau_minus", "0", "> 0"));
        }
        Ok(Self {
            tau_plus,
            tau_minus,
            presynaptic_spike_times: Vec::new(),
            postsynaptic_spike_times: Vec::new(),
        })
    }

    /// Number of recorded spikes required on each side before a weight update.
    pub fn period(&self) -> usize {
        (self.tau_plus + self.tau_minus) as usize
    }
}

/// A delta synapse composed with an additive STDP rule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StdpDeltaSynapse {
    /// The plasticity rule and its spike histories.
    pub rule: AdditiveStdpRule,
    /// The wrapped delta synapse.
    pub synapse: DeltaSynapse,
}

impl StdpDeltaSynapse {
    /// Compose a delta synapse with an additive STDP rule.
    pub fn new(rule: AdditiveStdpRule, synapse: DeltaSynapse) -> Self {
        Self { rule, synapse }
    }
}

impl SynapseModel for StdpDeltaSynapse {
    fn pre_index(&self) -> u32 {
        self.synapse.pre_index
    }

    fn post_index(&self) -> u32 {
        self.synapse.post_index
    }
}

impl DeltaLike for StdpDeltaSynapse {
    fn weight(&self) -> f32 {
        self.synapse.weight
    }

    fn delay(&self) -> u64 {
        self.synapse.delay
    }

    fn kind(&self) -> ImpactKind {
        self.synapse.kind
    }
}

/// Forward index from neuron index to the synapse indexes touching it.
///
/// Built once at projection construction and read-only afterwards: a counting
/// sort produces an offset table plus a flat synapse-index array, so lookups
/// are a slice borrow with no per-call allocation.
#[derive(Debug, Clone, Default)]
pub struct ForwardIndex {
    offsets: Vec<u32>,
    synapse_ids: Vec<u32>,
}

impl ForwardIndex {
    fn build(keys: &[u32]) -> Self {
        let buckets = keys.iter().copied().max().map_or(0, |max| max as usize + 1);
        let mut counts = vec![0u32; buckets + 1];
        for &key in keys {
            counts[key as usize + 1] += 1;
        }
        for i in 1..counts.len() {
            counts[i] += counts[i - 1];
        }
        let offsets = counts.clone();
        let mut cursor = counts;
        let mut synapse_ids = vec![0u32; keys.len()];
        for (synapse, &key) in keys.iter().enumerate() {
            synapse_ids[cursor[key as usize] as usize] = synapse as u32;
            cursor[key as usize] += 1;
        }
        Self {
            offsets,
            synapse_ids,
        }
    }

    /// Synapse indexes registered under `neuron_index`, in synapse order.
    pub fn get(&self, neuron_index: u32) -> &[u32] {
        let i = neuron_index as usize;
        if i + 1 >= self.offsets.len() {
            return &[];
        }
        &self.synapse_ids[self.offsets[i] as usize..self.offsets[i + 1] as usize]
    }
}

/// An ordered collection of synapses from one population to another.
#[derive(Debug, Clone)]
pub struct Projection<S> {
    uid: Uid,
    tags: TagMap,
    presynaptic_uid: Uid,
    postsynaptic_uid: Uid,
    synapses: Vec<S>,
    by_pre: ForwardIndex,
    by_post: ForwardIndex,
    stdp_populations: AHashMap<Uid, ProcessingMode>,
}

impl<S: SynapseModel> Projection<S> {
    /// Create a projection over `synapses` between two populations.
    ///
    /// The forward indexes are built here; the synapse set is fixed for the
    /// projection's lifetime (weights stay mutable).
    pub fn new(presynaptic_uid: Uid, postsynaptic_uid: Uid, synapses: Vec<S>) -> Self {
        let pre_keys: Vec<u32> = synapses.iter().map(SynapseModel::pre_index).collect();
        let post_keys: Vec<u32> = synapses.iter().map(SynapseModel::post_index).collect();
        Self {
            uid: Uid::new(),
            tags: TagMap::new(),
            presynaptic_uid,
            postsynaptic_uid,
            by_pre: ForwardIndex::build(&pre_keys),
            by_post: ForwardIndex::build(&post_keys),
            synapses,
            stdp_populations: AHashMap::new(),
        }
    }

    /// UID of this projection.
    pub fn get_uid(&self) -> Uid {
        self.uid
    }

    /// Tags attached to this projection.
    pub fn tags(&self) -> &TagMap {
        &self.tags
    }

    /// Mutable tags attached to this projection.
    pub fn tags_mut(&mut self) -> &mut TagMap {
        &mut self.tags
    }

    /// UID of the source population.
    pub fn presynaptic_uid(&self) -> Uid {
        self.presynaptic_uid
    }

    /// UID of the target population.
    pub fn postsynaptic_uid(&self) -> Uid {
        self.postsynaptic_uid
    }

    /// Number of synapses.
    pub fn size(&self) -> usize {
        self.synapses.len()
    }

    /// The synapse records, in construction order.
    pub fn synapses(&self) -> &[S] {
        &self.synapses
    }

    /// Mutable synapse records. The wiring (pre/post indexes) must not be
    /// changed; the forward indexes are not rebuilt.
    pub fn synapses_mut(&mut self) -> &mut [S] {
        &mut self.synapses
    }

    /// Synapse indexes whose presynaptic neuron is `neuron_index`.
    pub fn get_by_presynaptic_neuron(&self, neuron_index: u32) -> &[u32] {
        self.by_pre.get(neuron_index)
    }

    /// Synapse indexes whose postsynaptic neuron is `neuron_index`.
    pub fn get_by_postsynaptic_neuron(&self, neuron_index: u32) -> &[u32] {
        self.by_post.get(neuron_index)
    }

    /// Sender populations whose spikes feed the STDP histories, by mode.
    pub fn stdp_populations(&self) -> &AHashMap<Uid, ProcessingMode> {
        &self.stdp_populations
    }

    /// Register a sender population for STDP processing.
    pub fn set_stdp_population(&mut self, sender: Uid, mode: ProcessingMode) {
        self.stdp_populations.insert(sender, mode);
    }
}

/// Tagged union over the supported projection types.
#[derive(Debug, Clone)]
pub enum ProjectionVariant {
    /// Projection of plain delta synapses.
    Delta(Projection<DeltaSynapse>),
    /// Projection of delta synapses with additive STDP.
    StdpDelta(Projection<StdpDeltaSynapse>),
}

impl ProjectionVariant {
    /// UID of the wrapped projection.
    pub fn uid(&self) -> Uid {
        match self {
            Self::Delta(p) => p.get_uid(),
            Self::StdpDelta(p) => p.get_uid(),
        }
    }

    /// UID of the source population.
    pub fn presynaptic_uid(&self) -> Uid {
        match self {
            Self::Delta(p) => p.presynaptic_uid(),
            Self::StdpDelta(p) => p.presynaptic_uid(),
        }
    }

    /// UID of the target population.
    pub fn postsynaptic_uid(&self) -> Uid {
        match self {
            Self::Delta(p) => p.postsynaptic_uid(),
            Self::StdpDelta(p) => p.postsynaptic_uid(),
        }
    }

    /// Number of synapses in the wrapped projection.
    pub fn size(&self) -> usize {
        match self {
            Self::Delta(p) => p.size(),
            Self::StdpDelta(p) => p.size(),
        }
    }

    /// Sender UIDs whose spike history feeds this projection's STDP rule.
    pub fn stdp_sender_uids(&self) -> Vec<Uid> {
        match self {
            Self::Delta(p) => p.stdp_populations().keys().copied().collect(),
            Self::StdpDelta(p) => p.stdp_populations().keys().copied().collect(),
        }
    }

    /// Name of the wrapped synapse type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Delta(_) => "DeltaSynapse",
            Self::StdpDelta(_) => "AdditiveSTDPDeltaSynapse",
        }
    }
}
