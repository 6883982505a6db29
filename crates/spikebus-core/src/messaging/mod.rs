//! Message types exchanged over the bus

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::uid::Uid;

pub mod envelope;

pub use envelope::{extract_from_envelope, pack_to_envelope};

/// Classification of a synaptic impact's effect on the target neuron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ImpactKind {
    /// Adds the impact value to the membrane potential.
    Excitatory = 0,
    /// Subtracts the impact value from the membrane potential.
    InhibitoryCurrent = 1,
    /// Adds the impact value to the inhibitory conductance.
    InhibitoryConductance = 2,
    /// Accumulates the impact value into the neuron's dopamine store.
    Dopamine = 3,
    /// Blocks all activity of the target neuron for its blocking period.
    Blocking = 4,
}

impl ImpactKind {
    /// Wire code of this kind.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a wire code into a kind.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Excitatory),
            1 => Ok(Self::InhibitoryCurrent),
            2 => Ok(Self::InhibitoryConductance),
            3 => Ok(Self::Dopamine),
            4 => Ok(Self::Blocking),
            _ => Err(CoreError::UnknownImpactKind { code }),
        }
    }
}

/// A spike event batch emitted by one sender at one step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpikeMessage {
    /// UID of the emitting entity.
    pub sender_uid: Uid,
    /// Simulation step at which the message was sent.
    pub send_time: u64,
    /// Indexes of the neurons that fired, in emission order.
    pub neuron_indexes: Vec<u32>,
}

/// The effect of one synapse firing onto one postsynaptic neuron.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SynapticImpact {
    /// Index of the presynaptic neuron.
    pub pre_index: u32,
    /// Index of the postsynaptic neuron.
    pub post_index: u32,
    /// Impact magnitude (the synaptic weight at delivery time).
    pub value: f32,
    /// How the impact acts on the target neuron.
    pub kind: ImpactKind,
}

/// A batch of synaptic impacts addressed to one postsynaptic population.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SynapticImpactMessage {
    /// UID of the emitting projection.
    pub sender_uid: Uid,
    /// Simulation step at which the message was sent.
    pub send_time: u64,
    /// UID of the postsynaptic population the impacts target.
    pub postsynaptic_uid: Uid,
    /// The impacts, in synapse-evaluation order.
    pub impacts: Vec<SynapticImpact>,
}

/// Tagged union over all message kinds carried by the bus.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MessageVariant {
    /// A spike message.
    Spike(SpikeMessage),
    /// A synaptic impact message.
    SynapticImpact(SynapticImpactMessage),
}

impl MessageVariant {
    /// UID of the entity that sent this message.
    pub fn sender_uid(&self) -> Uid {
        match self {
            Self::Spike(m) => m.sender_uid,
            Self::SynapticImpact(m) => m.sender_uid,
        }
    }

    /// Simulation step at which this message was sent.
    pub fn send_time(&self) -> u64 {
        match self {
            Self::Spike(m) => m.send_time,
            Self::SynapticImpact(m) => m.send_time,
        }
    }
}

impl From<SpikeMessage> for MessageVariant {
    fn from(message: SpikeMessage) -> Self {
        Self::Spike(message)
    }
}

impl From<SynapticImpactMessage> for MessageVariant {
    fn from(message: SynapticImpactMessage) -> Self {
        Self::SynapticImpact(message)
    }
}
