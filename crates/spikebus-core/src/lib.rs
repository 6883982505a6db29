//! Core data model and typed message bus for the spikebus SNN engine
//!
//! This crate defines the entities a spiking-network backend computes over
//! (populations of neurons, projections of synapses, the network container)
//! and the publish/subscribe message bus that routes spike and synaptic-impact
//! messages between them by UID-addressed subscription.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod bus;
pub mod error;
pub mod messaging;
pub mod network;
pub mod neuron;
pub mod population;
pub mod projection;
pub mod subscription;
pub mod tag;
pub mod uid;

pub use bus::{BusMessage, MessageBus, MessageEndpoint};
pub use error::{CoreError, Result};
pub use messaging::{
    ImpactKind, MessageVariant, SpikeMessage, SynapticImpact, SynapticImpactMessage,
};
pub use network::Network;
pub use neuron::BlifatNeuron;
pub use population::{Population, PopulationVariant};
pub use projection::{ProcessingMode, Projection, ProjectionVariant};
pub use subscription::Subscription;
pub use tag::TagMap;
pub use uid::Uid;

/// Core crate version for compatibility checking.
pub const CORE_VERSION: u32 = 1;
