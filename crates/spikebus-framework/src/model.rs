//! Model: a network plus its channel registrations

use ahash::AHashMap;

use spikebus_core::{Network, Uid};

use crate::error::{FrameworkError, Result};

/// A network together with the channel UIDs wired into and out of it.
///
/// Input channels map onto the projection that converts their spikes into
/// impacts; output channels map onto the population whose spikes they
/// observe. A channel UID may be registered against several entities.
#[derive(Debug, Default)]
pub struct Model {
    network: Network,
    in_channels: AHashMap<Uid, Vec<Uid>>,
    out_channels: AHashMap<Uid, Vec<Uid>>,
}

impl Model {
    /// Create a model around a constructed network.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            in_channels: AHashMap::new(),
            out_channels: AHashMap::new(),
        }
    }

    /// The wrapped network.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// The wrapped network, mutably.
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Register an input channel feeding `projection_uid`.
    ///
    /// Fails if the projection does not exist in the network.
    pub fn add_input_channel(&mut self, channel_uid: Uid, projection_uid: Uid) -> Result<()> {
        if !self.network.is_projection_exists(projection_uid) {
            return Err(FrameworkError::ProjectionNotFound {
                uid: projection_uid,
            });
        }
        self.in_channels
            .entry(channel_uid)
            .or_default()
            .push(projection_uid);
        log::debug!("input channel {} -> projection {}", channel_uid, projection_uid);
        Ok(())
    }

    /// Register an output channel observing `population_uid`.
    ///
    /// Fails if the population does not exist in the network.
    pub fn add_output_channel(&mut self, channel_uid: Uid, population_uid: Uid) -> Result<()> {
        if !self.network.is_population_exists(population_uid) {
            return Err(FrameworkError::PopulationNotFound {
                uid: population_uid,
            });
        }
        self.out_channels
            .entry(channel_uid)
            .or_default()
            .push(population_uid);
        log::debug!("output channel {} <- population {}", channel_uid, population_uid);
        Ok(())
    }

    /// Projection UIDs registered under an input channel.
    pub fn get_input_channels(&self, channel_uid: Uid) -> &[Uid] {
        self.in_channels
            .get(&channel_uid)
            .map_or(&[], Vec::as_slice)
    }

    /// Population UIDs registered under an output channel.
    pub fn get_output_channels(&self, channel_uid: Uid) -> &[Uid] {
        self.out_channels
            .get(&channel_uid)
            .map_or(&[], Vec::as_slice)
    }
}
