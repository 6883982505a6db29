//! Input channels: spike injection into the bus

use spikebus_core::messaging::SpikeMessage;
use spikebus_core::{MessageEndpoint, Uid};

/// An input channel that forms spike messages and posts them to the bus.
///
/// Downstream projections see the channel as a presynaptic population: build
/// the input projection with the channel's UID as its presynaptic UID and the
/// backend's `init()` wires the subscription.
#[derive(Debug)]
pub struct InputChannel {
    uid: Uid,
    endpoint: MessageEndpoint,
}

impl InputChannel {
    /// Create a channel with a fresh UID over `endpoint`.
    pub fn new(endpoint: MessageEndpoint) -> Self {
        Self::with_uid(endpoint, Uid::new())
    }

    /// Create a channel with a caller-chosen UID over `endpoint`.
    pub fn with_uid(endpoint: MessageEndpoint, uid: Uid) -> Self {
        Self { uid, endpoint }
    }

    /// UID of this channel; the sender UID of every message it posts.
    pub fn get_uid(&self) -> Uid {
        self.uid
    }

    /// Form a spike message for `step` and post it to the bus.
    pub fn send(&self, step: u64, neuron_indexes: Vec<u32>) {
        log::trace!("input channel {} sends {} spikes", self.uid, neuron_indexes.len());
        self.endpoint.send_message(SpikeMessage {
            sender_uid: self.uid,
            send_time: step,
            neuron_indexes,
        });
    }
}
