//! Delta-synapse projection kernel: spike to delayed impact translation

use ahash::AHashMap;
use rayon::prelude::*;

use spikebus_core::messaging::{SpikeMessage, SynapticImpact, SynapticImpactMessage};
use spikebus_core::projection::{DeltaLike, Projection};
use spikebus_core::Uid;

/// Merge a projection's unloaded spike messages into one effective spike
/// list for the tick, preserving message order.
pub fn merge_spike_indexes(messages: &[SpikeMessage]) -> Vec<u32> {
    let mut merged = Vec::with_capacity(messages.iter().map(|m| m.neuron_indexes.len()).sum());
    for message in messages {
        merged.extend_from_slice(&message.neuron_indexes);
    }
    merged
}

/// Translate incoming spikes into `(deliver_step, impact)` pairs.
///
/// Spikes are partitioned into chunks of `spikes_per_thread`; each chunk is
/// evaluated by one worker and the chunk results are concatenated in chunk
/// order, so the output ordering is independent of thread interleaving.
/// An empty spike list produces no impacts.
pub fn project_spikes<S>(
    projection: &Projection<S>,
    spike_indexes: &[u32],
    step: u64,
    spikes_per_thread: usize,
) -> Vec<(u64, SynapticImpact)>
where
    S: DeltaLike + Sync,
{
    if spike_indexes.is_empty() {
        return Vec::new();
    }

    let chunks: Vec<Vec<(u64, SynapticImpact)>> = spike_indexes
        .par_chunks(spikes_per_thread.max(1))
        .map(|chunk| {
            let mut local = Vec::new();
            for &spike_index in chunk {
                for &synapse_index in projection.get_by_presynaptic_neuron(spike_index) {
                    let synapse = &projection.synapses()[synapse_index as usize];
                    local.push((
                        step + synapse.delay(),
                        SynapticImpact {
                            pre_index: synapse.pre_index(),
                            post_index: synapse.post_index(),
                            value: synapse.weight(),
                            kind: synapse.kind(),
                        },
                    ));
                }
            }
            local
        })
        .collect();

    chunks.concat()
}

/// Append translated impacts to a projection's pending queue, creating the
/// per-step impact message on first use.
pub fn queue_impacts(
    pending: &mut AHashMap<u64, SynapticImpactMessage>,
    sender_uid: Uid,
    postsynaptic_uid: Uid,
    impacts: Vec<(u64, SynapticImpact)>,
) {
    for (deliver_step, impact) in impacts {
        pending
            .entry(deliver_step)
            .or_insert_with(|| SynapticImpactMessage {
                sender_uid,
                send_time: deliver_step,
                postsynaptic_uid,
                impacts: Vec::new(),
            })
            .impacts
            .push(impact);
    }
}
