//! Additive STDP kernel: spike-history bookkeeping and weight updates

use spikebus_core::messaging::SpikeMessage;
use spikebus_core::projection::{ProcessingMode, Projection, StdpDeltaSynapse};

/// The additive STDP weight-change formula.
///
/// Zhang et al. 1998; Gerstner et al. 1996, Kempter et al. 1999.
#[derive(Debug, Clone, Copy)]
pub struct StdpFormula {
    tau_plus: f32,
    tau_minus: f32,
    a_plus: f32,
    a_minus: f32,
}

impl StdpFormula {
    /// Create the formula for the given window sizes and learning rates.
    pub fn new(tau_plus: u32, tau_minus: u32, a_plus: f32, a_minus: f32) -> Self {
        Self {
            tau_plus: tau_plus as f32,
            tau_minus: tau_minus as f32,
            a_plus,
            a_minus,
        }
    }

    /// Kernel value for one pre/post timing difference `dt = t_post - t_pre`.
    ///
    /// Coincident spikes (`dt = 0`) take the potentiation branch.
    pub fn kernel(&self, dt: i64) -> f32 {
        if dt >= 0 {
            self.a_plus * (-(dt as f32) / self.tau_plus).exp()
        } else {
            self.a_minus * ((dt as f32) / self.tau_minus).exp()
        }
    }

    /// Total weight change over all pre/post spike-time pairs.
    pub fn delta_w(&self, presynaptic_spikes: &[u64], postsynaptic_spikes: &[u64]) -> f32 {
        let mut total = 0.0;
        for &t_f in presynaptic_spikes {
            for &t_n in postsynaptic_spikes {
                total += self.kernel(t_n as i64 - t_f as i64);
            }
        }
        total
    }
}

/// Record incoming spike times into the synapse histories of an STDP
/// projection.
///
/// Senders absent from the projection's STDP population table are left
/// untouched. `StdpOnly` messages are consumed: their spike list is cleared
/// so the delta kernel skips them downstream.
pub fn register_spikes(projection: &mut Projection<StdpDeltaSynapse>, messages: &mut [SpikeMessage]) {
    log::trace!("registering spikes for STDP projection {}", projection.get_uid());
    for message in messages.iter_mut() {
        let mode = match projection.stdp_populations().get(&message.sender_uid) {
            Some(mode) => *mode,
            None => continue,
        };

        if matches!(mode, ProcessingMode::StdpOnly | ProcessingMode::StdpAndSpike) {
            append_spike_times(projection, message, HistorySide::Postsynaptic);
        }
        if mode == ProcessingMode::StdpAndSpike {
            append_spike_times(projection, message, HistorySide::Presynaptic);
        }
        if mode == ProcessingMode::StdpOnly {
            message.neuron_indexes.clear();
        }
    }
}

/// Apply the additive rule once per tick, after registration.
///
/// A synapse's weight changes only when both histories hold at least
/// `tau_plus + tau_minus` entries; both histories are cleared afterwards.
pub fn update_weights(projection: &mut Projection<StdpDeltaSynapse>) {
    for synapse in projection.synapses_mut() {
        let period = synapse.rule.period();
        if synapse.rule.presynaptic_spike_times.len() >= period
            && synapse.rule.postsynaptic_spike_times.len() >= period
        {
            let formula = StdpFormula::new(synapse.rule.tau_plus, synapse.rule.tau_minus, 1.0, 1.0);
            let delta = formula.delta_w(
                &synapse.rule.presynaptic_spike_times,
                &synapse.rule.postsynaptic_spike_times,
            );
            log::trace!("STDP weight {} += {}", synapse.synapse.weight, delta);
            synapse.synapse.weight += delta;
            synapse.rule.presynaptic_spike_times.clear();
            synapse.rule.postsynaptic_spike_times.clear();
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum HistorySide {
    Presynaptic,
    Postsynaptic,
}

fn append_spike_times(
    projection: &mut Projection<StdpDeltaSynapse>,
    message: &SpikeMessage,
    side: HistorySide,
) {
    for &neuron_index in &message.neuron_indexes {
        let synapse_indexes: Vec<u32> = match side {
            HistorySide::Presynaptic => projection.get_by_presynaptic_neuron(neuron_index).to_vec(),
            HistorySide::Postsynaptic => projection.get_by_postsynaptic_neuron(neuron_index).to_vec(),
        };
        for synapse_index in synapse_indexes {
            let rule = &mut projection.synapses_mut()[synapse_index as usize].rule;
            let capacity = rule.period();
            let queue = match side {
                HistorySide::Presynaptic => &mut rule.presynaptic_spike_times,
                HistorySide::Postsynaptic => &mut rule.postsynaptic_spike_times,
            };
            if queue.len() < capacity {
                queue.push(message.send_time);
            }
        }
    }
}
