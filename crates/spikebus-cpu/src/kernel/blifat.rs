//! BLIFAT neuron kernel: three phases per tick
//!
//! Phase A integrates decays and bursting before any input is seen, phase B
//! applies routed synaptic impacts, phase C makes the spike decision and
//! updates post-spike state. The scheduler runs A and C over disjoint neuron
//! chunks in parallel and B with one worker per population.

use spikebus_core::messaging::{ImpactKind, SynapticImpactMessage};
use spikebus_core::neuron::BlifatNeuron;
use spikebus_core::population::Population;

/// Phase A: pre-input integration over a chunk of neurons.
///
/// A neuron inside its refractory window keeps its potential pinned to the
/// reset value for the whole phase; all other decays still apply.
pub fn integrate_pre_input(neurons: &mut [BlifatNeuron]) {
    for neuron in neurons {
        let refractory = neuron.is_refractory();
        if refractory {
            neuron.potential = neuron.potential_reset_value;
        } else {
            neuron.potential *= neuron.potential_decay;
        }

        neuron.dynamic_threshold *= neuron.threshold_decay;

        if neuron.postsynaptic_trace_decay == 0.0 {
            neuron.postsynaptic_trace = 0.0;
        } else {
            neuron.postsynaptic_trace *= neuron.postsynaptic_trace_decay;
        }

        neuron.inhibitory_conductance *= neuron.inhibitory_conductance_decay;

        if neuron.bursting_period > 0 {
            neuron.bursting_phase = (neuron.bursting_phase + 1) % neuron.bursting_period;
            if neuron.bursting_phase == 0 && !refractory {
                neuron.potential += neuron.reflexive_weight;
            }
        }

        neuron.pre_impact_potential = neuron.potential;
    }
}

/// Phase B: apply a population's routed impact messages, then the
/// conductance-based inhibition effect and the lower potential clamp.
pub fn apply_impacts(
    population: &mut Population<BlifatNeuron>,
    messages: &[SynapticImpactMessage],
    step: u64,
) {
    for message in messages {
        for impact in &message.impacts {
            let Some(neuron) = population.neurons_mut().get_mut(impact.post_index as usize) else {
                continue;
            };
            let value = impact.value as f64;
            match impact.kind {
                ImpactKind::Excitatory => neuron.potential += value,
                ImpactKind::InhibitoryCurrent => neuron.potential -= value,
                ImpactKind::InhibitoryConductance => neuron.inhibitory_conductance += value,
                ImpactKind::Dopamine => neuron.dopamine_value += value,
                ImpactKind::Blocking => {
                    neuron.blocked_until_step = blocking_horizon(step, neuron.total_blocking_period);
                    neuron.potential = neuron.pre_impact_potential;
                }
            }
        }
    }

    for neuron in population.neurons_mut() {
        neuron.potential +=
            neuron.inhibitory_conductance * (neuron.reversive_inhibitory_potential - neuron.potential);
        if neuron.potential < neuron.min_potential {
            neuron.potential = neuron.min_potential;
        }
    }
}

/// Phase C: spike decision and post-spike state over a chunk of neurons.
///
/// `base_index` is the population index of the chunk's first neuron; the
/// returned spike indexes are population-global.
pub fn fire_and_reset(neurons: &mut [BlifatNeuron], base_index: u32, step: u64) -> Vec<u32> {
    let mut spikes = Vec::new();
    for (offset, neuron) in neurons.iter_mut().enumerate() {
        let can_fire = !neuron.is_refractory() && !neuron.is_blocked(step);
        if can_fire && neuron.potential >= neuron.activation_threshold + neuron.dynamic_threshold {
            spikes.push(base_index + offset as u32);
            neuron.potential = neuron.potential_reset_value;
            neuron.dynamic_threshold += neuron.threshold_increment;
            neuron.postsynaptic_trace += neuron.postsynaptic_trace_increment;
            neuron.n_time_steps_since_last_firing = 0;
        } else {
            neuron.n_time_steps_since_last_firing =
                neuron.n_time_steps_since_last_firing.saturating_add(1);
        }
    }
    spikes
}

fn blocking_horizon(step: u64, total_blocking_period: i64) -> u64 {
    if total_blocking_period <= 0 {
        return step;
    }
    step.saturating_add(total_blocking_period as u64)
}
