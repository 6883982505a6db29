//! Neuron parameter records
//!
//! The only neuron type in the supported set is BLIFAT: a bio-inspired leaky
//! integrate-and-fire neuron with adaptive threshold, refractory period,
//! conductance-based inhibition and optional bursting.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-neuron parameter and state record for the BLIFAT model.
///
/// A population stores one record per neuron; the backend's kernels mutate
/// the state fields in place each tick.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlifatNeuron {
    /// Current membrane potential.
    pub potential: f64,
    /// Multiplier applied to the potential each step before input.
    pub potential_decay: f64,
    /// Potential value the neuron is reset to after a spike.
    pub potential_reset_value: f64,
    /// Lower clamp for the membrane potential.
    pub min_potential: f64,

    /// Base firing threshold for the membrane potential.
    pub activation_threshold: f64,
    /// Adaptive component added to the threshold; grows on each spike.
    pub dynamic_threshold: f64,
    /// Multiplier applied to the dynamic threshold each step.
    pub threshold_decay: f64,
    /// Amount added to the dynamic threshold when the neuron spikes.
    pub threshold_increment: f64,

    /// Postsynaptic activity trace.
    pub postsynaptic_trace: f64,
    /// Multiplier applied to the trace each step; 0 pins the trace to 0.
    pub postsynaptic_trace_decay: f64,
    /// Amount added to the trace when the neuron spikes.
    pub postsynaptic_trace_increment: f64,

    /// Conductance of inhibitory synapses onto this neuron.
    pub inhibitory_conductance: f64,
    /// Multiplier applied to the inhibitory conductance each step.
    pub inhibitory_conductance_decay: f64,
    /// Potential the membrane tends to under conductance-based inhibition.
    pub reversive_inhibitory_potential: f64,

    /// Potential injected on each bursting wrap-around.
    pub reflexive_weight: f64,
    /// Minimum number of steps between spikes; 0 permits spiking every tick.
    pub absolute_refractory_period: u32,

    /// Number of steps between self-induced bursts; 0 disables bursting.
    pub bursting_period: u32,
    /// Position inside the current bursting cycle.
    pub bursting_phase: u32,

    /// Number of steps a blocking impact silences this neuron for.
    pub total_blocking_period: i64,
    /// Steps elapsed since the neuron last fired.
    pub n_time_steps_since_last_firing: usize,

    /// Potential saved before impacts are applied; restored on blocking.
    pub pre_impact_potential: f64,
    /// Accumulated dopamine received through dopamine-kind impacts.
    pub dopamine_value: f64,

    /// First step at which the neuron is no longer blocked.
    pub blocked_until_step: u64,
}

impl Default for BlifatNeuron {
    fn default() -> Self {
        Self {
            potential: 0.0,
            potential_decay: 0.0,
            potential_reset_value: 0.0,
            min_potential: -1.0e9,
            activation_threshold: 1.0,
            dynamic_threshold: 0.0,
            threshold_decay: 0.0,
            threshold_increment: 0.0,
            postsynaptic_trace: 0.0,
            postsynaptic_trace_decay: 0.0,
            postsynaptic_trace_increment: 0.0,
            inhibitory_conductance: 0.0,
            inhibitory_conductance_decay: 0.0,
            reversive_inhibitory_potential: -0.3,
            reflexive_weight: 0.0,
            absolute_refractory_period: 0,
            bursting_period: 0,
            bursting_phase: 0,
            total_blocking_period: i64::MAX,
            n_time_steps_since_last_firing: usize::MAX,
            pre_impact_potential: 0.0,
            dopamine_value: 0.0,
            blocked_until_step: 0,
        }
    }
}

impl BlifatNeuron {
    /// Check whether the neuron is inside its absolute refractory period.
    pub fn is_refractory(&self) -> bool {
        self.n_time_steps_since_last_firing < self.absolute_refractory_period as usize
    }

    /// Check whether the neuron is silenced by a blocking impact at `step`.
    pub fn is_blocked(&self, step: u64) -> bool {
        step < self.blocked_until_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let neuron = BlifatNeuron::default();
        assert_eq!(neuron.activation_threshold, 1.0);
        assert_eq!(neuron.reversive_inhibitory_potential, -0.3);
        assert_eq!(neuron.min_potential, -1.0e9);
        // A fresh neuron has never fired and is neither refractory nor blocked.
        assert!(!neuron.is_refractory());
        assert!(!neuron.is_blocked(0));
    }

    #[test]
    fn test_refractory_window() {
        let mut neuron = BlifatNeuron {
            absolute_refractory_period: 3,
            ..Default::default()
        };
        neuron.n_time_steps_since_last_firing = 0;
        assert!(neuron.is_refractory());
        neuron.n_time_steps_since_last_firing = 2;
        assert!(neuron.is_refractory());
        neuron.n_time_steps_since_last_firing = 3;
        assert!(!neuron.is_refractory());
    }

    #[test]
    fn test_blocking_window() {
        let neuron = BlifatNeuron {
            blocked_until_step: 5,
            ..Default::default()
        };
        assert!(neuron.is_blocked(4));
        assert!(!neuron.is_blocked(5));
    }
}
