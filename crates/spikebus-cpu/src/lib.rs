//! Multi-threaded CPU backend for the spikebus SNN engine
//!
//! Drives a network of populations and projections through discrete time
//! steps on a fixed-size worker pool: neuron integration, spike emission,
//! spike-to-impact translation with delivery delays, and additive-STDP
//! weight updates, all glued together by the core message bus.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod device;
pub mod error;
pub mod kernel;

pub use backend::{BackendConfig, CpuBackend, ProjectionWrapper};
pub use device::CpuDevice;
pub use error::{CpuError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        let backend = CpuBackend::new(BackendConfig::default()).unwrap();
        assert!(!backend.running());
        assert_eq!(backend.current_step(), 0);
        assert!(backend
            .get_supported_neurons()
            .contains(&"BLIFATNeuron"));
    }
}
