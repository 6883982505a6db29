//! Per-tick computation kernels
//!
//! The kernels are total functions over their inputs: configuration errors
//! are caught at construction time, so no per-tick error paths exist. Each
//! kernel operates on a disjoint neuron or synapse range and never touches
//! the bus; message traffic is the scheduler's job.

pub mod blifat;
pub mod delta;
pub mod stdp;
