//! Model facade and I/O surfaces for the spikebus SNN engine
//!
//! Wraps a core [`Network`](spikebus_core::Network) together with its input
//! and output channel registrations, and provides the endpoint-based channel
//! and observer types callers use to inject spikes and consume results.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod io;
pub mod model;

pub use error::{FrameworkError, Result};
pub use io::{InputChannel, MessageObserver};
pub use model::Model;
