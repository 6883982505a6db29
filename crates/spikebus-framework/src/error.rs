//! Error types for the framework layer

use thiserror::Error;

use spikebus_core::Uid;

/// Result type for framework operations.
pub type Result<T> = std::result::Result<T, FrameworkError>;

/// Errors that can occur in the framework layer.
#[derive(Error, Debug)]
pub enum FrameworkError {
    /// A channel was mapped onto a projection that is not in the network.
    #[error("Projection with UID {uid} doesn't exist")]
    ProjectionNotFound {
        /// UID the channel was mapped onto.
        uid: Uid,
    },

    /// A channel was mapped onto a population that is not in the network.
    #[error("Population with UID {uid} doesn't exist")]
    PopulationNotFound {
        /// UID the channel was mapped onto.
        uid: Uid,
    },

    /// Core data-model error.
    #[error("Core error: {source}")]
    Core {
        #[from]
        /// Source core error.
        source: spikebus_core::CoreError,
    },
}
