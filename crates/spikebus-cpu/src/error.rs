//! Error types for the CPU backend

use thiserror::Error;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, CpuError>;

/// Errors that can occur in the CPU backend.
#[derive(Error, Debug)]
pub enum CpuError {
    /// Core data-model or bus error.
    #[error("Core error: {source}")]
    Core {
        #[from]
        /// Source core error.
        source: spikebus_core::CoreError,
    },

    /// The worker pool could not be built.
    #[error("Failed to build worker pool: {reason}")]
    ThreadPool {
        /// Reason reported by the pool builder.
        reason: String,
    },
}

impl CpuError {
    /// Create a thread pool construction error.
    pub fn thread_pool(reason: impl Into<String>) -> Self {
        Self::ThreadPool {
            reason: reason.into(),
        }
    }
}
