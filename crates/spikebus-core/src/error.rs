//! Error types for the core data model and message bus

use thiserror::Error;

use crate::uid::Uid;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid parameter value supplied at construction time.
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name.
        parameter: String,
        /// Invalid value.
        value: String,
        /// Constraint description.
        constraint: String,
    },

    /// An entity with the same UID already exists in the container.
    #[error("Entity with UID {uid} already exists")]
    DuplicateUid {
        /// UID of the conflicting entity.
        uid: Uid,
    },

    /// Envelope buffer ended before the payload was complete.
    #[error("Envelope truncated at offset {offset}: {needed} more bytes required")]
    EnvelopeTruncated {
        /// Byte offset at which decoding stopped.
        offset: usize,
        /// Number of additional bytes required.
        needed: usize,
    },

    /// Envelope kind tag does not name a known message type.
    #[error("Unknown message kind tag {tag}")]
    UnknownMessageKind {
        /// The unrecognized kind tag.
        tag: u8,
    },

    /// Synaptic impact kind code does not name a known impact kind.
    #[error("Unknown synaptic impact kind code {code}")]
    UnknownImpactKind {
        /// The unrecognized kind code.
        code: u8,
    },
}

impl CoreError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }
}
