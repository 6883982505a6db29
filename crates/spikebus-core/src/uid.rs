//! Opaque 128-bit identifiers for network entities

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a network entity.
///
/// Every population, projection, channel and backend instance carries one.
/// UIDs are comparable, hashable and printable; a freshly generated UID is
/// random and never collides in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Uid(Uuid);

impl Uid {
    /// Generate a new random UID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The nil UID, used as a sentinel for "no sender".
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Check whether this is the nil sentinel.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Construct a UID from its 16-byte representation.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Get the 16-byte representation of this UID.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for Uid {
    fn default() -> Self {
        Self::nil()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_uniqueness() {
        let a = Uid::new();
        let b = Uid::new();
        assert_ne!(a, b);
        assert!(!a.is_nil());
    }

    #[test]
    fn test_nil_sentinel() {
        let nil = Uid::nil();
        assert!(nil.is_nil());
        assert_eq!(nil, Uid::default());
    }

    #[test]
    fn test_byte_round_trip() {
        let uid = Uid::new();
        let bytes = *uid.as_bytes();
        assert_eq!(Uid::from_bytes(bytes), uid);
    }

    #[test]
    fn test_display() {
        let uid = Uid::nil();
        assert_eq!(format!("{}", uid), "00000000-0000-0000-0000-000000000000");
    }
}
