//! Error taxonomy shared by registries, resolvers and the report book.

use thiserror::Error;

use crate::types::Address;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Reason a pair of neighbor hints was refused.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum HintFault {
    /// A hint names the key being positioned.
    #[error("hint refers to the key itself")]
    SelfReference,
    /// The greater hint is not a live key.
    #[error("greater hint is not present")]
    UnknownGreater,
    /// The lesser hint is not a live key.
    #[error("lesser hint is not present")]
    UnknownLesser,
    /// The hints do not name two adjacent positions.
    #[error("hints are not adjacent")]
    NotAdjacent,
    /// The value is larger than the greater neighbor's.
    #[error("value exceeds greater neighbor")]
    AboveGreater,
    /// The value does not exceed the lesser neighbor's.
    #[error("value does not exceed lesser neighbor")]
    NotAboveLesser,
}

/// Errors reported by registries, resolvers and the report book.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The NULL sentinel was used as a real key.
    #[error("invalid key: NULL cannot be stored")]
    InvalidKey,
    /// Insert of a key that is already present.
    #[error("duplicate key")]
    DuplicateKey,
    /// The referenced key is absent.
    #[error("key not found")]
    NotFound,
    /// Supplied lesser/greater hints do not match the value's position.
    #[error("hint mismatch: {0}")]
    HintMismatch(HintFault),
    /// Insert beyond the configured capacity.
    #[error("capacity of {capacity} entries exceeded")]
    CapacityExceeded {
        /// Configured maximum number of entries.
        capacity: usize,
    },
    /// `pop_n` asked for more entries than are stored.
    #[error("requested {requested} entries but only {available} are stored")]
    InsufficientElements {
        /// Number of entries requested.
        requested: usize,
        /// Number of entries stored.
        available: usize,
    },
    /// A fraction was built with a zero denominator.
    #[error("fraction denominator must be non-zero")]
    ZeroDenominator,
    /// A textual address could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// A report came from an address that is not an authorized oracle.
    #[error("{oracle} is not an authorized oracle")]
    Unauthorized {
        /// Address that tried to report.
        oracle: Address,
    },
    /// A report carried a timestamp older than the newest stored report.
    #[error("report timestamp {timestamp} is older than newest report {newest}")]
    StaleTimestamp {
        /// Timestamp supplied with the report.
        timestamp: u64,
        /// Newest timestamp already stored.
        newest: u64,
    },
}

impl RegistryError {
    /// Returns `true` when the error signals a stale snapshot.
    ///
    /// Callers should refetch the registry contents, re-derive hints and
    /// retry. Every other error is a caller mistake and retrying it blindly
    /// cannot succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RegistryError::HintMismatch(_) | RegistryError::DuplicateKey | RegistryError::NotFound
        )
    }

    pub(crate) fn hint(fault: HintFault) -> Self {
        RegistryError::HintMismatch(fault)
    }
}
