//! Errors raised while configuring a table.

use thiserror::Error;

/// Rejected table configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    /// Load factor must be finite and strictly positive.
    #[error("invalid load factor: {load_factor}")]
    InvalidLoadFactor {
        /// The rejected value
        load_factor: f32,
    },

    /// Requested bucket count exceeds the supported maximum.
    #[error("capacity overflow: requested {requested} buckets, maximum is {max}")]
    CapacityOverflow {
        /// Buckets asked for, before rounding
        requested: usize,
        /// Largest supported bucket count
        max: usize,
    },
}

/// Result alias for table construction.
pub type Result<T> = std::result::Result<T, TableError>;
