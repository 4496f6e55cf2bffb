//! Table sizing parameters.

use crate::error::{Result, TableError};

/// Bucket count of a table built with the default configuration.
pub const DEFAULT_BUCKETS: usize = 1 << 4;

/// Ratio of entries to buckets at which a table grows.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Largest bucket count a table grows to. Once reached, chains only get
/// longer.
pub const MAX_BUCKETS: usize = 1 << 30;

/// Initial bucket count and load factor for a new table.
///
/// The bucket count is rounded up to the next power of two when the
/// table is built; validation happens at that point too.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    initial_buckets: usize,
    load_factor: f32,
}

impl TableConfig {
    pub const fn new() -> Self {
        Self {
            initial_buckets: DEFAULT_BUCKETS,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    pub fn with_buckets(mut self, buckets: usize) -> Self {
        self.initial_buckets = buckets;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn initial_buckets(&self) -> usize {
        self.initial_buckets
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Checks the configuration and returns the rounded bucket count.
    pub fn validate(&self) -> Result<usize> {
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 {
            return Err(TableError::InvalidLoadFactor {
                load_factor: self.load_factor,
            });
        }
        if self.initial_buckets > MAX_BUCKETS {
            return Err(TableError::CapacityOverflow {
                requested: self.initial_buckets,
                max: MAX_BUCKETS,
            });
        }
        Ok(self.initial_buckets.max(1).next_power_of_two())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry count at which a table of `buckets` buckets grows.
pub(crate) fn threshold_for(buckets: usize, load_factor: f32) -> usize {
    if buckets >= MAX_BUCKETS {
        return usize::MAX;
    }
    (buckets as f64 * load_factor as f64) as usize
}
