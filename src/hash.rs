//! Hash finalization and bucket indexing.
//!
//! A key's `BuildHasher` output is folded to a 32-bit primitive hash,
//! then mixed so that high-order bits take part in the power-of-two mask.

/// Folds a 64-bit hasher output into the 32-bit primitive hash.
#[inline]
pub fn fold(h: u64) -> u32 {
    (h ^ (h >> 32)) as u32
}

/// Secondary mix: xor the high half of `raw` into its low half.
#[inline]
pub fn mix(raw: u32) -> u32 {
    raw ^ (raw >> 16)
}

/// Bucket index of a mixed hash in a table of `bucket_count` buckets.
///
/// `bucket_count` must be a power of two.
#[inline]
pub fn index_for(mixed: u32, bucket_count: usize) -> usize {
    debug_assert!(bucket_count.is_power_of_two());
    (mixed as usize) & (bucket_count - 1)
}
