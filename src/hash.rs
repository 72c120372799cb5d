//! djb2 string hashing and bucket indexing.
//!
//! The index of a key depends only on its bytes and the bucket count, so
//! it is stable across calls and across processes.

/// Starting value of the djb2 recurrence.
pub const SEED: u64 = 5381;

/// Raw djb2 hash: `h = h * 33 + byte` over every byte, wrapping at 64 bits.
#[inline]
pub fn raw_hash(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(SEED, |h, &b| h.wrapping_mul(33).wrapping_add(u64::from(b)))
}

/// Bucket index of `key` in a table of `size` buckets; always `< size`.
///
/// Panics if `size` is zero.
#[inline]
pub fn bucket_index(key: &str, size: usize) -> usize {
    assert!(size > 0, "bucket count must be positive");
    (raw_hash(key.as_bytes()) % size as u64) as usize
}
