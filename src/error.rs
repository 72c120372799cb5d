//! Error taxonomy for table operations.

use thiserror::Error;

/// Recoverable failures reported by [`Table`](crate::Table) operations.
///
/// Lookups report a missing key as `None` instead of an error.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum TableError {
    /// The bucket array could not be reserved, either at construction or
    /// while growing. The table, if any, is left unchanged.
    #[error("cannot allocate a bucket array of {buckets} slots")]
    AllocationFailure { buckets: usize },

    /// `del` hashed to a bucket that holds no chain.
    #[error("bucket {index} is empty")]
    EmptyBucket { index: usize },

    /// `del` walked the whole chain of a bucket without a match.
    #[error("key not present in the chain of bucket {index}")]
    NotFound { index: usize },
}

impl TableError {
    /// Numeric status code: `1` for an allocation failure or an empty
    /// bucket, `2` for a key missing from a populated bucket. Success is 0.
    pub fn status(&self) -> u8 {
        match self {
            TableError::AllocationFailure { .. } | TableError::EmptyBucket { .. } => 1,
            TableError::NotFound { .. } => 2,
        }
    }
}
