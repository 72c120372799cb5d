//! chained-hashtable: a single-threaded, string-keyed table of `i64`
//! values using separate chaining.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small associative table whose collision resolution, growth
//!   policy and error signaling are all explicit and easy to audit.
//! - Layers:
//!   - `hash`: djb2 (`h = h * 33 + byte`, seeded at 5381) reduced modulo
//!     the bucket count.
//!   - `chain`: one slab (`SlotMap`) owns every entry; each bucket stores
//!     the id of its chain head and each entry the id of its successor.
//!   - `table`: the bucket array plus set/get/del, the occupancy monitor
//!     and the resize engine.
//!   - `diag`: textual dump and shape statistics.
//!
//! Constraints
//! - Single-threaded; callers serialize access themselves.
//! - Entries live in one slab rather than as individually allocated
//!   nodes: growing the table re-links ids and never moves entries.
//! - Keys are unique within a chain; `set` overwrites in place and only
//!   appends once the whole chain has been walked.
//! - Bucket indexes are a pure function of the key bytes and the bucket
//!   count; there is no random state.
//!
//! Growth
//! - `set` checks occupancy (`100 * entries / size`, truncated) before
//!   placing the key. Above the fixed 60% threshold the bucket array grows
//!   once to `2 * size + 1`. Every earlier insert started at or below 60%,
//!   so at most 60% + 1 entry is present; the grown array brings that back
//!   to 60% or less, and there is no retry loop.
//! - The bucket array never shrinks; `del` and `clear` keep `size`.
//!
//! Failure model
//! - Reserving a bucket array is fallible and reported as
//!   `TableError::AllocationFailure`; the table is untouched on failure.
//! - `del` reports `EmptyBucket` or `NotFound`; `get` returns `None`.
//! - A zero bucket count is a caller bug and panics.
//!
//! Notes and non-goals
//! - No iteration-order guarantee; order follows buckets and changes on
//!   growth.
//! - Values are plain `i64`; there is no generic value type.
//! - `cleanup` consumes the table, so use-after-cleanup does not compile.

mod chain;
pub mod config;
mod diag;
mod error;
pub mod hash;
mod table;
mod table_proptest;

// Public surface
pub use chain::{Chain, Entry};
pub use config::TableConfig;
pub use diag::TableStats;
pub use error::TableError;
pub use table::{Iter, Table};
