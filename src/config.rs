//! Construction parameters for [`Table`](crate::Table).

/// Bucket count used by `Table::default()`.
pub const DEFAULT_INITIAL_BUCKETS: usize = 16;

/// Occupancy percentage above which `set` grows the table first.
///
/// Fixed: with this value one `2 * size + 1` step always brings occupancy
/// back to at most the threshold before the key is placed.
pub const LOAD_THRESHOLD: usize = 60;

/// Builder-style configuration; start from `TableConfig::default()`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TableConfig {
    pub(crate) initial_buckets: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_INITIAL_BUCKETS,
        }
    }
}

impl TableConfig {
    /// Sets the initial bucket count. Panics on zero.
    pub fn with_initial_buckets(mut self, buckets: usize) -> Self {
        assert!(buckets > 0, "initial bucket count must be positive");
        self.initial_buckets = buckets;
        self
    }

    pub fn initial_buckets(&self) -> usize {
        self.initial_buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = TableConfig::default();
        assert_eq!(c.initial_buckets(), 16);
    }

    #[test]
    fn builder_overrides() {
        let c = TableConfig::default().with_initial_buckets(10);
        assert_eq!(c.initial_buckets(), 10);
    }

    #[test]
    #[should_panic(expected = "initial bucket count must be positive")]
    fn zero_buckets_rejected() {
        let _ = TableConfig::default().with_initial_buckets(0);
    }
}
