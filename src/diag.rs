//! Diagnostic rendering of a table's contents.
//!
//! The dump is meant for people reading a terminal, not for parsing:
//!
//! ```text
//! { 30% full (size 10)
//!   [0] "a": 19,  [0] "k": 7,
//!   [1] "b": 1,
//! }
//! ```

use crate::table::Table;
use std::fmt;
use std::io::{self, Write};

/// Point-in-time shape of a table.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TableStats {
    pub entries: usize,
    pub buckets: usize,
    /// Buckets holding at least one entry.
    pub used_buckets: usize,
    pub longest_chain: usize,
    /// Same value as [`Table::used`].
    pub occupancy: usize,
}

impl Table {
    pub fn stats(&self) -> TableStats {
        let mut stats = TableStats {
            buckets: self.size(),
            occupancy: self.used(),
            ..TableStats::default()
        };
        for i in 0..self.size() {
            let len = self.bucket(i).count();
            stats.entries += len;
            if len > 0 {
                stats.used_buckets += 1;
            }
            stats.longest_chain = stats.longest_chain.max(len);
        }
        stats
    }

    /// Writes the dump followed by a blank line.
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{self}")?;
        writeln!(out)
    }

    /// Writes the dump to standard output. Write errors are ignored.
    pub fn print(&self) {
        let _ = self.dump(&mut io::stdout().lock());
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{ {}% full (size {})", self.used(), self.size())?;
        for i in 0..self.size() {
            let mut chain = self.bucket(i).peekable();
            if chain.peek().is_none() {
                continue;
            }
            for e in chain {
                write!(f, "  [{i}] {:?}: {},", e.key(), e.value())?;
            }
            writeln!(f)?;
        }
        f.write_str("}")
    }
}
