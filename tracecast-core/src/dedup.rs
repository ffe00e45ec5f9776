//! Per-period entity deduplication
//!
//! Tracks which entities a stream has seen since the last reporting
//! boundary. Resets are time-driven and lazy: the set is cleared by the
//! first event whose time lies beyond the current boundary, and that event
//! is then recorded into the fresh set.
//!
//! ```text
//! period = 2
//! t:     0.0    0.4     1.9     2.3     2.5     4.1
//! id:     1      2       1       3       1       2
//! reset:         ↑ (0)           ↑ (2)           ↑ (4)
//! set:   {1}    {2}    {1,2}    {3}    {1,3}    {2}
//! ```
//!
//! Boundaries start at 0 and advance by one period per reset, so a reset
//! is only evaluated against the current boundary, never skipped ahead.

use alloc::collections::BTreeSet;
use alloc::string::String;
use core::fmt::{self, Write};

use crate::report::PeriodReport;
use crate::time::{ModelTime, PeriodicBoundary};

/// Entities observed in the current reporting period
#[derive(Debug, Clone, PartialEq)]
pub struct DedupSet {
    ids: BTreeSet<i64>,
    boundary: PeriodicBoundary,
}

impl DedupSet {
    /// Create an empty set that resets every `period` time units
    pub fn new(period: ModelTime) -> Self {
        Self {
            ids: BTreeSet::new(),
            boundary: PeriodicBoundary::new(period),
        }
    }

    /// Record an entity, returning true if it was not yet seen this period
    pub fn observe(&mut self, id: i64) -> bool {
        self.ids.insert(id)
    }

    /// Clear the set if `current_time` is past the reporting boundary
    pub fn maybe_reset(&mut self, current_time: ModelTime) -> bool {
        self.roll_over(current_time).is_some()
    }

    /// Like `maybe_reset`, returning a snapshot of the cleared contents
    pub fn roll_over(&mut self, current_time: ModelTime) -> Option<PeriodReport> {
        let boundary = self.boundary.cross(current_time)?;
        let ids = core::mem::take(&mut self.ids);

        Some(PeriodReport {
            boundary,
            triggered_at: current_time,
            ids: ids.into_iter().collect(),
        })
    }

    /// Check whether an entity was seen this period
    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    /// Number of distinct entities this period
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if no entity was seen this period
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Entity ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().copied()
    }

    /// Time of the next reset boundary
    pub fn next_report_time(&self) -> ModelTime {
        self.boundary.next()
    }

    /// Render the ids as a list string, e.g. `"[1, 4, 9]"`
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = write_id_list(&mut out, self.ids());
        out
    }

    /// Drop all ids and rewind the boundary to its initial time
    pub fn clear(&mut self) {
        self.ids.clear();
        self.boundary.rewind();
    }
}

/// Write ids in `[a, b, c]` form
pub(crate) fn write_id_list<W: Write>(
    out: &mut W,
    ids: impl IntoIterator<Item = i64>,
) -> fmt::Result {
    out.write_char('[')?;
    for (i, id) in ids.into_iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write!(out, "{}", id)?;
    }
    out.write_char(']')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_once_per_period() {
        let mut set = DedupSet::new(2.0);

        assert!(set.observe(7));
        assert!(!set.observe(7));
        assert!(set.observe(8));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn reset_is_lazy_and_strict() {
        let mut set = DedupSet::new(2.0);
        set.observe(1);

        // t == boundary does not reset
        assert!(!set.maybe_reset(0.0));
        assert!(set.contains(1));

        assert!(set.maybe_reset(0.1));
        assert!(set.is_empty());
        assert_eq!(set.next_report_time(), 2.0);

        // Fresh period: the id counts as new again
        assert!(set.observe(1));

        // Same period again, nothing to do
        assert!(!set.maybe_reset(1.9));
        assert!(!set.observe(1));
    }

    #[test]
    fn roll_over_snapshots_before_clearing() {
        let mut set = DedupSet::new(2.0);
        set.maybe_reset(0.5);
        set.observe(4);
        set.observe(2);

        let report = set.roll_over(2.5).unwrap();
        assert_eq!(report.boundary, 2.0);
        assert_eq!(report.triggered_at, 2.5);
        assert_eq!(report.ids, alloc::vec![2, 4]);
        assert!(set.is_empty());
        assert_eq!(set.next_report_time(), 4.0);
    }

    #[test]
    fn render_lists_ids_in_order() {
        let mut set = DedupSet::new(2.0);
        assert_eq!(set.render(), "[]");

        set.observe(9);
        set.observe(1);
        set.observe(4);
        assert_eq!(set.render(), "[1, 4, 9]");
    }

    #[test]
    fn clear_rewinds_boundary() {
        let mut set = DedupSet::new(2.0);
        set.maybe_reset(1.0);
        set.observe(3);
        set.clear();

        assert!(set.is_empty());
        assert_eq!(set.next_report_time(), 0.0);
    }
}
