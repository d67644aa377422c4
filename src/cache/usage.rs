use std::collections::HashMap;

use super::EntryId;

/// Least-frequently-used bookkeeping for cache entries.
///
/// Ties on the use count break towards the entry inserted first, so a burst
/// of same-count entries is evicted in insertion order.
#[derive(Default)]
pub(super) struct UsageTracker {
    counts: HashMap<EntryId, (u64, u64)>,
    next_seq: u64,
}

impl UsageTracker {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Bump the use count of `id`, registering it on first sight.
    pub(super) fn record(&mut self, id: EntryId) {
        let seq = &mut self.next_seq;
        let entry = self.counts.entry(id).or_insert_with(|| {
            let s = *seq;
            *seq += 1;
            (0, s)
        });
        entry.0 += 1;
    }

    /// Remove and return the least-used entry, if any.
    pub(super) fn poll_least(&mut self) -> Option<EntryId> {
        let id = self
            .counts
            .iter()
            .min_by_key(|(_, &(count, seq))| (count, seq))
            .map(|(&id, _)| id)?;
        self.counts.remove(&id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_least_prefers_lowest_count() {
        let mut usage = UsageTracker::new();
        usage.record(1);
        usage.record(2);
        usage.record(2);
        usage.record(3);
        usage.record(3);
        usage.record(3);
        assert_eq!(usage.poll_least(), Some(1));
        assert_eq!(usage.poll_least(), Some(2));
        assert_eq!(usage.poll_least(), Some(3));
        assert_eq!(usage.poll_least(), None);
    }

    #[test]
    fn test_ties_break_towards_oldest() {
        let mut usage = UsageTracker::new();
        usage.record(7);
        usage.record(5);
        usage.record(9);
        assert_eq!(usage.poll_least(), Some(7));
        assert_eq!(usage.poll_least(), Some(5));
        assert_eq!(usage.poll_least(), Some(9));
    }

    #[test]
    fn test_polled_entry_restarts_at_zero() {
        let mut usage = UsageTracker::new();
        usage.record(1);
        usage.record(1);
        usage.record(2);
        assert_eq!(usage.poll_least(), Some(2));
        usage.record(2);
        // the re-inserted entry lost its old count of 1 and starts over
        assert_eq!(usage.poll_least(), Some(2));
        assert_eq!(usage.poll_least(), Some(1));
    }
}
