use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Ids of events that have already been notified during this run.
///
/// Each id remembers its event's creation time so that entries can be pruned
/// once they fall behind the poll loop's age cutoff. Events older than the
/// cutoff are never selected again, so pruning cannot cause a repeat.
#[derive(Debug, Default)]
pub struct DedupWindow {
    seen: HashMap<String, DateTime<Utc>>,
}

impl DedupWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, id: &str) -> bool {
        self.seen.contains_key(id)
    }

    pub fn mark_seen(&mut self, id: &str, created_at: DateTime<Utc>) {
        self.seen.insert(id.to_string(), created_at);
    }

    /// Forget every id whose event was created strictly before `cutoff`.
    /// Returns how many entries were removed.
    pub fn prune(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.seen.len();
        self.seen.retain(|_, created_at| *created_at >= cutoff);
        before - self.seen.len()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn marks_are_exact() {
        let now = Utc::now();
        let mut window = DedupWindow::new();
        assert!(!window.seen("1"));

        window.mark_seen("1", now);
        assert!(window.seen("1"));
        assert!(!window.seen("10"));
        assert!(!window.seen(""));
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn marking_twice_keeps_one_entry() {
        let now = Utc::now();
        let mut window = DedupWindow::new();
        window.mark_seen("1", now);
        window.mark_seen("1", now);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn prune_drops_only_entries_before_cutoff() {
        let now = Utc::now();
        let cutoff = now - Duration::hours(1);
        let mut window = DedupWindow::new();
        window.mark_seen("old", now - Duration::minutes(61));
        window.mark_seen("edge", cutoff);
        window.mark_seen("new", now - Duration::minutes(5));

        assert_eq!(window.prune(cutoff), 1);
        assert!(!window.seen("old"));
        assert!(window.seen("edge"));
        assert!(window.seen("new"));
    }

    #[test]
    fn prune_on_empty_window() {
        let mut window = DedupWindow::new();
        assert_eq!(window.prune(Utc::now()), 0);
        assert!(window.is_empty());
    }
}
