//! Watched data address (daddr) and the persistent watch list.
//!
//! The daddr is a singleton focus range driving the timeline's access lane,
//! the region history pane and J/K navigation. Watch entries persist across
//! Live/Replay transitions and carry a saturating hit counter.

use crate::engine::TraceEngine;

/// Default watched-range size when the user gives only an address.
pub const DEFAULT_DADDR_SIZE: u64 = 4;

/// Region history display cap (newest rows kept).
pub const REGION_HISTORY_MAX: usize = 2000;

/// Watch hit counters saturate here; shown as `10000+`.
pub const WATCH_HIT_CAP: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchedRange {
    pub addr: u64,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEntry {
    pub addr: u64,
    pub size: u64,
    pub label: String,
    /// Access count over the whole trace, `None` until refreshed.
    pub hits: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct WatchState {
    daddr: Option<WatchedRange>,
    entries: Vec<WatchEntry>,
}

impl WatchState {
    #[must_use]
    pub fn daddr(&self) -> Option<WatchedRange> {
        self.daddr
    }

    #[must_use]
    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    pub fn set_daddr(&mut self, addr: u64, size: u64) {
        self.daddr = Some(WatchedRange {
            addr,
            size: size.max(1),
        });
    }

    pub fn clear_daddr(&mut self) {
        self.daddr = None;
    }

    /// Add (or re-label) a watch entry; one entry per (addr, size).
    pub fn add_entry(&mut self, addr: u64, size: u64, label: impl Into<String>) {
        let size = size.max(1);
        let label = label.into();
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.addr == addr && e.size == size)
        {
            existing.label = label;
            return;
        }
        self.entries.push(WatchEntry {
            addr,
            size,
            label,
            hits: None,
        });
    }

    /// Remove the entry matching (addr, size). Removing the entry the daddr
    /// currently points at clears the daddr too.
    pub fn remove_entry(&mut self, addr: u64, size: u64) {
        self.entries.retain(|e| !(e.addr == addr && e.size == size));
        if self
            .daddr
            .is_some_and(|d| d.addr == addr && d.size == size)
        {
            self.daddr = None;
        }
    }

    /// Recount every entry's accesses against the current trace.
    pub fn refresh_hits<E: TraceEngine + ?Sized>(&mut self, engine: &E) {
        for entry in &mut self.entries {
            entry.hits = Some(engine.address_hit_count(entry.addr, entry.size, WATCH_HIT_CAP));
        }
    }

    pub fn clear(&mut self) {
        self.daddr = None;
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removing_watched_entry_clears_daddr() {
        let mut w = WatchState::default();
        w.add_entry(0x1000, 4, "buf");
        w.add_entry(0x2000, 8, "len");
        w.set_daddr(0x1000, 4);

        w.remove_entry(0x2000, 8);
        assert!(w.daddr().is_some());

        w.remove_entry(0x1000, 4);
        assert_eq!(w.daddr(), None);
        assert!(w.entries().is_empty());
    }

    #[test]
    fn test_removal_matches_size_too() {
        let mut w = WatchState::default();
        w.add_entry(0x1000, 4, "a");
        w.set_daddr(0x1000, 8);
        // Same address, different size: the daddr survives.
        w.remove_entry(0x1000, 4);
        assert!(w.daddr().is_some());
    }

    #[test]
    fn test_add_entry_dedups_and_relabels() {
        let mut w = WatchState::default();
        w.add_entry(0x1000, 4, "old");
        w.add_entry(0x1000, 4, "new");
        assert_eq!(w.entries().len(), 1);
        assert_eq!(w.entries()[0].label, "new");
    }

    #[test]
    fn test_zero_size_is_bumped_to_one() {
        let mut w = WatchState::default();
        w.set_daddr(0x1000, 0);
        assert_eq!(w.daddr().map(|d| d.size), Some(1));
    }
}
