//! Trace cursor: Live vs Replay.
//!
//! Live tracks the head of the trace; Replay pins one retained index. The
//! cursor alone never talks to the engine — the session drives the restore
//! pipeline around it — but the transition rules live here so they are
//! testable in isolation.

/// Where in the trace the front end is looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceCursor {
    /// Following the newest entry; state views show the head.
    #[default]
    Live,
    /// Pinned to one retained index; state views are frozen at it.
    Replay { local_index: usize },
}

impl TraceCursor {
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// The index state views read from: the pinned index in Replay, the
    /// head in Live. `None` on an empty trace.
    #[must_use]
    pub fn effective_index(&self, trace_len: usize) -> Option<usize> {
        if trace_len == 0 {
            return None;
        }
        match self {
            Self::Live => Some(trace_len - 1),
            Self::Replay { local_index } => Some((*local_index).min(trace_len - 1)),
        }
    }

    /// Enter Replay at `index`, clamped to the retained range. An empty
    /// trace cannot be entered; the cursor is unchanged.
    #[must_use]
    pub fn seeked(self, index: usize, trace_len: usize) -> Self {
        if trace_len == 0 {
            return self;
        }
        Self::Replay {
            local_index: index.min(trace_len - 1),
        }
    }

    /// Current index moved by `delta`, saturating at both ends.
    #[must_use]
    pub fn relative_target(&self, delta: i64, trace_len: usize) -> Option<usize> {
        let cur = self.effective_index(trace_len)?;
        let target = if delta.is_negative() {
            cur.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            cur.saturating_add(delta as usize)
        };
        Some(target.min(trace_len - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_clamps_and_requires_entries() {
        let live = TraceCursor::Live;
        assert_eq!(live.seeked(5, 0), TraceCursor::Live);
        assert_eq!(live.seeked(500, 100), TraceCursor::Replay { local_index: 99 });
        assert_eq!(live.seeked(0, 100), TraceCursor::Replay { local_index: 0 });
    }

    #[test]
    fn test_effective_index() {
        assert_eq!(TraceCursor::Live.effective_index(0), None);
        assert_eq!(TraceCursor::Live.effective_index(10), Some(9));
        let pinned = TraceCursor::Replay { local_index: 4 };
        assert_eq!(pinned.effective_index(10), Some(4));
        // Stale pin after the trace shrank reads clamped, not out of range.
        assert_eq!(pinned.effective_index(3), Some(2));
    }

    #[test]
    fn test_relative_target_saturates() {
        let c = TraceCursor::Replay { local_index: 2 };
        assert_eq!(c.relative_target(-10, 100), Some(0));
        assert_eq!(c.relative_target(10, 100), Some(12));
        assert_eq!(c.relative_target(1000, 100), Some(99));
        assert_eq!(TraceCursor::Live.relative_target(1, 0), None);
    }
}
