//! Commands the session dispatches.
//!
//! Every user-visible operation is one value of [`Command`]; the TUI (and
//! the integration tests) drive the session exclusively through
//! `TraceSession::dispatch`, so the full behavior surface is replayable.

use crate::domain::RegisterId;
use crate::search::{SearchDomain, SearchMode};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Pin the cursor at a local trace index (clamped).
    Seek(usize),
    /// Move the cursor by a signed delta (saturating).
    SeekRelative(i64),
    SeekStart,
    SeekEnd,
    /// Leave Replay and follow the head again.
    ResumeLive,

    /// Seek to the next/previous execution of the current instruction.
    NextInstrHit,
    PrevInstrHit,
    /// Seek to the next/previous access of the watched data range.
    NextDaddrHit,
    PrevDaddrHit,
    /// Seek to the next change / the setting write of a register.
    NextRegisterWrite(RegisterId),
    PrevRegisterWrite(RegisterId),

    SetDaddr { addr: u64, size: Option<u64> },
    ClearDaddr,
    AddWatch { addr: u64, size: u64, label: String },
    RemoveWatch { addr: u64, size: u64 },

    /// Seek to the index under a timeline column.
    ClickSeek { px: u16, width: u16 },
    /// Zoom into a dragged column range (ignored below the minimum span).
    DragZoom { px0: u16, px1: u16, width: u16 },
    ScrollZoom { px: u16, width: u16, zoom_in: bool },
    ZoomReset,

    Search {
        domain: SearchDomain,
        query: String,
        mode: SearchMode,
    },
    SearchNext(SearchDomain),
    SearchPrev(SearchDomain),
    SearchClear(SearchDomain),

    /// Full session reset (program reload).
    Reset,
}
