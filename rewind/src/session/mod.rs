//! The trace session: cursor, viewport, watches and searches over one engine.
//!
//! ```text
//!                ┌────────────────────────────────────────────┐
//!   Command ────▶│ TraceSession                               │
//!                │  cursor  (Live / Replay state machine)     │
//!                │  zoom    (viewport mapper)                 │──▶ SeekView,
//!                │  watch   (daddr + watch list)              │    timeline,
//!                │  search  (memory / disasm / syscall)       │    history
//!                └───────────────────┬────────────────────────┘
//!                                    │ TraceEngine trait
//!                                    ▼
//!                              trace store (external)
//! ```
//!
//! All user-visible operations arrive as a [`Command`] through
//! [`TraceSession::dispatch`] and run to completion before the next one; the
//! session holds no locks and spawns no tasks. Engine queries that find
//! nothing leave the session untouched; engine *failures* surface as a
//! status line plus the empty view, never a panic.

pub mod command;
pub mod cursor;
pub mod watch;
pub mod zoom;

pub use command::Command;
pub use cursor::TraceCursor;
pub use watch::{WatchState, WatchedRange, DEFAULT_DADDR_SIZE, REGION_HISTORY_MAX};
pub use zoom::{ZoomWindow, DRAG_THRESHOLD, OVERSAMPLE};

use log::debug;

use crate::engine::{
    ActivitySample, DaddrHit, DisasmLine, MemAccess, RegionAccess, RegisterSnapshot, RipSample,
    TraceEngine,
};
use crate::search::{
    resolve_mode, LineHaystack, MemoryHaystack, Needle, SearchDomain, SearchHit,
    SearchMode, SearchSession, SEARCH_MATCH_CAP,
};

/// Listing lines fetched on each side of the current rip.
const DISASM_CONTEXT: usize = 64;

/// Bytes the generic memory-search fallback covers when the engine offers no
/// native full-image search: the window the memory dump displays.
const MEM_VIEW_BYTES: usize = 512;

/// Frozen state views for the current cursor position. Replaced atomically
/// per seek; an engine failure replaces it with [`SeekView::default`], never
/// a half-updated one.
#[derive(Debug, Clone, Default)]
pub struct SeekView {
    pub registers: Option<RegisterSnapshot>,
    /// Disassembly of the current instruction.
    pub disasm: String,
    /// Listing window around the current rip.
    pub listing: Vec<DisasmLine>,
    /// Memory accesses performed by the current instruction.
    pub accesses: Vec<MemAccess>,
    /// Whether the current instruction touches the watched data range.
    pub touches_daddr: bool,
}

/// Everything the timeline widget needs for one frame, sampled through the
/// zoom window at anti-alias density.
#[derive(Debug, Clone, Default)]
pub struct TimelineData {
    pub rip: Vec<RipSample>,
    pub activity: Vec<ActivitySample>,
    pub daddr_hits: Vec<DaddrHit>,
    pub instr_hits: Vec<usize>,
    pub cursor_column: Option<u16>,
    pub minimap: Option<(f64, f64)>,
    pub window: ZoomWindow,
}

pub struct TraceSession<E> {
    engine: E,
    cursor: TraceCursor,
    zoom: ZoomWindow,
    watch: WatchState,
    mem_search: SearchSession,
    disasm_search: SearchSession,
    syscall_search: SearchSession,
    view: SeekView,
    region_history: Vec<RegionAccess>,
    follow_row: Option<usize>,
    /// Dump base pinned to the current memory search hit; cleared whenever
    /// the watched range changes or the memory search is cleared.
    mem_view_pin: Option<u64>,
    status: Option<String>,
}

impl<E: TraceEngine> TraceSession<E> {
    pub fn new(engine: E) -> Self {
        let mut session = Self {
            engine,
            cursor: TraceCursor::Live,
            zoom: ZoomWindow::full(0),
            watch: WatchState::default(),
            mem_search: SearchSession::new(SearchDomain::Memory),
            disasm_search: SearchSession::new(SearchDomain::Disassembly),
            syscall_search: SearchSession::new(SearchDomain::SyscallLog),
            view: SeekView::default(),
            region_history: Vec::new(),
            follow_row: None,
            mem_view_pin: None,
            status: None,
        };
        session.zoom = ZoomWindow::full(session.engine.trace_len());
        session.refresh_live();
        session
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable engine access for the live feed (appending steps).
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn cursor(&self) -> TraceCursor {
        self.cursor
    }

    pub fn zoom(&self) -> ZoomWindow {
        self.zoom.normalized(self.engine.trace_len())
    }

    pub fn watch(&self) -> &WatchState {
        &self.watch
    }

    pub fn view(&self) -> &SeekView {
        &self.view
    }

    pub fn region_history(&self) -> &[RegionAccess] {
        &self.region_history
    }

    /// Row of the region history the views should track: the last access at
    /// or before the cursor.
    pub fn follow_row(&self) -> Option<usize> {
        self.follow_row
    }

    /// Terminal status of the last failed engine operation, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn search(&self, domain: SearchDomain) -> &SearchSession {
        match domain {
            SearchDomain::Memory => &self.mem_search,
            SearchDomain::Disassembly => &self.disasm_search,
            SearchDomain::SyscallLog => &self.syscall_search,
        }
    }

    fn search_mut(&mut self, domain: SearchDomain) -> &mut SearchSession {
        match domain {
            SearchDomain::Memory => &mut self.mem_search,
            SearchDomain::Disassembly => &mut self.disasm_search,
            SearchDomain::SyscallLog => &mut self.syscall_search,
        }
    }

    /// Cursor position in global sequence numbers: `(position, head)`.
    pub fn global_position(&self) -> Option<(u64, u64)> {
        let len = self.engine.trace_len();
        let idx = self.cursor.effective_index(len)?;
        let base = self.engine.base_index();
        Some((base + idx as u64, base + (len - 1) as u64))
    }

    /// Base address of the memory dump window: the current memory search hit
    /// when one is active, the watched range otherwise.
    pub fn memory_view_base(&self) -> u64 {
        self.mem_view_pin
            .or_else(|| self.watch.daddr().map(|d| d.addr & !0xf))
            .unwrap_or(0)
    }

    pub fn dispatch(&mut self, cmd: Command) {
        debug!("dispatch: {cmd:?}");
        let len = self.engine.trace_len();
        match cmd {
            Command::Seek(index) => self.seek(index),
            Command::SeekRelative(delta) => {
                if let Some(target) = self.cursor.relative_target(delta, len) {
                    self.seek(target);
                }
            }
            Command::SeekStart => self.seek(0),
            Command::SeekEnd => {
                if len > 0 {
                    self.seek(len - 1);
                }
            }
            Command::ResumeLive => self.resume_live(),

            Command::NextInstrHit => self.seek_instr_hit(true),
            Command::PrevInstrHit => self.seek_instr_hit(false),
            Command::NextDaddrHit => self.seek_daddr_hit(true),
            Command::PrevDaddrHit => self.seek_daddr_hit(false),
            Command::NextRegisterWrite(reg) => {
                if let Some(cur) = self.cursor.effective_index(len) {
                    if let Some(target) = self.engine.next_by_register_write(reg, cur) {
                        self.seek(target);
                    }
                }
            }
            Command::PrevRegisterWrite(reg) => {
                if let Some(cur) = self.cursor.effective_index(len) {
                    if let Some(target) = self.engine.prev_by_register_write(reg, cur) {
                        self.seek(target);
                    }
                }
            }

            Command::SetDaddr { addr, size } => {
                self.watch
                    .set_daddr(addr, size.unwrap_or(DEFAULT_DADDR_SIZE));
                self.mem_view_pin = None;
                self.watch.refresh_hits(&self.engine);
                self.refresh_region_history();
                self.view.touches_daddr = self.accesses_touch_daddr();
            }
            Command::ClearDaddr => {
                self.watch.clear_daddr();
                self.mem_view_pin = None;
                self.refresh_region_history();
                self.view.touches_daddr = false;
            }
            Command::AddWatch { addr, size, label } => {
                self.watch.add_entry(addr, size, label);
                self.watch.refresh_hits(&self.engine);
            }
            Command::RemoveWatch { addr, size } => {
                let had_daddr = self.watch.daddr().is_some();
                self.watch.remove_entry(addr, size);
                if had_daddr && self.watch.daddr().is_none() {
                    self.refresh_region_history();
                    self.view.touches_daddr = false;
                }
            }

            Command::ClickSeek { px, width } => {
                let idx = self.zoom.index_at(px, width, len);
                self.seek(idx);
            }
            Command::DragZoom { px0, px1, width } => {
                if let Some(zoomed) = self.zoom.drag_zoom(px0, px1, width, len) {
                    self.zoom = zoomed;
                }
            }
            Command::ScrollZoom { px, width, zoom_in } => {
                self.zoom = self.zoom.scroll_zoom(px, width, len, zoom_in);
            }
            Command::ZoomReset => self.zoom = ZoomWindow::full(len),

            Command::Search {
                domain,
                query,
                mode,
            } => self.run_search(domain, &query, mode),
            Command::SearchNext(domain) => {
                if let Some(hit) = self.search_mut(domain).next() {
                    self.goto_match(domain, hit);
                }
            }
            Command::SearchPrev(domain) => {
                if let Some(hit) = self.search_mut(domain).prev() {
                    self.goto_match(domain, hit);
                }
            }
            Command::SearchClear(domain) => {
                self.search_mut(domain).clear();
                if domain == SearchDomain::Memory {
                    self.mem_view_pin = None;
                }
            }

            Command::Reset => self.reset(),
        }
    }

    /// Clear all navigation state back to Live-at-full-range. Watches,
    /// searches and the daddr are gone; the engine is untouched.
    pub fn reset(&mut self) {
        self.cursor = TraceCursor::Live;
        self.zoom = ZoomWindow::full(self.engine.trace_len());
        self.watch.clear();
        self.mem_search.clear();
        self.disasm_search.clear();
        self.syscall_search.clear();
        self.view = SeekView::default();
        self.region_history.clear();
        self.follow_row = None;
        self.mem_view_pin = None;
        self.status = None;
        self.refresh_live();
    }

    /// Sync the views to the head. Call after new live steps arrive; a
    /// Replay cursor is left alone.
    pub fn refresh_live(&mut self) {
        let len = self.engine.trace_len();
        if self.cursor.is_live() && len > 0 {
            self.sync_at(len - 1);
        }
    }

    /// Pin the cursor and run the synchronization pipeline: restore,
    /// refresh the view atomically, then the region history follow row.
    fn seek(&mut self, index: usize) {
        let len = self.engine.trace_len();
        if len == 0 {
            return;
        }
        let idx = index.min(len - 1);
        self.cursor = TraceCursor::Replay { local_index: idx };
        self.sync_at(idx);
    }

    fn resume_live(&mut self) {
        self.cursor = TraceCursor::Live;
        self.view = SeekView::default();
        self.status = None;
        self.refresh_live();
    }

    fn sync_at(&mut self, idx: usize) {
        self.status = None;
        if let Err(err) = self.engine.restore_state_at(idx) {
            self.view = SeekView::default();
            self.status = Some(err.to_string());
            self.refresh_region_history();
            self.refresh_disasm_search();
            return;
        }
        let registers = self.engine.registers_at(idx);
        let rip = registers.as_ref().map_or(0, |r| r.rip);
        let accesses = self.engine.memory_accesses_at(idx);
        let touches_daddr = self
            .watch
            .daddr()
            .is_some_and(|d| accesses.iter().any(|a| a.intersects(d.addr, d.size)));
        self.view = SeekView {
            registers,
            disasm: self.engine.disassembly_at(idx),
            listing: self
                .engine
                .disassembly_window(rip, DISASM_CONTEXT, DISASM_CONTEXT),
            accesses,
            touches_daddr,
        };
        self.refresh_region_history();
        self.refresh_disasm_search();
    }

    /// The disassembly haystack is the listing window, which moved with the
    /// seek; recompute the active query so highlights point at the new lines.
    /// An identical match list keeps the current-match pointer, anything else
    /// resets it.
    fn refresh_disasm_search(&mut self) {
        if self.disasm_search.query().trim().is_empty() {
            return;
        }
        let query = self.disasm_search.query().to_string();
        let mode = self.disasm_search.mode();
        let hay = LineHaystack::from_disasm(&self.view.listing);
        self.disasm_search.run(&query, mode, &hay);
    }

    fn accesses_touch_daddr(&self) -> bool {
        self.watch.daddr().is_some_and(|d| {
            self.view
                .accesses
                .iter()
                .any(|a| a.intersects(d.addr, d.size))
        })
    }

    fn refresh_region_history(&mut self) {
        match self.watch.daddr() {
            Some(d) => {
                self.region_history =
                    self.engine
                        .region_history(d.addr, d.size, REGION_HISTORY_MAX);
                let len = self.engine.trace_len();
                self.follow_row = self.cursor.effective_index(len).and_then(|cur| {
                    self.region_history
                        .iter()
                        .rposition(|row| row.local_index <= cur)
                });
            }
            None => {
                self.region_history.clear();
                self.follow_row = None;
            }
        }
    }

    fn seek_instr_hit(&mut self, forward: bool) {
        let len = self.engine.trace_len();
        let Some(cur) = self.cursor.effective_index(len) else {
            return;
        };
        let Some(regs) = self.engine.registers_at(cur) else {
            return;
        };
        let target = if forward {
            self.engine.next_by_rip(regs.rip, cur + 1)
        } else {
            cur.checked_sub(1)
                .and_then(|from| self.engine.prev_by_rip(regs.rip, from))
        };
        if let Some(target) = target {
            self.seek(target);
        }
    }

    fn seek_daddr_hit(&mut self, forward: bool) {
        let Some(d) = self.watch.daddr() else {
            return;
        };
        let len = self.engine.trace_len();
        let Some(cur) = self.cursor.effective_index(len) else {
            return;
        };
        let target = if forward {
            self.engine.next_by_address_access(d.addr, d.size, cur + 1)
        } else {
            cur.checked_sub(1)
                .and_then(|from| self.engine.prev_by_address_access(d.addr, d.size, from))
        };
        if let Some(target) = target {
            self.seek(target);
        }
    }

    fn run_search(&mut self, domain: SearchDomain, query: &str, mode: SearchMode) {
        match domain {
            SearchDomain::Memory => self.run_memory_search(query, mode),
            SearchDomain::Disassembly => {
                let hay = LineHaystack::from_disasm(&self.view.listing);
                self.disasm_search.run(query, mode, &hay);
            }
            SearchDomain::SyscallLog => {
                let lines = self
                    .engine
                    .syscall_log()
                    .into_iter()
                    .map(|row| row.text)
                    .collect();
                let hay = LineHaystack::from_lines(lines);
                self.syscall_search.run(query, mode, &hay);
            }
        }
    }

    fn run_memory_search(&mut self, query: &str, mode: SearchMode) {
        let q = query.trim();
        if q.is_empty() {
            self.mem_search.install(query, mode, None, Vec::new(), false, true);
            self.mem_view_pin = None;
            return;
        }
        let resolved = resolve_mode(q, mode, SearchDomain::Memory);
        if let Some(matches) = self.engine.search_memory(q, resolved) {
            // Engine-native full-image search.
            let valid = Needle::build(q, resolved, SearchDomain::Memory).is_some();
            let overflow = matches.len() >= SEARCH_MATCH_CAP;
            let hits = matches
                .into_iter()
                .map(|m| SearchHit {
                    start: m.addr,
                    len: m.len,
                })
                .collect();
            self.mem_search
                .install(query, mode, Some(resolved), hits, overflow, valid);
        } else {
            // Generic matcher over the visible dump window.
            let base = self.memory_view_base();
            let slice = self.engine.read_memory_range(base, MEM_VIEW_BYTES);
            let hay = MemoryHaystack {
                base,
                bytes: &slice.bytes,
            };
            self.mem_search.run(query, mode, &hay);
        }
        // Show the first hit straight away, like `n` would.
        if let Some(hit) = self.mem_search.current() {
            self.mem_view_pin = Some(hit.start & !0xf);
        }
    }

    /// Match navigation per domain: a syscall-log match seeks to the
    /// syscall's trace index, a memory match jumps the dump window to its
    /// row. Disassembly matches only move view highlights, which the widgets
    /// derive from the session.
    fn goto_match(&mut self, domain: SearchDomain, hit: SearchHit) {
        match domain {
            SearchDomain::SyscallLog => {
                let log = self.engine.syscall_log();
                if let Some(row) = log.get(hit.start as usize) {
                    self.seek(row.local_index);
                }
            }
            SearchDomain::Memory => self.mem_view_pin = Some(hit.start & !0xf),
            SearchDomain::Disassembly => {}
        }
    }

    /// Sample every timeline lane through the zoom window for a raster of
    /// `width` columns.
    pub fn timeline(&self, width: u16) -> TimelineData {
        let len = self.engine.trace_len();
        let window = self.zoom.normalized(len);
        if len == 0 || width == 0 {
            return TimelineData::default();
        }
        let max_samples = usize::from(width) * OVERSAMPLE;
        let (start, end) = (window.start, window.end);

        let daddr_hits = self.watch.daddr().map_or_else(Vec::new, |d| {
            self.engine
                .daddr_hit_samples(d.addr, d.size, start, end, max_samples)
        });
        let instr_hits = self
            .view
            .registers
            .as_ref()
            .map_or_else(Vec::new, |regs| {
                self.engine.rip_hit_indices(regs.rip, start, end, max_samples)
            });

        TimelineData {
            rip: self.engine.rip_samples(start, end, max_samples),
            activity: self.engine.memory_activity_samples(start, end, max_samples),
            daddr_hits,
            instr_hits,
            cursor_column: self
                .cursor
                .effective_index(len)
                .and_then(|idx| window.column_of(idx, width, len)),
            minimap: window.minimap(len),
            window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecordedEngine;
    use crate::search::SearchStatus;
    use crate::trace_file::{TraceFile, TraceStep};

    fn session(steps: usize) -> TraceSession<RecordedEngine> {
        TraceSession::new(RecordedEngine::new(TraceFile::synthetic(steps)))
    }

    #[test]
    fn test_new_session_is_live_at_full_range() {
        let s = session(100);
        assert!(s.cursor().is_live());
        assert_eq!(s.zoom(), ZoomWindow::full(100));
        assert!(s.view().registers.is_some());
    }

    #[test]
    fn test_seek_clamps_and_freezes_view() {
        let mut s = session(50);
        s.dispatch(Command::Seek(10_000));
        assert_eq!(s.cursor(), TraceCursor::Replay { local_index: 49 });
        let rip = s.view().registers.as_ref().map(|r| r.rip);
        assert!(rip.is_some());
        assert!(!s.view().disasm.is_empty());
    }

    #[test]
    fn test_resume_live_clears_replay_state() {
        let mut s = session(50);
        s.dispatch(Command::Seek(5));
        s.dispatch(Command::ResumeLive);
        assert!(s.cursor().is_live());
        // Live view tracks the head again.
        assert_eq!(
            s.view().registers.as_ref().map(|r| r.rip),
            s.engine().registers_at(49).map(|r| r.rip)
        );
    }

    #[test]
    fn test_relative_seek_saturates() {
        let mut s = session(20);
        s.dispatch(Command::Seek(1));
        s.dispatch(Command::SeekRelative(-10));
        assert_eq!(s.cursor(), TraceCursor::Replay { local_index: 0 });
        s.dispatch(Command::SeekRelative(1000));
        assert_eq!(s.cursor(), TraceCursor::Replay { local_index: 19 });
    }

    #[test]
    fn test_instr_hit_navigation_round_trip() {
        let mut s = session(40);
        s.dispatch(Command::Seek(1));
        s.dispatch(Command::NextInstrHit);
        assert_eq!(s.cursor(), TraceCursor::Replay { local_index: 9 });
        s.dispatch(Command::PrevInstrHit);
        assert_eq!(s.cursor(), TraceCursor::Replay { local_index: 1 });
        // Not-found leaves the cursor untouched.
        s.dispatch(Command::PrevInstrHit);
        assert_eq!(s.cursor(), TraceCursor::Replay { local_index: 1 });
    }

    #[test]
    fn test_daddr_drives_history_and_follow_row() {
        let mut s = session(64);
        s.dispatch(Command::SetDaddr {
            addr: 0x60_0000,
            size: None,
        });
        assert!(!s.region_history().is_empty());

        s.dispatch(Command::Seek(10));
        // Follow row is the last access at or before index 10 (accesses at
        // steps 0, 2, 8, 10).
        let follow = s.follow_row().map(|i| s.region_history()[i].local_index);
        assert_eq!(follow, Some(10));

        s.dispatch(Command::ClearDaddr);
        assert!(s.region_history().is_empty());
        assert_eq!(s.follow_row(), None);
    }

    #[test]
    fn test_removing_watch_entry_that_is_daddr_clears_history() {
        let mut s = session(64);
        s.dispatch(Command::AddWatch {
            addr: 0x60_0000,
            size: 4,
            label: "counter".into(),
        });
        s.dispatch(Command::SetDaddr {
            addr: 0x60_0000,
            size: Some(4),
        });
        assert!(!s.region_history().is_empty());
        s.dispatch(Command::RemoveWatch {
            addr: 0x60_0000,
            size: 4,
        });
        assert_eq!(s.watch().daddr(), None);
        assert!(s.region_history().is_empty());
    }

    #[test]
    fn test_watch_hits_are_counted() {
        let mut s = session(64);
        s.dispatch(Command::AddWatch {
            addr: 0x60_0000,
            size: 8,
            label: "counter".into(),
        });
        let hits = s.watch().entries()[0].hits;
        assert!(hits.is_some_and(|h| h > 0));
    }

    #[test]
    fn test_click_seek_and_zoom_commands() {
        let mut s = session(1000);
        s.dispatch(Command::DragZoom {
            px0: 10,
            px1: 50,
            width: 100,
        });
        assert!(s.zoom().span() < 1000);
        let window = s.zoom();
        s.dispatch(Command::ClickSeek { px: 0, width: 100 });
        assert_eq!(
            s.cursor(),
            TraceCursor::Replay {
                local_index: window.start
            }
        );
        s.dispatch(Command::ZoomReset);
        assert_eq!(s.zoom(), ZoomWindow::full(1000));
    }

    #[test]
    fn test_syscall_search_next_seeks_to_syscall() {
        let mut s = session(256);
        s.dispatch(Command::Search {
            domain: SearchDomain::SyscallLog,
            query: "write".into(),
            mode: SearchMode::Auto,
        });
        assert!(!s.search(SearchDomain::SyscallLog).matches().is_empty());
        s.dispatch(Command::SearchNext(SearchDomain::SyscallLog));
        let idx = match s.cursor() {
            TraceCursor::Replay { local_index } => local_index,
            TraceCursor::Live => panic!("expected replay after syscall search"),
        };
        assert!(s.engine().is_syscall_at(idx));
    }

    #[test]
    fn test_memory_search_uses_engine_fast_path() {
        let mut s = session(32);
        s.dispatch(Command::Search {
            domain: SearchDomain::Memory,
            query: "rewind".into(),
            mode: SearchMode::Auto,
        });
        let hits = s.search(SearchDomain::Memory).matches();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].start, 0x60_0010);
    }

    #[test]
    fn test_memory_match_moves_dump_base_without_daddr() {
        let mut s = session(32);
        assert_eq!(s.memory_view_base(), 0);
        s.dispatch(Command::Search {
            domain: SearchDomain::Memory,
            query: "demo".into(),
            mode: SearchMode::Auto,
        });
        // "demo" sits at 0x60_0017; the dump jumps to its 16-byte row.
        assert_eq!(s.memory_view_base(), 0x60_0010);
        s.dispatch(Command::SearchNext(SearchDomain::Memory));
        assert_eq!(s.memory_view_base(), 0x60_0010);

        // An explicit watch takes the dump base back over.
        s.dispatch(Command::SetDaddr {
            addr: 0x60_0040,
            size: None,
        });
        assert_eq!(s.memory_view_base(), 0x60_0040);

        s.dispatch(Command::ClearDaddr);
        s.dispatch(Command::SearchClear(SearchDomain::Memory));
        assert_eq!(s.memory_view_base(), 0);
    }

    #[test]
    fn test_disasm_matches_follow_listing_window_across_seeks() {
        // Distinct rips per step so the listing window actually moves.
        let steps = (0..300)
            .map(|i| TraceStep {
                rip: 0x1000 + i as u64 * 4,
                disasm: if i == 5 {
                    "cmp rdi, rsi".to_string()
                } else {
                    "nop".to_string()
                },
                registers: vec![0],
                flags: Vec::new(),
                accesses: Vec::new(),
                syscall: None,
            })
            .collect();
        let file = TraceFile {
            base_index: 0,
            register_names: vec!["rax".to_string()],
            memory: Vec::new(),
            steps,
        };
        let mut s = TraceSession::new(RecordedEngine::new(file));

        s.dispatch(Command::Seek(0));
        s.dispatch(Command::Search {
            domain: SearchDomain::Disassembly,
            query: "cmp".into(),
            mode: SearchMode::Auto,
        });
        assert_eq!(s.search(SearchDomain::Disassembly).matches().len(), 1);

        // The listing around step 299 no longer contains the cmp line; the
        // match list must follow it instead of pointing at a stale index.
        s.dispatch(Command::Seek(299));
        assert!(s.search(SearchDomain::Disassembly).matches().is_empty());
        assert_eq!(
            s.search(SearchDomain::Disassembly).status(),
            SearchStatus::NoMatches
        );

        // Seeking back into range finds it again.
        s.dispatch(Command::Seek(0));
        assert_eq!(s.search(SearchDomain::Disassembly).matches().len(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut s = session(64);
        s.dispatch(Command::Seek(5));
        s.dispatch(Command::SetDaddr {
            addr: 0x60_0000,
            size: None,
        });
        s.dispatch(Command::Search {
            domain: SearchDomain::Disassembly,
            query: "mov".into(),
            mode: SearchMode::Text,
        });
        s.dispatch(Command::Reset);
        assert!(s.cursor().is_live());
        assert_eq!(s.watch().daddr(), None);
        assert!(s.search(SearchDomain::Disassembly).matches().is_empty());
        assert!(s.region_history().is_empty());
    }

    #[test]
    fn test_global_position_uses_base_index() {
        let mut s = session(10);
        s.engine_mut(); // no-op, keeps the accessor exercised
        s.dispatch(Command::Seek(3));
        assert_eq!(s.global_position(), Some((3, 9)));
    }

    #[test]
    fn test_timeline_samples_within_window() {
        let mut s = session(1000);
        s.dispatch(Command::DragZoom {
            px0: 20,
            px1: 80,
            width: 100,
        });
        let data = s.timeline(100);
        assert!(!data.rip.is_empty());
        assert!(data.rip.len() <= 200);
        let w = data.window;
        assert!(data.rip.iter().all(|r| r.local_index >= w.start && r.local_index < w.end));
        assert!(data.minimap.is_some());
    }
}
