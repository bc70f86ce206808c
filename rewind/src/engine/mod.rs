//! Trace engine interface.
//!
//! The execution/trace engine is an external collaborator: it executes code,
//! records per-instruction state and answers point and range queries over an
//! append-only trace store. This module defines the seam the navigation core
//! talks through, plus the record types that cross it.
//!
//! Conventions shared by every query:
//! - `index`/`from` are *local* indices into the retained trace window
//!   (`0 <= index < trace_len()`); `base_index()` converts local to global.
//! - Point searches return `None` for "not found" — that is a normal result,
//!   never an error.
//! - Range queries take `(start, end, max_samples)` over `[start, end)` and
//!   return downsampled results; callers oversample for anti-aliasing.

pub mod recorded;

use serde::{Deserialize, Serialize};

use crate::domain::{EngineError, RegisterId};

pub use recorded::RecordedEngine;

/// CPU register state as of one trace index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSnapshot {
    pub rip: u64,
    /// General-purpose register values, in the engine's slot order
    /// (see [`TraceEngine::register_names`]).
    pub gprs: Vec<u64>,
    /// Set flag names (e.g. `ZF`, `CF`), for display only.
    pub flags: Vec<String>,
}

/// One memory access performed by one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemAccess {
    pub addr: u64,
    pub size: u64,
    pub is_write: bool,
    /// Decoded value if the engine recorded one (up to 8 bytes, little-endian).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
}

impl MemAccess {
    /// Whether this access touches any byte of `[addr, addr + size)`.
    #[must_use]
    pub fn intersects(&self, addr: u64, size: u64) -> bool {
        self.addr < addr.saturating_add(size) && addr < self.addr.saturating_add(self.size)
    }
}

/// One row of the access log for a watched range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionAccess {
    pub local_index: usize,
    pub rip: u64,
    pub access: MemAccess,
}

/// One line of a disassembly listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisasmLine {
    pub addr: u64,
    pub text: String,
}

/// One recorded syscall with the trace index it executed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyscallRow {
    pub local_index: usize,
    pub text: String,
}

/// Downsampled timeline entry: instruction pointer at one sampled index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RipSample {
    pub local_index: usize,
    pub rip: u64,
    pub is_syscall: bool,
}

/// Memory read/write activity of one sampled index (or bucket of indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemActivity {
    #[default]
    None,
    Read,
    Write,
    Both,
}

impl MemActivity {
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        use MemActivity::{Both, None, Read, Write};
        match (self, other) {
            (None, x) | (x, None) => x,
            (Read, Read) => Read,
            (Write, Write) => Write,
            _ => Both,
        }
    }

    #[must_use]
    pub fn from_flags(read: bool, write: bool) -> Self {
        match (read, write) {
            (false, false) => Self::None,
            (true, false) => Self::Read,
            (false, true) => Self::Write,
            (true, true) => Self::Both,
        }
    }
}

/// Downsampled memory activity sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivitySample {
    pub local_index: usize,
    pub activity: MemActivity,
}

/// One hit of the watched data range for the timeline's daddr lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaddrHit {
    pub local_index: usize,
    pub is_write: bool,
}

/// Raw memory read with per-byte validity (unmapped bytes read as zero but
/// are marked invalid so views can render them as `??`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySlice {
    pub bytes: Vec<u8>,
    pub valid: Vec<bool>,
}

/// A memory-search hit in absolute address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemMatch {
    pub addr: u64,
    pub len: usize,
}

/// Point and range queries over the engine's trace store.
///
/// All queries are synchronous calls against already-materialized data; the
/// core never blocks on I/O through this trait.
pub trait TraceEngine {
    /// Number of retained trace entries.
    fn trace_len(&self) -> usize;

    /// Global sequence number of local index 0 (the engine may discard old
    /// entries, so local indices are relative to the retained window).
    fn base_index(&self) -> u64;

    /// Display names of the general-purpose register slots.
    fn register_names(&self) -> &[String];

    /// Materialize CPU and memory state as of `index` (point-in-time
    /// restore): after this returns, memory reads reflect the state
    /// immediately after that instruction executed.
    ///
    /// # Errors
    /// Fails when the trace is empty, the index is out of range, or the
    /// store was cleared concurrently.
    fn restore_state_at(&mut self, index: usize) -> Result<(), EngineError>;

    fn registers_at(&self, index: usize) -> Option<RegisterSnapshot>;

    /// Disassembly text of the instruction at `index`.
    fn disassembly_at(&self, index: usize) -> String;

    /// Listing window around `rip`: up to `before` lines preceding it and
    /// `after` lines following it, in address order.
    fn disassembly_window(&self, rip: u64, before: usize, after: usize) -> Vec<DisasmLine>;

    fn memory_accesses_at(&self, index: usize) -> Vec<MemAccess>;

    fn is_syscall_at(&self, index: usize) -> bool;

    /// Every recorded syscall, in trace order.
    fn syscall_log(&self) -> Vec<SyscallRow>;

    // ── Point searches (None = not found, a normal outcome) ──────────────

    fn next_by_rip(&self, rip: u64, from: usize) -> Option<usize>;
    fn prev_by_rip(&self, rip: u64, from: usize) -> Option<usize>;

    /// Next instruction after `from` that changes `reg`.
    fn next_by_register_write(&self, reg: RegisterId, from: usize) -> Option<usize>;

    /// The instruction that set `reg` to the value it holds at `from` — not
    /// merely any prior write. Returns `None` when the cursor is already on
    /// that instruction or the value predates the retained window.
    fn prev_by_register_write(&self, reg: RegisterId, from: usize) -> Option<usize>;

    fn next_by_address_access(&self, addr: u64, size: u64, from: usize) -> Option<usize>;
    fn prev_by_address_access(&self, addr: u64, size: u64, from: usize) -> Option<usize>;

    // ── Range/sample queries for visualization ───────────────────────────

    fn rip_samples(&self, start: usize, end: usize, max_samples: usize) -> Vec<RipSample>;

    fn memory_activity_samples(
        &self,
        start: usize,
        end: usize,
        max_samples: usize,
    ) -> Vec<ActivitySample>;

    fn daddr_hit_samples(
        &self,
        addr: u64,
        size: u64,
        start: usize,
        end: usize,
        max_samples: usize,
    ) -> Vec<DaddrHit>;

    fn rip_hit_indices(&self, rip: u64, start: usize, end: usize, max_samples: usize)
        -> Vec<usize>;

    /// Count of accesses to `[addr, addr + size)` over the whole trace,
    /// saturating at `cap` for responsiveness.
    fn address_hit_count(&self, addr: u64, size: u64, cap: usize) -> usize;

    /// Ordered access log for `[addr, addr + size)`, keeping at most the
    /// newest `max_entries` rows (a display cap, not data loss).
    fn region_history(&self, addr: u64, size: u64, max_entries: usize) -> Vec<RegionAccess>;

    // ── Memory ───────────────────────────────────────────────────────────

    /// Read `len` bytes at `addr` from the currently restored state.
    fn read_memory_range(&self, addr: u64, len: usize) -> MemorySlice;

    /// Engine-native full-memory search fast path. `None` means the engine
    /// does not offer one and the caller falls back to the generic matcher;
    /// when offered, results must be identical to the generic matcher's.
    fn search_memory(
        &self,
        query: &str,
        mode: crate::search::SearchMode,
    ) -> Option<Vec<MemMatch>>;
}
