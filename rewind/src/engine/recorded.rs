//! In-memory trace engine backed by a recorded trace file.
//!
//! This is the collaborator implementation the binary and the tests run
//! against: every [`TraceEngine`] query is answered by scanning the recorded
//! steps, and point-in-time restore replays recorded writes onto the initial
//! memory image.
//!
//! Restore is incremental when seeking forward (apply the writes in between)
//! and rebuilds from the initial image when seeking backward; for recorded
//! traces of display scale this is well under a frame.

use log::warn;

use crate::domain::{EngineError, RegisterId};
use crate::search::{resolve_mode, Haystack, MemoryHaystack, Needle, SearchDomain, SearchMode};
use crate::trace_file::{MemoryRegion, TraceFile, TraceStep};

use super::{
    ActivitySample, DaddrHit, DisasmLine, MemAccess, MemActivity, MemMatch, MemorySlice,
    RegionAccess, RegisterSnapshot, RipSample, SyscallRow, TraceEngine,
};

pub struct RecordedEngine {
    base_index: u64,
    register_names: Vec<String>,
    initial_memory: Vec<MemoryRegion>,
    steps: Vec<TraceStep>,
    /// Program listing reconstructed from recorded rips, address-ordered.
    listing: Vec<DisasmLine>,
    /// Memory image as of `restored` (initial image when `None`).
    image: Vec<MemoryRegion>,
    restored: Option<usize>,
}

impl RecordedEngine {
    #[must_use]
    pub fn new(file: TraceFile) -> Self {
        let listing = build_listing(&file.steps);
        Self {
            base_index: file.base_index,
            register_names: file.register_names,
            image: file.memory.clone(),
            initial_memory: file.memory,
            steps: file.steps,
            listing,
            restored: None,
        }
    }

    /// Append a step arriving from the live feed.
    ///
    /// Keeps the restored image following the head when it already was at
    /// the head, so live views stay current without a full restore.
    pub fn push_step(&mut self, step: TraceStep) {
        if step.registers.len() != self.register_names.len() {
            warn!(
                "dropping live step with {} register values (expected {})",
                step.registers.len(),
                self.register_names.len()
            );
            return;
        }
        let at_head = self.restored == Some(self.steps.len().wrapping_sub(1))
            && !self.steps.is_empty();
        insert_listing_line(&mut self.listing, step.rip, &step.disasm);
        self.steps.push(step);
        if at_head || self.restored.is_none() {
            let idx = self.steps.len() - 1;
            apply_step_writes(&mut self.image, &self.steps[idx]);
            self.restored = Some(idx);
        }
    }

    fn apply_range(&mut self, range: std::ops::RangeInclusive<usize>) {
        for i in range {
            apply_step_writes(&mut self.image, &self.steps[i]);
        }
    }
}

fn build_listing(steps: &[TraceStep]) -> Vec<DisasmLine> {
    let mut listing: Vec<DisasmLine> = Vec::new();
    for step in steps {
        insert_listing_line(&mut listing, step.rip, &step.disasm);
    }
    listing
}

fn insert_listing_line(listing: &mut Vec<DisasmLine>, addr: u64, text: &str) {
    match listing.binary_search_by_key(&addr, |l| l.addr) {
        Ok(_) => {} // first recorded text for an address wins
        Err(pos) => listing.insert(
            pos,
            DisasmLine {
                addr,
                text: text.to_string(),
            },
        ),
    }
}

/// Apply the write accesses of one step to the memory image.
fn apply_step_writes(image: &mut [MemoryRegion], step: &TraceStep) {
    for acc in &step.accesses {
        if !acc.is_write {
            continue;
        }
        let Some(value) = acc.value else { continue };
        let len = acc.size.min(8);
        for i in 0..len {
            let byte = (value >> (8 * i)) as u8;
            write_byte(image, acc.addr + i, byte);
        }
    }
}

fn write_byte(image: &mut [MemoryRegion], addr: u64, byte: u8) {
    for region in image.iter_mut() {
        if addr >= region.base && addr < region.base + region.bytes.len() as u64 {
            region.bytes[(addr - region.base) as usize] = byte;
            return;
        }
    }
    // Writes to unmapped addresses are dropped; the recording simply did not
    // snapshot that region.
}

fn read_byte(image: &[MemoryRegion], addr: u64) -> Option<u8> {
    image.iter().find_map(|region| {
        if addr >= region.base && addr < region.base + region.bytes.len() as u64 {
            Some(region.bytes[(addr - region.base) as usize])
        } else {
            None
        }
    })
}

/// Clamp `(start, end)` against the trace length; `None` when empty.
fn clamp_range(start: usize, end: usize, len: usize) -> Option<(usize, usize)> {
    let end = end.min(len);
    if start >= end {
        None
    } else {
        Some((start, end))
    }
}

fn step_activity(step: &TraceStep) -> MemActivity {
    let read = step.accesses.iter().any(|a| !a.is_write);
    let write = step.accesses.iter().any(|a| a.is_write);
    MemActivity::from_flags(read, write)
}

impl TraceEngine for RecordedEngine {
    fn trace_len(&self) -> usize {
        self.steps.len()
    }

    fn base_index(&self) -> u64 {
        self.base_index
    }

    fn register_names(&self) -> &[String] {
        &self.register_names
    }

    fn restore_state_at(&mut self, index: usize) -> Result<(), EngineError> {
        let len = self.steps.len();
        if len == 0 {
            return Err(EngineError::EmptyTrace);
        }
        if index >= len {
            return Err(EngineError::IndexOutOfRange { index, len });
        }
        match self.restored {
            Some(cur) if cur == index => {}
            Some(cur) if cur < index => self.apply_range(cur + 1..=index),
            _ => {
                // Backward (or first) restore: rebuild from the initial image.
                self.image = self.initial_memory.clone();
                self.apply_range(0..=index);
            }
        }
        self.restored = Some(index);
        Ok(())
    }

    fn registers_at(&self, index: usize) -> Option<RegisterSnapshot> {
        self.steps.get(index).map(|s| RegisterSnapshot {
            rip: s.rip,
            gprs: s.registers.clone(),
            flags: s.flags.clone(),
        })
    }

    fn disassembly_at(&self, index: usize) -> String {
        self.steps.get(index).map(|s| s.disasm.clone()).unwrap_or_default()
    }

    fn disassembly_window(&self, rip: u64, before: usize, after: usize) -> Vec<DisasmLine> {
        let pos = self.listing.partition_point(|l| l.addr < rip);
        let lo = pos.saturating_sub(before);
        let hi = (pos + after + 1).min(self.listing.len());
        self.listing[lo..hi].to_vec()
    }

    fn memory_accesses_at(&self, index: usize) -> Vec<MemAccess> {
        self.steps.get(index).map(|s| s.accesses.clone()).unwrap_or_default()
    }

    fn is_syscall_at(&self, index: usize) -> bool {
        self.steps.get(index).is_some_and(|s| s.syscall.is_some())
    }

    fn syscall_log(&self) -> Vec<SyscallRow> {
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                s.syscall.as_ref().map(|text| SyscallRow {
                    local_index: i,
                    text: text.clone(),
                })
            })
            .collect()
    }

    fn next_by_rip(&self, rip: u64, from: usize) -> Option<usize> {
        (from..self.steps.len()).find(|&i| self.steps[i].rip == rip)
    }

    fn prev_by_rip(&self, rip: u64, from: usize) -> Option<usize> {
        let from = from.min(self.steps.len().checked_sub(1)?);
        (0..=from).rev().find(|&i| self.steps[i].rip == rip)
    }

    fn next_by_register_write(&self, reg: RegisterId, from: usize) -> Option<usize> {
        let slot = reg.0;
        if slot >= self.register_names.len() {
            return None;
        }
        ((from + 1)..self.steps.len())
            .find(|&j| self.steps[j].registers[slot] != self.steps[j - 1].registers[slot])
    }

    fn prev_by_register_write(&self, reg: RegisterId, from: usize) -> Option<usize> {
        let slot = reg.0;
        if slot >= self.register_names.len() {
            return None;
        }
        let from = from.min(self.steps.len().checked_sub(1)?);
        let current = self.steps[from].registers[slot];
        let mut i = from;
        while i > 0 && self.steps[i - 1].registers[slot] == current {
            i -= 1;
        }
        // i is now the instruction that set the register to `current`; no
        // movement means the cursor already sits on it.
        if i < from {
            Some(i)
        } else {
            None
        }
    }

    fn next_by_address_access(&self, addr: u64, size: u64, from: usize) -> Option<usize> {
        (from..self.steps.len())
            .find(|&i| self.steps[i].accesses.iter().any(|a| a.intersects(addr, size)))
    }

    fn prev_by_address_access(&self, addr: u64, size: u64, from: usize) -> Option<usize> {
        let from = from.min(self.steps.len().checked_sub(1)?);
        (0..=from)
            .rev()
            .find(|&i| self.steps[i].accesses.iter().any(|a| a.intersects(addr, size)))
    }

    fn rip_samples(&self, start: usize, end: usize, max_samples: usize) -> Vec<RipSample> {
        let Some((start, end)) = clamp_range(start, end, self.steps.len()) else {
            return Vec::new();
        };
        let stride = (end - start).div_ceil(max_samples.max(1)).max(1);
        (start..end)
            .step_by(stride)
            .map(|i| RipSample {
                local_index: i,
                rip: self.steps[i].rip,
                is_syscall: self.steps[i].syscall.is_some(),
            })
            .collect()
    }

    fn memory_activity_samples(
        &self,
        start: usize,
        end: usize,
        max_samples: usize,
    ) -> Vec<ActivitySample> {
        let Some((start, end)) = clamp_range(start, end, self.steps.len()) else {
            return Vec::new();
        };
        let stride = (end - start).div_ceil(max_samples.max(1)).max(1);
        (start..end)
            .step_by(stride)
            .map(|i| {
                // Union the bucket so short bursts survive downsampling.
                let bucket_end = (i + stride).min(end);
                let activity = self.steps[i..bucket_end]
                    .iter()
                    .fold(MemActivity::None, |acc, s| acc.union(step_activity(s)));
                ActivitySample {
                    local_index: i,
                    activity,
                }
            })
            .collect()
    }

    fn daddr_hit_samples(
        &self,
        addr: u64,
        size: u64,
        start: usize,
        end: usize,
        max_samples: usize,
    ) -> Vec<DaddrHit> {
        let Some((start, end)) = clamp_range(start, end, self.steps.len()) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for i in start..end {
            let touching: Vec<&MemAccess> = self.steps[i]
                .accesses
                .iter()
                .filter(|a| a.intersects(addr, size))
                .collect();
            if touching.is_empty() {
                continue;
            }
            out.push(DaddrHit {
                local_index: i,
                is_write: touching.iter().any(|a| a.is_write),
            });
            if out.len() >= max_samples {
                break;
            }
        }
        out
    }

    fn rip_hit_indices(
        &self,
        rip: u64,
        start: usize,
        end: usize,
        max_samples: usize,
    ) -> Vec<usize> {
        let Some((start, end)) = clamp_range(start, end, self.steps.len()) else {
            return Vec::new();
        };
        (start..end)
            .filter(|&i| self.steps[i].rip == rip)
            .take(max_samples)
            .collect()
    }

    fn address_hit_count(&self, addr: u64, size: u64, cap: usize) -> usize {
        let mut count = 0;
        for step in &self.steps {
            count += step.accesses.iter().filter(|a| a.intersects(addr, size)).count();
            if count >= cap {
                return cap;
            }
        }
        count
    }

    fn region_history(&self, addr: u64, size: u64, max_entries: usize) -> Vec<RegionAccess> {
        let mut out = Vec::new();
        for (i, step) in self.steps.iter().enumerate() {
            for acc in step.accesses.iter().filter(|a| a.intersects(addr, size)) {
                out.push(RegionAccess {
                    local_index: i,
                    rip: step.rip,
                    access: *acc,
                });
            }
        }
        // Display cap: keep the newest entries.
        if out.len() > max_entries {
            out.drain(..out.len() - max_entries);
        }
        out
    }

    fn read_memory_range(&self, addr: u64, len: usize) -> MemorySlice {
        let mut slice = MemorySlice {
            bytes: Vec::with_capacity(len),
            valid: Vec::with_capacity(len),
        };
        for i in 0..len as u64 {
            match read_byte(&self.image, addr + i) {
                Some(b) => {
                    slice.bytes.push(b);
                    slice.valid.push(true);
                }
                None => {
                    slice.bytes.push(0);
                    slice.valid.push(false);
                }
            }
        }
        slice
    }

    fn search_memory(&self, query: &str, mode: SearchMode) -> Option<Vec<MemMatch>> {
        let resolved = resolve_mode(query, mode, SearchDomain::Memory);
        let needle = Needle::build(query, resolved, SearchDomain::Memory)?;
        let mut out = Vec::new();
        for region in &self.image {
            let hay = MemoryHaystack {
                base: region.base,
                bytes: &region.bytes,
            };
            let (hits, overflow) = hay.find(&needle);
            out.extend(hits.into_iter().map(|h| MemMatch {
                addr: h.start,
                len: h.len,
            }));
            if overflow || out.len() >= crate::search::SEARCH_MATCH_CAP {
                out.truncate(crate::search::SEARCH_MATCH_CAP);
                break;
            }
        }
        Some(out)
    }
}
