//! Recorded-trace file model.
//!
//! The external engine dumps a recording as JSON; this module is the serde
//! model for it plus a synthetic generator used by `--demo` and the tests.
//!
//! File shape:
//!
//! ```json
//! {
//!   "base_index": 0,
//!   "register_names": ["rax", "rbx", ...],
//!   "memory": [ { "base": 4198400, "bytes": [85, 72, ...] } ],
//!   "steps": [
//!     {
//!       "rip": 4198400,
//!       "disasm": "push rbp",
//!       "registers": [0, 0, ...],
//!       "flags": ["ZF"],
//!       "accesses": [ { "addr": 140..., "size": 8, "is_write": true } ],
//!       "syscall": "write(1, \"hi\", 2) = 2"
//!     }
//!   ]
//! }
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::TraceFileError;
use crate::engine::MemAccess;

/// An initial memory region snapshot (state before step 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRegion {
    pub base: u64,
    pub bytes: Vec<u8>,
}

/// One recorded instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub rip: u64,
    pub disasm: String,
    /// Register values *after* this instruction, in `register_names` order.
    pub registers: Vec<u64>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub accesses: Vec<MemAccess>,
    /// Formatted syscall line when this instruction is a syscall.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syscall: Option<String>,
}

/// A complete recording: initial memory image plus per-instruction state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceFile {
    /// Global sequence number of step 0 (the engine may have discarded
    /// earlier entries before dumping).
    #[serde(default)]
    pub base_index: u64,
    pub register_names: Vec<String>,
    #[serde(default)]
    pub memory: Vec<MemoryRegion>,
    pub steps: Vec<TraceStep>,
}

impl TraceFile {
    /// Load and validate a recording.
    ///
    /// # Errors
    /// Fails on unreadable/malformed JSON, an empty step list, or a step
    /// whose register count disagrees with `register_names`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TraceFileError> {
        let content = std::fs::read_to_string(path)?;
        let file: Self = serde_json::from_str(&content)?;
        file.validate()?;
        Ok(file)
    }

    /// Structural validation shared by the file loader and the live feed.
    ///
    /// # Errors
    /// See [`TraceFile::from_file`].
    pub fn validate(&self) -> Result<(), TraceFileError> {
        if self.steps.is_empty() {
            return Err(TraceFileError::Empty);
        }
        let expected = self.register_names.len();
        for (i, step) in self.steps.iter().enumerate() {
            if step.registers.len() != expected {
                return Err(TraceFileError::RegisterCountMismatch {
                    step: i,
                    got: step.registers.len(),
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Serialize to a writer as pretty JSON (mirrors the engine's dump).
    ///
    /// # Errors
    /// Returns serialization or I/O failures.
    pub fn export<W: std::io::Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Build a synthetic recording of `steps` instructions.
    ///
    /// The fake program is a counter loop with a small data buffer: it
    /// increments a counter in memory, copies it into registers, and issues
    /// a `write` syscall every 16 iterations. Enough texture for every lane
    /// of the timeline, the region history, and all three search domains.
    #[must_use]
    pub fn synthetic(steps: usize) -> Self {
        const CODE_BASE: u64 = 0x40_1000;
        const DATA_BASE: u64 = 0x60_0000;
        let register_names = ["rax", "rbx", "rcx", "rdx", "rsi", "rdi", "rsp", "rbp"]
            .iter()
            .map(ToString::to_string)
            .collect();

        // Program text the disassembly window reads back: 8 instructions.
        let listing = [
            "mov rax, [0x600000]",
            "add rax, 1",
            "mov [0x600000], rax",
            "mov rbx, rax",
            "xor rcx, rcx",
            "cmp rax, rdx",
            "test rax, rax",
            "jne 0x401000",
        ];

        let mut data = vec![0u8; 64];
        data[16..32].copy_from_slice(b"rewind demo data");

        let mut out = Vec::with_capacity(steps.max(1));
        let mut counter: u64 = 0;
        let mut regs = [0u64; 8];
        regs[6] = 0x7fff_f000; // rsp
        regs[7] = 0x7fff_f010; // rbp

        for i in 0..steps.max(1) {
            let slot = i % listing.len();
            let rip = CODE_BASE + slot as u64 * 4;
            let mut accesses = Vec::new();
            let mut syscall = None;

            match slot {
                0 => {
                    regs[0] = counter;
                    accesses.push(MemAccess {
                        addr: DATA_BASE,
                        size: 8,
                        is_write: false,
                        value: Some(counter),
                    });
                }
                1 => {
                    counter += 1;
                    regs[0] = counter;
                }
                2 => {
                    accesses.push(MemAccess {
                        addr: DATA_BASE,
                        size: 8,
                        is_write: true,
                        value: Some(counter),
                    });
                }
                3 => regs[1] = regs[0],
                4 => regs[2] = 0,
                7 if counter % 16 == 0 && counter > 0 => {
                    syscall = Some(format!("write(1, \"tick {counter}\\n\", 8) = 8"));
                    accesses.push(MemAccess {
                        addr: DATA_BASE + 16,
                        size: 8,
                        is_write: false,
                        value: None,
                    });
                }
                _ => {}
            }

            let disasm = if syscall.is_some() {
                "syscall".to_string()
            } else {
                listing[slot].to_string()
            };

            out.push(TraceStep {
                rip,
                disasm,
                registers: regs.to_vec(),
                flags: if counter % 2 == 0 {
                    vec!["ZF".to_string()]
                } else {
                    Vec::new()
                },
                accesses,
                syscall,
            });
        }

        Self {
            base_index: 0,
            register_names,
            memory: vec![MemoryRegion {
                base: DATA_BASE,
                bytes: data,
            }],
            steps: out,
        }
    }
}
