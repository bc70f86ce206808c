//! # rewind - Record/Replay Trace Navigation Front End
//!
//! rewind is the navigation and search core of a record/replay debugger: it
//! sits on top of an execution engine that records per-instruction state
//! (registers, disassembly, memory accesses, syscalls) and lets the user
//! move through that history, watch data addresses and search three views
//! of the recording.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TUI (ratatui)                           │
//! │  registers │ disassembly │ memory │ timeline │ history      │
//! └──────────────────────────┬──────────────────────────────────┘
//!                            │ Command
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TraceSession                            │
//! │                                                             │
//! │  ┌────────────┐  ┌────────────┐  ┌───────────────────────┐ │
//! │  │   Cursor   │  │  Viewport  │  │   Search (x3)         │ │
//! │  │ Live/Replay│  │ zoom + map │  │ memory/disasm/syscall │ │
//! │  └────────────┘  └────────────┘  └───────────────────────┘ │
//! │  ┌────────────┐  ┌────────────────────────────────────────┐│
//! │  │   Watch    │  │  Region history (watched-range log)    ││
//! │  └────────────┘  └────────────────────────────────────────┘│
//! └──────────────────────────┬──────────────────────────────────┘
//!                            │ TraceEngine trait
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │         RecordedEngine (in-memory trace store)              │
//! │   point-in-time restore │ point searches │ range sampling   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`session`]: the session object; every user operation is a
//!   [`session::Command`] dispatched against it
//!   - `cursor`: Live/Replay state machine
//!   - `zoom`: viewport mapping between trace indices and raster columns
//!   - `watch`: watched data address, watch list, region history caps
//! - [`search`]: one search core for three domains (hex/text/regex needles,
//!   byte and line haystacks, per-domain sessions)
//! - [`engine`]: the `TraceEngine` trait the core talks through, plus
//!   `RecordedEngine` backed by a loaded recording
//! - [`trace_file`]: serde model of the recorded-trace JSON plus the
//!   synthetic demo generator
//! - [`entropy`]: Shannon entropy and its heat-map color scale
//! - [`tui`]: ratatui front end (panels, mouse-driven timeline, overlays)
//! - [`cli`]: command-line argument parsing
//! - [`domain`]: newtypes and error enums
//!
//! ## Operational Modes
//!
//! 1. **Replay** (`--replay trace.json`): navigate a recording
//! 2. **Demo** (`--demo [N]`): synthetic trace streamed in live
//!
//! ## Key Concepts
//!
//! - **Local vs global index**: the engine retains a window of the trace;
//!   local indices address that window, `base_index` converts to global
//!   sequence numbers for display.
//! - **Point-in-time restore**: seeking replays recorded memory writes onto
//!   the initial image so memory reads reflect the seeked instant.
//! - **daddr**: the singleton watched data range driving the timeline's
//!   access lane, J/K navigation and the region history pane.

// Expose modules for testing
pub mod cli;
pub mod domain;
pub mod engine;
pub mod entropy;
pub mod search;
pub mod session;
pub mod trace_file;
pub mod tui;
