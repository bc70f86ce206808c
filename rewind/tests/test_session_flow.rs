//! End-to-end session scenarios: everything goes through `dispatch`, the
//! same way the TUI drives a session.

use rewind::engine::{RecordedEngine, TraceEngine};
use rewind::search::{SearchDomain, SearchMode, SearchStatus};
use rewind::session::{Command, TraceCursor, TraceSession, ZoomWindow};
use rewind::trace_file::TraceFile;

fn session(steps: usize) -> TraceSession<RecordedEngine> {
    TraceSession::new(RecordedEngine::new(TraceFile::synthetic(steps)))
}

#[test]
fn test_seek_pipeline_restores_state() {
    let mut s = session(200);

    s.dispatch(Command::Seek(10));
    assert_eq!(s.cursor(), TraceCursor::Replay { local_index: 10 });

    // The frozen view reflects index 10.
    let view_rip = s.view().registers.as_ref().expect("registers").rip;
    assert_eq!(Some(view_rip), s.engine().registers_at(10).map(|r| r.rip));
    assert!(!s.view().disasm.is_empty());

    // Memory was restored: the counter cell reflects writes up to index 10.
    let slice = s.engine().read_memory_range(0x60_0000, 8);
    let counter = u64::from_le_bytes(slice.bytes[..8].try_into().expect("8 bytes"));
    assert_eq!(counter, 2); // writes at steps 2 and 10

    // Esc: back to live, views track the head again.
    s.dispatch(Command::ResumeLive);
    assert!(s.cursor().is_live());
    let head_rip = s.engine().registers_at(199).map(|r| r.rip);
    assert_eq!(s.view().registers.as_ref().map(|r| r.rip), head_rip);
}

#[test]
fn test_empty_trace_is_fully_inert() {
    let file = TraceFile {
        base_index: 0,
        register_names: vec!["rax".into()],
        memory: Vec::new(),
        steps: Vec::new(),
    };
    let mut s = TraceSession::new(RecordedEngine::new(file));

    s.dispatch(Command::Seek(5));
    assert!(s.cursor().is_live());
    s.dispatch(Command::SeekRelative(-3));
    s.dispatch(Command::NextInstrHit);
    s.dispatch(Command::ClickSeek { px: 10, width: 80 });
    s.dispatch(Command::SearchNext(SearchDomain::Memory));
    assert!(s.cursor().is_live());
    assert!(s.view().registers.is_none());
}

#[test]
fn test_register_write_navigation_contract() {
    let mut s = session(64);
    // rbx takes a new value at slot 3 of each iteration (steps 3, 11, 19...).
    s.dispatch(Command::Seek(14));
    s.dispatch(Command::PrevRegisterWrite(rewind::domain::RegisterId(1)));
    assert_eq!(s.cursor(), TraceCursor::Replay { local_index: 11 });

    // On the setting instruction itself: no movement.
    s.dispatch(Command::PrevRegisterWrite(rewind::domain::RegisterId(1)));
    assert_eq!(s.cursor(), TraceCursor::Replay { local_index: 11 });

    s.dispatch(Command::NextRegisterWrite(rewind::domain::RegisterId(1)));
    assert_eq!(s.cursor(), TraceCursor::Replay { local_index: 19 });
}

#[test]
fn test_timeline_zoom_click_scroll_round_trip() {
    let mut s = session(2000);
    let width = 120;

    // Drag-zoom into the middle fifth.
    s.dispatch(Command::DragZoom {
        px0: 48,
        px1: 72,
        width,
    });
    let zoomed = s.zoom();
    assert!(zoomed.span() < 2000);
    assert!(zoomed.start <= 800 && zoomed.end >= 1200);

    // Click in the middle of the raster seeks inside the zoomed window.
    s.dispatch(Command::ClickSeek { px: 60, width });
    let TraceCursor::Replay { local_index } = s.cursor() else {
        panic!("click did not enter replay");
    };
    assert!(local_index >= zoomed.start && local_index < zoomed.end);

    // Scroll-zoom out repeatedly settles at the full range.
    for _ in 0..30 {
        s.dispatch(Command::ScrollZoom {
            px: 60,
            width,
            zoom_in: false,
        });
    }
    assert_eq!(s.zoom(), ZoomWindow::full(2000));
}

#[test]
fn test_search_is_idempotent_across_reruns() {
    let mut s = session(512);
    let run = |s: &mut TraceSession<RecordedEngine>| {
        s.dispatch(Command::Search {
            domain: SearchDomain::SyscallLog,
            query: "write".into(),
            mode: SearchMode::Auto,
        });
    };
    run(&mut s);
    let total = s.search(SearchDomain::SyscallLog).matches().len();
    assert!(total >= 2);

    // Walk to the second match, re-run the identical query: pointer stays.
    s.dispatch(Command::SearchNext(SearchDomain::SyscallLog));
    let before = s.search(SearchDomain::SyscallLog).current_index();
    run(&mut s);
    assert_eq!(s.search(SearchDomain::SyscallLog).current_index(), before);

    // Cyclic: total next presses wrap back around to the same match.
    for _ in 0..total {
        s.dispatch(Command::SearchNext(SearchDomain::SyscallLog));
    }
    assert_eq!(s.search(SearchDomain::SyscallLog).current_index(), before);
}

#[test]
fn test_memory_hex_and_text_queries_agree() {
    let mut s = session(32);
    s.dispatch(Command::Search {
        domain: SearchDomain::Memory,
        query: "demo".into(),
        mode: SearchMode::Text,
    });
    let text_hits: Vec<_> = s.search(SearchDomain::Memory).matches().to_vec();

    s.dispatch(Command::Search {
        domain: SearchDomain::Memory,
        query: "64 65 6d 6f".into(),
        mode: SearchMode::Hex,
    });
    let hex_hits: Vec<_> = s.search(SearchDomain::Memory).matches().to_vec();

    assert!(!text_hits.is_empty());
    assert_eq!(text_hits, hex_hits);
}

#[test]
fn test_malformed_queries_degrade_to_status() {
    let mut s = session(64);

    // Unparseable regex: zero matches, invalid status, no panic.
    s.dispatch(Command::Search {
        domain: SearchDomain::Disassembly,
        query: "/[unclosed/".into(),
        mode: SearchMode::Auto,
    });
    assert_eq!(s.search(SearchDomain::Disassembly).status(), SearchStatus::Invalid);

    // Odd-length hex token: same degradation.
    s.dispatch(Command::Search {
        domain: SearchDomain::Memory,
        query: "f 41".into(),
        mode: SearchMode::Hex,
    });
    assert_eq!(s.search(SearchDomain::Memory).status(), SearchStatus::Invalid);

    // Navigation on an invalid search is a no-op.
    let cursor = s.cursor();
    s.dispatch(Command::SearchNext(SearchDomain::Memory));
    assert_eq!(s.cursor(), cursor);
}

#[test]
fn test_disassembly_search_modes() {
    let mut s = session(64);
    s.dispatch(Command::Seek(3));

    // Literal text, case-insensitive per line.
    s.dispatch(Command::Search {
        domain: SearchDomain::Disassembly,
        query: "MOV".into(),
        mode: SearchMode::Text,
    });
    assert!(!s.search(SearchDomain::Disassembly).matches().is_empty());

    // Regex over "{addr} {text}" composed lines.
    s.dispatch(Command::Search {
        domain: SearchDomain::Disassembly,
        query: "/^0x40100[04]/".into(),
        mode: SearchMode::Auto,
    });
    assert!(!s.search(SearchDomain::Disassembly).matches().is_empty());
}

#[test]
fn test_live_feed_grows_trace_and_views_follow() {
    let mut s = session(8);
    let extra = TraceFile::synthetic(16).steps.split_off(8);
    for step in extra {
        s.engine_mut().push_step(step);
    }
    s.refresh_live();

    assert_eq!(s.engine().trace_len(), 16);
    assert!(s.cursor().is_live());
    assert_eq!(
        s.view().registers.as_ref().map(|r| r.rip),
        s.engine().registers_at(15).map(|r| r.rip)
    );

    // A pinned cursor must NOT follow the head.
    s.dispatch(Command::Seek(4));
    let extra = TraceFile::synthetic(20).steps.split_off(16);
    for step in extra {
        s.engine_mut().push_step(step);
    }
    s.refresh_live();
    assert_eq!(s.cursor(), TraceCursor::Replay { local_index: 4 });
}
