//! # Terminal User Interface (TUI)
//!
//! Interactive terminal UI using `ratatui` for trace navigation.
//!
//! ## Panels
//!
//! - **Registers** - GPRs/flags at the cursor, focused-register marker
//! - **Disassembly** - listing around the current rip with search highlights
//! - **Memory** - hex dump with watch/access/search highlights, entropy heat
//! - **Timeline** - the zoom window as per-column lanes (mouse-driven)
//! - **Watches / Region History / Syscalls** - bottom row
//!
//! ## Operational Modes
//!
//! - **Replay** (`App::replay()`) - navigating a loaded recording
//! - **Live** (`App::live()`) - steps stream in over a channel and the
//!   cursor follows the head until the user seeks
//!
//! All input is translated to session [`Command`]s; the TUI renders session
//! state and owns nothing but input-overlay scratch.

// TUI rendering intentionally uses precision-losing casts and long functions for clarity
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::too_many_lines,
    clippy::items_after_statements
)]

use anyhow::Result;
use crossbeam_channel::Receiver;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use std::io;
use std::time::Duration;

mod disasm;
mod history;
mod memory;
mod registers;
mod syscalls;
pub mod theme;
mod timeline;
mod watches;

use disasm::DisasmPanel;
use history::HistoryPanel;
use memory::MemoryPanel;
use registers::RegistersPanel;
use syscalls::SyscallPanel;
use theme::{ALERT_RED, DIM, FG_GREEN, WARN_AMBER};
use timeline::TimelineView;
use watches::WatchesPanel;

use crate::domain::RegisterId;
use crate::engine::{RecordedEngine, TraceEngine};
use crate::search::{SearchDomain, SearchMode};
use crate::session::{Command, TraceSession, DRAG_THRESHOLD};
use crate::trace_file::TraceStep;

const STYLE_HEADING: Style = Style::new().fg(FG_GREEN).add_modifier(Modifier::BOLD);
const STYLE_KEY: Style = Style::new().fg(WARN_AMBER);
const STYLE_DIM: Style = Style::new().fg(DIM);

/// Bytes the memory dump reads per frame.
const MEM_VIEW_BYTES: usize = 256;

/// What keyboard input currently drives.
#[derive(Debug, Clone, Copy, PartialEq)]
enum InputMode {
    /// Navigation keys act on the session.
    Normal,
    /// Typing into the search bar of the active domain.
    Search,
    /// Typing a watch target (`addr [size]`).
    Daddr,
    /// Help overlay; any key closes.
    Help,
}

pub struct App {
    session: TraceSession<RecordedEngine>,
    /// Live step feed; `None` in replay mode.
    live_rx: Option<Receiver<TraceStep>>,

    // UI state
    input_mode: InputMode,
    input_buffer: String,
    active_domain: SearchDomain,
    focused_register: usize,
    entropy_heat: bool,
    /// Timeline raster area from the last frame, for mouse hit-testing.
    timeline_area: Rect,
    drag_origin: Option<u16>,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn replay(session: TraceSession<RecordedEngine>) -> Self {
        Self::build(session, None)
    }

    #[must_use]
    pub fn live(session: TraceSession<RecordedEngine>, rx: Receiver<TraceStep>) -> Self {
        Self::build(session, Some(rx))
    }

    fn build(session: TraceSession<RecordedEngine>, live_rx: Option<Receiver<TraceStep>>) -> Self {
        Self {
            session,
            live_rx,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            active_domain: SearchDomain::Memory,
            focused_register: 0,
            entropy_heat: false,
            timeline_area: Rect::default(),
            drag_origin: None,
            should_quit: false,
        }
    }

    /// Run the event loop until quit.
    ///
    /// # Errors
    /// Returns an error if terminal setup or rendering fails.
    pub fn run(mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        loop {
            // Drain pending live steps, then let a Live cursor follow the head.
            if let Some(rx) = &self.live_rx {
                let mut appended = false;
                while let Ok(step) = rx.try_recv() {
                    self.session.engine_mut().push_step(step);
                    appended = true;
                }
                if appended {
                    self.session.refresh_live();
                }
            }

            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key.code, key.modifiers);
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }

            if self.should_quit {
                break;
            }
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        terminal.show_cursor()?;
        Ok(())
    }

    // ── Input ────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyCode, mods: KeyModifiers) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key, mods),
            InputMode::Help => self.input_mode = InputMode::Normal,
            InputMode::Search => match key {
                KeyCode::Esc => {
                    self.input_buffer.clear();
                    self.input_mode = InputMode::Normal;
                }
                KeyCode::Enter => {
                    self.session.dispatch(Command::Search {
                        domain: self.active_domain,
                        query: self.input_buffer.clone(),
                        mode: SearchMode::Auto,
                    });
                    self.input_mode = InputMode::Normal;
                }
                KeyCode::Backspace => {
                    self.input_buffer.pop();
                }
                KeyCode::Char(c) => self.input_buffer.push(c),
                _ => {}
            },
            InputMode::Daddr => match key {
                KeyCode::Esc => {
                    self.input_buffer.clear();
                    self.input_mode = InputMode::Normal;
                }
                KeyCode::Enter => {
                    if let Some((addr, size)) = parse_watch_input(&self.input_buffer) {
                        self.session.dispatch(Command::SetDaddr { addr, size });
                    }
                    self.input_buffer.clear();
                    self.input_mode = InputMode::Normal;
                }
                KeyCode::Backspace => {
                    self.input_buffer.pop();
                }
                KeyCode::Char(c) => self.input_buffer.push(c),
                _ => {}
            },
        }
    }

    fn handle_normal_key(&mut self, key: KeyCode, mods: KeyModifiers) {
        let stride = if mods.contains(KeyModifiers::SHIFT) { 10 } else { 1 };
        match key {
            KeyCode::Char('q' | 'Q') => self.should_quit = true,
            KeyCode::Char('?') => self.input_mode = InputMode::Help,
            KeyCode::Esc => self.session.dispatch(Command::ResumeLive),

            KeyCode::Left => self.session.dispatch(Command::SeekRelative(-stride)),
            KeyCode::Right => self.session.dispatch(Command::SeekRelative(stride)),
            KeyCode::Char('g') => self.session.dispatch(Command::SeekStart),
            KeyCode::Char('G') => self.session.dispatch(Command::SeekEnd),

            KeyCode::Char('j') => self.session.dispatch(Command::NextInstrHit),
            KeyCode::Char('k') => self.session.dispatch(Command::PrevInstrHit),
            KeyCode::Char('J') => self.session.dispatch(Command::NextDaddrHit),
            KeyCode::Char('K') => self.session.dispatch(Command::PrevDaddrHit),
            KeyCode::Char('[') => self
                .session
                .dispatch(Command::PrevRegisterWrite(RegisterId(self.focused_register))),
            KeyCode::Char(']') => self
                .session
                .dispatch(Command::NextRegisterWrite(RegisterId(self.focused_register))),

            KeyCode::Up => {
                self.focused_register = self.focused_register.saturating_sub(1);
            }
            KeyCode::Down => {
                let max = self.session.engine().register_names().len().saturating_sub(1);
                self.focused_register = (self.focused_register + 1).min(max);
            }

            KeyCode::Char('/') => {
                self.input_buffer = self.session.search(self.active_domain).query().to_string();
                self.input_mode = InputMode::Search;
            }
            KeyCode::Tab => {
                self.active_domain = match self.active_domain {
                    SearchDomain::Memory => SearchDomain::Disassembly,
                    SearchDomain::Disassembly => SearchDomain::SyscallLog,
                    SearchDomain::SyscallLog => SearchDomain::Memory,
                };
            }
            KeyCode::Char('n') => self.session.dispatch(Command::SearchNext(self.active_domain)),
            KeyCode::Char('N') => self.session.dispatch(Command::SearchPrev(self.active_domain)),
            KeyCode::Char('c') => self.session.dispatch(Command::SearchClear(self.active_domain)),

            KeyCode::Char('d') => {
                self.input_buffer.clear();
                self.input_mode = InputMode::Daddr;
            }
            KeyCode::Char('D') => self.session.dispatch(Command::ClearDaddr),
            KeyCode::Char('w') => {
                if let Some(d) = self.session.watch().daddr() {
                    self.session.dispatch(Command::AddWatch {
                        addr: d.addr,
                        size: d.size,
                        label: format!("{:#x}", d.addr),
                    });
                }
            }
            KeyCode::Char('x') => {
                if let Some(d) = self.session.watch().daddr() {
                    self.session.dispatch(Command::RemoveWatch {
                        addr: d.addr,
                        size: d.size,
                    });
                }
            }

            KeyCode::Char('e') => self.entropy_heat = !self.entropy_heat,
            KeyCode::Char('z') => self.session.dispatch(Command::ZoomReset),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let area = self.timeline_area;
        let inside = mouse.column >= area.x
            && mouse.column < area.x + area.width
            && mouse.row >= area.y
            && mouse.row < area.y + area.height;
        let col = mouse.column.saturating_sub(area.x);
        let width = area.width;
        if width == 0 {
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if inside => {
                self.drag_origin = Some(col);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(origin) = self.drag_origin.take() {
                    let travel = origin.abs_diff(col.min(width - 1));
                    if travel < DRAG_THRESHOLD {
                        self.session.dispatch(Command::ClickSeek { px: col, width });
                    } else {
                        self.session.dispatch(Command::DragZoom {
                            px0: origin,
                            px1: col.min(width - 1),
                            width,
                        });
                    }
                }
            }
            MouseEventKind::ScrollUp if inside => {
                self.session.dispatch(Command::ScrollZoom {
                    px: col,
                    width,
                    zoom_in: true,
                });
            }
            MouseEventKind::ScrollDown if inside => {
                self.session.dispatch(Command::ScrollZoom {
                    px: col,
                    width,
                    zoom_in: false,
                });
            }
            _ => {}
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    fn draw(&mut self, f: &mut ratatui::Frame) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(12),   // Registers / disasm / memory
                Constraint::Length(6), // Timeline
                Constraint::Min(8),    // Watches / history / syscalls
                Constraint::Length(3), // Status bar
            ])
            .split(f.area());

        self.render_header(f, outer[0]);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(24),
                Constraint::Percentage(38),
                Constraint::Percentage(38),
            ])
            .split(outer[1]);

        let cur_idx = self
            .session
            .cursor()
            .effective_index(self.session.engine().trace_len());
        let prev_snapshot =
            cur_idx.and_then(|i| i.checked_sub(1)).and_then(|i| self.session.engine().registers_at(i));
        RegistersPanel::render(
            f,
            top[0],
            self.session.engine().register_names(),
            self.session.view().registers.as_ref(),
            prev_snapshot.as_ref(),
            self.focused_register,
        );

        DisasmPanel::render(
            f,
            top[1],
            &self.session.view().listing,
            self.session.view().registers.as_ref().map(|r| r.rip),
            self.session.search(SearchDomain::Disassembly),
        );

        let mem_base = self.session.memory_view_base();
        let slice = self.session.engine().read_memory_range(mem_base, MEM_VIEW_BYTES);
        MemoryPanel::render(
            f,
            top[2],
            mem_base,
            &slice,
            self.session.watch().daddr(),
            &self.session.view().accesses,
            self.session.search(SearchDomain::Memory),
            self.entropy_heat,
        );

        let tl_width = outer[2].width.saturating_sub(2);
        let data = self.session.timeline(tl_width);
        let tl_title = format!(
            "Timeline [{}..{}) of {}",
            data.window.start,
            data.window.end,
            self.session.engine().trace_len()
        );
        self.timeline_area = TimelineView::render(f, outer[2], &data, &tl_title);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(40),
                Constraint::Percentage(35),
            ])
            .split(outer[3]);

        WatchesPanel::render(f, bottom[0], self.session.watch());
        HistoryPanel::render(
            f,
            bottom[1],
            self.session.region_history(),
            self.session.follow_row(),
        );
        let log = self.session.engine().syscall_log();
        SyscallPanel::render(
            f,
            bottom[2],
            &log,
            cur_idx,
            self.session.search(SearchDomain::SyscallLog),
        );

        self.render_status_bar(f, outer[4]);

        match self.input_mode {
            InputMode::Search => {
                let title = format!("Search {}", domain_name(self.active_domain));
                render_input_overlay(f, f.area(), &title, &self.input_buffer);
            }
            InputMode::Daddr => {
                render_input_overlay(f, f.area(), "Watch addr [size]", &self.input_buffer);
            }
            InputMode::Help => render_help_overlay(f, f.area()),
            InputMode::Normal => {}
        }
    }

    fn render_header(&self, f: &mut ratatui::Frame, area: Rect) {
        let mode = if self.session.cursor().is_live() {
            Span::styled("[LIVE]", Style::new().fg(ALERT_RED).add_modifier(Modifier::BOLD))
        } else {
            Span::styled("[REPLAY]", Style::new().fg(WARN_AMBER))
        };
        let position = self.session.global_position().map_or_else(
            || "-/-".to_string(),
            |(pos, head)| format!("#{pos} / #{head}"),
        );
        let mut spans = vec![
            Span::styled("REWIND", STYLE_HEADING),
            Span::styled(" | ", STYLE_DIM),
            mode,
            Span::styled(" | ", STYLE_DIM),
            Span::styled(position, Style::new().fg(FG_GREEN)),
            Span::styled(" | ", STYLE_DIM),
            Span::styled(
                format!("{} steps", self.session.engine().trace_len()),
                Style::new().fg(FG_GREEN),
            ),
        ];
        if let Some(err) = self.session.status() {
            spans.push(Span::styled(" | ", STYLE_DIM));
            spans.push(Span::styled(err.to_string(), Style::new().fg(ALERT_RED)));
        }
        let header = Paragraph::new(vec![Line::from(spans)]).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::new().fg(FG_GREEN)),
        );
        f.render_widget(header, area);
    }

    fn render_status_bar(&self, f: &mut ratatui::Frame, area: Rect) {
        let domain = Span::styled(
            format!("[{}]", domain_name(self.active_domain)),
            Style::new().fg(WARN_AMBER),
        );
        let line = Line::from(vec![
            Span::styled("Q", STYLE_KEY),
            Span::styled(":Quit ", STYLE_DIM),
            Span::styled("←→", STYLE_KEY),
            Span::styled(":Seek ", STYLE_DIM),
            Span::styled("j/k J/K [/]", STYLE_KEY),
            Span::styled(":Nav ", STYLE_DIM),
            Span::styled("/", STYLE_KEY),
            Span::styled(":Search ", STYLE_DIM),
            Span::styled("n/N", STYLE_KEY),
            Span::styled(":Match ", STYLE_DIM),
            Span::styled("d", STYLE_KEY),
            Span::styled(":Watch ", STYLE_DIM),
            Span::styled("Esc", STYLE_KEY),
            Span::styled(":Live ", STYLE_DIM),
            Span::styled("?", STYLE_KEY),
            Span::styled(":Help ", STYLE_DIM),
            domain,
        ]);
        let status = Paragraph::new(vec![line]).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(FG_GREEN)),
        );
        f.render_widget(status, area);
    }
}

fn domain_name(domain: SearchDomain) -> &'static str {
    match domain {
        SearchDomain::Memory => "memory",
        SearchDomain::Disassembly => "disasm",
        SearchDomain::SyscallLog => "syscalls",
    }
}

/// Parse watch input: a hex/decimal address, optionally followed by a size.
fn parse_watch_input(input: &str) -> Option<(u64, Option<u64>)> {
    let mut parts = input.split_whitespace();
    let addr = parse_number(parts.next()?)?;
    let size = match parts.next() {
        Some(token) => Some(parse_number(token)?),
        None => None,
    };
    Some((addr, size))
}

fn parse_number(token: &str) -> Option<u64> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        token.parse().ok()
    }
}

// ── Overlays ─────────────────────────────────────────────────────────────

fn centered_popup(area: Rect, width_percent: u16, height_lines: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(height_lines), Constraint::Fill(1)])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(vertical[1])[1]
}

fn render_input_overlay(f: &mut ratatui::Frame, area: Rect, title: &str, buffer: &str) {
    let popup_area = centered_popup(area, 60, 3);
    let widget = Paragraph::new(format!("{buffer}_"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {title} (Enter to apply, Esc to cancel) "))
                .style(Style::default().bg(ratatui::style::Color::Black).fg(FG_GREEN)),
        )
        .style(Style::default().fg(WARN_AMBER));
    f.render_widget(ratatui::widgets::Clear, popup_area);
    f.render_widget(widget, popup_area);
}

fn render_help_overlay(f: &mut ratatui::Frame, area: Rect) {
    let popup_area = centered_popup(area, 70, 24);

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("  Navigation", STYLE_HEADING)),
        Line::from(vec![
            Span::styled("  ←/→", STYLE_KEY),
            Span::styled(" step ±1 (Shift: ±10)   ", STYLE_DIM),
            Span::styled("g/G", STYLE_KEY),
            Span::styled(" start/end   ", STYLE_DIM),
            Span::styled("Esc", STYLE_KEY),
            Span::styled(" back to live", STYLE_DIM),
        ]),
        Line::from(vec![
            Span::styled("  j/k", STYLE_KEY),
            Span::styled(" next/prev run of this instruction", STYLE_DIM),
        ]),
        Line::from(vec![
            Span::styled("  J/K", STYLE_KEY),
            Span::styled(" next/prev access of the watched range", STYLE_DIM),
        ]),
        Line::from(vec![
            Span::styled("  [/]", STYLE_KEY),
            Span::styled(" setting write / next write of the focused register (↑↓ to focus)", STYLE_DIM),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Timeline (mouse)", STYLE_HEADING)),
        Line::from(Span::styled("  click to seek, drag to zoom in, scroll wheel to zoom at pointer", STYLE_DIM)),
        Line::from(vec![
            Span::styled("  z", STYLE_KEY),
            Span::styled(" reset zoom", STYLE_DIM),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Search", STYLE_HEADING)),
        Line::from(vec![
            Span::styled("  /", STYLE_KEY),
            Span::styled(" edit query   ", STYLE_DIM),
            Span::styled("Tab", STYLE_KEY),
            Span::styled(" cycle domain   ", STYLE_DIM),
            Span::styled("n/N", STYLE_KEY),
            Span::styled(" next/prev match   ", STYLE_DIM),
            Span::styled("c", STYLE_KEY),
            Span::styled(" clear", STYLE_DIM),
        ]),
        Line::from(Span::styled("  hex digits → byte pattern, /re/ → regex, else literal text", STYLE_DIM)),
        Line::from(""),
        Line::from(Span::styled("  Watches", STYLE_HEADING)),
        Line::from(vec![
            Span::styled("  d", STYLE_KEY),
            Span::styled(" set watched range   ", STYLE_DIM),
            Span::styled("D", STYLE_KEY),
            Span::styled(" clear   ", STYLE_DIM),
            Span::styled("w/x", STYLE_KEY),
            Span::styled(" pin/remove list entry   ", STYLE_DIM),
            Span::styled("e", STYLE_KEY),
            Span::styled(" entropy heat", STYLE_DIM),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Press any key to close", STYLE_DIM)),
    ];

    let widget = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .style(Style::new().bg(ratatui::style::Color::Black).fg(FG_GREEN)),
    );
    f.render_widget(ratatui::widgets::Clear, popup_area);
    f.render_widget(widget, popup_area);
}
