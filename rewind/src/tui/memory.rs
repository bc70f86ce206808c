//! Memory dump: 16-byte hex rows with the watched range, access and
//! search-match highlights, and an optional per-row entropy heat map.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::engine::{MemAccess, MemorySlice};
use crate::entropy::{entropy_color, shannon_entropy};
use crate::search::SearchSession;
use crate::session::WatchedRange;

use super::theme::{DIM, FG_GREEN, READ_BLUE, WARN_AMBER, WRITE_RED};

const BYTES_PER_ROW: usize = 16;

pub struct MemoryPanel;

impl MemoryPanel {
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        f: &mut Frame,
        area: Rect,
        base: u64,
        slice: &MemorySlice,
        daddr: Option<WatchedRange>,
        accesses: &[MemAccess],
        search: &SearchSession,
        entropy_heat: bool,
    ) {
        let rows = usize::from(area.height.saturating_sub(2));
        let current_hit = search.current();
        let mut lines = Vec::new();

        for row in 0..rows {
            let row_off = row * BYTES_PER_ROW;
            if row_off >= slice.bytes.len() {
                break;
            }
            let row_end = (row_off + BYTES_PER_ROW).min(slice.bytes.len());
            let row_bytes = &slice.bytes[row_off..row_end];
            let row_addr = base.saturating_add(row_off as u64);

            let addr_style = if entropy_heat {
                Style::default().fg(entropy_color(shannon_entropy(row_bytes)))
            } else {
                Style::default().fg(DIM)
            };
            let mut spans = vec![Span::styled(format!("{row_addr:#012x}  "), addr_style)];

            let mut ascii = String::with_capacity(BYTES_PER_ROW);
            for (i, &byte) in row_bytes.iter().enumerate() {
                let addr = row_addr.saturating_add(i as u64);
                let valid = slice.valid.get(row_off + i).copied().unwrap_or(false);

                // Saturating like MemAccess::intersects: a watch or match at
                // the top of the address space must not wrap.
                let in_daddr = daddr
                    .is_some_and(|d| addr >= d.addr && addr < d.addr.saturating_add(d.size));
                let accessed = accesses.iter().find(|a| a.intersects(addr, 1));
                let covers = |m: &crate::search::SearchHit| {
                    addr >= m.start && addr < m.start.saturating_add(m.len as u64)
                };
                let in_match = search.matches().iter().any(|m| covers(m));
                let in_current = current_hit.is_some_and(|m| covers(&m));

                let mut style = if entropy_heat {
                    Style::default().fg(entropy_color(shannon_entropy(row_bytes)))
                } else {
                    Style::default().fg(FG_GREEN)
                };
                if let Some(acc) = accessed {
                    style = Style::default().fg(if acc.is_write { WRITE_RED } else { READ_BLUE });
                }
                if in_match {
                    style = Style::default().fg(WARN_AMBER);
                }
                if in_current {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                if in_daddr {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }

                let text = if valid {
                    format!("{byte:02x} ")
                } else {
                    "?? ".to_string()
                };
                spans.push(Span::styled(text, style));

                ascii.push(if valid && (0x20..0x7f).contains(&byte) {
                    byte as char
                } else {
                    '.'
                });
            }
            spans.push(Span::styled(format!(" {ascii}"), Style::default().fg(DIM)));
            lines.push(Line::from(spans));
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled("no memory", Style::default().fg(DIM))));
        }

        let mut title = String::from("Memory");
        if let Some(d) = daddr {
            title.push_str(&format!(" [watch {:#x}+{}]", d.addr, d.size));
        }
        if !search.query().is_empty() {
            title.push_str(&format!(" [\"{}\" {}]", search.query(), search.status()));
        }
        if entropy_heat {
            title.push_str(" [entropy]");
        }

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(FG_GREEN)),
        );
        f.render_widget(widget, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SearchDomain, SearchHit, SearchMode, SearchSession};
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_render_survives_ranges_at_top_of_address_space() {
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).expect("terminal");
        let slice = MemorySlice {
            bytes: vec![0xaa; 64],
            valid: vec![true; 64],
        };
        let daddr = Some(WatchedRange {
            addr: u64::MAX - 1,
            size: 4,
        });
        let mut search = SearchSession::new(SearchDomain::Memory);
        search.install(
            "aa",
            SearchMode::Hex,
            Some(SearchMode::Hex),
            vec![SearchHit {
                start: u64::MAX - 2,
                len: 8,
            }],
            false,
            true,
        );
        terminal
            .draw(|f| {
                MemoryPanel::render(
                    f,
                    f.area(),
                    u64::MAX - 32,
                    &slice,
                    daddr,
                    &[],
                    &search,
                    false,
                );
            })
            .expect("render with top-of-address-space ranges");
    }
}
