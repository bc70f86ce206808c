//! Disassembly listing around the current rip, with search-hit highlights.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::engine::DisasmLine;
use crate::search::SearchSession;

use super::theme::{DIM, FG_GREEN, WARN_AMBER};

pub struct DisasmPanel;

impl DisasmPanel {
    pub fn render(
        f: &mut Frame,
        area: Rect,
        listing: &[DisasmLine],
        current_rip: Option<u64>,
        search: &SearchSession,
    ) {
        let height = usize::from(area.height.saturating_sub(2));
        let current_pos = current_rip
            .and_then(|rip| listing.iter().position(|l| l.addr == rip))
            .unwrap_or(0);
        // Keep the current line centered.
        let top = current_pos.saturating_sub(height / 2);

        let hit_lines: Vec<usize> = search.matches().iter().map(|m| m.start as usize).collect();
        let current_hit = search.current().map(|h| h.start as usize);

        let mut lines = Vec::new();
        for (i, entry) in listing.iter().enumerate().skip(top).take(height) {
            let is_cursor = current_rip == Some(entry.addr);
            let is_hit = hit_lines.contains(&i);
            let style = if is_cursor {
                Style::default().fg(FG_GREEN).add_modifier(Modifier::REVERSED)
            } else if current_hit == Some(i) {
                Style::default().fg(WARN_AMBER).add_modifier(Modifier::REVERSED)
            } else if is_hit {
                Style::default().fg(WARN_AMBER)
            } else {
                Style::default().fg(FG_GREEN)
            };
            let marker = if is_cursor { "▶ " } else { "  " };
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(WARN_AMBER)),
                Span::styled(format!("{:#012x}  ", entry.addr), Style::default().fg(DIM)),
                Span::styled(entry.text.clone(), style),
            ]));
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled("no listing", Style::default().fg(DIM))));
        }

        let title = if search.query().is_empty() {
            "Disassembly".to_string()
        } else {
            format!("Disassembly [\"{}\" {}]", search.query(), search.status())
        };
        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(FG_GREEN)),
        );
        f.render_widget(widget, area);
    }
}
