//! Syscall log panel with search highlights.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::engine::SyscallRow;
use crate::search::SearchSession;

use super::theme::{DIM, FG_GREEN, SYSCALL_CYAN, WARN_AMBER};

pub struct SyscallPanel;

impl SyscallPanel {
    pub fn render(
        f: &mut Frame,
        area: Rect,
        log: &[SyscallRow],
        cursor_index: Option<usize>,
        search: &SearchSession,
    ) {
        let height = usize::from(area.height.saturating_sub(2));
        // Track the nearest row at or before the cursor.
        let active = cursor_index
            .and_then(|cur| log.iter().rposition(|row| row.local_index <= cur));
        let top = active
            .or_else(|| log.len().checked_sub(1))
            .unwrap_or(0)
            .saturating_sub(height / 2);

        let current_hit = search.current().map(|h| h.start as usize);
        let mut lines = Vec::new();
        for (i, row) in log.iter().enumerate().skip(top).take(height) {
            let is_hit = search.matches().iter().any(|m| m.start as usize == i);
            let style = if active == Some(i) {
                Style::default().fg(SYSCALL_CYAN).add_modifier(Modifier::REVERSED)
            } else if current_hit == Some(i) {
                Style::default().fg(WARN_AMBER).add_modifier(Modifier::REVERSED)
            } else if is_hit {
                Style::default().fg(WARN_AMBER)
            } else {
                Style::default().fg(SYSCALL_CYAN)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<8} ", row.local_index), Style::default().fg(DIM)),
                Span::styled(row.text.clone(), style),
            ]));
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled("no syscalls", Style::default().fg(DIM))));
        }

        let title = if search.query().is_empty() {
            format!("Syscalls ({})", log.len())
        } else {
            format!("Syscalls [\"{}\" {}]", search.query(), search.status())
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
