//! Region history: the access log of the watched range, tracking the cursor.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::engine::RegionAccess;
use crate::session::REGION_HISTORY_MAX;

use super::theme::{DIM, FG_GREEN, READ_BLUE, WRITE_RED};

pub struct HistoryPanel;

impl HistoryPanel {
    pub fn render(f: &mut Frame, area: Rect, rows: &[RegionAccess], follow: Option<usize>) {
        let height = usize::from(area.height.saturating_sub(2));
        // Scroll so the follow row stays visible.
        let top = follow
            .unwrap_or(0)
            .saturating_sub(height.saturating_sub(1) / 2);

        let mut lines = Vec::new();
        lines.push(Line::from(Span::styled(
            "  index     rip           rw addr         size value",
            Style::default().fg(DIM).add_modifier(Modifier::BOLD),
        )));
        for (i, row) in rows.iter().enumerate().skip(top).take(height.saturating_sub(1)) {
            let rw = if row.access.is_write { "W" } else { "R" };
            let rw_color = if row.access.is_write { WRITE_RED } else { READ_BLUE };
            let value = row
                .access
                .value
                .map_or_else(|| "-".to_string(), |v| format!("{v:#x}"));
            let base = Style::default().fg(FG_GREEN);
            let style = if follow == Some(i) {
                base.add_modifier(Modifier::REVERSED)
            } else {
                base
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", if follow == Some(i) { "▶" } else { " " }), base),
                Span::styled(format!("{:<9} ", row.local_index), style),
                Span::styled(format!("{:#012x}  ", row.rip), style),
                Span::styled(format!("{rw}  "), Style::default().fg(rw_color)),
                Span::styled(
                    format!("{:#012x} {:<4} {value}", row.access.addr, row.access.size),
                    style,
                ),
            ]));
        }
        if rows.is_empty() {
            lines.push(Line::from(Span::styled(
                "no watched range",
                Style::default().fg(DIM),
            )));
        }

        let capped = if rows.len() >= REGION_HISTORY_MAX { "+" } else { "" };
        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Region History ({}{capped})", rows.len()))
                .border_style(Style::default().fg(FG_GREEN)),
        );
        f.render_widget(widget, area);
    }
}
