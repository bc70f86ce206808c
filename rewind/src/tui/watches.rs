//! Watch list panel: persistent watched ranges with hit counters.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::session::watch::WATCH_HIT_CAP;
use crate::session::{WatchState, WatchedRange};

use super::theme::{DIM, FG_GREEN, WARN_AMBER};

pub struct WatchesPanel;

impl WatchesPanel {
    pub fn render(f: &mut Frame, area: Rect, watch: &WatchState) {
        let daddr = watch.daddr();
        let mut lines = Vec::new();
        for entry in watch.entries() {
            let is_daddr =
                daddr == Some(WatchedRange { addr: entry.addr, size: entry.size });
            let hits = match entry.hits {
                Some(h) if h >= WATCH_HIT_CAP => format!("{WATCH_HIT_CAP}+"),
                Some(h) => h.to_string(),
                None => "-".to_string(),
            };
            let style = if is_daddr {
                Style::default().fg(WARN_AMBER).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(FG_GREEN)
            };
            lines.push(Line::from(vec![
                Span::styled(if is_daddr { "▶ " } else { "  " }, Style::default().fg(WARN_AMBER)),
                Span::styled(
                    format!("{:#012x}+{:<4} ", entry.addr, entry.size),
                    style,
                ),
                Span::styled(format!("{hits:>6}  "), Style::default().fg(DIM)),
                Span::styled(entry.label.clone(), style),
            ]));
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled("no watches", Style::default().fg(DIM))));
        }

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Watches ({})", watch.entries().len()))
                .border_style(Style::default().fg(FG_GREEN)),
        );
        f.render_widget(widget, area);
    }
}
