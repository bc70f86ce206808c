//! Register panel: GPRs, flags and the focused-register marker.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::engine::RegisterSnapshot;

use super::theme::{DIM, FG_GREEN, WARN_AMBER};

pub struct RegistersPanel;

impl RegistersPanel {
    /// `focused` is the register the `[`/`]` write-navigation keys act on;
    /// `previous` (the snapshot one step back) highlights changed values.
    pub fn render(
        f: &mut Frame,
        area: Rect,
        names: &[String],
        snapshot: Option<&RegisterSnapshot>,
        previous: Option<&RegisterSnapshot>,
        focused: usize,
    ) {
        let mut lines = Vec::new();
        match snapshot {
            Some(regs) => {
                lines.push(Line::from(vec![
                    Span::styled("rip ", Style::default().fg(DIM)),
                    Span::styled(format!("{:#018x}", regs.rip), Style::default().fg(FG_GREEN)),
                ]));
                for (i, value) in regs.gprs.iter().enumerate() {
                    let name = names.get(i).map_or("r?", String::as_str);
                    let marker = if i == focused { "▶" } else { " " };
                    let changed = previous
                        .and_then(|p| p.gprs.get(i))
                        .is_some_and(|prev| prev != value);
                    let value_style = if changed {
                        Style::default().fg(WARN_AMBER).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(FG_GREEN)
                    };
                    lines.push(Line::from(vec![
                        Span::styled(marker.to_string(), Style::default().fg(WARN_AMBER)),
                        Span::styled(format!("{name:<4}"), Style::default().fg(DIM)),
                        Span::styled(format!("{value:#018x}"), value_style),
                    ]));
                }
                if !regs.flags.is_empty() {
                    lines.push(Line::from(vec![
                        Span::styled("flags ", Style::default().fg(DIM)),
                        Span::styled(regs.flags.join(" "), Style::default().fg(FG_GREEN)),
                    ]));
                }
            }
            None => lines.push(Line::from(Span::styled("no data", Style::default().fg(DIM)))),
        }

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Registers")
                .border_style(Style::default().fg(FG_GREEN)),
        );
        f.render_widget(widget, area);
    }
}
