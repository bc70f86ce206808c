//! Timeline raster: the zoom window painted as stacked per-column lanes.
//!
//! Lane order, top to bottom:
//! - rip lane: hue-coded instruction pointer, cyan on syscalls
//! - activity lane: memory reads (blue), writes (red), both (amber)
//! - daddr lane: accesses to the watched range, when one is set
//! - scale row: cursor marker plus the minimap strip when zoomed
//!
//! Mouse events on the returned inner area drive click-to-seek,
//! drag-to-zoom and scroll-to-zoom; the app keeps the area from the last
//! frame for hit-testing.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::engine::MemActivity;
use crate::session::TimelineData;

use super::theme::{
    rip_color, CURSOR_WHITE, DIM, FG_GREEN, READ_BLUE, SYSCALL_CYAN, WARN_AMBER, WRITE_RED,
};

pub struct TimelineView;

impl TimelineView {
    /// Render the timeline into `area`; returns the inner raster area the
    /// mouse maps against.
    pub fn render(f: &mut Frame, area: Rect, data: &TimelineData, title: &str) -> Rect {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .border_style(Style::default().fg(FG_GREEN));
        let inner = block.inner(area);
        f.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return inner;
        }

        let width = usize::from(inner.width);
        let mut lines = Vec::new();
        lines.push(rip_lane(data, width));
        lines.push(activity_lane(data, width));
        if !data.daddr_hits.is_empty() || data.window.span() > 0 {
            lines.push(daddr_lane(data, width));
        }
        lines.push(scale_row(data, width));

        f.render_widget(Paragraph::new(lines), inner);
        inner
    }
}

/// Bucket sampled entries into raster columns.
fn column_of(local_index: usize, data: &TimelineData, width: usize) -> Option<usize> {
    let w = data.window;
    if local_index < w.start || local_index >= w.end || w.span() == 0 {
        return None;
    }
    let col = (local_index - w.start) * width / w.span();
    Some(col.min(width - 1))
}

fn rip_lane(data: &TimelineData, width: usize) -> Line<'static> {
    let (min_rip, max_rip) = data
        .rip
        .iter()
        .fold((u64::MAX, 0), |(lo, hi), s| (lo.min(s.rip), hi.max(s.rip)));

    let mut cells: Vec<Option<Span<'static>>> = vec![None; width];
    for sample in &data.rip {
        let Some(col) = column_of(sample.local_index, data, width) else {
            continue;
        };
        let color = if sample.is_syscall {
            SYSCALL_CYAN
        } else {
            rip_color(sample.rip, min_rip, max_rip)
        };
        cells[col] = Some(Span::styled("█", Style::default().fg(color)));
    }
    fill_lane(cells)
}

fn activity_lane(data: &TimelineData, width: usize) -> Line<'static> {
    let mut cells: Vec<Option<Span<'static>>> = vec![None; width];
    for sample in &data.activity {
        let Some(col) = column_of(sample.local_index, data, width) else {
            continue;
        };
        let color = match sample.activity {
            MemActivity::None => continue,
            MemActivity::Read => READ_BLUE,
            MemActivity::Write => WRITE_RED,
            MemActivity::Both => WARN_AMBER,
        };
        cells[col] = Some(Span::styled("▀", Style::default().fg(color)));
    }
    fill_lane(cells)
}

fn daddr_lane(data: &TimelineData, width: usize) -> Line<'static> {
    let mut cells: Vec<Option<Span<'static>>> = vec![None; width];
    for hit in &data.daddr_hits {
        let Some(col) = column_of(hit.local_index, data, width) else {
            continue;
        };
        let color = if hit.is_write { WRITE_RED } else { READ_BLUE };
        cells[col] = Some(Span::styled("▪", Style::default().fg(color)));
    }
    // Executions of the current instruction share the lane as dim ticks.
    for &idx in &data.instr_hits {
        if let Some(col) = column_of(idx, data, width) {
            if cells[col].is_none() {
                cells[col] = Some(Span::styled("·", Style::default().fg(DIM)));
            }
        }
    }
    fill_lane(cells)
}

/// Cursor marker, overlaid on the minimap strip when zoomed.
fn scale_row(data: &TimelineData, width: usize) -> Line<'static> {
    let mut cells: Vec<Option<Span<'static>>> = vec![None; width];
    if let Some((lo, hi)) = data.minimap {
        let from = (lo * width as f64) as usize;
        let to = ((hi * width as f64).ceil() as usize).clamp(from + 1, width);
        for cell in cells.iter_mut().take(to).skip(from) {
            *cell = Some(Span::styled("─", Style::default().fg(WARN_AMBER)));
        }
    }
    if let Some(col) = data.cursor_column {
        let col = usize::from(col).min(width.saturating_sub(1));
        cells[col] = Some(Span::styled("▲", Style::default().fg(CURSOR_WHITE)));
    }
    fill_lane(cells)
}

fn fill_lane(cells: Vec<Option<Span<'static>>>) -> Line<'static> {
    Line::from(
        cells
            .into_iter()
            .map(|c| c.unwrap_or_else(|| Span::styled(" ", Style::default())))
            .collect::<Vec<_>>(),
    )
}
