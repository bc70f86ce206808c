//! TUI color theme.
//!
//! Green-on-black instrument look; the timeline's rip lane gets a full hue
//! sweep so distinct code regions read as distinct colors.

use ratatui::style::Color;

pub const FG_GREEN: Color = Color::Rgb(0, 255, 0);
pub const ALERT_RED: Color = Color::Rgb(255, 0, 0);
pub const WARN_AMBER: Color = Color::Rgb(255, 191, 0);
pub const DIM: Color = Color::Rgb(0, 180, 0);
pub const SYSCALL_CYAN: Color = Color::Rgb(0, 220, 220);
pub const WRITE_RED: Color = Color::Rgb(255, 80, 80);
pub const READ_BLUE: Color = Color::Rgb(90, 140, 255);
pub const CURSOR_WHITE: Color = Color::Rgb(255, 255, 255);

/// Color for an instruction pointer, hue-mapped across the executed address
/// range so nearby code shares a hue.
#[must_use]
pub fn rip_color(rip: u64, min_rip: u64, max_rip: u64) -> Color {
    if max_rip <= min_rip {
        return FG_GREEN;
    }
    let t = (rip - min_rip) as f64 / (max_rip - min_rip) as f64;
    hsl_to_rgb(t * 300.0, 0.8, 0.55)
}

/// Plain HSL to RGB (h in degrees, s/l in 0..=1).
#[must_use]
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Color {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::Rgb(to_u8(r), to_u8(g), to_u8(b))
}
