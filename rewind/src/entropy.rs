//! Shannon entropy of byte windows and its heat-map color scale.
//!
//! The memory dump colors each row by the entropy of its bytes, making
//! compressed/encrypted regions (high entropy) stand out from zero fill and
//! text (low entropy).

use ratatui::style::Color;

/// Shannon entropy of `bytes` in bits per byte: 0.0 for empty or uniform
/// data, up to 8.0 for uniformly random data.
#[must_use]
pub fn shannon_entropy(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }
    let mut freq = [0u32; 256];
    for &b in bytes {
        freq[usize::from(b)] += 1;
    }
    let len = bytes.len() as f64;
    let mut h = 0.0;
    for &count in &freq {
        if count == 0 {
            continue;
        }
        let p = f64::from(count) / len;
        h -= p * p.log2();
    }
    h
}

/// Gradient stops as `(t, r, g, b)`: dark blue through cyan, green, yellow,
/// orange and red up to magenta at maximum entropy.
const STOPS: [(f64, u8, u8, u8); 8] = [
    (0.00, 10, 10, 40),
    (0.10, 20, 40, 120),
    (0.25, 30, 140, 200),
    (0.40, 40, 200, 100),
    (0.55, 200, 220, 40),
    (0.70, 240, 160, 20),
    (0.85, 230, 50, 30),
    (1.00, 200, 40, 180),
];

/// Map an entropy value (0..=8 bits) onto the heat-map gradient.
#[must_use]
pub fn entropy_color(entropy: f64) -> Color {
    let t = (entropy / 8.0).clamp(0.0, 1.0);
    let mut lo = STOPS[0];
    let mut hi = STOPS[STOPS.len() - 1];
    for pair in STOPS.windows(2) {
        if t >= pair[0].0 && t <= pair[1].0 {
            lo = pair[0];
            hi = pair[1];
            break;
        }
    }
    let f = if (hi.0 - lo.0).abs() < f64::EPSILON {
        0.0
    } else {
        (t - lo.0) / (hi.0 - lo.0)
    };
    let lerp = |a: u8, b: u8| (f64::from(a) + f * (f64::from(b) - f64::from(a))).round() as u8;
    Color::Rgb(lerp(lo.1, hi.1), lerp(lo.2, hi.2), lerp(lo.3, hi.3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_bounds() {
        assert!(shannon_entropy(&[]).abs() < f64::EPSILON);
        assert!(shannon_entropy(&[0x41; 64]).abs() < f64::EPSILON);

        // All 256 byte values once: exactly 8 bits.
        let all: Vec<u8> = (0..=255).collect();
        assert!((shannon_entropy(&all) - 8.0).abs() < 1e-9);

        // Two symbols, even split: exactly 1 bit.
        let coin: Vec<u8> = (0..64).map(|i| i % 2).collect();
        assert!((shannon_entropy(&coin) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_color_endpoints_and_clamp() {
        assert_eq!(entropy_color(0.0), Color::Rgb(10, 10, 40));
        assert_eq!(entropy_color(8.0), Color::Rgb(200, 40, 180));
        // Out-of-range inputs clamp to the endpoints.
        assert_eq!(entropy_color(-1.0), entropy_color(0.0));
        assert_eq!(entropy_color(100.0), entropy_color(8.0));
    }

    #[test]
    fn test_color_interpolates_between_stops() {
        // Halfway between the 0.25 and 0.40 stops.
        let mid = entropy_color(0.325 * 8.0);
        assert_eq!(mid, Color::Rgb(35, 170, 150));
    }
}
