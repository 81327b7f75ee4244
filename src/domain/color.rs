//! Depth banding colors.

const HUE_STEP: usize = 37;
const SATURATION: f64 = 0.60;
const LIGHTNESS: f64 = 0.92;

/// Soft fill color for a depth, as `#rrggbb`.
///
/// Hue rotates by a fixed step per level; saturation and lightness are constant.
pub fn depth_color(depth: usize) -> String {
    let hue = (depth % 360 * HUE_STEP) % 360;
    let (r, g, b) = hsl_to_rgb(hue as f64 / 360.0, SATURATION, LIGHTNESS);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r1, g1, b1) = match (h * 6.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let channel = |v: f64| ((v + m) * 255.0) as u8;
    (channel(r1), channel(g1), channel(b1))
}
