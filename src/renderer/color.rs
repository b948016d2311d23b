use crate::vec2::Vec2;

/// Soft clamp toward `threshold`: `threshold * (1 - exp(-x / threshold))`.
/// `threshold` must be non-zero.
pub fn saturate(x: f64, threshold: f64) -> f64 {
    threshold * (1.0 - (-x / threshold).exp())
}

/// Display tuning for the cell colour mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Speed multiplier before the hue is saturated toward 255 degrees.
    pub velocity_param: f64,
    /// Density multiplier before alpha is saturated toward 1.
    pub density_param: f64,
    pub saturation: f64,
    pub value: f64,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            velocity_param: 80.0,
            density_param: 0.1,
            saturation: 1.0,
            value: 0.9,
        }
    }
}

/// HSV (hue in degrees) to RGB in [0, 1].
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (f64, f64, f64) {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = value * saturation;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = value - c;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    (r + m, g + m, b + m)
}

/// Colour of one cell: hue from speed, alpha from density.
pub fn cell_rgba(density: f64, velocity: Vec2, palette: &Palette) -> [u8; 4] {
    let hue = saturate(velocity.length() * palette.velocity_param, 255.0);
    let alpha = saturate(density * palette.density_param, 1.0).clamp(0.0, 1.0);
    let (r, g, b) = hsv_to_rgb(hue, palette.saturation, palette.value);
    [to_byte(r), to_byte(g), to_byte(b), to_byte(alpha)]
}

/// Alpha-composite `rgba` over an opaque background.
pub fn blend_over(rgba: [u8; 4], background: [u8; 3]) -> [u8; 3] {
    let a = rgba[3] as f64 / 255.0;
    let mix = |fg: u8, bg: u8| (fg as f64 * a + bg as f64 * (1.0 - a)).round() as u8;
    [mix(rgba[0], background[0]), mix(rgba[1], background[1]), mix(rgba[2], background[2])]
}

fn to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
