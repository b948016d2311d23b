mod color;

// Re-export public API
pub use color::{blend_over, cell_rgba, hsv_to_rgb, saturate, Palette};

use crate::grid::Snapshot;

/// Frame layout: every simulation cell becomes a `cell_size` x `cell_size` block.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub frame_width: usize,
    pub frame_height: usize,
    pub cell_size: usize,
    pub background: [u8; 3],
    pub palette: Palette,
}

impl RenderConfig {
    /// Largest integer cell size whose frame fits in `pixel_width` x `pixel_height`
    /// (at least one pixel per cell).
    pub fn fit(pixel_width: usize, pixel_height: usize, grid_width: usize, grid_height: usize) -> Self {
        let cell_size = (pixel_width / grid_width.max(1))
            .min(pixel_height / grid_height.max(1))
            .max(1);
        Self {
            frame_width: grid_width * cell_size,
            frame_height: grid_height * cell_size,
            cell_size,
            background: [0, 0, 0],
            palette: Palette::default(),
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }
}

/// Render into a reusable RGBA buffer (opaque, background already composited).
pub fn render_into(buf: &mut Vec<u8>, snap: &Snapshot, cfg: &RenderConfig) {
    let fw = cfg.frame_width;
    buf.resize(fw * cfg.frame_height * 4, 0);

    let cs = cfg.cell_size.max(1);
    for y in 0..snap.height.min(cfg.frame_height / cs) {
        for x in 0..snap.width.min(fw / cs) {
            let rgba = cell_rgba(snap.density_at(y, x), snap.velocity_at(y, x), &cfg.palette);
            let [r, g, b] = blend_over(rgba, cfg.background);
            for py in y * cs..(y + 1) * cs {
                let row = py * fw;
                for px in x * cs..(x + 1) * cs {
                    let off = (row + px) * 4;
                    buf[off] = r;
                    buf[off + 1] = g;
                    buf[off + 2] = b;
                    buf[off + 3] = 255;
                }
            }
        }
    }
}

pub fn render(snap: &Snapshot, cfg: &RenderConfig) -> Vec<u8> {
    let mut buf = Vec::new();
    render_into(&mut buf, snap, cfg);
    buf
}

/// Convert RGBA bytes to 0RGB words.
pub fn rgba_to_argb(rgba: &[u8], out: &mut [u32]) {
    for (i, pixel) in rgba.chunks_exact(4).enumerate() {
        out[i] = (pixel[0] as u32) << 16 | (pixel[1] as u32) << 8 | pixel[2] as u32;
    }
}

/// Binary PPM (P6) image; alpha is dropped.
pub fn encode_ppm(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut out = format!("P6\n{} {}\n255\n", width, height).into_bytes();
    out.reserve(width * height * 3);
    for pixel in rgba.chunks_exact(4).take(width * height) {
        out.extend_from_slice(&pixel[..3]);
    }
    out
}
