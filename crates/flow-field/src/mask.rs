//! Per-pixel visibility mask and overlay raster.

use flow_common::Rgba;

/// Visibility bitmap plus a parallel RGBA overlay raster, both sized to the
/// viewport.
///
/// Built once per globe/projection by rasterizing the globe's outer
/// boundary; the visibility bitmap is immutable afterward. The overlay
/// raster is written by the field builder, four pixels at a time (one
/// stride-2 block), and handed to the published field read-only.
#[derive(Debug, Clone)]
pub struct Mask {
    width: usize,
    height: usize,
    visible: Vec<bool>,
    overlay: Vec<u8>,
}

impl Mask {
    /// Rasterize a closed boundary polygon into a visibility bitmap.
    ///
    /// Even-odd scanline fill against pixel centers, the raster analog of
    /// filling the boundary path into an off-screen buffer and testing
    /// opacity per pixel.
    pub fn rasterize(outline: &[(f64, f64)], width: usize, height: usize) -> Self {
        let mut visible = vec![false; width * height];

        for y in 0..height {
            let scan_y = y as f64 + 0.5;
            let mut crossings = Vec::new();
            for i in 0..outline.len() {
                let (x0, y0) = outline[i];
                let (x1, y1) = outline[(i + 1) % outline.len()];
                // Half-open edge rule so a vertex is counted once.
                if (y0 <= scan_y && y1 > scan_y) || (y1 <= scan_y && y0 > scan_y) {
                    let t = (scan_y - y0) / (y1 - y0);
                    crossings.push(x0 + t * (x1 - x0));
                }
            }
            crossings.sort_by(f64::total_cmp);

            for pair in crossings.chunks(2) {
                if pair.len() < 2 {
                    break;
                }
                let start = pair[0].ceil().max(0.0) as usize;
                let end = (pair[1].floor().max(0.0) as usize).min(width.saturating_sub(1));
                for x in start..=end {
                    if x < width {
                        visible[y * width + x] = true;
                    }
                }
            }
        }

        Self {
            width,
            height,
            visible,
            overlay: vec![0; width * height * 4],
        }
    }

    /// A mask where every pixel is visible, for rectangular projections
    /// covering the whole viewport.
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            visible: vec![true; width * height],
            overlay: vec![0; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True when the pixel lies on the projected globe.
    pub fn is_visible(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.visible[y * self.width + x]
    }

    /// Write one overlay pixel. Out-of-raster writes are ignored.
    pub fn set_overlay_pixel(&mut self, x: usize, y: usize, rgba: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * 4;
        self.overlay[i..i + 4].copy_from_slice(&rgba);
    }

    /// Write a 2x2 overlay block anchored at (x, y), the builder's stride
    /// unit. Only visible pixels are written, so a block straddling the
    /// boundary never colors the hidden side.
    pub fn set_overlay_block(&mut self, x: usize, y: usize, rgba: Rgba) {
        for (px, py) in [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)] {
            if self.is_visible(px, py) {
                self.set_overlay_pixel(px, py, rgba);
            }
        }
    }

    /// Read-only view of the RGBA overlay raster.
    pub fn overlay_raster(&self) -> &[u8] {
        &self.overlay
    }

    /// Consume the mask, keeping only the overlay raster.
    pub(crate) fn into_overlay(self) -> Vec<u8> {
        self.overlay
    }
}
