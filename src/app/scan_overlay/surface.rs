// SPDX-License-Identifier: MPL-2.0

//! In-memory RGBA overlay surface

use super::{OverlaySurface, StrokeStyle};
use crate::app::frame_processor::geometry::RoiRect;
use crate::errors::{AppError, AppResult};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// Transparent RGBA bitmap
///
/// Strokes are centered on the rectangle's edge and drawn without
/// anti-aliasing.
#[derive(Debug, Clone)]
pub struct RgbaSurface {
    image: RgbaImage,
}

impl RgbaSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Save as PNG (or whatever the extension names)
    pub fn save(&self, path: &Path) -> AppResult<()> {
        self.image
            .save(path)
            .map_err(|e| AppError::Storage(format!("Failed to save '{}': {}", path.display(), e)))
    }

    fn stroke(&mut self, rect: RoiRect, radius: f32, style: StrokeStyle) {
        if rect.is_empty() || style.width <= 0.0 {
            return;
        }

        let half_stroke = style.width / 2.0;
        let center_x = (rect.left + rect.right) as f32 / 2.0;
        let center_y = (rect.top + rect.bottom) as f32 / 2.0;
        let half_w = rect.width() as f32 / 2.0;
        let half_h = rect.height() as f32 / 2.0;
        let radius = radius.clamp(0.0, half_w.min(half_h));

        let reach = half_stroke.ceil() as u32;
        let x_start = rect.left.saturating_sub(reach);
        let y_start = rect.top.saturating_sub(reach);
        let x_end = (rect.right + reach).min(self.image.width());
        let y_end = (rect.bottom + reach).min(self.image.height());

        let color = Rgba(style.color);
        for y in y_start..y_end {
            for x in x_start..x_end {
                let px = x as f32 + 0.5 - center_x;
                let py = y as f32 + 0.5 - center_y;
                let distance = rounded_rect_distance(px, py, half_w, half_h, radius);
                if distance.abs() <= half_stroke {
                    self.image.put_pixel(x, y, color);
                }
            }
        }
    }
}

/// Signed distance from a point to a centered rounded rectangle outline
fn rounded_rect_distance(px: f32, py: f32, half_w: f32, half_h: f32, radius: f32) -> f32 {
    let qx = px.abs() - half_w + radius;
    let qy = py.abs() - half_h + radius;
    let outside = qx.max(0.0).hypot(qy.max(0.0));
    let inside = qx.max(qy).min(0.0);
    outside + inside - radius
}

impl OverlaySurface for RgbaSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.image.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
        }
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn stroke_rect(&mut self, rect: RoiRect, style: StrokeStyle) {
        self.stroke(rect, 0.0, style);
    }

    fn stroke_round_rect(&mut self, rect: RoiRect, radius: f32, style: StrokeStyle) {
        self.stroke(rect, radius, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::frame_processor::geometry::GuideShape;
    use crate::app::scan_overlay::OverlayRenderer;

    const WHITE: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    #[test]
    fn test_plain_rectangle_edges() {
        let mut renderer = OverlayRenderer::new(RgbaSurface::new(100, 100), 0.3);
        renderer.redraw();
        let image = renderer.surface().image();

        // Guide spans 35..65 on both axes
        assert_eq!(*image.get_pixel(35, 50), WHITE);
        assert_eq!(*image.get_pixel(50, 35), WHITE);
        assert_eq!(*image.get_pixel(35, 35), WHITE);
        assert_eq!(*image.get_pixel(50, 50), CLEAR);
        assert_eq!(*image.get_pixel(5, 5), CLEAR);
    }

    #[test]
    fn test_rounded_corner_is_cut() {
        let mut renderer = OverlayRenderer::new(RgbaSurface::new(800, 600), 0.5);
        renderer.redraw();
        let image = renderer.surface().image();

        // Guide spans (250,150)-(550,450) with a 100px corner radius
        assert_eq!(*image.get_pixel(250, 150), CLEAR);
        assert_eq!(*image.get_pixel(250, 300), WHITE);
        assert_eq!(*image.get_pixel(400, 150), WHITE);
    }

    #[test]
    fn test_render_is_idempotent() {
        let rect = RoiRect {
            left: 10,
            top: 10,
            right: 40,
            bottom: 40,
        };
        let mut renderer = OverlayRenderer::new(RgbaSurface::new(50, 50), 0.6);
        renderer.render(rect, GuideShape::Rectangle, [0xFF; 4]);
        let first = renderer.surface().image().clone();
        renderer.render(rect, GuideShape::Rectangle, [0xFF; 4]);
        assert_eq!(renderer.surface().image(), &first);
    }

    #[test]
    fn test_resize_discards_old_guide() {
        let mut renderer = OverlayRenderer::new(RgbaSurface::new(100, 100), 0.5);
        renderer.redraw();
        renderer.on_geometry_changed(60, 60);

        assert_eq!(renderer.surface().size(), (60, 60));
        // 0.5 of 60 → guide spans 15..45
        assert_eq!(*renderer.surface().image().get_pixel(15, 30), WHITE);
    }
}
