// SPDX-License-Identifier: MPL-2.0

//! Scan guide overlay
//!
//! Draws the guide around the region of interest onto a transparent surface
//! layered above the camera preview. The guide uses the same geometry as the
//! crop, so it frames exactly the area the decoder searches.
//!
//! The renderer owns its surface. Whoever owns the renderer is the rendering
//! context; all drawing goes through `&mut self`.

mod surface;

pub use surface::RgbaSurface;

use crate::app::frame_processor::geometry::{GuideShape, RoiRect, compute_rects};
use crate::constants::guide;
use tracing::trace;

/// Stroke parameters for the guide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    /// RGBA color
    pub color: [u8; 4],
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: guide::STROKE_WIDTH,
            color: guide::DEFAULT_COLOR,
        }
    }
}

/// Transparent drawing target above the preview
pub trait OverlaySurface: Send {
    /// Current surface size in pixels
    fn size(&self) -> (u32, u32);

    fn resize(&mut self, width: u32, height: u32);

    /// Reset every pixel to transparent
    fn clear(&mut self);

    fn stroke_rect(&mut self, rect: RoiRect, style: StrokeStyle);

    fn stroke_round_rect(&mut self, rect: RoiRect, radius: f32, style: StrokeStyle);
}

impl<S: OverlaySurface + ?Sized> OverlaySurface for Box<S> {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    fn resize(&mut self, width: u32, height: u32) {
        (**self).resize(width, height)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn stroke_rect(&mut self, rect: RoiRect, style: StrokeStyle) {
        (**self).stroke_rect(rect, style)
    }

    fn stroke_round_rect(&mut self, rect: RoiRect, radius: f32, style: StrokeStyle) {
        (**self).stroke_round_rect(rect, radius, style)
    }
}

/// Draws the scan guide
pub struct OverlayRenderer<S> {
    surface: S,
    roi_ratio: f64,
    color: [u8; 4],
    last_drawn: Option<RoiRect>,
}

impl<S: OverlaySurface> OverlayRenderer<S> {
    pub fn new(surface: S, roi_ratio: f64) -> Self {
        Self {
            surface,
            roi_ratio,
            color: guide::DEFAULT_COLOR,
            last_drawn: None,
        }
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    /// Clear the surface and stroke the guide
    ///
    /// Only the most recent guide is ever visible.
    pub fn render(&mut self, rect: RoiRect, shape: GuideShape, color: [u8; 4]) {
        let style = StrokeStyle {
            color,
            ..StrokeStyle::default()
        };

        self.surface.clear();
        match shape {
            GuideShape::Rectangle => self.surface.stroke_rect(rect, style),
            GuideShape::RoundedRectangle { radius } => {
                self.surface.stroke_round_rect(rect, radius, style)
            }
        }

        trace!(?rect, ?shape, "Guide drawn");
        self.last_drawn = Some(rect);
    }

    /// Draw the guide for the surface's current size
    pub fn redraw(&mut self) {
        let (width, height) = self.surface.size();
        let (_, overlay_rect) = compute_rects(width, height, self.roi_ratio);
        self.render(overlay_rect, GuideShape::for_ratio(self.roi_ratio), self.color);
    }

    /// Follow a viewport size change
    pub fn on_geometry_changed(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        self.redraw();
    }

    pub fn last_drawn(&self) -> Option<RoiRect> {
        self.last_drawn
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        size: (u32, u32),
        ops: Vec<String>,
    }

    impl OverlaySurface for Recorder {
        fn size(&self) -> (u32, u32) {
            self.size
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.size = (width, height);
        }

        fn clear(&mut self) {
            self.ops.clear();
            self.ops.push("clear".into());
        }

        fn stroke_rect(&mut self, rect: RoiRect, style: StrokeStyle) {
            self.ops.push(format!("rect {:?} {}", rect, style.width));
        }

        fn stroke_round_rect(&mut self, rect: RoiRect, radius: f32, _style: StrokeStyle) {
            self.ops.push(format!("round {:?} {}", rect, radius));
        }
    }

    #[test]
    fn test_shape_follows_ratio() {
        let mut small = OverlayRenderer::new(Recorder::default(), 0.3);
        small.on_geometry_changed(1000, 2000);
        assert!(small.surface().ops[1].starts_with("rect"));
        assert_eq!(
            small.last_drawn(),
            Some(RoiRect {
                left: 350,
                top: 850,
                right: 650,
                bottom: 1150
            })
        );

        let mut large = OverlayRenderer::new(Recorder::default(), 0.5);
        large.on_geometry_changed(800, 600);
        assert!(large.surface().ops[1].starts_with("round"));
        assert!(large.surface().ops[1].ends_with(" 100"));
    }

    #[test]
    fn test_render_replaces_previous_guide() {
        let mut renderer = OverlayRenderer::new(Recorder::default(), 0.5);
        renderer.on_geometry_changed(800, 600);
        renderer.on_geometry_changed(400, 400);

        let ops = &renderer.surface().ops;
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0], "clear");
        assert_eq!(renderer.last_drawn().map(|r| r.width()), Some(200));
    }
}
