//! Freehand stroke capture on a transparent drawing layer.

use crate::brush::Brush;
use crate::surface::{RasterSurface, Surface};

/// A point in drawing-surface pixel coordinates.
pub type Point = (f32, f32);

/// The ink layer drawn above a photo.
///
/// The layer is sized to the *displayed* image dimensions once, when drawing
/// starts for an image. Later calls to [`StrokeLayer::ensure_sized`] are
/// no-ops until [`StrokeLayer::reset_for_new_image`] is called, so strokes
/// survive re-entering drawing mode and brush changes.
#[derive(Debug, Clone)]
pub struct StrokeLayer<S: Surface = RasterSurface> {
    surface: S,
    sized: bool,
    last_point: Option<Point>,
    has_unsaved_strokes: bool,
}

impl<S: Surface> StrokeLayer<S> {
    /// Wrap a surface. The layer counts as unsized until the first
    /// [`StrokeLayer::ensure_sized`] call.
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            sized: false,
            last_point: None,
            has_unsaved_strokes: false,
        }
    }

    /// Size the surface for the current image, once.
    ///
    /// Returns `true` when the surface was actually resized (and therefore
    /// cleared). Zero dimensions mean the photo has not been laid out yet;
    /// the layer stays unsized.
    pub fn ensure_sized(&mut self, width: u32, height: u32) -> bool {
        if self.sized || width == 0 || height == 0 {
            return false;
        }
        self.surface.resize(width, height);
        self.sized = true;
        log::debug!("drawing layer sized to {}x{}", width, height);
        true
    }

    /// Whether the surface has been sized for the current image.
    pub fn is_sized(&self) -> bool {
        self.sized
    }

    /// Forget the sizing so the next image gets a fresh surface.
    pub fn reset_for_new_image(&mut self) {
        self.sized = false;
        self.last_point = None;
        self.has_unsaved_strokes = false;
        self.surface.resize(0, 0);
    }

    /// Pointer down: start a new path at `point`.
    pub fn begin(&mut self, point: Point) {
        if !self.sized {
            return;
        }
        self.last_point = Some(point);
    }

    /// Pointer move while pressed: line to `point` and stroke it.
    ///
    /// The brush is applied per segment so color or width changes between
    /// segments take effect immediately. Returns `true` if the segment
    /// painted at least one pixel.
    pub fn extend(&mut self, point: Point, brush: &Brush) -> bool {
        let Some(from) = self.last_point else {
            return false;
        };
        let painted = draw_segment(&mut self.surface, from, point, brush);
        self.last_point = Some(point);
        self.has_unsaved_strokes |= painted;
        painted
    }

    /// Pointer up: end the current path.
    pub fn end(&mut self) {
        self.last_point = None;
    }

    /// Whether a path is in progress.
    pub fn is_stroking(&self) -> bool {
        self.last_point.is_some()
    }

    /// Wipe all ink. Keeps the current size.
    pub fn clear(&mut self) {
        self.surface.clear();
        self.last_point = None;
        self.has_unsaved_strokes = false;
    }

    pub fn has_unsaved_strokes(&self) -> bool {
        self.has_unsaved_strokes
    }

    pub fn mark_saved(&mut self) {
        self.has_unsaved_strokes = false;
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl Default for StrokeLayer<RasterSurface> {
    fn default() -> Self {
        Self::new(RasterSurface::default())
    }
}

/// Paint a straight segment with round ends.
///
/// A pixel is painted when its center lies within `width / 2` of the
/// segment. Returns whether any pixel was painted.
pub fn draw_segment<S: Surface>(surface: &mut S, from: Point, to: Point, brush: &Brush) -> bool {
    let (w, h) = (surface.width(), surface.height());
    if w == 0 || h == 0 {
        return false;
    }

    let radius = (brush.width() as f32 / 2.0).max(0.5);
    let color = brush.rgba();

    let min_x = (from.0.min(to.0) - radius).floor().max(0.0) as u32;
    let min_y = (from.1.min(to.1) - radius).floor().max(0.0) as u32;
    let max_x = (from.0.max(to.0) + radius).ceil().min((w - 1) as f32);
    let max_y = (from.1.max(to.1) + radius).ceil().min((h - 1) as f32);
    if max_x < 0.0 || max_y < 0.0 {
        return false;
    }
    let (max_x, max_y) = (max_x as u32, max_y as u32);

    let mut painted = false;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let center = (x as f32 + 0.5, y as f32 + 0.5);
            if distance_to_segment(center, from, to) <= radius {
                surface.put_pixel(x, y, color);
                painted = true;
            }
        }
    }
    painted
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::PALETTE;
    use image::Rgba;

    fn sized_layer(w: u32, h: u32) -> StrokeLayer {
        let mut layer = StrokeLayer::default();
        layer.ensure_sized(w, h);
        layer
    }

    #[test]
    fn test_ensure_sized_only_once() {
        let mut layer = StrokeLayer::default();
        assert!(layer.ensure_sized(10, 10));
        assert!(!layer.ensure_sized(20, 20));
        assert_eq!(layer.surface().width(), 10);
    }

    #[test]
    fn test_zero_size_does_not_latch() {
        let mut layer = StrokeLayer::default();
        assert!(!layer.ensure_sized(0, 0));
        assert!(!layer.is_sized());
        assert!(layer.ensure_sized(12, 8));
        assert_eq!(layer.surface().width(), 12);
    }

    #[test]
    fn test_segment_off_surface_is_not_unsaved_ink() {
        let mut layer = sized_layer(10, 10);
        layer.begin((40.0, 40.0));
        assert!(!layer.extend((60.0, 60.0), &Brush::default()));
        assert!(!layer.has_unsaved_strokes());
    }

    #[test]
    fn test_stroke_sets_unsaved_flag() {
        let mut layer = sized_layer(20, 20);
        let brush = Brush::default();

        layer.begin((2.0, 2.0));
        assert!(!layer.has_unsaved_strokes());

        assert!(layer.extend((15.0, 2.0), &brush));
        assert!(layer.has_unsaved_strokes());
        assert_eq!(layer.surface().pixel(8, 2), Rgba([255, 0, 0, 255]));

        layer.end();
        assert!(!layer.is_stroking());
    }

    #[test]
    fn test_move_without_press_draws_nothing() {
        let mut layer = sized_layer(20, 20);
        assert!(!layer.extend((5.0, 5.0), &Brush::default()));
        assert!(layer.surface().is_blank());
        assert!(!layer.has_unsaved_strokes());
    }

    #[test]
    fn test_unsized_layer_ignores_input() {
        let mut layer = StrokeLayer::default();
        layer.begin((1.0, 1.0));
        assert!(!layer.extend((2.0, 2.0), &Brush::default()));
    }

    #[test]
    fn test_brush_change_mid_stroke_applies_to_next_segment() {
        let mut layer = sized_layer(30, 10);
        let mut brush = Brush::new(PALETTE[0], 1);

        layer.begin((1.0, 5.0));
        layer.extend((10.0, 5.0), &brush);
        brush.set_color(PALETTE[1]);
        layer.extend((25.0, 5.0), &brush);

        assert_eq!(layer.surface().pixel(5, 5), Rgba([255, 0, 0, 255]));
        assert_eq!(layer.surface().pixel(20, 5), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_clear_resets_flag_and_keeps_size() {
        let mut layer = sized_layer(10, 10);
        layer.begin((1.0, 1.0));
        layer.extend((8.0, 8.0), &Brush::default());

        layer.clear();
        assert!(!layer.has_unsaved_strokes());
        assert!(layer.surface().is_blank());
        assert_eq!(layer.surface().width(), 10);
        assert!(layer.is_sized());
    }

    #[test]
    fn test_segment_respects_width() {
        let mut surface = RasterSurface::new(20, 20);
        draw_segment(&mut surface, (2.0, 10.0), (18.0, 10.0), &Brush::new(PALETTE[0], 6));

        // 3px either side of y=10
        assert_eq!(surface.pixel(10, 12), Rgba([255, 0, 0, 255]));
        assert_eq!(surface.pixel(10, 7), Rgba([255, 0, 0, 255]));
        assert!(surface.pixel(10, 14).0[3] == 0);
        assert!(surface.pixel(10, 5).0[3] == 0);
    }
}
