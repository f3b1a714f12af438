//! Zoom/pan state for the viewer and pointer coordinate mapping.

use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;
pub const SCALE_STEP: f32 = 0.5;

/// Zoom factor and pan offset applied to the displayed photo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ViewTransform {
    /// Apply one wheel notch. Negative `delta_y` (scrolling up) zooms in.
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.scale = (self.scale + SCALE_STEP).min(MAX_SCALE);
        } else if delta_y > 0.0 {
            self.scale = (self.scale - SCALE_STEP).max(MIN_SCALE);
        }
    }

    /// Whether dragging should pan the photo.
    pub fn can_pan(&self) -> bool {
        self.scale > 1.0
    }

    /// Move the photo by a drag delta. Ignored unless zoomed in.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        if self.can_pan() {
            self.offset_x += dx;
            self.offset_y += dy;
        }
    }

    /// Back to 1x with no offset.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Where the photo is drawn on screen, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Maps client pointer positions onto drawing-surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMapper {
    rect: DisplayRect,
    surface_width: u32,
    surface_height: u32,
}

impl PointerMapper {
    pub fn new(rect: DisplayRect, surface_width: u32, surface_height: u32) -> Self {
        Self {
            rect,
            surface_width,
            surface_height,
        }
    }

    /// Convert a client position to surface coordinates.
    ///
    /// Returns `None` for a degenerate rectangle.
    pub fn map(&self, client_x: f32, client_y: f32) -> Option<(f32, f32)> {
        if self.rect.width <= 0.0 || self.rect.height <= 0.0 {
            return None;
        }
        let sx = self.surface_width as f32 / self.rect.width;
        let sy = self.surface_height as f32 / self.rect.height;
        Some((
            (client_x - self.rect.left) * sx,
            (client_y - self.rect.top) * sy,
        ))
    }
}

/// Tracks a drag gesture and yields per-move deltas.
#[derive(Debug, Clone, Default)]
pub struct DragState {
    last_pos: Option<(f32, f32)>,
}

impl DragState {
    pub fn start(&mut self, pos: (f32, f32)) {
        self.last_pos = Some(pos);
    }

    /// Update the drag position and return the delta since the last one.
    pub fn update(&mut self, pos: (f32, f32)) -> Option<(f32, f32)> {
        let last = self.last_pos?;
        self.last_pos = Some(pos);
        Some((pos.0 - last.0, pos.1 - last.1))
    }

    pub fn end(&mut self) {
        self.last_pos = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.last_pos.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_steps_and_clamps() {
        let mut t = ViewTransform::default();
        for _ in 0..10 {
            t.wheel(-1.0);
        }
        assert_eq!(t.scale, MAX_SCALE);

        for _ in 0..10 {
            t.wheel(1.0);
        }
        assert_eq!(t.scale, MIN_SCALE);

        t.wheel(-1.0);
        assert_eq!(t.scale, 1.0);
    }

    #[test]
    fn test_pan_only_when_zoomed_in() {
        let mut t = ViewTransform::default();
        t.pan_by(10.0, 5.0);
        assert_eq!((t.offset_x, t.offset_y), (0.0, 0.0));

        t.wheel(-1.0);
        t.pan_by(10.0, 5.0);
        assert_eq!((t.offset_x, t.offset_y), (10.0, 5.0));

        t.reset();
        assert_eq!(t, ViewTransform::default());
    }

    #[test]
    fn test_pointer_mapping() {
        let rect = DisplayRect {
            left: 100.0,
            top: 50.0,
            width: 200.0,
            height: 100.0,
        };
        let mapper = PointerMapper::new(rect, 200, 100);
        assert_eq!(mapper.map(150.0, 75.0), Some((50.0, 25.0)));

        // Surface at half the displayed size
        let mapper = PointerMapper::new(rect, 100, 50);
        assert_eq!(mapper.map(300.0, 150.0), Some((100.0, 50.0)));

        let empty = DisplayRect {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 10.0,
        };
        assert_eq!(PointerMapper::new(empty, 10, 10).map(1.0, 1.0), None);
    }

    #[test]
    fn test_drag_deltas() {
        let mut drag = DragState::default();
        assert_eq!(drag.update((1.0, 1.0)), None);

        drag.start((10.0, 10.0));
        assert_eq!(drag.update((15.0, 12.0)), Some((5.0, 2.0)));
        assert_eq!(drag.update((14.0, 12.0)), Some((-1.0, 0.0)));

        drag.end();
        assert!(!drag.is_dragging());
    }
}
