//! Brush settings for freehand annotation.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Narrowest allowed brush, in pixels.
pub const MIN_BRUSH_WIDTH: u32 = 1;
/// Widest allowed brush, in pixels.
pub const MAX_BRUSH_WIDTH: u32 = 20;
/// Width used when a viewer opens.
pub const DEFAULT_BRUSH_WIDTH: u32 = 3;

/// Fixed swatch palette offered while drawing (RGB).
pub const PALETTE: [[u8; 3]; 6] = [
    [255, 0, 0],     // red
    [0, 0, 255],     // blue
    [0, 128, 0],     // green
    [255, 255, 0],   // yellow
    [0, 0, 0],       // black
    [255, 255, 255], // white
];

/// Brush color and width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brush {
    color: [u8; 3],
    width: u32,
}

impl Brush {
    /// Create a brush; width is clamped into the slider range.
    pub fn new(color: [u8; 3], width: u32) -> Self {
        Self {
            color,
            width: clamp_width(width),
        }
    }

    pub fn color(&self) -> [u8; 3] {
        self.color
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Opaque RGBA used when painting.
    pub fn rgba(&self) -> Rgba<u8> {
        let [r, g, b] = self.color;
        Rgba([r, g, b, 255])
    }

    pub fn set_color(&mut self, color: [u8; 3]) {
        self.color = color;
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = clamp_width(width);
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(PALETTE[0], DEFAULT_BRUSH_WIDTH)
    }
}

fn clamp_width(width: u32) -> u32 {
    width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH)
}

/// Parse a `#rrggbb` swatch string.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_is_clamped() {
        assert_eq!(Brush::new(PALETTE[0], 0).width(), 1);
        assert_eq!(Brush::new(PALETTE[0], 50).width(), 20);

        let mut brush = Brush::default();
        brush.set_width(7);
        assert_eq!(brush.width(), 7);
        brush.set_width(21);
        assert_eq!(brush.width(), 20);
    }

    #[test]
    fn test_default_is_red() {
        assert_eq!(Brush::default().rgba(), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Some([255, 0, 0]));
        assert_eq!(parse_hex_color("00ff7f"), Some([0, 255, 127]));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }
}
