//! Raster surfaces.

use image::{Rgba, RgbaImage};

/// Fully transparent pixel.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// A 2D RGBA drawing surface.
///
/// Resizing a surface discards its contents, the same way resizing an HTML
/// canvas does. Callers that hold annotations must resize at most once per
/// image.
pub trait Surface {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Resize to the given dimensions, clearing every pixel.
    fn resize(&mut self, width: u32, height: u32);

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Read a pixel. Out-of-bounds reads return transparent.
    fn pixel(&self, x: u32, y: u32) -> Rgba<u8>;

    /// Write a pixel. Out-of-bounds writes are ignored.
    fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>);
}

/// In-memory surface backed by an [`RgbaImage`].
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
}

impl RasterSurface {
    /// Create a transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
        }
    }

    /// Borrow the backing image.
    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Consume the surface, returning the backing image.
    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Check whether any pixel has been painted.
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p.0[3] == 0)
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::from_pixel(width, height, TRANSPARENT);
    }

    fn clear(&mut self) {
        for p in self.pixels.pixels_mut() {
            *p = TRANSPARENT;
        }
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        self.pixels.get_pixel_checked(x, y).copied().unwrap_or(TRANSPARENT)
    }

    fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        if let Some(p) = self.pixels.get_pixel_mut_checked(x, y) {
            *p = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_blank() {
        let surface = RasterSurface::new(4, 3);
        assert_eq!(surface.width(), 4);
        assert_eq!(surface.height(), 3);
        assert!(surface.is_blank());
    }

    #[test]
    fn test_resize_clears_contents() {
        let mut surface = RasterSurface::new(4, 4);
        surface.put_pixel(1, 1, Rgba([255, 0, 0, 255]));
        assert!(!surface.is_blank());

        surface.resize(4, 4);
        assert!(surface.is_blank());
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut surface = RasterSurface::new(2, 2);
        surface.put_pixel(5, 5, Rgba([255, 0, 0, 255]));
        assert!(surface.is_blank());
        assert_eq!(surface.pixel(9, 9), TRANSPARENT);
    }
}
