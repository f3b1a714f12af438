//! Flattening the photo and its ink layer into one raster.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};

use crate::{CanvasError, CanvasResult};

/// Draw `base` onto a fresh raster sized to `overlay`, then draw `overlay`
/// on top at (0, 0).
///
/// The base is only resampled when its dimensions differ from the overlay,
/// so an unscaled photo keeps its exact pixel values wherever there is no
/// ink.
pub fn composite(base: &RgbaImage, overlay: &RgbaImage) -> CanvasResult<RgbaImage> {
    let (width, height) = overlay.dimensions();
    if width == 0 || height == 0 {
        return Err(CanvasError::NothingToSave(
            "drawing layer has no size".into(),
        ));
    }
    if base.width() == 0 || base.height() == 0 {
        return Err(CanvasError::NothingToSave("base image is empty".into()));
    }

    let mut out = if base.dimensions() == (width, height) {
        base.clone()
    } else {
        imageops::resize(base, width, height, FilterType::Triangle)
    };

    imageops::overlay(&mut out, overlay, 0, 0);

    Ok(out)
}

/// Encode as PNG.
pub fn encode_png(image: &RgbaImage) -> CanvasResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Decode PNG or JPEG bytes into RGBA.
pub fn decode_image(bytes: &[u8]) -> CanvasResult<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}
