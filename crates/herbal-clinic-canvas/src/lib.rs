//! Herbal Clinic Canvas
//!
//! Photo annotation for stage attachments, independent of any UI toolkit.
//! The host wires pointer and wheel events into [`ImageViewer`]; everything
//! else (zoom limits, stroke rendering, the drawing-surface sizing rule and
//! the final flatten) happens here on plain RGBA rasters.
//!
//! # Flow
//!
//! ```text
//! open(thumbnail) ──► Viewing ──toggle──► Drawing ──close──┐
//!                       ▲   wheel/drag      strokes        │
//!                       │                                  ▼
//!                       └──────── Discard ◄──── ConfirmClose ──► Save
//!                                                               │
//!                                      composite(base, overlay) ▼
//!                                                           PNG bytes
//! ```
//!
//! # Modules
//!
//! - [`surface`]: the abstract raster surface and its in-memory implementation
//! - [`brush`]: brush color/width and the fixed swatch palette
//! - [`stroke`]: freehand stroke capture on a drawing layer
//! - [`transform`]: zoom/pan state and pointer mapping
//! - [`viewer`]: the per-session viewer state machine
//! - [`composite`]: flattening and PNG encoding

pub mod brush;
pub mod composite;
pub mod stroke;
pub mod surface;
pub mod transform;
pub mod viewer;

pub use brush::{Brush, PALETTE};
pub use composite::{composite, decode_image, encode_png};
pub use stroke::StrokeLayer;
pub use surface::{RasterSurface, Surface};
pub use transform::{DisplayRect, DragState, PointerMapper, ViewTransform};
pub use viewer::{
    AnnotationExport, CloseDecision, CloseOutcome, DrawableImage, ImageViewer, ViewerMode,
};

use thiserror::Error;

/// Canvas errors.
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Nothing to save: {0}")]
    NothingToSave(String),

    #[error("Invalid viewer state: {0}")]
    InvalidState(String),
}

pub type CanvasResult<T> = Result<T, CanvasError>;
