//! Image viewer session: inspect, annotate, then save or discard.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::brush::Brush;
use crate::composite::{composite, encode_png};
use crate::stroke::StrokeLayer;
use crate::transform::{DragState, ViewTransform};
use crate::{CanvasError, CanvasResult};

/// A photo opened from a thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawableImage {
    /// Where the host loads the photo from
    pub url: String,
    /// Persisted attachment ID, when replacing an existing attachment
    pub image_id: Option<u64>,
    /// Stage that owns the attachment
    pub stage_id: Option<u64>,
}

/// Viewer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewerMode {
    /// Wheel zooms, drag pans when zoomed in
    Viewing,
    /// Zoom pinned at 1x, pointer draws
    Drawing,
    /// Unsaved ink exists and the user asked to close
    ConfirmClose,
}

/// Result of asking the viewer to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Nothing to keep; the session is gone
    Closed,
    /// Unsaved ink; the host must ask Save or Discard
    ConfirmRequired,
}

/// The user's answer to the close confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseDecision {
    Save,
    Discard,
}

/// The flattened annotation, ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationExport {
    /// Attachment being replaced
    pub image_id: Option<u64>,
    /// Stage the new attachment belongs to
    pub stage_id: Option<u64>,
    pub width: u32,
    pub height: u32,
    /// PNG-encoded composite
    pub png: Vec<u8>,
}

/// One open viewer.
#[derive(Debug, Default)]
pub struct ImageViewer {
    image: Option<DrawableImage>,
    mode: Option<ViewerMode>,
    transform: ViewTransform,
    drag: DragState,
    layer: StrokeLayer,
    brush: Brush,
    displayed: Option<(u32, u32)>,
}

impl ImageViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a photo. Zoom and pan start from defaults.
    pub fn open(&mut self, image: DrawableImage) {
        log::debug!("opening viewer for {}", image.url);
        self.image = Some(image);
        self.mode = Some(ViewerMode::Viewing);
        self.transform.reset();
        self.drag.end();
        self.layer.reset_for_new_image();
        self.displayed = None;
    }

    pub fn is_open(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Option<&DrawableImage> {
        self.image.as_ref()
    }

    /// Current mode, `None` when closed.
    pub fn mode(&self) -> Option<ViewerMode> {
        self.mode
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn layer(&self) -> &StrokeLayer {
        &self.layer
    }

    pub fn has_unsaved_strokes(&self) -> bool {
        self.layer.has_unsaved_strokes()
    }

    /// The host finished laying out the photo at `width` x `height`.
    ///
    /// If drawing is already active and the layer has not been sized for
    /// this image, it is sized now.
    pub fn image_loaded(&mut self, width: u32, height: u32) {
        self.displayed = Some((width, height));
        if self.mode == Some(ViewerMode::Drawing) {
            self.layer.ensure_sized(width, height);
        }
    }

    /// Switch to drawing mode with the photo displayed at `width` x `height`.
    ///
    /// Zoom and pan are reset and suspended. The drawing layer is sized only
    /// on the first entry for the open image; entering again keeps the ink.
    /// A photo not laid out yet (zero size) is sized by
    /// [`ImageViewer::image_loaded`] instead.
    pub fn enter_drawing(&mut self, width: u32, height: u32) -> CanvasResult<()> {
        if !self.is_open() {
            return Err(CanvasError::InvalidState("no image is open".into()));
        }
        if self.mode == Some(ViewerMode::ConfirmClose) {
            return Err(CanvasError::InvalidState(
                "a close confirmation is pending".into(),
            ));
        }
        self.transform.reset();
        self.drag.end();
        self.displayed = Some((width, height));
        self.layer.ensure_sized(width, height);
        self.mode = Some(ViewerMode::Drawing);
        Ok(())
    }

    /// Leave drawing mode. Same as closing the viewer.
    pub fn exit_drawing(&mut self) -> CloseOutcome {
        self.request_close()
    }

    /// Mouse wheel. Ignored outside viewing mode.
    pub fn wheel(&mut self, delta_y: f32) {
        if self.mode == Some(ViewerMode::Viewing) {
            self.transform.wheel(delta_y);
        }
    }

    /// Restore 1x zoom and no pan.
    pub fn reset_view(&mut self) {
        if self.mode == Some(ViewerMode::Viewing) {
            self.transform.reset();
        }
    }

    /// Pointer pressed. `pos` is in client coordinates while viewing and in
    /// drawing-surface coordinates while drawing.
    pub fn pointer_down(&mut self, pos: (f32, f32)) {
        match self.mode {
            Some(ViewerMode::Viewing) if self.transform.can_pan() => self.drag.start(pos),
            Some(ViewerMode::Drawing) => self.layer.begin(pos),
            _ => {}
        }
    }

    /// Pointer moved.
    pub fn pointer_move(&mut self, pos: (f32, f32)) {
        match self.mode {
            Some(ViewerMode::Viewing) => {
                if let Some((dx, dy)) = self.drag.update(pos) {
                    self.transform.pan_by(dx, dy);
                }
            }
            Some(ViewerMode::Drawing) => {
                self.layer.extend(pos, &self.brush);
            }
            _ => {}
        }
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) {
        self.drag.end();
        self.layer.end();
    }

    pub fn set_brush_color(&mut self, color: [u8; 3]) {
        self.brush.set_color(color);
    }

    pub fn set_brush_width(&mut self, width: u32) {
        self.brush.set_width(width);
    }

    /// Wipe all ink and forget that there was any.
    pub fn clear_canvas(&mut self) {
        self.layer.clear();
    }

    /// Ask to close. Without unsaved ink the session ends immediately.
    pub fn request_close(&mut self) -> CloseOutcome {
        if !self.is_open() {
            return CloseOutcome::Closed;
        }
        if self.layer.has_unsaved_strokes() {
            self.layer.end();
            self.mode = Some(ViewerMode::ConfirmClose);
            CloseOutcome::ConfirmRequired
        } else {
            self.close();
            CloseOutcome::Closed
        }
    }

    /// Answer the close confirmation.
    ///
    /// `Discard` closes the session. `Save` flattens `base` with the ink and
    /// returns the export; the viewer stays open until
    /// [`ImageViewer::finish_save`] so a failed upload can be retried.
    pub fn resolve_close(
        &mut self,
        decision: CloseDecision,
        base: &RgbaImage,
    ) -> CanvasResult<Option<AnnotationExport>> {
        match decision {
            CloseDecision::Discard => {
                log::debug!("discarding annotation");
                self.close();
                Ok(None)
            }
            CloseDecision::Save => self.export(base).map(Some),
        }
    }

    /// Flatten the photo and the ink into a PNG.
    pub fn export(&self, base: &RgbaImage) -> CanvasResult<AnnotationExport> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| CanvasError::InvalidState("no image is open".into()))?;
        if !self.layer.is_sized() {
            return Err(CanvasError::NothingToSave(
                "drawing mode was never entered".into(),
            ));
        }

        let flattened = composite(base, self.layer.surface().image())?;
        Ok(AnnotationExport {
            image_id: image.image_id,
            stage_id: image.stage_id,
            width: flattened.width(),
            height: flattened.height(),
            png: encode_png(&flattened)?,
        })
    }

    /// The composite was persisted; end the session.
    pub fn finish_save(&mut self) {
        self.layer.mark_saved();
        self.close();
    }

    fn close(&mut self) {
        self.image = None;
        self.mode = None;
        self.transform.reset();
        self.drag.end();
        self.layer.reset_for_new_image();
        self.displayed = None;
    }
}
