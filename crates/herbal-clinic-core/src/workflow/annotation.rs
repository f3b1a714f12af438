//! Persisting annotated stage images.

use std::sync::Arc;

use herbal_clinic_canvas::AnnotationExport;
use sha2::{Digest, Sha256};

use super::{InFlight, WorkflowError, WorkflowResult};
use crate::api::{ClinicClient, Transport};
use crate::models::{StageImage, Upload, Visit};
use crate::session::Session;

/// Hex digits of the content hash used in upload names.
const NAME_HASH_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SaveKey {
    Image(u64),
    Stage(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    AlreadyInFlight,
    /// The annotated copy replaced the original
    Saved {
        image: StageImage,
        visit: Option<Visit>,
    },
    /// The annotated copy was stored but the original could not be removed
    SavedWithLeftover {
        image: StageImage,
        leftover_image_id: u64,
        visit: Option<Visit>,
    },
}

impl SaveOutcome {
    pub fn visit(&self) -> Option<&Visit> {
        match self {
            SaveOutcome::Saved { visit, .. } | SaveOutcome::SavedWithLeftover { visit, .. } => {
                visit.as_ref()
            }
            SaveOutcome::AlreadyInFlight => None,
        }
    }
}

/// Upload name for an annotated image: `annotated-<stage>-<sha256 prefix>.png`.
pub fn annotated_file_name(stage_id: u64, png: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(png));
    format!("annotated-{}-{}.png", stage_id, &digest[..NAME_HASH_LEN])
}

/// Replaces stage images with their annotated composite.
///
/// The new image is uploaded first and the original deleted second, so a
/// failure never loses the photo: a failed upload leaves the original
/// untouched, a failed delete leaves both.
pub struct AnnotationSaver<T: Transport> {
    client: Arc<ClinicClient<T>>,
    saving: InFlight<SaveKey>,
}

impl<T: Transport> AnnotationSaver<T> {
    pub fn new(client: Arc<ClinicClient<T>>) -> Self {
        Self {
            client,
            saving: InFlight::new(),
        }
    }

    pub fn save(
        &self,
        session: &Session,
        export: &AnnotationExport,
        visit_id: u64,
    ) -> WorkflowResult<SaveOutcome> {
        let stage_id = export.stage_id.ok_or_else(|| {
            WorkflowError::InvalidInput("annotated image has no stage".into())
        })?;
        let key = export
            .image_id
            .map(SaveKey::Image)
            .unwrap_or(SaveKey::Stage(stage_id));

        let Some(_guard) = self.saving.try_acquire(key) else {
            log::info!("Save for {:?} already in flight", key);
            return Ok(SaveOutcome::AlreadyInFlight);
        };

        let upload = Upload {
            file_name: annotated_file_name(stage_id, &export.png),
            content_type: "image/png".into(),
            bytes: export.png.clone(),
        };
        log::info!(
            "Uploading annotated image {} ({}x{}) for stage {}",
            upload.file_name,
            export.width,
            export.height,
            stage_id
        );
        let image = self.client.upload_stage_image(session, stage_id, upload)?;

        let leftover = match export.image_id {
            Some(old_id) => match self.client.delete_stage_image(session, old_id) {
                Ok(()) => None,
                Err(e) => {
                    log::warn!("Annotated copy stored but image {} was not deleted: {}", old_id, e);
                    Some(old_id)
                }
            },
            None => None,
        };

        let visit = match self.client.get_visit(session, visit_id) {
            Ok(visit) => Some(visit),
            Err(e) => {
                log::warn!("Re-fetch of visit {} failed: {}", visit_id, e);
                None
            }
        };

        Ok(match leftover {
            None => SaveOutcome::Saved { image, visit },
            Some(leftover_image_id) => SaveOutcome::SavedWithLeftover {
                image,
                leftover_image_id,
                visit,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_is_content_addressed() {
        let a = annotated_file_name(3, b"first");
        let b = annotated_file_name(3, b"second");
        assert!(a.starts_with("annotated-3-"));
        assert!(a.ends_with(".png"));
        assert_eq!(a.len(), "annotated-3-".len() + NAME_HASH_LEN + ".png".len());
        assert_ne!(a, b);
        assert_eq!(a, annotated_file_name(3, b"first"));
    }
}
