//! Visit, stage, attachment and prescription models.

use serde::{Deserialize, Serialize};

use super::order::ProductionOrder;
use crate::pipeline::{
    is_stage_action_disabled, latest_order, status_display_text, LatestOrder, StageAction,
};

/// A patient visit with its nested stages, as fetched from
/// `GET /api/visits/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    pub id: u64,
    /// Patient server ID
    pub patient: u64,
    pub visit_date: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub notes: String,
    /// Relative URL of an attached document
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

/// A dated checkpoint within a visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stage {
    pub id: u64,
    #[serde(default)]
    pub stage_date: Option<String>,
    #[serde(default)]
    pub complaint: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub images: Vec<StageImage>,
    #[serde(default)]
    pub medicines: Vec<PrescribedMedicine>,
}

/// A photo attached to a stage (eye images).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageImage {
    pub id: u64,
    /// URL of the stored image
    pub image: String,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

/// A medicine prescribed at a stage, with its production orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrescribedMedicine {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub production_orders: Vec<ProductionOrder>,
}

impl PrescribedMedicine {
    /// The newest production order(s).
    pub fn latest_order(&self) -> LatestOrder<'_> {
        latest_order(&self.production_orders)
    }

    /// Whether a stage action button is disabled for this medicine.
    pub fn is_action_disabled(&self, action: StageAction) -> bool {
        is_stage_action_disabled(self.latest_order().effective_status(), action)
    }

    /// Status phrase of the newest order, empty without orders.
    pub fn status_text(&self) -> &'static str {
        status_display_text(self.latest_order().effective_status())
    }
}

impl Visit {
    pub fn stage(&self, stage_id: u64) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    pub fn medicine(&self, medicine_id: u64) -> Option<&PrescribedMedicine> {
        self.stages
            .iter()
            .flat_map(|s| s.medicines.iter())
            .find(|m| m.id == medicine_id)
    }

    pub fn order(&self, order_id: u64) -> Option<&ProductionOrder> {
        self.stages
            .iter()
            .flat_map(|s| s.medicines.iter())
            .flat_map(|m| m.production_orders.iter())
            .find(|o| o.id == order_id)
    }

    pub fn image(&self, image_id: u64) -> Option<&StageImage> {
        self.stages
            .iter()
            .flat_map(|s| s.images.iter())
            .find(|i| i.id == image_id)
    }
}

/// Body of `POST /api/visits/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewVisit {
    pub patient: u64,
    /// ISO 8601 timestamp
    pub visit_date: String,
    pub diagnosis: String,
    pub notes: String,
}

/// A file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Fields of `PATCH /api/visits/{id}/` (sent as multipart).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitUpdate {
    pub diagnosis: String,
    pub notes: String,
    pub document: Option<Upload>,
}
