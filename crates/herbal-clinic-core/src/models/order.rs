//! Production order models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::ProductionOrderStatus;

/// A production order as returned by the backend.
///
/// `status` is kept as the raw wire string so that values this client does
/// not know still round-trip; use [`ProductionOrder::status`] for the typed
/// view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductionOrder {
    /// Server ID
    pub id: u64,
    /// Prescribed medicine this order fulfils
    #[serde(default)]
    pub medicine: Option<u64>,
    /// Medicine name (denormalised for dashboards)
    #[serde(default)]
    pub medicine_name: String,
    /// Raw status value
    pub status: String,
    /// Backend-rendered status label
    #[serde(default)]
    pub status_display: String,
    /// Patient name (denormalised for dashboards)
    #[serde(default)]
    pub patient_name: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last update timestamp
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ProductionOrder {
    /// Typed status, `None` when the value is not recognised.
    pub fn status(&self) -> Option<ProductionOrderStatus> {
        ProductionOrderStatus::parse(&self.status)
    }

    /// Creation time, `None` when it does not parse.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Creation date prefix (`YYYY-MM-DD`) as sent by the backend.
    pub fn created_date(&self) -> &str {
        self.created_at.get(..10).unwrap_or(&self.created_at)
    }
}

/// Body of `POST /api/production-orders/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProductionOrder {
    pub medicine: u64,
    pub status: ProductionOrderStatus,
}

/// Body of `PATCH /api/production-orders/{id}/update_status/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusUpdate {
    pub status: ProductionOrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_backend_order() {
        let json = r#"{
            "id": 12,
            "medicine": 4,
            "medicine_name": "Isırgan Kürü",
            "status": "production_sent",
            "status_display": "Üretime Gönderildi",
            "patient_name": "Ayşe Yılmaz",
            "created_at": "2024-04-10T08:30:00.123456+03:00"
        }"#;
        let order: ProductionOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.status(), Some(ProductionOrderStatus::ProductionSent));
        assert_eq!(order.created_date(), "2024-04-10");
        assert!(order.created_at_utc().is_some());
        assert!(order.updated_at.is_none());
    }

    #[test]
    fn test_unknown_status_survives() {
        let json = r#"{"id": 1, "status": "delivered", "created_at": "garbage"}"#;
        let order: ProductionOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, "delivered");
        assert!(order.status().is_none());
        assert!(order.created_at_utc().is_none());
    }

    #[test]
    fn test_status_update_body() {
        let body = StatusUpdate {
            status: ProductionOrderStatus::PackagePreparing,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"status":"package_preparing"}"#
        );
    }
}
