//! Notification inbox models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::ProductionOrderStatus;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PackageRequest,
    ProductionRequest,
    CargoRequest,
    StatusUpdate,
    ProductionComplete,
    #[serde(other)]
    Other,
}

/// Shortcut a notification offers on its linked production order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectAction {
    /// Move the order to this status
    Advance(ProductionOrderStatus),
    /// Download the order PDF, then move the order to this status
    DownloadPdfThenAdvance(ProductionOrderStatus),
}

impl DirectAction {
    pub fn target(self) -> ProductionOrderStatus {
        match self {
            Self::Advance(s) | Self::DownloadPdfThenAdvance(s) => s,
        }
    }

    pub fn downloads_pdf(self) -> bool {
        matches!(self, Self::DownloadPdfThenAdvance(_))
    }
}

/// Page a notification leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTarget {
    Logistics,
    Patients,
}

impl NotificationKind {
    pub fn direct_action(self) -> Option<DirectAction> {
        use ProductionOrderStatus as S;
        match self {
            Self::PackageRequest => Some(DirectAction::Advance(S::PackagePreparing)),
            Self::ProductionRequest => Some(DirectAction::Advance(S::ProductionPreparing)),
            Self::CargoRequest => Some(DirectAction::DownloadPdfThenAdvance(S::CargoPreparing)),
            _ => None,
        }
    }

    pub fn navigation(self) -> Option<NotificationTarget> {
        match self {
            Self::PackageRequest | Self::ProductionRequest | Self::CargoRequest => {
                Some(NotificationTarget::Logistics)
            }
            Self::StatusUpdate | Self::ProductionComplete => Some(NotificationTarget::Patients),
            Self::Other => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PackageRequest => "Paket Hazırlama Talebi",
            Self::ProductionRequest => "Üretim Talebi",
            Self::CargoRequest => "Kargo Hazırlama Talebi",
            Self::StatusUpdate => "Durum Güncellendi",
            Self::ProductionComplete => "İşlem Tamamlandı",
            Self::Other => "Bildirim",
        }
    }
}

/// A notification from `/api/notifications/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub notification_type: NotificationKind,
    #[serde(default)]
    pub target_user_type: String,
    #[serde(default)]
    pub production_order_id: Option<u64>,
    #[serde(default)]
    pub medicine_name: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: String,
}

impl Notification {
    /// Direct action, only when the notification links an order.
    pub fn direct_action(&self) -> Option<(u64, DirectAction)> {
        let order_id = self.production_order_id?;
        self.notification_type.direct_action().map(|a| (order_id, a))
    }
}

/// Inbox contents with the server's unread counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationFeed {
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub unread_count: u32,
}

impl NotificationFeed {
    /// Mark one notification read locally. Returns false if it was unknown
    /// or already read.
    pub fn mark_read(&mut self, id: u64) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.is_read => {
                n.is_read = true;
                self.unread_count = self.unread_count.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.notifications {
            n.is_read = true;
        }
        self.unread_count = 0;
    }
}

/// Human-readable age of a timestamp ("5 dakika önce").
///
/// Unparseable or future timestamps read as "Az önce".
pub fn relative_time(created_at: &str, now: DateTime<Utc>) -> String {
    let minutes = DateTime::parse_from_rfc3339(created_at)
        .map(|t| (now - t.with_timezone(&Utc)).num_minutes())
        .unwrap_or(0);

    match minutes {
        m if m < 1 => "Az önce".to_string(),
        m if m < 60 => format!("{} dakika önce", m),
        m if m < 1440 => format!("{} saat önce", m / 60),
        m => format!("{} gün önce", m / 1440),
    }
}
