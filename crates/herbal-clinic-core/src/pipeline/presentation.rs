//! How statuses are shown: advance buttons, chips and status phrases.

use serde::{Deserialize, Serialize};

use super::status::{ProductionOrderStatus, StageGroup, LEGACY_DELIVERED};

/// Icon shown on an advance button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonIcon {
    PlayArrow,
    CheckCircle,
    LocalShipping,
    LocalShippingOutlined,
    Schedule,
}

/// Color category for buttons and chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionColor {
    Primary,
    Success,
    Warning,
    Info,
}

impl ButtonIcon {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlayArrow => "PlayArrow",
            Self::CheckCircle => "CheckCircle",
            Self::LocalShipping => "LocalShipping",
            Self::LocalShippingOutlined => "LocalShippingOutlined",
            Self::Schedule => "Schedule",
        }
    }
}

impl ActionColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Label, icon and color of the "advance" action for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusButtonDescriptor {
    pub label: &'static str,
    pub icon: ButtonIcon,
    pub color: ActionColor,
}

impl StatusButtonDescriptor {
    const fn new(label: &'static str, icon: ButtonIcon, color: ActionColor) -> Self {
        Self { label, icon, color }
    }
}

/// Used for any status without its own entry.
pub const FALLBACK_BUTTON: StatusButtonDescriptor =
    StatusButtonDescriptor::new("İlerle", ButtonIcon::Schedule, ActionColor::Primary);

/// Advance button for a status.
pub fn status_button_descriptor(status: ProductionOrderStatus) -> StatusButtonDescriptor {
    use ActionColor::*;
    use ButtonIcon::*;
    use ProductionOrderStatus as S;

    match status {
        S::PackageRequested => StatusButtonDescriptor::new("Hazırlamaya Başla", PlayArrow, Primary),
        S::PackagePreparing => StatusButtonDescriptor::new("Hazırlandı", CheckCircle, Success),
        S::PackageReady => {
            StatusButtonDescriptor::new("Üretime Gönder", LocalShippingOutlined, Warning)
        }
        S::ProductionRequested => {
            StatusButtonDescriptor::new("Hazırlamaya Başla", PlayArrow, Primary)
        }
        S::ProductionPreparing => StatusButtonDescriptor::new("Gönderildi", CheckCircle, Success),
        S::ProductionSent => StatusButtonDescriptor::new("Tamamlandı", CheckCircle, Success),
        S::ProductionCompleted => StatusButtonDescriptor::new("Kargo Hazırla", LocalShipping, Info),
        S::CargoRequested => StatusButtonDescriptor::new("Hazırlamaya Başla", PlayArrow, Primary),
        S::CargoPreparing => StatusButtonDescriptor::new("Hazırlandı", CheckCircle, Success),
        S::CargoReady => StatusButtonDescriptor::new("Kargoya Ver", LocalShipping, Warning),
        S::CargoShipped => StatusButtonDescriptor::new("Tamamla", CheckCircle, Success),
        S::Completed => FALLBACK_BUTTON,
    }
}

/// Advance button for a raw wire value.
pub fn status_button_descriptor_raw(raw: &str) -> StatusButtonDescriptor {
    ProductionOrderStatus::parse(raw)
        .map(status_button_descriptor)
        .unwrap_or(FALLBACK_BUTTON)
}

/// Shown for a status value this client does not know.
pub const UNKNOWN_STATUS_TEXT: &str = "❔ Bilinmeyen Durum";

/// Human-readable phrase for the latest order's status; empty without an
/// order.
pub fn status_display_text(latest: Option<ProductionOrderStatus>) -> &'static str {
    use ProductionOrderStatus as S;

    let Some(status) = latest else {
        return "";
    };
    match status {
        S::PackageRequested => "📦 Paket Hazırlama Talebi",
        S::PackagePreparing => "📦 Paket Hazırlanıyor",
        S::PackageReady => "✅ Paket Hazır",
        S::ProductionRequested => "🏭 Üretim Talebi",
        S::ProductionPreparing => "🏭 Üretim Hazırlanıyor",
        S::ProductionSent => "🚀 Üretime Gönderildi",
        S::ProductionCompleted => "✅ Üretim Tamamlandı",
        S::CargoRequested => "🚚 Kargo Hazırlama Talebi",
        S::CargoPreparing => "🚚 Kargo Hazırlanıyor",
        S::CargoReady => "✅ Kargo Hazır",
        S::CargoShipped => "🚛 Kargoya Verildi",
        S::Completed => "🎉 Tamamlandı",
    }
}

/// Phrase for a raw wire value, `None` meaning no order.
pub fn status_display_text_raw(latest: Option<&str>) -> &'static str {
    match latest {
        None => "",
        Some(raw) if raw.trim() == LEGACY_DELIVERED => "📬 Teslim Edildi",
        Some(raw) => match ProductionOrderStatus::parse(raw) {
            Some(status) => status_display_text(Some(status)),
            None => UNKNOWN_STATUS_TEXT,
        },
    }
}

/// Chip color on dashboards: one color per pipeline stage.
pub fn status_chip_color(raw: &str) -> ActionColor {
    match ProductionOrderStatus::parse(raw).map(ProductionOrderStatus::group) {
        Some(StageGroup::Package) => ActionColor::Primary,
        Some(StageGroup::Production) => ActionColor::Warning,
        Some(StageGroup::Cargo) => ActionColor::Info,
        Some(StageGroup::Done) | None => ActionColor::Success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_for_package_ready() {
        let d = status_button_descriptor(ProductionOrderStatus::PackageReady);
        assert_eq!(d.label, "Üretime Gönder");
        assert_eq!(d.icon, ButtonIcon::LocalShippingOutlined);
        assert_eq!(d.color, ActionColor::Warning);
    }

    #[test]
    fn test_button_fallback() {
        assert_eq!(
            status_button_descriptor(ProductionOrderStatus::Completed),
            FALLBACK_BUTTON
        );
        assert_eq!(status_button_descriptor_raw("nonsense"), FALLBACK_BUTTON);
        assert_eq!(status_button_descriptor_raw(""), FALLBACK_BUTTON);
    }

    #[test]
    fn test_display_text_is_total() {
        for status in ProductionOrderStatus::ALL {
            assert!(!status_display_text(Some(status)).is_empty());
        }
        assert_eq!(status_display_text(None), "");
        assert_eq!(status_display_text_raw(None), "");
        assert_eq!(status_display_text_raw(Some("???")), UNKNOWN_STATUS_TEXT);
        assert_eq!(status_display_text_raw(Some("delivered")), "📬 Teslim Edildi");
        assert_eq!(
            status_display_text_raw(Some("completed")),
            "🎉 Tamamlandı"
        );
    }

    #[test]
    fn test_chip_colors() {
        assert_eq!(status_chip_color("package_preparing"), ActionColor::Primary);
        assert_eq!(status_chip_color("production_sent"), ActionColor::Warning);
        assert_eq!(status_chip_color("cargo_ready"), ActionColor::Info);
        assert_eq!(status_chip_color("completed"), ActionColor::Success);
        assert_eq!(status_chip_color("delivered"), ActionColor::Success);
    }
}
