//! Transient, auto-dismissing user notices.

use std::time::Duration;

use super::{AdvanceOutcome, SaveOutcome, StageActionOutcome, WorkflowError};
use crate::config::DEFAULT_NOTICE_DURATION;
use crate::pipeline::status_display_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub duration: Duration,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            duration: DEFAULT_NOTICE_DURATION,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn from_error(error: &WorkflowError) -> Self {
        let message = match error {
            WorkflowError::SessionExpired => {
                "Oturumunuzun süresi doldu, lütfen tekrar giriş yapın.".to_string()
            }
            WorkflowError::Api(_) => "İşlem sırasında bir hata oluştu.".to_string(),
            WorkflowError::Canvas(e) => format!("Görsel kaydedilemedi: {}", e),
            WorkflowError::InvalidInput(msg) => msg.clone(),
        };
        Self::error(message)
    }

    /// Notice for an advance attempt; `None` when nothing happened.
    pub fn for_advance(outcome: &AdvanceOutcome) -> Option<Self> {
        match outcome {
            AdvanceOutcome::Advanced { to, .. } => Some(Self::success(format!(
                "Durum güncellendi: {}",
                status_display_text(Some(*to))
            ))),
            AdvanceOutcome::NoAction | AdvanceOutcome::AlreadyInFlight => None,
        }
    }

    pub fn for_stage_action(outcome: &StageActionOutcome) -> Option<Self> {
        match outcome {
            StageActionOutcome::Created { .. } => Some(Self::success("Talep oluşturuldu.")),
            StageActionOutcome::Disabled | StageActionOutcome::AlreadyInFlight => None,
        }
    }

    pub fn for_save(outcome: &SaveOutcome) -> Option<Self> {
        match outcome {
            SaveOutcome::Saved { .. } => Some(Self::success("Çizim kaydedildi.")),
            SaveOutcome::SavedWithLeftover { .. } => Some(Self::warning(
                "Çizim kaydedildi ancak eski görsel silinemedi.",
            )),
            SaveOutcome::AlreadyInFlight => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ProductionOrderStatus;

    #[test]
    fn test_advance_notice() {
        let outcome = AdvanceOutcome::Advanced {
            order_id: 1,
            from: ProductionOrderStatus::PackageRequested,
            to: ProductionOrderStatus::PackagePreparing,
            refreshed: None,
        };
        let notice = Notice::for_advance(&outcome).unwrap();
        assert_eq!(notice.severity, Severity::Success);
        assert!(notice.message.contains("Paket Hazırlanıyor"));
        assert_eq!(notice.duration, DEFAULT_NOTICE_DURATION);
        assert!(Notice::for_advance(&AdvanceOutcome::NoAction).is_none());
    }

    #[test]
    fn test_error_notice() {
        let notice = Notice::from_error(&WorkflowError::SessionExpired);
        assert_eq!(notice.severity, Severity::Error);
        assert!(notice.message.contains("giriş"));
    }
}
