//! Backend workflows driven by user actions.
//!
//! ```text
//! advance button ──► AdvanceCoordinator ──► PATCH update_status ──► re-fetch
//! stage button   ──► AdvanceCoordinator ──► POST production-orders ──► re-fetch visit
//! save drawing   ──► AnnotationSaver    ──► POST stage-images ──► DELETE old ──► re-fetch visit
//! bell           ──► NotificationInbox  ──► GET notifications (every 15 s)
//! ```
//!
//! Each mutation is issued at most once per key at a time and is never
//! retried automatically.

mod advance;
mod annotation;
mod guard;
mod inbox;
mod notice;

pub use advance::*;
pub use annotation::*;
pub use guard::*;
pub use inbox::*;
pub use notice::*;

use herbal_clinic_canvas::CanvasError;
use thiserror::Error;

use crate::api::ApiError;

/// Workflow errors.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The backend rejected the access token; the user must sign in again
    #[error("Session expired")]
    SessionExpired,

    #[error("API error: {0}")]
    Api(ApiError),

    #[error("Canvas error: {0}")]
    Canvas(#[from] CanvasError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ApiError> for WorkflowError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Unauthorized => WorkflowError::SessionExpired,
            other => WorkflowError::Api(other),
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_means_session_expired() {
        assert!(matches!(
            WorkflowError::from(ApiError::Unauthorized),
            WorkflowError::SessionExpired
        ));
        assert!(matches!(
            WorkflowError::from(ApiError::Status {
                status: 500,
                body: String::new()
            }),
            WorkflowError::Api(_)
        ));
    }
}
