//! Production-order status pipeline.
//!
//! ```text
//! package_requested → package_preparing → package_ready
//!   → production_requested → production_preparing → production_sent → production_completed
//!   → cargo_requested → cargo_preparing → cargo_ready → cargo_shipped
//!   → completed
//! ```
//!
//! Every lookup here is total: unknown statuses produce "no action" or a
//! fallback presentation, never an error.

mod presentation;
mod stage_actions;
mod status;

pub use presentation::*;
pub use stage_actions::*;
pub use status::*;

use thiserror::Error;

/// Pipeline errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Unknown production order status: {0}")]
    UnknownStatus(String),

    #[error("Unknown stage action: {0}")]
    UnknownAction(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_status() -> impl Strategy<Value = ProductionOrderStatus> {
        proptest::sample::select(ProductionOrderStatus::ALL.to_vec())
    }

    fn any_action() -> impl Strategy<Value = StageAction> {
        proptest::sample::select(StageAction::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_next_is_strictly_later(status in any_status()) {
            match status.next() {
                Some(next) => prop_assert!(next.position() > status.position()),
                None => prop_assert_eq!(status, ProductionOrderStatus::Completed),
            }
        }

        #[test]
        fn prop_disabling_is_monotonic(a in any_status(), b in any_status(), action in any_action()) {
            let (earlier, later) = if a <= b { (a, b) } else { (b, a) };
            if is_stage_action_disabled(Some(earlier), action) {
                prop_assert!(is_stage_action_disabled(Some(later), action));
            }
        }

        #[test]
        fn prop_raw_lookups_are_total(raw in ".{0,24}") {
            let _ = status_button_descriptor_raw(&raw);
            let _ = status_display_text_raw(Some(&raw));
            let _ = status_chip_color(&raw);
            prop_assert!(next_status_raw(&raw).map_or(true, |n| n.position() > 0));
        }
    }
}
