//! Stage actions (package / production / cargo) and which of them are
//! still available for a medicine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::status::{ProductionOrderStatus, StageGroup};
use super::PipelineError;
use crate::models::ProductionOrder;

/// A button that starts one pipeline stage for a prescribed medicine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageAction {
    PackagePrepare,
    SendProduction,
    PrepareCargo,
}

impl StageAction {
    pub const ALL: [StageAction; 3] = [
        Self::PackagePrepare,
        Self::SendProduction,
        Self::PrepareCargo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PackagePrepare => "package_prepare",
            Self::SendProduction => "send_production",
            Self::PrepareCargo => "prepare_cargo",
        }
    }

    /// The stage this action starts.
    pub fn group(self) -> StageGroup {
        match self {
            Self::PackagePrepare => StageGroup::Package,
            Self::SendProduction => StageGroup::Production,
            Self::PrepareCargo => StageGroup::Cargo,
        }
    }

    /// Status of the order created when the action is triggered.
    pub fn initial_status(self) -> ProductionOrderStatus {
        match self {
            Self::PackagePrepare => ProductionOrderStatus::PackageRequested,
            Self::SendProduction => ProductionOrderStatus::ProductionRequested,
            Self::PrepareCargo => ProductionOrderStatus::CargoRequested,
        }
    }
}

impl fmt::Display for StageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageAction {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| PipelineError::UnknownAction(s.to_string()))
    }
}

/// Whether `action` must be disabled because its stage, or a later one, has
/// already been reached by the medicine's latest order.
///
/// No order: nothing is disabled. A completed order disables everything.
pub fn is_stage_action_disabled(latest: Option<ProductionOrderStatus>, action: StageAction) -> bool {
    match latest {
        None => false,
        Some(status) => status.group() >= action.group(),
    }
}

/// Raw-string variant. An unrecognised status counts as no order.
pub fn is_stage_action_disabled_raw(latest: Option<&str>, action: StageAction) -> bool {
    is_stage_action_disabled(latest.and_then(ProductionOrderStatus::parse), action)
}

/// The most recently created order(s) of a medicine.
#[derive(Debug, Clone, PartialEq)]
pub enum LatestOrder<'a> {
    None,
    Unique(&'a ProductionOrder),
    /// Several orders share the newest creation timestamp
    Tied(Vec<&'a ProductionOrder>),
}

impl<'a> LatestOrder<'a> {
    /// Status that drives the stage buttons.
    ///
    /// For tied orders the furthest-advanced recognised status wins, so a
    /// stage that any of them already passed stays disabled.
    pub fn effective_status(&self) -> Option<ProductionOrderStatus> {
        match self {
            LatestOrder::None => None,
            LatestOrder::Unique(order) => order.status(),
            LatestOrder::Tied(orders) => orders.iter().filter_map(|o| o.status()).max(),
        }
    }

    /// The order an advance action targets; `None` when there is no order
    /// or the newest orders are tied.
    pub fn unique(&self) -> Option<&'a ProductionOrder> {
        match self {
            LatestOrder::Unique(order) => Some(*order),
            _ => None,
        }
    }

    pub fn is_tied(&self) -> bool {
        matches!(self, LatestOrder::Tied(_))
    }
}

/// Pick the order(s) with the maximum creation timestamp.
///
/// Timestamps that fail to parse sort before every valid one.
pub fn latest_order(orders: &[ProductionOrder]) -> LatestOrder<'_> {
    let newest = match orders.iter().map(ProductionOrder::created_at_utc).max() {
        Some(newest) => newest,
        None => return LatestOrder::None,
    };

    let mut tied: Vec<&ProductionOrder> = orders
        .iter()
        .filter(|o| o.created_at_utc() == newest)
        .collect();

    if tied.len() == 1 {
        LatestOrder::Unique(tied.remove(0))
    } else {
        log::warn!(
            "{} production orders share the newest timestamp; using the furthest status",
            tied.len()
        );
        LatestOrder::Tied(tied)
    }
}
