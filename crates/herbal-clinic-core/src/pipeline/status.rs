//! Production order statuses and their fixed forward order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::PipelineError;

/// Legacy terminal value some backend records still carry. It is not part
/// of the pipeline; dashboards treat it as finished.
pub const LEGACY_DELIVERED: &str = "delivered";

/// Fulfillment state of a production order.
///
/// Variants are declared in pipeline order, so the derived `Ord` is the
/// pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionOrderStatus {
    PackageRequested,
    PackagePreparing,
    PackageReady,
    ProductionRequested,
    ProductionPreparing,
    ProductionSent,
    ProductionCompleted,
    CargoRequested,
    CargoPreparing,
    CargoReady,
    CargoShipped,
    Completed,
}

/// Pipeline stage a status belongs to, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StageGroup {
    Package,
    Production,
    Cargo,
    Done,
}

impl ProductionOrderStatus {
    /// Every status, in pipeline order.
    pub const ALL: [ProductionOrderStatus; 12] = [
        Self::PackageRequested,
        Self::PackagePreparing,
        Self::PackageReady,
        Self::ProductionRequested,
        Self::ProductionPreparing,
        Self::ProductionSent,
        Self::ProductionCompleted,
        Self::CargoRequested,
        Self::CargoPreparing,
        Self::CargoReady,
        Self::CargoShipped,
        Self::Completed,
    ];

    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PackageRequested => "package_requested",
            Self::PackagePreparing => "package_preparing",
            Self::PackageReady => "package_ready",
            Self::ProductionRequested => "production_requested",
            Self::ProductionPreparing => "production_preparing",
            Self::ProductionSent => "production_sent",
            Self::ProductionCompleted => "production_completed",
            Self::CargoRequested => "cargo_requested",
            Self::CargoPreparing => "cargo_preparing",
            Self::CargoReady => "cargo_ready",
            Self::CargoShipped => "cargo_shipped",
            Self::Completed => "completed",
        }
    }

    /// Parse a wire value. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }

    /// Zero-based rank in the pipeline.
    pub fn position(self) -> usize {
        self as usize
    }

    /// The single status an advance action moves to, `None` when terminal.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::PackageRequested => Some(Self::PackagePreparing),
            Self::PackagePreparing => Some(Self::PackageReady),
            Self::PackageReady => Some(Self::ProductionRequested),
            Self::ProductionRequested => Some(Self::ProductionPreparing),
            Self::ProductionPreparing => Some(Self::ProductionSent),
            Self::ProductionSent => Some(Self::ProductionCompleted),
            Self::ProductionCompleted => Some(Self::CargoRequested),
            Self::CargoRequested => Some(Self::CargoPreparing),
            Self::CargoPreparing => Some(Self::CargoReady),
            Self::CargoReady => Some(Self::CargoShipped),
            Self::CargoShipped => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    pub fn group(self) -> StageGroup {
        match self {
            Self::PackageRequested | Self::PackagePreparing | Self::PackageReady => {
                StageGroup::Package
            }
            Self::ProductionRequested
            | Self::ProductionPreparing
            | Self::ProductionSent
            | Self::ProductionCompleted => StageGroup::Production,
            Self::CargoRequested | Self::CargoPreparing | Self::CargoReady | Self::CargoShipped => {
                StageGroup::Cargo
            }
            Self::Completed => StageGroup::Done,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for ProductionOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductionOrderStatus {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| PipelineError::UnknownStatus(s.to_string()))
    }
}

/// Next status for an advance action.
pub fn next_status(current: ProductionOrderStatus) -> Option<ProductionOrderStatus> {
    current.next()
}

/// Next status for a raw wire value; unrecognised values have no action.
pub fn next_status_raw(current: &str) -> Option<ProductionOrderStatus> {
    ProductionOrderStatus::parse(current).and_then(ProductionOrderStatus::next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for status in ProductionOrderStatus::ALL {
            assert_eq!(ProductionOrderStatus::parse(status.as_str()), Some(status));
            assert_eq!(status.to_string().parse::<ProductionOrderStatus>().unwrap(), status);
        }
        assert_eq!(ProductionOrderStatus::parse("delivered"), None);
        assert!("garbage".parse::<ProductionOrderStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&ProductionOrderStatus::CargoShipped).unwrap();
        assert_eq!(json, "\"cargo_shipped\"");
        let back: ProductionOrderStatus = serde_json::from_str("\"package_ready\"").unwrap();
        assert_eq!(back, ProductionOrderStatus::PackageReady);
    }

    #[test]
    fn test_next_walks_the_whole_pipeline() {
        let mut current = ProductionOrderStatus::PackageRequested;
        let mut visited = vec![current];
        while let Some(next) = current.next() {
            visited.push(next);
            current = next;
        }
        assert_eq!(visited, ProductionOrderStatus::ALL.to_vec());
        assert_eq!(current, ProductionOrderStatus::Completed);
    }

    #[test]
    fn test_next_status_raw() {
        assert_eq!(
            next_status_raw("cargo_shipped"),
            Some(ProductionOrderStatus::Completed)
        );
        assert_eq!(next_status_raw("completed"), None);
        assert_eq!(next_status_raw("delivered"), None);
        assert_eq!(next_status_raw(""), None);
    }

    #[test]
    fn test_groups() {
        use ProductionOrderStatus::*;
        assert_eq!(PackageReady.group(), StageGroup::Package);
        assert_eq!(ProductionCompleted.group(), StageGroup::Production);
        assert_eq!(CargoRequested.group(), StageGroup::Cargo);
        assert_eq!(Completed.group(), StageGroup::Done);
    }
}
