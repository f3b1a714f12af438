//! Logistics dashboard data and order filtering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Patient, ProductionOrder};
use crate::pipeline::{ProductionOrderStatus, LEGACY_DELIVERED};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogisticStats {
    pub total_patients: u64,
    pub total_visits: u64,
    pub this_month_visits: u64,
    pub today_visits: u64,
    pub new_patients_last_month: u64,
    pub total_orders: u64,
    pub pending_orders: u64,
    pub completed_orders: u64,
    pub today_orders: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecentActivity {
    pub activity: String,
    #[serde(default)]
    pub time: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Response of `GET /api/logistic-stats/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogisticsDashboard {
    pub stats: LogisticStats,
    pub recent_activities: Vec<RecentActivity>,
    pub production_orders: Vec<ProductionOrder>,
    pub patients: Vec<Patient>,
}

/// Stat-card filter on the order table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderFilter {
    Total,
    Pending,
    Completed,
    Today,
}

/// Whether an order counts as finished on the dashboard. The legacy
/// `delivered` value is finished too.
pub fn is_finished(raw_status: &str) -> bool {
    raw_status == ProductionOrderStatus::Completed.as_str() || raw_status == LEGACY_DELIVERED
}

impl LogisticsDashboard {
    /// Orders matching the selected card and, independently, a creation
    /// date. `today` is the caller's current date.
    pub fn filter_orders(
        &self,
        filter: Option<OrderFilter>,
        date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Vec<&ProductionOrder> {
        let today = today.format("%Y-%m-%d").to_string();
        let date = date.map(|d| d.format("%Y-%m-%d").to_string());

        self.production_orders
            .iter()
            .filter(|order| match filter {
                None | Some(OrderFilter::Total) => true,
                Some(OrderFilter::Pending) => !is_finished(&order.status),
                Some(OrderFilter::Completed) => is_finished(&order.status),
                Some(OrderFilter::Today) => order.created_at.starts_with(&today),
            })
            .filter(|order| date.as_ref().map_or(true, |d| order.created_at.starts_with(d)))
            .collect()
    }
}

/// File name for a downloaded production order PDF.
pub fn pdf_file_name(order_id: u64) -> String {
    format!("uretim_emri_{}.pdf", order_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard() -> LogisticsDashboard {
        serde_json::from_str(
            r#"{
                "stats": {"total_orders": 4, "pending_orders": 2},
                "recent_activities": [{"activity": "Yeni hasta", "time": "10:00", "type": "patient"}],
                "production_orders": [
                    {"id": 1, "status": "package_requested", "created_at": "2024-05-03T08:00:00Z"},
                    {"id": 2, "status": "completed", "created_at": "2024-05-02T08:00:00Z"},
                    {"id": 3, "status": "delivered", "created_at": "2024-05-03T09:00:00Z"},
                    {"id": 4, "status": "cargo_ready", "created_at": "2024-05-01T08:00:00Z"}
                ],
                "patients": []
            }"#,
        )
        .unwrap()
    }

    fn ids(orders: Vec<&ProductionOrder>) -> Vec<u64> {
        orders.iter().map(|o| o.id).collect()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_decode_partial_stats() {
        let d = dashboard();
        assert_eq!(d.stats.total_orders, 4);
        assert_eq!(d.stats.completed_orders, 0);
        assert_eq!(d.recent_activities[0].kind, "patient");
    }

    #[test]
    fn test_card_filters() {
        let d = dashboard();
        let today = day("2024-05-03");
        assert_eq!(ids(d.filter_orders(None, None, today)), vec![1, 2, 3, 4]);
        assert_eq!(ids(d.filter_orders(Some(OrderFilter::Pending), None, today)), vec![1, 4]);
        assert_eq!(ids(d.filter_orders(Some(OrderFilter::Completed), None, today)), vec![2, 3]);
        assert_eq!(ids(d.filter_orders(Some(OrderFilter::Today), None, today)), vec![1, 3]);
    }

    #[test]
    fn test_date_filter_combines_with_card() {
        let d = dashboard();
        let orders = d.filter_orders(Some(OrderFilter::Completed), Some(day("2024-05-02")), day("2024-05-03"));
        assert_eq!(ids(orders), vec![2]);
    }

    #[test]
    fn test_pdf_file_name() {
        assert_eq!(pdf_file_name(42), "uretim_emri_42.pdf");
    }
}
