use common::enums::{DeliveryStatus, OrderStatus};
use db::stats::{DeliveryStatusCount, OrderStatusCount, OrderTotals};
use policy::temperature::TemperatureCounts;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct VendorStatsQuery {
    pub vendor_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryStatsQuery {
    pub delivery_person_id: Option<Uuid>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrdersByStatus {
    pub pending_review: i64,
    pub pending: i64,
    pub in_delivery: i64,
    pub delivered: i64,
    pub cancelled: i64,
}

impl From<Vec<OrderStatusCount>> for OrdersByStatus {
    fn from(rows: Vec<OrderStatusCount>) -> Self {
        let mut counts = OrdersByStatus::default();
        for row in rows {
            let slot = match row.status {
                OrderStatus::PendingReview => &mut counts.pending_review,
                OrderStatus::Pending => &mut counts.pending,
                OrderStatus::InDelivery => &mut counts.in_delivery,
                OrderStatus::Delivered => &mut counts.delivered,
                OrderStatus::Cancelled => &mut counts.cancelled,
            };
            *slot += row.count;
        }
        counts
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub customers: TemperatureCounts,
    pub orders: OrdersByStatus,
    pub visits_today: i64,
    pub sales_today: OrderTotals,
    pub sales_month: OrderTotals,
}

#[derive(Debug, Serialize)]
pub struct VendorStats {
    pub vendor_id: Uuid,
    pub visits_today: i64,
    pub orders_month: OrderTotals,
    pub customers: TemperatureCounts,
    pub customers_needing_attention: i64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeliveryStats {
    pub pending: i64,
    pub delivered_today: i64,
    pub failed_today: i64,
}

impl From<Vec<DeliveryStatusCount>> for DeliveryStats {
    fn from(rows: Vec<DeliveryStatusCount>) -> Self {
        let mut stats = DeliveryStats::default();
        for row in rows {
            match row.status {
                DeliveryStatus::Pending => stats.pending += row.count,
                DeliveryStatus::Delivered => stats.delivered_today += row.count,
                DeliveryStatus::Failed => stats.failed_today += row.count,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_rows_fill_their_slots() {
        let counts = OrdersByStatus::from(vec![
            OrderStatusCount {
                status: OrderStatus::PendingReview,
                count: 4,
            },
            OrderStatusCount {
                status: OrderStatus::Delivered,
                count: 10,
            },
        ]);
        assert_eq!(counts.pending_review, 4);
        assert_eq!(counts.delivered, 10);
        assert_eq!(counts.pending, 0);
    }

    #[test]
    fn delivery_rows_map_to_daily_counters() {
        let stats = DeliveryStats::from(vec![
            DeliveryStatusCount {
                status: DeliveryStatus::Pending,
                count: 3,
            },
            DeliveryStatusCount {
                status: DeliveryStatus::Failed,
                count: 1,
            },
        ]);
        assert_eq!(
            stats,
            DeliveryStats {
                pending: 3,
                delivered_today: 0,
                failed_today: 1
            }
        );
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["failed_today"], 1);
    }
}
