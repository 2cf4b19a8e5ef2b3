//! Delivery kanban: fulfillment statuses, move rules, and the order-board
//! classification of sales.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::sales::SaleStatus;

/// Delivered cards remain on the board for this many days after delivery.
pub const DELIVERED_VISIBLE_DAYS: i64 = 7;

/// Fulfillment status of a delivery. Every variant except
/// [`DeliveryStatus::Cancelled`] is a board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    InProduction,
    Waiting,
    Preparing,
    ReadyForDelivery,
    OutForDelivery,
    Delivered,
    Cancelled,
}

/// Serializable column header of the delivery board.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub status: DeliveryStatus,
    pub name: &'static str,
    pub color: &'static str,
    pub order: u8,
}

impl DeliveryStatus {
    /// Board columns in display order.
    pub const BOARD: [DeliveryStatus; 6] = [
        DeliveryStatus::InProduction,
        DeliveryStatus::Waiting,
        DeliveryStatus::Preparing,
        DeliveryStatus::ReadyForDelivery,
        DeliveryStatus::OutForDelivery,
        DeliveryStatus::Delivered,
    ];

    pub const ALL: [DeliveryStatus; 7] = [
        DeliveryStatus::InProduction,
        DeliveryStatus::Waiting,
        DeliveryStatus::Preparing,
        DeliveryStatus::ReadyForDelivery,
        DeliveryStatus::OutForDelivery,
        DeliveryStatus::Delivered,
        DeliveryStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::InProduction => "in_production",
            DeliveryStatus::Waiting => "waiting",
            DeliveryStatus::Preparing => "preparing",
            DeliveryStatus::ReadyForDelivery => "ready_for_delivery",
            DeliveryStatus::OutForDelivery => "out_for_delivery",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid delivery status '{value}'. Must be one of: {}",
                    Self::ALL.map(|s| s.as_str()).join(", ")
                ))
            })
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DeliveryStatus::InProduction => "In Production",
            DeliveryStatus::Waiting => "Waiting",
            DeliveryStatus::Preparing => "Preparing",
            DeliveryStatus::ReadyForDelivery => "Ready for Delivery",
            DeliveryStatus::OutForDelivery => "Out for Delivery",
            DeliveryStatus::Delivered => "Delivered",
            DeliveryStatus::Cancelled => "Cancelled",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            DeliveryStatus::InProduction => "#dc3545",
            DeliveryStatus::Waiting => "#fd7e14",
            DeliveryStatus::Preparing => "#ffc107",
            DeliveryStatus::ReadyForDelivery => "#0dcaf0",
            DeliveryStatus::OutForDelivery => "#6f42c1",
            DeliveryStatus::Delivered => "#198754",
            DeliveryStatus::Cancelled => "#6c757d",
        }
    }

    /// 1-based column position; `cancelled` sorts after every column.
    pub fn order(self) -> u8 {
        match self {
            DeliveryStatus::InProduction => 1,
            DeliveryStatus::Waiting => 2,
            DeliveryStatus::Preparing => 3,
            DeliveryStatus::ReadyForDelivery => 4,
            DeliveryStatus::OutForDelivery => 5,
            DeliveryStatus::Delivered => 6,
            DeliveryStatus::Cancelled => 7,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == DeliveryStatus::Cancelled
    }

    pub fn column_info(self) -> ColumnInfo {
        ColumnInfo {
            status: self,
            name: self.display_name(),
            color: self.color(),
            order: self.order(),
        }
    }
}

/// Check a delivery status move.
///
/// Cancelled deliveries are terminal. Every other status can move to any
/// status, including back to an earlier column.
pub fn validate_delivery_move(
    current: DeliveryStatus,
    target: DeliveryStatus,
) -> Result<(), CoreError> {
    if current.is_terminal() && target != current {
        return Err(CoreError::Conflict(format!(
            "Delivery is {} and can no longer be moved",
            current.as_str()
        )));
    }
    Ok(())
}

pub const NOTE_GENERAL: &str = "general";
pub const NOTE_PRODUCTION: &str = "production";
pub const NOTE_DELIVERY: &str = "delivery";

/// All valid delivery note kinds.
pub const NOTE_KINDS: &[&str] = &[NOTE_GENERAL, NOTE_PRODUCTION, NOTE_DELIVERY];

pub fn validate_note_kind(kind: &str) -> Result<(), CoreError> {
    if NOTE_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid note kind '{kind}'. Must be one of: {}",
            NOTE_KINDS.join(", ")
        )))
    }
}

/// Column of the order board a sale falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardColumn {
    InProduction,
    Ready,
    DueToday,
    DueTomorrow,
    Delivered,
    Overdue,
}

/// Per-column sale counts for the order board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardCounters {
    pub in_production: i64,
    pub ready: i64,
    pub due_today: i64,
    pub due_tomorrow: i64,
    pub delivered: i64,
    pub overdue: i64,
}

impl BoardCounters {
    pub fn record(&mut self, column: BoardColumn) {
        let slot = match column {
            BoardColumn::InProduction => &mut self.in_production,
            BoardColumn::Ready => &mut self.ready,
            BoardColumn::DueToday => &mut self.due_today,
            BoardColumn::DueTomorrow => &mut self.due_tomorrow,
            BoardColumn::Delivered => &mut self.delivered,
            BoardColumn::Overdue => &mut self.overdue,
        };
        *slot += 1;
    }
}

/// Place a (non-cancelled) sale on the order board.
///
/// A sale stays "in production" until every line item is ready. Once ready,
/// a pending or confirmed sale is bucketed by its delivery date relative to
/// `today`.
pub fn classify_sale_for_board(
    status: SaleStatus,
    total_items: i64,
    ready_items: i64,
    delivery_date: Option<NaiveDate>,
    today: NaiveDate,
) -> BoardColumn {
    if status == SaleStatus::Delivered {
        return BoardColumn::Delivered;
    }

    let all_ready = total_items > 0 && ready_items >= total_items;
    if !all_ready {
        return BoardColumn::InProduction;
    }

    if !matches!(status, SaleStatus::Pending | SaleStatus::Confirmed) {
        return BoardColumn::Ready;
    }

    let tomorrow = today.checked_add_days(Days::new(1));
    match delivery_date {
        Some(date) if date < today => BoardColumn::Overdue,
        Some(date) if date == today => BoardColumn::DueToday,
        Some(date) if Some(date) == tomorrow => BoardColumn::DueTomorrow,
        _ => BoardColumn::Ready,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    #[test]
    fn board_has_six_ordered_columns() {
        let orders: Vec<u8> = DeliveryStatus::BOARD.iter().map(|s| s.order()).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6]);
        assert!(!DeliveryStatus::BOARD.contains(&DeliveryStatus::Cancelled));
    }

    #[test]
    fn parse_accepts_all_statuses() {
        for status in DeliveryStatus::ALL {
            assert_eq!(DeliveryStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(DeliveryStatus::parse("lost").is_err());
    }

    #[test]
    fn cancelled_is_terminal() {
        let err = validate_delivery_move(DeliveryStatus::Cancelled, DeliveryStatus::Waiting)
            .unwrap_err();
        assert_matches!(err, CoreError::Conflict(_));
        assert!(validate_delivery_move(DeliveryStatus::Cancelled, DeliveryStatus::Cancelled).is_ok());
    }

    #[test]
    fn moves_between_columns_are_free() {
        assert!(validate_delivery_move(DeliveryStatus::Delivered, DeliveryStatus::OutForDelivery).is_ok());
        assert!(validate_delivery_move(DeliveryStatus::Waiting, DeliveryStatus::Delivered).is_ok());
        assert!(validate_delivery_move(DeliveryStatus::Preparing, DeliveryStatus::Cancelled).is_ok());
    }

    #[test]
    fn note_kinds() {
        assert!(validate_note_kind("production").is_ok());
        assert!(validate_note_kind("billing").is_err());
    }

    #[test]
    fn delivered_sale_goes_to_delivered() {
        let col = classify_sale_for_board(SaleStatus::Delivered, 2, 0, None, day(10));
        assert_eq!(col, BoardColumn::Delivered);
    }

    #[test]
    fn unfinished_items_stay_in_production() {
        assert_eq!(
            classify_sale_for_board(SaleStatus::Confirmed, 3, 2, Some(day(10)), day(10)),
            BoardColumn::InProduction
        );
        assert_eq!(
            classify_sale_for_board(SaleStatus::Pending, 0, 0, None, day(10)),
            BoardColumn::InProduction
        );
    }

    #[test]
    fn ready_sales_bucket_by_delivery_date() {
        let today = day(10);
        assert_eq!(
            classify_sale_for_board(SaleStatus::Pending, 2, 2, Some(day(9)), today),
            BoardColumn::Overdue
        );
        assert_eq!(
            classify_sale_for_board(SaleStatus::Confirmed, 2, 2, Some(day(10)), today),
            BoardColumn::DueToday
        );
        assert_eq!(
            classify_sale_for_board(SaleStatus::Confirmed, 2, 2, Some(day(11)), today),
            BoardColumn::DueTomorrow
        );
        assert_eq!(
            classify_sale_for_board(SaleStatus::Confirmed, 2, 2, Some(day(20)), today),
            BoardColumn::Ready
        );
        assert_eq!(
            classify_sale_for_board(SaleStatus::Confirmed, 2, 2, None, today),
            BoardColumn::Ready
        );
    }

    #[test]
    fn counters_record_columns() {
        let mut counters = BoardCounters::default();
        counters.record(BoardColumn::Overdue);
        counters.record(BoardColumn::Overdue);
        counters.record(BoardColumn::Ready);
        assert_eq!(counters.overdue, 2);
        assert_eq!(counters.ready, 1);
        assert_eq!(counters.delivered, 0);
    }
}
