use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// A status column held a value outside its enumeration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}

// Status columns are stored as text; each enum round-trips through `as_str` / `FromStr`.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownStatus;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownStatus {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(
    /// Lifecycle of an order. `Delivered`, `Cancelled` and `Paid` are terminal.
    OrderStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Ready => "ready",
        Delivered => "delivered",
        Cancelled => "cancelled",
        Paid => "paid",
    }
);

text_enum!(
    ItemStatus {
        Pending => "pending",
        Preparing => "preparing",
        Ready => "ready",
        Served => "served",
        Cancelled => "cancelled",
    }
);

text_enum!(
    TableStatus {
        Free => "free",
        Occupied => "occupied",
        Waiting => "waiting",
        Paying => "paying",
    }
);

text_enum!(
    SessionStatus {
        Active => "active",
        Closed => "closed",
    }
);

text_enum!(
    ShiftStatus {
        Open => "open",
        Closed => "closed",
    }
);

text_enum!(
    TransactionKind {
        Income => "income",
        Expense => "expense",
    }
);

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Paid
        )
    }

    /// Statuses shown on the kitchen board.
    pub fn is_kitchen_active(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::InProgress)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Station {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub active: bool,
    pub station_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Prices and costs are in minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub cost: Option<i64>,
    pub stock: i32,
    pub is_available: bool,
    pub prep_time_minutes: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Zone {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub zone_type: Option<String>,
    pub floor: Option<i32>,
    pub capacity: Option<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiningTable {
    pub id: Uuid,
    pub zone_id: Option<Uuid>,
    pub number: String,
    pub status: TableStatus,
    pub capacity: i32,
    pub x_position: i32,
    pub y_position: i32,
    pub shape: Option<String>,
    pub qr_code: Option<String>,
    pub current_session_id: Option<Uuid>,
    pub current_session_start_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TableSession {
    pub id: Uuid,
    pub table_id: Uuid,
    pub waiter_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub ideal_duration: i32,
    pub client_count: i32,
    pub total_amount: i64,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub session_id: Option<Uuid>,
    pub table_id: Uuid,
    pub waiter_id: Option<Uuid>,
    pub status: OrderStatus,
    pub priority: i32,
    /// Minutes; `None` means the kitchen default applies.
    pub estimated_total_time: Option<i32>,
    pub total_amount: i64,
    pub kitchen_started_at: Option<DateTime<Utc>>,
    pub kitchen_finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub notes: Option<String>,
    pub status: ItemStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CashShift {
    pub id: Uuid,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub base_amount: i64,
    pub final_cash_expected: Option<i64>,
    pub final_cash_real: Option<i64>,
    pub difference: Option<i64>,
    pub status: ShiftStatus,
    pub opened_by: Uuid,
    pub closed_by: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CashTransaction {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_round_trips_through_storage_form() {
        assert_eq!(OrderStatus::InProgress.as_str(), "in_progress");
        assert_eq!("in_progress".parse::<OrderStatus>(), Ok(OrderStatus::InProgress));
        assert_eq!(
            serde_json::to_value(ItemStatus::Preparing).unwrap(),
            serde_json::json!("preparing")
        );
    }

    #[test]
    fn unknown_status_is_reported_with_its_kind() {
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.kind, "OrderStatus");
        assert_eq!(err.to_string(), "unknown OrderStatus value 'shipped'");
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
        assert!(OrderStatus::Pending.is_kitchen_active());
        assert!(!OrderStatus::Ready.is_kitchen_active());
    }
}
