//! Kitchen display board: urgency tiers, station routing and queue order.
//!
//! Everything here is a pure function of already-loaded orders and a
//! wall-clock instant; loading and refreshing live in [`board`].

pub mod board;
pub mod priority;
pub mod sort;
pub mod station;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{ItemStatus, OrderStatus};

pub use board::KitchenBoard;
pub use priority::{DEFAULT_ESTIMATED_MINUTES, Priority, priority_for};
pub use sort::{compare_orders, sort_orders};
pub use station::{StationSelection, filter_orders, item_matches, item_station};

/// Category as joined onto a product; only the station link matters to the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryRef {
    #[serde(default)]
    pub station_id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A joined category arrives either as one object or as a collection,
/// depending on how the row was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryLink {
    Many(Vec<CategoryRef>),
    One(CategoryRef),
}

impl CategoryLink {
    pub fn primary(&self) -> Option<&CategoryRef> {
        match self {
            CategoryLink::Many(list) => list.first(),
            CategoryLink::One(category) => Some(category),
        }
    }

    pub fn station_id(&self) -> Option<Uuid> {
        self.primary().and_then(|c| c.station_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductRef {
    pub name: String,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub categories: Option<CategoryLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KitchenItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub notes: Option<String>,
    pub status: ItemStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub product: Option<ProductRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KitchenOrder {
    pub id: Uuid,
    pub table_id: Uuid,
    pub table_number: Option<String>,
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub kitchen_started_at: Option<DateTime<Utc>>,
    pub estimated_total_time: Option<i32>,
    pub items: Vec<KitchenItem>,
}

impl KitchenOrder {
    pub fn priority(&self, now: DateTime<Utc>) -> Priority {
        priority_for(
            self.created_at,
            self.kitchen_started_at,
            self.estimated_total_time,
            now,
        )
    }

    pub fn item_mut(&mut self, item_id: Uuid) -> Option<&mut KitchenItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }
}

/// One card on the board, with the time-dependent fields resolved.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KitchenOrderView {
    #[serde(flatten)]
    pub order: KitchenOrder,
    pub priority: Priority,
    pub elapsed_minutes: i64,
    pub progress: f64,
}

impl KitchenOrderView {
    pub fn new(order: KitchenOrder, now: DateTime<Utc>) -> Self {
        let priority = order.priority(now);
        let elapsed_minutes = order
            .created_at
            .map(|at| priority::elapsed_minutes(at, now))
            .unwrap_or(0);
        let progress = priority::progress_percent(order.items.iter().map(|i| &i.status));
        Self {
            order,
            priority,
            elapsed_minutes,
            progress,
        }
    }
}

/// Filter for `selection`, then sort for display.
pub fn build_view(
    selection: StationSelection,
    orders: &[KitchenOrder],
    now: DateTime<Utc>,
) -> Vec<KitchenOrderView> {
    let mut visible = filter_orders(selection, orders);
    sort_orders(&mut visible, now);
    visible
        .into_iter()
        .map(|order| KitchenOrderView::new(order, now))
        .collect()
}
