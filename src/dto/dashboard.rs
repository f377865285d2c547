use serde::Serialize;
use utoipa::ToSchema;

use crate::{dto::tables::ZoneStats, kitchen::board::TierCounts};

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub floor: ZoneStats,
    pub tables_waiting: usize,
    pub tables_paying: usize,
    pub kitchen_orders: usize,
    pub kitchen_tiers: TierCounts,
    pub sales_today: i64,
    pub paid_orders_today: u64,
    pub shift_open: bool,
}
