use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{DiningTable, TableSession, TableStatus, Zone};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    pub zone_id: Option<Uuid>,
    pub number: String,
    pub capacity: Option<i32>,
    pub x_position: Option<i32>,
    pub y_position: Option<i32>,
    pub shape: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTableRequest {
    pub zone_id: Option<Uuid>,
    pub number: Option<String>,
    pub capacity: Option<i32>,
    pub x_position: Option<i32>,
    pub y_position: Option<i32>,
    pub shape: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OccupyTableRequest {
    pub waiter_id: Option<Uuid>,
    pub client_count: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeTableStatusRequest {
    pub status: TableStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableWithSession {
    pub table: DiningTable,
    pub session: Option<TableSession>,
}

/// A table as drawn on the floor board.
#[derive(Debug, Serialize, ToSchema)]
pub struct TableBoardEntry {
    #[serde(flatten)]
    pub table: DiningTable,
    pub elapsed_ms: Option<i64>,
    pub over_ideal_time: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateZoneRequest {
    pub name: String,
    pub description: Option<String>,
    pub zone_type: Option<String>,
    pub floor: Option<i32>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateZoneRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub zone_type: Option<String>,
    pub floor: Option<i32>,
    pub capacity: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ZoneWithTables {
    #[serde(flatten)]
    pub zone: Zone,
    pub tables: Vec<DiningTable>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ZoneStats {
    pub total_zones: usize,
    pub active_zones: usize,
    pub total_tables: usize,
    pub available_tables: usize,
    pub occupied_tables: usize,
}
