use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{kitchen::StationSelection, models::ItemStatus};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StationQuery {
    /// `all` or a station id.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub station: Option<StationSelection>,
}

impl StationQuery {
    pub fn selection(&self) -> StationSelection {
        self.station.unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemStatusRequest {
    pub status: ItemStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArchiveResult {
    pub archived: u64,
}
