use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::tables::{CreateZoneRequest, UpdateZoneRequest, ZoneStats, ZoneWithTables},
    entity::{
        dining_tables::{Column as TableCol, Entity as DiningTables},
        zones::{ActiveModel as ZoneActive, Column as ZoneCol, Entity as Zones, Model as ZoneModel},
    },
    error::{AppError, AppResult},
    models::{DiningTable, TableStatus, Zone},
    response::ApiResponse,
    services::table_service::table_from_entity,
    state::AppState,
};

pub async fn list_zones(state: &AppState) -> AppResult<ApiResponse<Vec<ZoneWithTables>>> {
    let zones = Zones::find()
        .order_by_asc(ZoneCol::Name)
        .all(&state.orm)
        .await?;

    let mut by_zone: HashMap<Uuid, Vec<DiningTable>> = HashMap::new();
    for model in DiningTables::find()
        .filter(TableCol::ZoneId.is_not_null())
        .order_by_asc(TableCol::Number)
        .all(&state.orm)
        .await?
    {
        let table = table_from_entity(model)?;
        if let Some(zone_id) = table.zone_id {
            by_zone.entry(zone_id).or_default().push(table);
        }
    }

    let zones = zones
        .into_iter()
        .map(|model| {
            let tables = by_zone.remove(&model.id).unwrap_or_default();
            ZoneWithTables {
                zone: zone_from_entity(model),
                tables,
            }
        })
        .collect();

    Ok(ApiResponse::list("Ok", zones))
}

pub async fn create_zone(state: &AppState, payload: CreateZoneRequest) -> AppResult<ApiResponse<Zone>> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Zone name is required".into()));
    }

    let zone = ZoneActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(payload.description),
        zone_type: Set(payload.zone_type),
        floor: Set(payload.floor),
        capacity: Set(payload.capacity),
        active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    let zone = zone_from_entity(zone);
    state.feed.inserted("zones", &zone);
    Ok(ApiResponse::success("Zone created", zone, None))
}

pub async fn update_zone(
    state: &AppState,
    id: Uuid,
    payload: UpdateZoneRequest,
) -> AppResult<ApiResponse<Zone>> {
    let existing = Zones::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let previous = zone_from_entity(existing.clone());
    let mut active: ZoneActive = existing.into();

    if let Some(name) = payload.name.map(|n| n.trim().to_string()) {
        if name.is_empty() {
            return Err(AppError::BadRequest("Zone name is required".into()));
        }
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(zone_type) = payload.zone_type {
        active.zone_type = Set(Some(zone_type));
    }
    if let Some(floor) = payload.floor {
        active.floor = Set(Some(floor));
    }
    if let Some(capacity) = payload.capacity {
        active.capacity = Set(Some(capacity));
    }
    if let Some(flag) = payload.active {
        active.active = Set(flag);
    }

    let zone = zone_from_entity(active.update(&state.orm).await?);
    state.feed.updated("zones", Some(&previous), &zone);
    Ok(ApiResponse::success("Zone updated", zone, None))
}

/// Tables of a deleted zone stay on the floor, unassigned.
pub async fn delete_zone(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Zone>> {
    let existing = Zones::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Zones::delete_by_id(id).exec(&state.orm).await?;

    let zone = zone_from_entity(existing);
    state.feed.deleted("zones", serde_json::json!({ "id": id }));
    tracing::info!(zone_id = %id, name = %zone.name, "zone deleted");
    Ok(ApiResponse::success("Zone deleted", zone, None))
}

pub async fn zone_stats(state: &AppState) -> AppResult<ApiResponse<ZoneStats>> {
    Ok(ApiResponse::success("Ok", load_stats(state).await?, None))
}

pub(crate) async fn load_stats(state: &AppState) -> AppResult<ZoneStats> {
    let zones = Zones::find().all(&state.orm).await?;
    let statuses = DiningTables::find()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|t| t.status.parse::<TableStatus>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tally(&zones, &statuses))
}

fn tally(zones: &[ZoneModel], tables: &[TableStatus]) -> ZoneStats {
    ZoneStats {
        total_zones: zones.len(),
        active_zones: zones.iter().filter(|z| z.active).count(),
        total_tables: tables.len(),
        available_tables: tables.iter().filter(|s| **s == TableStatus::Free).count(),
        occupied_tables: tables.iter().filter(|s| s.has_session()).count(),
    }
}

fn zone_from_entity(model: ZoneModel) -> Zone {
    Zone {
        id: model.id,
        name: model.name,
        description: model.description,
        zone_type: model.zone_type,
        floor: model.floor,
        capacity: model.capacity,
        active: model.active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(active: bool) -> ZoneModel {
        ZoneModel {
            id: Uuid::new_v4(),
            name: "Terraza".into(),
            description: None,
            zone_type: None,
            floor: Some(1),
            capacity: None,
            active,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn occupied_counts_every_table_with_a_party() {
        let stats = tally(
            &[zone(true), zone(false)],
            &[
                TableStatus::Free,
                TableStatus::Occupied,
                TableStatus::Paying,
                TableStatus::Waiting,
            ],
        );
        assert_eq!(
            stats,
            ZoneStats {
                total_zones: 2,
                active_zones: 1,
                total_tables: 4,
                available_tables: 1,
                occupied_tables: 3,
            }
        );
    }
}
