use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::tables::{CreateZoneRequest, UpdateZoneRequest, ZoneStats, ZoneWithTables},
    error::AppResult,
    models::Zone,
    response::ApiResponse,
    services::zone_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_zones).post(create_zone))
        .route("/stats", get(zone_stats))
        .route("/{id}", put(update_zone).delete(delete_zone))
}

#[utoipa::path(
    get,
    path = "/api/zones",
    responses(
        (status = 200, description = "Zones by name with their tables", body = ApiResponse<Vec<ZoneWithTables>>)
    ),
    tag = "Zones"
)]
pub async fn list_zones(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<ZoneWithTables>>>> {
    Ok(Json(zone_service::list_zones(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/zones/stats",
    responses(
        (status = 200, description = "Zone and table counts", body = ApiResponse<ZoneStats>)
    ),
    tag = "Zones"
)]
pub async fn zone_stats(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ZoneStats>>> {
    Ok(Json(zone_service::zone_stats(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/zones",
    request_body = CreateZoneRequest,
    responses(
        (status = 200, description = "Zone created", body = ApiResponse<Zone>),
        (status = 400, description = "Missing name"),
    ),
    tag = "Zones"
)]
pub async fn create_zone(
    State(state): State<AppState>,
    Json(payload): Json<CreateZoneRequest>,
) -> AppResult<Json<ApiResponse<Zone>>> {
    Ok(Json(zone_service::create_zone(&state, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/zones/{id}",
    params(("id" = Uuid, Path, description = "Zone ID")),
    request_body = UpdateZoneRequest,
    responses(
        (status = 200, description = "Zone updated", body = ApiResponse<Zone>),
        (status = 404, description = "Zone not found"),
    ),
    tag = "Zones"
)]
pub async fn update_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateZoneRequest>,
) -> AppResult<Json<ApiResponse<Zone>>> {
    Ok(Json(zone_service::update_zone(&state, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/zones/{id}",
    params(("id" = Uuid, Path, description = "Zone ID")),
    responses(
        (status = 200, description = "Zone deleted", body = ApiResponse<Zone>),
        (status = 404, description = "Zone not found"),
    ),
    tag = "Zones"
)]
pub async fn delete_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Zone>>> {
    Ok(Json(zone_service::delete_zone(&state, id).await?))
}
