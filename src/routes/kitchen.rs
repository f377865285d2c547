use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::kitchen::{ArchiveResult, StationQuery, UpdateItemStatusRequest},
    error::AppResult,
    kitchen::KitchenOrderView,
    models::{Order, OrderItem},
    response::ApiResponse,
    services::kitchen_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/board", get(board))
        .route("/archive", post(archive_all))
        .route("/orders/{id}/start", post(start_preparation))
        .route("/orders/{id}/complete", post(complete_order))
        .route("/orders/{id}/station-ready", post(mark_station_ready))
        .route("/items/{id}/status", patch(update_item_status))
        .route("/items/{id}/toggle", post(toggle_item))
}

#[utoipa::path(
    get,
    path = "/api/kitchen/board",
    params(
        ("station" = Option<String>, Query, description = "`all` (default) or a station id"),
    ),
    responses(
        (status = 200, description = "Active orders, most urgent first", body = ApiResponse<Vec<KitchenOrderView>>),
        (status = 400, description = "Malformed station"),
    ),
    tag = "Kitchen"
)]
pub async fn board(
    State(state): State<AppState>,
    Query(query): Query<StationQuery>,
) -> AppResult<Json<ApiResponse<Vec<KitchenOrderView>>>> {
    let resp = kitchen_service::board_view(&state, query.selection()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/kitchen/orders/{id}/start",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order in progress", body = ApiResponse<Order>),
        (status = 400, description = "Order is not pending"),
    ),
    tag = "Kitchen"
)]
pub async fn start_preparation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(Json(kitchen_service::start_preparation(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/kitchen/orders/{id}/complete",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order ready", body = ApiResponse<Order>),
        (status = 400, description = "Order already left the kitchen"),
    ),
    tag = "Kitchen"
)]
pub async fn complete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(Json(kitchen_service::complete_order(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/kitchen/orders/{id}/station-ready",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        ("station" = Option<String>, Query, description = "`all` (default) or a station id"),
    ),
    responses(
        (status = 200, description = "Items marked ready", body = ApiResponse<Vec<OrderItem>>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Kitchen"
)]
pub async fn mark_station_ready(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<StationQuery>,
) -> AppResult<Json<ApiResponse<Vec<OrderItem>>>> {
    let resp = kitchen_service::mark_station_ready(&state, id, query.selection()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/kitchen/items/{id}/status",
    params(("id" = Uuid, Path, description = "Order item ID")),
    request_body = UpdateItemStatusRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<OrderItem>),
        (status = 400, description = "Status not settable from the kitchen"),
        (status = 404, description = "Item not found"),
    ),
    tag = "Kitchen"
)]
pub async fn update_item_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let resp = kitchen_service::update_item_status(&state, id, payload.status).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/kitchen/items/{id}/toggle",
    params(
        ("id" = Uuid, Path, description = "Order item ID"),
        ("station" = Option<String>, Query, description = "`all` (default) or a station id"),
    ),
    responses(
        (status = 200, description = "Item flipped between ready and pending", body = ApiResponse<OrderItem>),
        (status = 400, description = "Item belongs to another station"),
    ),
    tag = "Kitchen"
)]
pub async fn toggle_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<StationQuery>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let resp = kitchen_service::toggle_item(&state, id, query.selection()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/kitchen/archive",
    responses(
        (status = 200, description = "Every open order cancelled", body = ApiResponse<ArchiveResult>)
    ),
    tag = "Kitchen"
)]
pub async fn archive_all(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ArchiveResult>>> {
    Ok(Json(kitchen_service::archive_all(&state).await?))
}
