use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::products::{CreateCategoryRequest, CreateStationRequest},
    error::AppResult,
    models::{Category, Station},
    response::ApiResponse,
    services::catalog_service,
    state::AppState,
};

pub fn stations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stations).post(create_station))
        .route("/{id}", put(rename_station).delete(delete_station))
}

pub fn categories_router() -> Router<AppState> {
    Router::new().route("/", get(list_categories).post(create_category))
}

#[utoipa::path(
    get,
    path = "/api/stations",
    responses(
        (status = 200, description = "Preparation stations by name", body = ApiResponse<Vec<Station>>)
    ),
    tag = "Catalog"
)]
pub async fn list_stations(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<Station>>>> {
    Ok(Json(catalog_service::list_stations(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/stations",
    request_body = CreateStationRequest,
    responses(
        (status = 200, description = "Station created", body = ApiResponse<Station>),
        (status = 409, description = "Name taken"),
    ),
    tag = "Catalog"
)]
pub async fn create_station(
    State(state): State<AppState>,
    Json(payload): Json<CreateStationRequest>,
) -> AppResult<Json<ApiResponse<Station>>> {
    Ok(Json(catalog_service::create_station(&state, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/stations/{id}",
    params(("id" = Uuid, Path, description = "Station ID")),
    request_body = CreateStationRequest,
    responses(
        (status = 200, description = "Station renamed", body = ApiResponse<Station>),
        (status = 404, description = "Station not found"),
    ),
    tag = "Catalog"
)]
pub async fn rename_station(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateStationRequest>,
) -> AppResult<Json<ApiResponse<Station>>> {
    Ok(Json(catalog_service::rename_station(&state, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/stations/{id}",
    params(("id" = Uuid, Path, description = "Station ID")),
    responses(
        (status = 200, description = "Station deleted", body = ApiResponse<Station>),
        (status = 404, description = "Station not found"),
    ),
    tag = "Catalog"
)]
pub async fn delete_station(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Station>>> {
    Ok(Json(catalog_service::delete_station(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Active categories by name", body = ApiResponse<Vec<Category>>)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    Ok(Json(catalog_service::list_categories(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = ApiResponse<Category>),
        (status = 400, description = "Unknown station"),
    ),
    tag = "Catalog"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    Ok(Json(catalog_service::create_category(&state, payload).await?))
}
