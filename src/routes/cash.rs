use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    cash::ShiftSummary,
    dto::cash::{AddTransactionRequest, CloseShiftRequest, ClosedShift, OpenShiftRequest},
    error::AppResult,
    models::{CashShift, CashTransaction},
    response::ApiResponse,
    services::cash_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shifts", post(open_shift))
        .route("/shifts/current", get(current_shift))
        .route(
            "/shifts/{id}/transactions",
            get(list_transactions).post(add_transaction),
        )
        .route("/shifts/{id}/summary", get(shift_summary))
        .route("/shifts/{id}/close", post(close_shift))
}

#[utoipa::path(
    get,
    path = "/api/cash/shifts/current",
    responses(
        (status = 200, description = "The open shift, if any", body = ApiResponse<Option<CashShift>>)
    ),
    tag = "Cash"
)]
pub async fn current_shift(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Option<CashShift>>>> {
    Ok(Json(cash_service::current_shift(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/cash/shifts",
    request_body = OpenShiftRequest,
    responses(
        (status = 200, description = "Shift opened", body = ApiResponse<CashShift>),
        (status = 409, description = "A shift is already open"),
    ),
    tag = "Cash"
)]
pub async fn open_shift(
    State(state): State<AppState>,
    Json(payload): Json<OpenShiftRequest>,
) -> AppResult<Json<ApiResponse<CashShift>>> {
    Ok(Json(cash_service::open_shift(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/cash/shifts/{id}/transactions",
    params(("id" = Uuid, Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Manual movements, newest first", body = ApiResponse<Vec<CashTransaction>>),
        (status = 404, description = "Shift not found"),
    ),
    tag = "Cash"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<CashTransaction>>>> {
    Ok(Json(cash_service::list_transactions(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/cash/shifts/{id}/transactions",
    params(("id" = Uuid, Path, description = "Shift ID")),
    request_body = AddTransactionRequest,
    responses(
        (status = 200, description = "Movement recorded", body = ApiResponse<CashTransaction>),
        (status = 400, description = "Non-positive amount"),
        (status = 409, description = "Shift is closed"),
    ),
    tag = "Cash"
)]
pub async fn add_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddTransactionRequest>,
) -> AppResult<Json<ApiResponse<CashTransaction>>> {
    Ok(Json(cash_service::add_transaction(&state, id, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/cash/shifts/{id}/summary",
    params(("id" = Uuid, Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Expected cash in the drawer", body = ApiResponse<ShiftSummary>),
        (status = 404, description = "Shift not found"),
    ),
    tag = "Cash"
)]
pub async fn shift_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ShiftSummary>>> {
    Ok(Json(cash_service::shift_summary(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/cash/shifts/{id}/close",
    params(("id" = Uuid, Path, description = "Shift ID")),
    request_body = CloseShiftRequest,
    responses(
        (status = 200, description = "Shift closed with its difference", body = ApiResponse<ClosedShift>),
        (status = 409, description = "Shift already closed"),
    ),
    tag = "Cash"
)]
pub async fn close_shift(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CloseShiftRequest>,
) -> AppResult<Json<ApiResponse<ClosedShift>>> {
    Ok(Json(cash_service::close_shift(&state, id, payload).await?))
}
