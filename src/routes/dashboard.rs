use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::Dashboard, error::AppResult, response::ApiResponse,
    services::dashboard_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Floor, kitchen and sales at a glance", body = ApiResponse<Dashboard>)
    ),
    tag = "Dashboard"
)]
pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Dashboard>>> {
    Ok(Json(dashboard_service::dashboard(&state).await?))
}
