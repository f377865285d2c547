use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        cart::{AddToCartRequest, CartView, SubmitCartRequest, UpdateCartLineRequest},
        orders::{OrderWithItems, SessionItem},
        tables::{
            ChangeTableStatusRequest, CreateTableRequest, OccupyTableRequest, TableBoardEntry,
            TableWithSession, UpdateTableRequest,
        },
    },
    error::AppResult,
    models::DiningTable,
    response::ApiResponse,
    services::{cart_service, order_service, table_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tables).post(create_table))
        .route("/{id}", get(get_table).put(update_table).delete(delete_table))
        .route("/{id}/occupy", post(occupy_table))
        .route("/{id}/free", post(free_table))
        .route("/{id}/status", patch(change_status))
        .route("/{id}/items", get(session_items))
        .route("/{id}/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/{id}/cart/submit", post(submit_cart))
        .route("/{id}/cart/{index}", patch(update_cart_line).delete(remove_cart_line))
}

#[utoipa::path(
    get,
    path = "/api/tables",
    responses(
        (status = 200, description = "Floor board ordered by table number", body = ApiResponse<Vec<TableBoardEntry>>)
    ),
    tag = "Tables"
)]
pub async fn list_tables(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<TableBoardEntry>>>> {
    Ok(Json(table_service::list_tables(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/tables/{id}",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Table with its current session", body = ApiResponse<TableWithSession>),
        (status = 404, description = "Table not found"),
    ),
    tag = "Tables"
)]
pub async fn get_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TableWithSession>>> {
    Ok(Json(table_service::get_table(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/tables",
    request_body = CreateTableRequest,
    responses(
        (status = 200, description = "Table created with its QR link", body = ApiResponse<DiningTable>),
        (status = 409, description = "Number already used"),
    ),
    tag = "Tables"
)]
pub async fn create_table(
    State(state): State<AppState>,
    Json(payload): Json<CreateTableRequest>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    Ok(Json(table_service::create_table(&state, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/tables/{id}",
    params(("id" = Uuid, Path, description = "Table ID")),
    request_body = UpdateTableRequest,
    responses(
        (status = 200, description = "Table updated", body = ApiResponse<DiningTable>),
        (status = 404, description = "Table not found"),
        (status = 409, description = "Number already used"),
    ),
    tag = "Tables"
)]
pub async fn update_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTableRequest>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    Ok(Json(table_service::update_table(&state, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/tables/{id}",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Table deleted", body = ApiResponse<DiningTable>),
        (status = 409, description = "Table has a party seated"),
    ),
    tag = "Tables"
)]
pub async fn delete_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    Ok(Json(table_service::delete_table(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/tables/{id}/occupy",
    params(("id" = Uuid, Path, description = "Table ID")),
    request_body = OccupyTableRequest,
    responses(
        (status = 200, description = "Session opened", body = ApiResponse<TableWithSession>),
        (status = 409, description = "Table is not free"),
    ),
    tag = "Tables"
)]
pub async fn occupy_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<OccupyTableRequest>,
) -> AppResult<Json<ApiResponse<TableWithSession>>> {
    Ok(Json(table_service::occupy_table(&state, id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/tables/{id}/free",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Session closed", body = ApiResponse<TableWithSession>),
        (status = 409, description = "Table is already free"),
    ),
    tag = "Tables"
)]
pub async fn free_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TableWithSession>>> {
    Ok(Json(table_service::free_table(&state, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/tables/{id}/status",
    params(("id" = Uuid, Path, description = "Table ID")),
    request_body = ChangeTableStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<TableWithSession>),
        (status = 409, description = "Transition not allowed"),
    ),
    tag = "Tables"
)]
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeTableStatusRequest>,
) -> AppResult<Json<ApiResponse<TableWithSession>>> {
    Ok(Json(table_service::change_status(&state, id, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/tables/{id}/items",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Items on the running bill", body = ApiResponse<Vec<SessionItem>>),
        (status = 404, description = "Table not found"),
    ),
    tag = "Tables"
)]
pub async fn session_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<SessionItem>>>> {
    Ok(Json(order_service::active_order_items(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/tables/{id}/cart",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Cart with totals", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::get_cart(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/tables/{id}/cart",
    params(("id" = Uuid, Path, description = "Table ID")),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Line added or merged", body = ApiResponse<CartView>),
        (status = 400, description = "Unknown or unavailable product"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::add_to_cart(&state, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/tables/{id}/cart",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::clear_cart(&state, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/tables/{id}/cart/{index}",
    params(
        ("id" = Uuid, Path, description = "Table ID"),
        ("index" = usize, Path, description = "Line position"),
    ),
    request_body = UpdateCartLineRequest,
    responses(
        (status = 200, description = "Quantity set; zero removes the line", body = ApiResponse<CartView>),
        (status = 404, description = "No such line"),
    ),
    tag = "Cart"
)]
pub async fn update_cart_line(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(payload): Json<UpdateCartLineRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::update_line(&state, id, index, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/tables/{id}/cart/{index}",
    params(
        ("id" = Uuid, Path, description = "Table ID"),
        ("index" = usize, Path, description = "Line position"),
    ),
    responses(
        (status = 200, description = "Line removed", body = ApiResponse<CartView>),
        (status = 404, description = "No such line"),
    ),
    tag = "Cart"
)]
pub async fn remove_cart_line(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::remove_line(&state, id, index).await?))
}

#[utoipa::path(
    post,
    path = "/api/tables/{id}/cart/submit",
    params(("id" = Uuid, Path, description = "Table ID")),
    request_body = SubmitCartRequest,
    responses(
        (status = 200, description = "Order placed from the cart", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Cart is empty"),
    ),
    tag = "Cart"
)]
pub async fn submit_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitCartRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    Ok(Json(cart_service::submit(&state, id, payload.waiter_id).await?))
}
