use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    cart::{CartLine, totals},
    db::DbPool,
    dto::{
        cart::{AddToCartRequest, CartView, UpdateCartLineRequest},
        orders::OrderWithItems,
    },
    error::{AppError, AppResult},
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

#[derive(FromRow)]
struct CartProductRow {
    name: String,
    price: i64,
    is_available: bool,
}

async fn ensure_table(pool: &DbPool, table_id: Uuid) -> AppResult<()> {
    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tables WHERE id = $1")
        .bind(table_id)
        .fetch_optional(pool)
        .await?;
    exists.map(|_| ()).ok_or(AppError::NotFound)
}

fn view(table_id: Uuid, lines: Vec<CartLine>) -> CartView {
    CartView {
        table_id,
        totals: totals(&lines),
        lines,
    }
}

pub async fn get_cart(state: &AppState, table_id: Uuid) -> AppResult<ApiResponse<CartView>> {
    let lines = state.carts.cart(table_id).await;
    Ok(ApiResponse::success("Cart", view(table_id, lines), None))
}

/// Add a product to a table's cart. Name and price are captured now so the
/// cart can be shown without the catalog; the order re-reads prices.
pub async fn add_to_cart(
    state: &AppState,
    table_id: Uuid,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    ensure_table(&state.pool, table_id).await?;

    let product = sqlx::query_as::<_, CartProductRow>(
        "SELECT name, price, is_available FROM products WHERE id = $1",
    )
    .bind(payload.product_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::BadRequest(format!("Unknown product {}", payload.product_id)))?;

    if !product.is_available {
        return Err(AppError::BadRequest(format!("{} is not available", product.name)));
    }

    let lines = state
        .carts
        .add(
            table_id,
            CartLine {
                product_id: payload.product_id,
                name: product.name,
                unit_price: product.price,
                quantity: payload.quantity,
                notes: payload.notes.trim().to_string(),
            },
        )
        .await?;

    tracing::debug!(table_id = %table_id, lines = lines.len(), "cart updated");
    Ok(ApiResponse::success("Added to cart", view(table_id, lines), None))
}

pub async fn update_line(
    state: &AppState,
    table_id: Uuid,
    index: usize,
    payload: UpdateCartLineRequest,
) -> AppResult<ApiResponse<CartView>> {
    let lines = state
        .carts
        .update_quantity(table_id, index, payload.quantity)
        .await?;
    Ok(ApiResponse::success("Cart updated", view(table_id, lines), None))
}

pub async fn remove_line(
    state: &AppState,
    table_id: Uuid,
    index: usize,
) -> AppResult<ApiResponse<CartView>> {
    let lines = state.carts.remove(table_id, index).await?;
    Ok(ApiResponse::success("Removed from cart", view(table_id, lines), None))
}

pub async fn clear_cart(state: &AppState, table_id: Uuid) -> AppResult<ApiResponse<CartView>> {
    state.carts.clear(table_id).await?;
    Ok(ApiResponse::success("Cart cleared", view(table_id, Vec::new()), None))
}

pub async fn submit(
    state: &AppState,
    table_id: Uuid,
    waiter_id: Option<Uuid>,
) -> AppResult<ApiResponse<OrderWithItems>> {
    order_service::submit_cart(state, table_id, waiter_id).await
}
