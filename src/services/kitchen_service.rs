use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::kitchen::ArchiveResult,
    entity::{
        categories::Entity as Categories,
        dining_tables::{Column as TableCol, Entity as DiningTables},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    kitchen::{
        CategoryLink, CategoryRef, KitchenItem, KitchenOrder, KitchenOrderView, ProductRef,
        StationSelection, board, item_matches, station::pending_station_items,
    },
    models::{ItemStatus, Order, OrderItem, OrderStatus},
    response::ApiResponse,
    services::order_service::{order_from_entity, order_item_from_entity},
    state::AppState,
    tentative::with_tentative,
};

/// Active orders (pending or cooking), oldest first, with items, product,
/// category and table number joined in.
pub async fn load_active_orders<C: ConnectionTrait>(conn: &C) -> AppResult<Vec<KitchenOrder>> {
    let orders = Orders::find()
        .filter(OrderCol::Status.is_in([
            OrderStatus::Pending.as_str(),
            OrderStatus::InProgress.as_str(),
        ]))
        .order_by_asc(OrderCol::CreatedAt)
        .all(conn)
        .await?;
    assemble(conn, orders).await
}

pub async fn load_kitchen_order<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<KitchenOrder> {
    let order = Orders::find_by_id(order_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    assemble(conn, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)
}

async fn load_kitchen_item<C: ConnectionTrait>(conn: &C, item_id: Uuid) -> AppResult<KitchenItem> {
    let item = OrderItems::find_by_id(item_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    let order = load_kitchen_order(conn, item.order_id).await?;
    order
        .items
        .into_iter()
        .find(|i| i.id == item_id)
        .ok_or(AppError::NotFound)
}

async fn assemble<C: ConnectionTrait>(conn: &C, orders: Vec<OrderModel>) -> AppResult<Vec<KitchenOrder>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?;

    let product_ids: HashSet<Uuid> = items.iter().map(|i| i.product_id).collect();
    let products = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(conn)
        .await?;

    let category_ids: HashSet<Uuid> = products.iter().filter_map(|p| p.category_id).collect();
    let categories: HashMap<Uuid, CategoryRef> = Categories::find()
        .filter(crate::entity::categories::Column::Id.is_in(category_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| {
            (
                c.id,
                CategoryRef {
                    station_id: c.station_id,
                    name: Some(c.name),
                },
            )
        })
        .collect();

    let products: HashMap<Uuid, ProductRef> = products
        .into_iter()
        .map(|p| {
            let categories = p
                .category_id
                .and_then(|id| categories.get(&id).cloned())
                .map(CategoryLink::One);
            (
                p.id,
                ProductRef {
                    name: p.name,
                    categories,
                },
            )
        })
        .collect();

    let table_ids: HashSet<Uuid> = orders.iter().map(|o| o.table_id).collect();
    let table_numbers: HashMap<Uuid, String> = DiningTables::find()
        .filter(TableCol::Id.is_in(table_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|t| (t.id, t.number))
        .collect();

    let mut items_by_order: HashMap<Uuid, Vec<KitchenItem>> = HashMap::new();
    for item in items {
        let product = products.get(&item.product_id).cloned();
        items_by_order
            .entry(item.order_id)
            .or_default()
            .push(kitchen_item_from_entity(item, product)?);
    }

    orders
        .into_iter()
        .map(|order| {
            Ok(KitchenOrder {
                id: order.id,
                table_id: order.table_id,
                table_number: table_numbers.get(&order.table_id).cloned(),
                status: order.status.parse()?,
                created_at: Some(order.created_at.with_timezone(&Utc)),
                kitchen_started_at: order.kitchen_started_at.map(|dt| dt.with_timezone(&Utc)),
                estimated_total_time: order.estimated_total_time,
                items: items_by_order.remove(&order.id).unwrap_or_default(),
            })
        })
        .collect()
}

fn kitchen_item_from_entity(model: OrderItemModel, product: Option<ProductRef>) -> AppResult<KitchenItem> {
    Ok(KitchenItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        notes: model.notes,
        status: model.status.parse()?,
        started_at: model.started_at.map(|dt| dt.with_timezone(&Utc)),
        finished_at: model.finished_at.map(|dt| dt.with_timezone(&Utc)),
        product,
    })
}

pub async fn refresh_board(state: &AppState) -> AppResult<usize> {
    let orders = load_active_orders(&state.orm).await?;
    let count = orders.len();
    state.board.replace(orders);
    Ok(count)
}

pub async fn board_view(
    state: &AppState,
    selection: StationSelection,
) -> AppResult<ApiResponse<Vec<KitchenOrderView>>> {
    let view = state.board.view(selection, Utc::now());
    Ok(ApiResponse::list("Kitchen board", view))
}

pub async fn start_preparation(state: &AppState, order_id: Uuid) -> AppResult<ApiResponse<Order>> {
    let existing = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let status: OrderStatus = existing.status.parse()?;
    if status != OrderStatus::Pending {
        return Err(AppError::BadRequest(format!(
            "Order is {status}, only pending orders can be started"
        )));
    }

    let now = Utc::now();
    let mut active: OrderActive = existing.clone().into();
    active.status = Set(OrderStatus::InProgress.as_str().into());
    active.kitchen_started_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let updated = active.update(&state.orm).await?;

    let order = order_from_entity(updated)?;
    state
        .feed
        .updated("orders", Some(&order_from_entity(existing)?), &order);
    tracing::info!(order_id = %order.id, "kitchen started order");

    Ok(ApiResponse::success("Preparation started", order, None))
}

pub async fn complete_order(state: &AppState, order_id: Uuid) -> AppResult<ApiResponse<Order>> {
    let existing = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let status: OrderStatus = existing.status.parse()?;
    if !status.is_kitchen_active() {
        return Err(AppError::BadRequest(format!("Order is already {status}")));
    }

    let now = Utc::now();
    let mut active: OrderActive = existing.clone().into();
    active.status = Set(OrderStatus::Ready.as_str().into());
    active.kitchen_finished_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let updated = active.update(&state.orm).await?;

    let order = order_from_entity(updated)?;
    state
        .feed
        .updated("orders", Some(&order_from_entity(existing)?), &order);

    Ok(ApiResponse::success("Order ready", order, None))
}

/// Write one item's status, stamping `started_at` for `preparing` and
/// `finished_at` for `ready`.
async fn write_item_status<C: ConnectionTrait>(
    conn: &C,
    item_id: Uuid,
    status: ItemStatus,
) -> AppResult<OrderItem> {
    let existing = OrderItems::find_by_id(item_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    let now = Utc::now();
    let mut active: OrderItemActive = existing.into();
    active.status = Set(status.as_str().into());
    match status {
        ItemStatus::Preparing => active.started_at = Set(Some(now.into())),
        ItemStatus::Ready => active.finished_at = Set(Some(now.into())),
        _ => {}
    }
    let updated = active.update(conn).await?;
    order_item_from_entity(updated)
}

fn ensure_kitchen_status(status: ItemStatus) -> AppResult<()> {
    match status {
        ItemStatus::Pending | ItemStatus::Preparing | ItemStatus::Ready => Ok(()),
        other => Err(AppError::BadRequest(format!(
            "Kitchen cannot set item status to {other}"
        ))),
    }
}

pub async fn update_item_status(
    state: &AppState,
    item_id: Uuid,
    status: ItemStatus,
) -> AppResult<ApiResponse<OrderItem>> {
    ensure_kitchen_status(status)?;

    let item = with_tentative(
        state.board.cache(),
        |orders| board::set_item_statuses(orders, &[item_id], status),
        write_item_status(&state.orm, item_id, status),
    )
    .await?;

    state.feed.updated("order_items", None, &item);
    Ok(ApiResponse::success("Item updated", item, None))
}

/// Flip an item between `ready` and `pending`. Stations may only touch
/// their own items; the `all` view may touch any.
pub async fn toggle_item(
    state: &AppState,
    item_id: Uuid,
    selection: StationSelection,
) -> AppResult<ApiResponse<OrderItem>> {
    let item = match state.board.find_item(item_id) {
        Some(item) => item,
        None => load_kitchen_item(&state.orm, item_id).await?,
    };
    if !item_matches(selection, &item) {
        return Err(AppError::BadRequest(
            "Item is prepared at another station".into(),
        ));
    }

    let next = if item.status == ItemStatus::Ready {
        ItemStatus::Pending
    } else {
        ItemStatus::Ready
    };
    update_item_status(state, item_id, next).await
}

/// Mark every unfinished item of `order_id` that belongs to the selected
/// station as ready, in one transaction.
pub async fn mark_station_ready(
    state: &AppState,
    order_id: Uuid,
    selection: StationSelection,
) -> AppResult<ApiResponse<Vec<OrderItem>>> {
    let order = load_kitchen_order(&state.orm, order_id).await?;
    let pending: Vec<Uuid> = pending_station_items(selection, &order)
        .into_iter()
        .map(|item| item.id)
        .collect();
    if pending.is_empty() {
        return Ok(ApiResponse::list("Nothing to mark", Vec::new()));
    }

    let write = async {
        let txn = state.orm.begin().await?;
        let mut updated = Vec::with_capacity(pending.len());
        for id in &pending {
            updated.push(write_item_status(&txn, *id, ItemStatus::Ready).await?);
        }
        txn.commit().await?;
        Ok::<_, AppError>(updated)
    };
    let updated = with_tentative(
        state.board.cache(),
        |orders| board::set_item_statuses(orders, &pending, ItemStatus::Ready),
        write,
    )
    .await?;

    for item in &updated {
        state.feed.updated("order_items", None, item);
    }
    tracing::info!(order_id = %order_id, station = %selection, count = updated.len(), "station items ready");

    Ok(ApiResponse::list("Station items ready", updated))
}

/// Cancel every order still on the board.
pub async fn archive_all(state: &AppState) -> AppResult<ApiResponse<ArchiveResult>> {
    let result = Orders::update_many()
        .col_expr(OrderCol::Status, Expr::value(OrderStatus::Cancelled.as_str()))
        .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(OrderCol::Status.is_in([
            OrderStatus::Pending.as_str(),
            OrderStatus::InProgress.as_str(),
        ]))
        .exec(&state.orm)
        .await?;

    let archived = result.rows_affected;
    state.board.replace(Vec::new());
    state.feed.updated(
        "orders",
        None,
        &serde_json::json!({ "archived": archived, "status": OrderStatus::Cancelled }),
    );
    audit::record(
        &state.pool,
        None,
        "kitchen_archive_all",
        "orders",
        serde_json::json!({ "archived": archived }),
    )
    .await;

    Ok(ApiResponse::success(
        "Board cleared",
        ArchiveResult { archived },
        None,
    ))
}
